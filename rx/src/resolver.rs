//! Locate the ripgrep executable
//!
//! Resolution order:
//! 1. An explicitly configured binary
//! 2. A genuine (non-shim) `rg` on the command search path
//! 3. The bundled copy under `<install root>/vendor/ripgrep/<arch>-<platform>/`
//!
//! Resolution never fails. A bundled path that does not exist is returned
//! unchanged and the error surfaces when the process is spawned.

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::Platform;

/// Conventional name of the search tool on the command search path
pub const RG_NAME: &str = "rg";

/// Environment variable marking test mode (`RIPEXEC_ENV=test`)
pub const ENV_VAR: &str = "RIPEXEC_ENV";

/// Extensions of Windows forwarding scripts
const SHIM_EXTENSIONS: &[&str] = &["cmd", "bat", "ps1"];

/// How the program is laid out on disk
///
/// Development and test runs sit one directory deeper in the tree than a
/// packaged install (`target/debug/rx` vs `bin/rx`). Test binaries built by
/// cargo live one level deeper still (`target/debug/deps`), so from there
/// `Development` lands on `target/`; tests set `install_root` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Development,
    Packaged,
}

impl Layout {
    /// Classify from the two environment facts
    pub fn detect(test_mode: bool, dev_runtime: bool) -> Self {
        if test_mode || dev_runtime {
            Self::Development
        } else {
            Self::Packaged
        }
    }

    /// Classify from process environment: `RIPEXEC_ENV=test`, or launched via cargo
    pub fn from_env() -> Self {
        let test_mode = std::env::var(ENV_VAR).is_ok_and(|v| v == "test");
        let dev_runtime = std::env::var_os("CARGO").is_some();
        debug!(test_mode, dev_runtime, "Layout::from_env: classified");
        Self::detect(test_mode, dev_runtime)
    }

    /// Directories between the executable's directory and the install root
    pub fn levels_up(self) -> usize {
        match self {
            Self::Development => 2,
            Self::Packaged => 1,
        }
    }
}

/// Inputs to binary resolution
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub layout: Layout,

    /// Directory the install root is computed from (normally the executable's)
    pub base_dir: PathBuf,

    pub platform: Platform,

    /// Use this install root instead of computing one from `base_dir`
    pub install_root: Option<PathBuf>,

    /// Search path to look in instead of `PATH`
    pub search_path: Option<OsString>,

    /// Skip resolution and run this binary
    pub binary: Option<PathBuf>,
}

impl ResolverConfig {
    pub fn new(layout: Layout, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            base_dir: base_dir.into(),
            platform: Platform::current(),
            install_root: None,
            search_path: None,
            binary: None,
        }
    }

    /// Layout and base directory taken from the running process
    pub fn from_env() -> Self {
        Self::new(Layout::from_env(), current_exe_dir())
    }

    /// Root directory the `vendor` tree hangs off
    pub fn install_root(&self) -> PathBuf {
        if let Some(root) = &self.install_root {
            return root.clone();
        }

        let mut root = self.base_dir.as_path();
        for _ in 0..self.layout.levels_up() {
            root = root.parent().unwrap_or(root);
        }
        root.to_path_buf()
    }

    /// Full path of the bundled binary for the configured platform
    pub fn vendored_path(&self) -> PathBuf {
        self.install_root()
            .join("vendor")
            .join("ripgrep")
            .join(self.platform.vendor_relative_path())
    }
}

/// Where a resolved binary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Configured,
    SystemPath,
    Vendored,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configured => "configured",
            Self::SystemPath => "system path",
            Self::Vendored => "vendored",
        };
        write!(f, "{}", name)
    }
}

/// A resolved executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLocation {
    pub path: PathBuf,
    pub source: Source,
}

impl BinaryLocation {
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Resolve the executable to run. Computed fresh on every call.
pub fn resolve(config: &ResolverConfig) -> BinaryLocation {
    if let Some(binary) = &config.binary {
        debug!(?binary, "resolve: using configured binary");
        return BinaryLocation {
            path: binary.clone(),
            source: Source::Configured,
        };
    }

    if let Some(path) = lookup_search_path(config) {
        debug!(?path, "resolve: using rg from search path");
        return BinaryLocation {
            path,
            source: Source::SystemPath,
        };
    }

    let path = config.vendored_path();
    debug!(?path, layout = ?config.layout, "resolve: falling back to vendored rg");
    BinaryLocation {
        path,
        source: Source::Vendored,
    }
}

fn lookup_search_path(config: &ResolverConfig) -> Option<PathBuf> {
    let found = match &config.search_path {
        Some(paths) => which::which_in(RG_NAME, Some(paths), &config.base_dir),
        None => which::which(RG_NAME),
    };

    match found {
        Ok(path) if is_shim(&path) => {
            debug!(?path, "lookup_search_path: ignoring shim");
            None
        }
        Ok(path) => Some(path),
        Err(e) => {
            debug!(%e, "lookup_search_path: rg not on search path");
            None
        }
    }
}

/// True when `path` forwards to another program rather than being the binary
pub fn is_shim(path: &Path) -> bool {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SHIM_EXTENSIONS.iter().any(|shim| ext.eq_ignore_ascii_case(shim)));
    if by_extension {
        return true;
    }

    let mut magic = [0u8; 2];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map(|_| &magic == b"#!")
        .unwrap_or(false)
}

fn current_exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
