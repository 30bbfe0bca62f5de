//! Platform naming for the bundled ripgrep binaries
//!
//! The vendor tree is keyed by `<arch>-<platform>` using the names the
//! release archives ship under (`x64-linux`, `arm64-darwin`, ...), not the
//! Rust target names. Windows is the exception: every Windows host uses the
//! single `x64-win32/rg.exe` build.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

/// Rust `ARCH` name -> vendor architecture name
const ARCH_NAMES: &[(&str, &str)] = &[
    ("x86_64", "x64"),
    ("aarch64", "arm64"),
    ("x86", "ia32"),
    ("arm", "arm"),
    ("powerpc64", "ppc64"),
    ("s390x", "s390x"),
    ("riscv64", "riscv64"),
    ("loongarch64", "loong64"),
];

/// Rust `OS` name -> vendor platform name
const OS_NAMES: &[(&str, &str)] = &[
    ("linux", "linux"),
    ("macos", "darwin"),
    ("windows", "win32"),
    ("freebsd", "freebsd"),
    ("openbsd", "openbsd"),
    ("android", "android"),
    ("solaris", "sunos"),
    ("aix", "aix"),
];

/// Platforms whose bundled binary ignores the host architecture:
/// (vendor platform, vendor directory, executable name)
const FIXED_VENDOR_DIRS: &[(&str, &str, &str)] = &[("win32", "x64-win32", "rg.exe")];

/// Executable name used when no fixed entry applies
const DEFAULT_EXECUTABLE: &str = "rg";

/// Target OS and CPU architecture, in Rust `std::env::consts` naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process is running on
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Vendor platform name (`darwin`, `win32`, ...); unknown names pass through
    pub fn vendor_os(&self) -> &str {
        lookup(OS_NAMES, &self.os)
    }

    /// Vendor architecture name (`x64`, `arm64`, ...); unknown names pass through
    pub fn vendor_arch(&self) -> &str {
        lookup(ARCH_NAMES, &self.arch)
    }

    fn fixed_entry(&self) -> Option<&'static (&'static str, &'static str, &'static str)> {
        let os = self.vendor_os();
        FIXED_VENDOR_DIRS.iter().find(|(platform, _, _)| *platform == os)
    }

    /// Directory under `vendor/ripgrep` holding the binary for this platform
    pub fn vendor_dir(&self) -> String {
        match self.fixed_entry() {
            Some((_, dir, _)) => dir.to_string(),
            None => format!("{}-{}", self.vendor_arch(), self.vendor_os()),
        }
    }

    /// File name of the bundled executable
    pub fn executable_name(&self) -> &'static str {
        self.fixed_entry().map(|(_, _, exe)| *exe).unwrap_or(DEFAULT_EXECUTABLE)
    }

    /// `<vendor_dir>/<executable_name>`, relative to `vendor/ripgrep`
    pub fn vendor_relative_path(&self) -> PathBuf {
        let path = PathBuf::from(self.vendor_dir()).join(self.executable_name());
        debug!(platform = %self, ?path, "Platform::vendor_relative_path: resolved");
        path
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}

fn lookup<'a>(table: &'static [(&'static str, &'static str)], name: &'a str) -> &'a str {
    table
        .iter()
        .find(|(rust_name, _)| *rust_name == name)
        .map(|(_, vendor_name)| *vendor_name)
        .unwrap_or(name)
}
