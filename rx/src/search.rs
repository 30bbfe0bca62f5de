//! Search entry point: resolve, invoke, interpret

use tracing::{debug, info};

use crate::invoker::{Invocation, invoke};
use crate::outcome::{RipGrepResult, SearchOutcome, interpret};
use crate::resolver::{BinaryLocation, ResolverConfig, resolve};

/// Stateless handle for running ripgrep searches
///
/// Every call resolves the binary again and spawns its own process, so one
/// handle can serve any number of concurrent searches.
#[derive(Debug, Clone)]
pub struct RipGrep {
    config: ResolverConfig,
}

impl RipGrep {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Handle configured from the running process
    pub fn from_env() -> Self {
        Self::new(ResolverConfig::from_env())
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Binary a search would run right now
    pub fn resolve(&self) -> BinaryLocation {
        resolve(&self.config)
    }

    /// Search `target` with `args`
    pub async fn search<I, S>(&self, args: I, target: impl Into<String>) -> SearchOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(&Invocation::new(args, target)).await
    }

    pub async fn run(&self, invocation: &Invocation) -> SearchOutcome {
        let location = self.resolve();
        debug!(path = ?location.path, source = %location.source, "RipGrep::run: resolved binary");

        let raw = invoke(&location.path, invocation).await;
        let outcome = interpret(raw);

        match &outcome {
            SearchOutcome::Matches { lines } => {
                debug!(count = lines.len(), "RipGrep::run: matches found");
            }
            SearchOutcome::NoMatch => {
                debug!("RipGrep::run: no matches");
            }
            SearchOutcome::Failed(failure) => {
                info!(kind = ?failure.kind, exit_code = ?failure.exit_code, stderr = %failure.stderr.trim(), "RipGrep::run: search failed");
            }
        }
        outcome
    }
}

/// Run one search with environment-derived configuration, returning the flat result
pub async fn rip_grep(args: &[String], target: &str) -> RipGrepResult {
    RipGrep::from_env().search(args.iter().cloned(), target).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FailureKind;
    use crate::resolver::{Layout, Source};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn with_binary(binary: &str) -> RipGrep {
        let mut config = ResolverConfig::new(Layout::Packaged, "/opt/app/bin");
        config.binary = Some(PathBuf::from(binary));
        RipGrep::new(config)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_search_scenario_match() {
        let rg = with_binary("/bin/sh");
        let outcome = rg.search(["-c", "printf 'file.ts:3:%s\\n' \"$0\""], "TODO").await;

        assert_eq!(
            RipGrepResult::from(outcome),
            RipGrepResult {
                success: true,
                lines: vec!["file.ts:3:TODO".to_string()],
                exit_code: Some(0),
                stderr: String::new(),
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_search_scenario_no_match() {
        let rg = with_binary("/bin/sh");
        let outcome = rg.search(["-c", "echo 'not a failure' >&2; exit 1"], "nothing-here").await;

        assert_eq!(outcome, SearchOutcome::NoMatch);
        assert_eq!(
            RipGrepResult::from(outcome),
            RipGrepResult {
                success: true,
                lines: vec![],
                exit_code: Some(1),
                stderr: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_search_missing_vendored_binary() {
        let install = tempdir().unwrap();
        let empty_path = tempdir().unwrap();
        let mut config = ResolverConfig::new(Layout::Packaged, install.path().join("bin"));
        config.search_path = Some(empty_path.path().as_os_str().to_os_string());
        let rg = RipGrep::new(config);

        assert_eq!(rg.resolve().source, Source::Vendored);

        let outcome = rg.search(["-n"], "TODO").await;
        match &outcome {
            SearchOutcome::Failed(failure) => assert_eq!(failure.kind, FailureKind::Spawn),
            other => panic!("expected spawn failure, got {:?}", other),
        }

        let result = RipGrepResult::from(outcome);
        assert!(!result.success);
        assert!(result.lines.is_empty());
        assert_eq!(result.exit_code, None);
        assert!(!result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_search_unexecutable_binary() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let binary = dir.path().join("rg");
        std::fs::write(&binary, b"\x7fELF\x02\x01\x01").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut config = ResolverConfig::new(Layout::Packaged, "/opt/app/bin");
        config.binary = Some(binary);
        let result = RipGrepResult::from(RipGrep::new(config).search(["-n"], "TODO").await);

        assert!(!result.success);
        assert!(result.lines.is_empty());
        assert_eq!(result.exit_code, None);
        assert!(!result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_concurrent_searches_are_independent() {
        let rg = with_binary("/bin/sh");
        let (first, second) = tokio::join!(
            rg.search(["-c", "echo \"one:$0\""], "a"),
            rg.search(["-c", "exit 1"], "b"),
        );

        assert_eq!(first.lines(), ["one:a".to_string()]);
        assert_eq!(second, SearchOutcome::NoMatch);
    }
}
