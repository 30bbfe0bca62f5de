//! Interpret a finished process as a search outcome
//!
//! ripgrep exits 1 when it ran fine but matched nothing. That case is a
//! successful search with no lines, never a failure.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RunError;
use crate::invoker::RawTermination;

/// Exit code ripgrep uses for "no matches"
pub const NO_MATCH_EXIT_CODE: i32 = 1;

/// Result of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Clean zero exit
    Matches { lines: Vec<String> },

    /// Exit code 1
    NoMatch,

    Failed(SearchFailure),
}

/// Broad cause of a failed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Exited with a code other than 0 or 1
    Exited,
    /// Terminated by a signal it did not ask for
    Killed,
    Timeout,
    OutputLimit,
    /// Never started
    Spawn,
    Io,
}

impl From<&RunError> for FailureKind {
    fn from(err: &RunError) -> Self {
        match err {
            RunError::Spawn { .. } => Self::Spawn,
            RunError::Exited { .. } => Self::Exited,
            RunError::Signaled { .. } => Self::Killed,
            RunError::Timeout { .. } => Self::Timeout,
            RunError::OutputLimit { .. } => Self::OutputLimit,
            RunError::Io(_) => Self::Io,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub kind: FailureKind,
    /// Lines captured before the failure
    pub lines: Vec<String>,
    pub exit_code: Option<i32>,
    /// Captured stderr, or the error text when stderr was empty. Never empty.
    pub stderr: String,
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn lines(&self) -> &[String] {
        match self {
            Self::Matches { lines } => lines,
            Self::NoMatch => &[],
            Self::Failed(failure) => &failure.lines,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Matches { .. } => Some(0),
            Self::NoMatch => Some(NO_MATCH_EXIT_CODE),
            Self::Failed(failure) => failure.exit_code,
        }
    }
}

/// Flat result shape: `{ success, lines, exitCode, stderr }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RipGrepResult {
    pub success: bool,
    pub lines: Vec<String>,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl From<SearchOutcome> for RipGrepResult {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Matches { lines } => Self {
                success: true,
                lines,
                exit_code: Some(0),
                stderr: String::new(),
            },
            SearchOutcome::NoMatch => Self {
                success: true,
                lines: Vec::new(),
                exit_code: Some(NO_MATCH_EXIT_CODE),
                stderr: String::new(),
            },
            SearchOutcome::Failed(failure) => Self {
                success: false,
                lines: failure.lines,
                exit_code: failure.exit_code,
                stderr: failure.stderr,
            },
        }
    }
}

/// Map a raw termination onto an outcome
pub fn interpret(raw: RawTermination) -> SearchOutcome {
    let Some(error) = raw.error else {
        return SearchOutcome::Matches {
            lines: parse_lines(&raw.stdout),
        };
    };

    if error.exit_code() == Some(NO_MATCH_EXIT_CODE) {
        debug!("interpret: exit code 1, no matches");
        return SearchOutcome::NoMatch;
    }

    debug!(%error, "interpret: search failed");
    let stderr = if raw.stderr.is_empty() {
        error.to_string()
    } else {
        raw.stderr
    };

    SearchOutcome::Failed(SearchFailure {
        kind: FailureKind::from(&error),
        lines: parse_lines(&raw.stdout),
        exit_code: error.exit_code(),
        stderr,
    })
}

/// Split stdout into trimmed, non-empty lines
pub fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .trim()
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw(error: Option<RunError>, stdout: &str, stderr: &str) -> RawTermination {
        RawTermination {
            error,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_clean_exit_with_matches() {
        let outcome = interpret(raw(None, "file.ts:3:TODO\n", ""));
        let result = RipGrepResult::from(outcome);

        assert_eq!(
            result,
            RipGrepResult {
                success: true,
                lines: vec!["file.ts:3:TODO".to_string()],
                exit_code: Some(0),
                stderr: String::new(),
            }
        );
    }

    #[test]
    fn test_clean_exit_drops_stderr_noise() {
        let outcome = interpret(raw(None, "a.rs:1:x\n", "rg: warning\n"));
        let result = RipGrepResult::from(outcome);
        assert!(result.success);
        assert_eq!(result.stderr, "");
    }

    #[test]
    fn test_exit_one_is_no_match() {
        let outcome = interpret(raw(Some(RunError::Exited { code: 1 }), "ignored\n", "ignored"));
        assert_eq!(outcome, SearchOutcome::NoMatch);

        let result = RipGrepResult::from(outcome);
        assert!(result.success);
        assert!(result.lines.is_empty());
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.stderr, "");
    }

    #[test]
    fn test_other_exit_code_fails_with_stderr() {
        let outcome = interpret(raw(
            Some(RunError::Exited { code: 2 }),
            "src/a.rs:1:hit\n",
            "rg: src/locked: Permission denied\n",
        ));

        match &outcome {
            SearchOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Exited);
                assert_eq!(failure.lines, vec!["src/a.rs:1:hit".to_string()]);
                assert_eq!(failure.exit_code, Some(2));
                assert!(failure.stderr.contains("Permission denied"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_failure_without_stderr_uses_error_text() {
        let error = RunError::Spawn {
            program: PathBuf::from("/opt/vendor/ripgrep/x64-linux/rg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        };
        let result = RipGrepResult::from(interpret(raw(Some(error), "", "")));

        assert!(!result.success);
        assert!(result.lines.is_empty());
        assert_eq!(result.exit_code, None);
        assert!(result.stderr.contains("/opt/vendor/ripgrep/x64-linux/rg"));
    }

    #[test]
    fn test_timeout_and_output_limit_kinds() {
        let timeout = interpret(raw(Some(RunError::Timeout { timeout_ms: 60_000 }), "partial\n", ""));
        assert_eq!(timeout.exit_code(), None);
        assert_eq!(timeout.lines(), ["partial".to_string()]);
        assert!(matches!(timeout, SearchOutcome::Failed(SearchFailure { kind: FailureKind::Timeout, .. })));

        let overflow = interpret(raw(Some(RunError::OutputLimit { limit: 10_000_000 }), "", ""));
        match overflow {
            SearchOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::OutputLimit);
                assert!(failure.stderr.contains("10000000"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_lines_drops_blanks() {
        let lines = parse_lines("\n\n  a.rs:1:x  \r\n\n\tb.rs:2:y\n\n");
        assert_eq!(lines, vec!["a.rs:1:x".to_string(), "b.rs:2:y".to_string()]);
        assert!(parse_lines("").is_empty());
        assert!(parse_lines("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = RipGrepResult::from(SearchOutcome::NoMatch);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "lines": [], "exitCode": 1, "stderr": "" })
        );
    }
}
