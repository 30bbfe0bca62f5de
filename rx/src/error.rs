//! Process-level error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running the search binary
///
/// A non-zero exit is reported here as well; whether it is a real failure is
/// decided by the outcome interpreter, not by the invoker.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to spawn {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Process exited with code {code}")]
    Exited { code: i32 },

    #[error("Process was killed by signal {signal}")]
    Signaled { signal: String },

    #[error("Process timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Output exceeded {limit} bytes")]
    OutputLimit { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Exit code reported by the process, if it exited on its own
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited { code } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_message_names_program() {
        let err = RunError::Spawn {
            program: PathBuf::from("/opt/vendor/rg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        };

        let msg = err.to_string();
        assert!(msg.contains("/opt/vendor/rg"));
        assert!(msg.contains("No such file"));
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn test_exit_code_only_for_exited() {
        assert_eq!(RunError::Exited { code: 2 }.exit_code(), Some(2));
        assert_eq!(RunError::Timeout { timeout_ms: 60_000 }.exit_code(), None);
        assert_eq!(RunError::OutputLimit { limit: 10 }.exit_code(), None);
        assert!(RunError::Timeout { timeout_ms: 60_000 }.to_string().contains("60000ms"));
    }
}
