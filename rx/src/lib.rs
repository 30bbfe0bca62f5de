//! ripexec - bounded ripgrep invocation
//!
//! Finds a usable `rg` binary, runs it as a child process with a hard
//! timeout and output ceiling, and turns the result into a [`SearchOutcome`]
//! that keeps "no matches" (exit code 1) apart from real failures.
//!
//! # Modules
//!
//! - [`platform`] - vendor directory naming per OS/architecture
//! - [`resolver`] - system path lookup and bundled fallback
//! - [`invoker`] - subprocess execution under fixed limits
//! - [`outcome`] - exit code interpretation and line splitting
//! - [`search`] - the composed entry point
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```ignore
//! use ripexec::RipGrep;
//!
//! let outcome = RipGrep::from_env().search(["-n"], "TODO").await;
//! for line in outcome.lines() {
//!     println!("{}", line);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod invoker;
pub mod outcome;
pub mod platform;
pub mod resolver;
pub mod search;

pub use config::Config;
pub use error::RunError;
pub use invoker::{Invocation, MAX_BUFFER_BYTES, RawTermination, TIMEOUT, invoke};
pub use outcome::{FailureKind, RipGrepResult, SearchFailure, SearchOutcome, interpret, parse_lines};
pub use platform::Platform;
pub use resolver::{BinaryLocation, Layout, ResolverConfig, Source, resolve};
pub use search::{RipGrep, rip_grep};
