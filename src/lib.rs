//! xattrtest - extended attribute performance harness
//!
//! Creates a corpus of files, sets a configurable number of extended
//! attributes on each, reads them back with optional content verification,
//! and removes the corpus, timing every phase. Cache state between phases
//! is controlled by sync, a kernel cache drop, and an external hook.

pub mod buffers;
pub mod cache;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod payload;
pub mod phase;
pub mod reader;
pub mod report;
pub mod timing;
pub mod writer;
pub mod xattr;

pub use config::RunConfig;
pub use error::{BenchError, HookError};
pub use phase::{Benchmark, Phase, PhaseReport};
