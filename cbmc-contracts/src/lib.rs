//! Compositional CBMC contract checking
//!
//! Finds the functions of a C code base that carry CBMC contracts and proves
//! each one in isolation: every other contracted function it calls is
//! replaced by its contract instead of being explored.

pub mod artifact;
pub mod compdb;
pub mod config;
pub mod contracts;
pub mod driver;
pub mod error;
pub mod harness;
pub mod resolver;
pub mod symbols;
pub mod tool;
pub mod util;

pub use config::{RunConfig, Toolchain};
pub use driver::{RunSummary, Verifier, run};
pub use error::{CheckError, Result};
pub use tool::{ProcessRunner, ToolCommand, ToolRunner};
