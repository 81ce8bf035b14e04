//! CLI command implementations.

pub mod check;
pub mod init;
pub mod operators;
pub mod output;
pub mod run;
