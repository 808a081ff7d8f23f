//! Command handlers for the oxt CLI.

pub mod build;
pub mod common;
pub mod init;
pub mod validate;
