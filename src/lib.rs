//! Authorized Google Drive client.
//!
//! [`drive::DriveClient`] wraps create, get, list and batch trash/delete calls so that
//! each one runs only after the configured [`drive::auth::Authorizer`] has produced a
//! credential. The `gdrive-model` binary exposes the same operations on the command line.

pub mod cli;
pub mod config;
pub mod drive;
pub mod error;
pub mod utils;
