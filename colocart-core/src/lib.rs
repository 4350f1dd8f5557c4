#![doc = "colocart-core: core logic library for colocart."]

//! This crate holds everything colocart does that is not CLI glue: reading
//! `colocart.cfg`, validating a project, running the frontend build and
//! uploading a build directory through an [`contract::Uploader`].
//!
//! # Usage
//! The `colocart` binary crate supplies the S3-backed uploader; tests supply
//! `MockUploader` (see the `test-export-mocks` feature).

pub mod build;
pub mod config;
pub mod contract;
pub mod error;
pub mod project;
pub mod upload;

pub use error::{ColocartError, ErrorKind};
