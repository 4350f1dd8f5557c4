//! Error taxonomy shared by the build and deploy pipelines.
//!
//! Every variant maps onto one of three [`ErrorKind`]s. All of them are
//! terminal for an invocation; nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::BoxError;

/// Broad class of a failure, used by the CLI to choose how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing project, config file or build directory.
    Usage,
    /// The frontend build (or the build-info file in front of it) failed.
    Build,
    /// The storage backend or the directory walk failed mid-upload.
    Upload,
}

#[derive(Debug, Error)]
pub enum ColocartError {
    #[error("No such directory [{}].", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("The project [{}] has no colocart.cfg.", .0.display())]
    MissingConfig(PathBuf),

    #[error("Invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("The project [{}] has no build directory ({build_dir}).", project.display())]
    MissingBuildDirectory { project: PathBuf, build_dir: String },

    #[error("Build failed: success marker {marker:?} not found in build output")]
    BuildFailed { marker: String, output: String },

    #[error("Failed to write build info to {}: {source}", path.display())]
    BuildInfo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run build command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload to bucket [{bucket}] failed: {source}")]
    Upload {
        bucket: String,
        #[source]
        source: BoxError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ColocartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ColocartError::ProjectNotFound(_)
            | ColocartError::MissingConfig(_)
            | ColocartError::Config { .. }
            | ColocartError::MissingBuildDirectory { .. } => ErrorKind::Usage,
            ColocartError::BuildFailed { .. }
            | ColocartError::BuildInfo { .. }
            | ColocartError::Spawn { .. } => ErrorKind::Build,
            ColocartError::Upload { .. } | ColocartError::Io { .. } => ErrorKind::Upload,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ColocartError::Io {
            path: path.into(),
            source,
        }
    }
}
