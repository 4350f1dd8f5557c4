//! A deployable project: a directory holding `colocart.cfg` and a build
//! output directory.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{ProjectConfig, CONFIG_FILE_NAME};
use crate::error::ColocartError;

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// Open and validate the project at `path`.
    ///
    /// Checks run in a fixed order: config file present, config parses,
    /// project is a directory, build directory exists. The first failure wins
    /// and nothing is uploaded.
    pub fn open(path: &Path) -> Result<Self, ColocartError> {
        let root = resolve_root(path);
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.is_file() {
            error!(config_path = %config_path.display(), "Project has no config file");
            return Err(ColocartError::MissingConfig(root));
        }

        let config = ProjectConfig::load(&config_path)?;

        if !root.is_dir() {
            return Err(ColocartError::ProjectNotFound(root));
        }

        let project = Project { root, config };
        let build_dir = project.build_dir();
        if !build_dir.is_dir() {
            error!(build_dir = %build_dir.display(), "Project has no build directory");
            return Err(ColocartError::MissingBuildDirectory {
                project: project.root,
                build_dir: project.config.build_directory,
            });
        }

        info!(
            root = %project.root.display(),
            build_dir = %build_dir.display(),
            bucket = %project.config.bucket_name,
            "Opened project"
        );
        Ok(project)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.config.build_directory)
    }

    pub fn bucket_name(&self) -> &str {
        &self.config.bucket_name
    }
}

/// `.` means the current working directory.
pub fn resolve_root(path: &Path) -> PathBuf {
    if path == Path::new(".") {
        if let Ok(cwd) = std::env::current_dir() {
            return cwd;
        }
    }
    path.to_path_buf()
}
