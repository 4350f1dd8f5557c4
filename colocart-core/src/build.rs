//! Frontend build step.
//!
//! Stamps the project with a generated build-info module, then runs the
//! project's build command in the project directory and looks for the
//! success marker in its stdout. The working directory is passed to every
//! child process explicitly; the process-wide cwd is never changed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info, warn};

use crate::config::BuildSettings;
use crate::error::ColocartError;

/// Values stamped into the generated build-info module.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BuildInfo {
    pub commit: String,
    pub user: String,
    /// Milliseconds since the Unix epoch.
    pub creation_ms: i64,
}

impl BuildInfo {
    pub fn collect(project: &Path) -> Self {
        BuildInfo {
            commit: current_commit(project),
            user: current_user(),
            creation_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Render as an ES module with a default export.
    pub fn render(&self) -> String {
        format!(
            "export default {{\n    \"commit\": {},\n    \"user\": {},\n    \"creation\": new Date({}),\n}};\n",
            js_string(&self.commit),
            js_string(&self.user),
            self.creation_ms
        )
    }

    /// Write the rendered module to `<project>/<relative>` and return the full path.
    pub fn write(&self, project: &Path, relative: &Path) -> Result<PathBuf, ColocartError> {
        let path = project.join(relative);
        fs::write(&path, self.render()).map_err(|source| {
            error!(error = ?source, path = %path.display(), "Failed to write build info");
            ColocartError::BuildInfo {
                path: path.clone(),
                source,
            }
        })?;
        debug!(path = %path.display(), commit = %self.commit, "Wrote build info");
        Ok(path)
    }
}

fn js_string(value: &str) -> String {
    // A JSON string literal is a valid JS string literal.
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

/// `git rev-parse HEAD` in `project`; empty when git is unavailable or the
/// project is not a repository.
pub fn current_commit(project: &Path) -> String {
    let output = Command::new("git")
        .arg("rev-parse")
        .arg("HEAD")
        .current_dir(project)
        .output();

    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        Ok(out) => {
            warn!(
                project = %project.display(),
                status = %out.status,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "git rev-parse exited with non-zero code; commit left empty"
            );
            String::new()
        }
        Err(e) => {
            warn!(error = ?e, "Failed to launch git; commit left empty");
            String::new()
        }
    }
}

pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub info: BuildInfo,
    pub info_path: PathBuf,
    pub output: String,
}

/// Run the full build step for `project`.
///
/// Fails with [`ColocartError::ProjectNotFound`] before touching anything if
/// `project` is not a directory. Success is decided by the marker in stdout,
/// not by the exit status.
pub fn build(project: &Path, settings: &BuildSettings) -> Result<BuildReport, ColocartError> {
    if !project.is_dir() {
        error!(project = %project.display(), "Project directory does not exist");
        return Err(ColocartError::ProjectNotFound(project.to_path_buf()));
    }

    let info = BuildInfo::collect(project);
    let info_path = info.write(project, &settings.build_info_path)?;

    info!(project = %project.display(), command = %settings.command, "Running build command");
    let output = shell(&settings.command)
        .current_dir(project)
        .output()
        .map_err(|source| {
            error!(error = ?source, command = %settings.command, "Failed to launch build command");
            ColocartError::Spawn {
                command: settings.command.clone(),
                source,
            }
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!(status = %output.status, stdout_len = stdout.len(), "Build command finished");

    if !stdout.contains(&settings.success_marker) {
        error!(
            status = %output.status,
            marker = %settings.success_marker,
            "Build output is missing the success marker"
        );
        return Err(ColocartError::BuildFailed {
            marker: settings.success_marker.clone(),
            output: stdout,
        });
    }

    if !output.status.success() {
        warn!(status = %output.status, "Build printed the success marker but exited non-zero");
    }

    info!(project = %project.display(), "Build succeeded");
    Ok(BuildReport {
        info,
        info_path,
        output: stdout,
    })
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_es_module() {
        let info = BuildInfo {
            commit: "abc123".into(),
            user: "jordan".into(),
            creation_ms: 1_600_000_000_000,
        };
        assert_eq!(
            info.render(),
            "export default {\n    \"commit\": \"abc123\",\n    \"user\": \"jordan\",\n    \"creation\": new Date(1600000000000),\n};\n"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let info = BuildInfo {
            commit: String::new(),
            user: "a\"b".into(),
            creation_ms: 0,
        };
        assert!(info.render().contains(r#""user": "a\"b","#));
    }
}
