//! Command-line surface: `colocart build` and `colocart deploy`.
//!
//! All non-trivial behaviour lives in `colocart-core`; this module parses
//! arguments, wires the S3 uploader in, and turns errors into the messages a
//! user sees.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colocart_core::build::build;
use colocart_core::config::BuildSettings;
use colocart_core::project::{resolve_root, Project};
use colocart_core::upload::upload_directory;
use colocart_core::{ColocartError, ErrorKind};

use crate::output;
use crate::s3::{S3Settings, S3Uploader};

/// Build a frontend project and deploy its build output to S3.
#[derive(Parser)]
#[clap(name = "colocart", version, about = "Build and deploy static frontends to S3")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stamp build info into the project and run its build command
    Build {
        /// Project directory
        project: PathBuf,
    },
    /// Upload the project's build directory to the configured bucket
    Deploy {
        /// Project directory containing colocart.cfg
        #[clap(default_value = ".")]
        project: PathBuf,
        /// AWS credential profile to use instead of the default chain
        #[clap(long)]
        profile_name: Option<String>,
    },
}

/// CLI entrypoint shared by `main` and tests. Errors come back as
/// [`ColocartError`] wrapped in `anyhow`; see [`report_error`].
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build { project } => run_build(project),
        Commands::Deploy {
            project,
            profile_name,
        } => run_deploy(project, profile_name).await,
    }
}

fn run_build(project: PathBuf) -> Result<()> {
    output::info(&format!("Building {}...", project.display()));
    tracing::info!(command = "build", project = %project.display(), "Starting build");

    if !project.is_dir() {
        return Err(ColocartError::ProjectNotFound(project).into());
    }

    let settings = BuildSettings::load_optional(&project)?;
    let report = build(&project, &settings)?;

    tracing::info!(
        command = "build",
        commit = %report.info.commit,
        info_path = %report.info_path.display(),
        "Build complete"
    );
    output::succeed("Build complete.");
    Ok(())
}

async fn run_deploy(project: PathBuf, profile_name: Option<String>) -> Result<()> {
    let root = resolve_root(&project);
    output::info(&format!("Deploying {}...", root.display()));
    tracing::info!(command = "deploy", project = %root.display(), "Starting deploy");

    let project = Project::open(&root)?;

    let settings = S3Settings {
        profile_name,
        region: project.config.region.clone(),
        endpoint_url: project.config.endpoint_url.clone(),
    };
    let uploader = S3Uploader::connect(&settings).await;

    let report = upload_directory(&project.build_dir(), project.bucket_name(), &uploader).await?;

    match serde_json::to_string_pretty(&report) {
        Ok(json) => tracing::debug!(json = %json, "Upload report"),
        Err(e) => tracing::error!(error = ?e, "Failed to serialize upload report"),
    }
    output::info(&format!(
        "Uploaded {} file(s) to [{}], skipped {}.",
        report.uploaded.len(),
        project.bucket_name(),
        report.skipped.len()
    ));
    output::succeed("Deploy complete.");
    Ok(())
}

/// Print a user-facing description of a failed run.
pub fn report_error(err: &anyhow::Error) {
    let Some(err) = err.downcast_ref::<ColocartError>() else {
        output::error(&format!("{err:#}"));
        return;
    };

    match (err.kind(), err) {
        (ErrorKind::Build, ColocartError::BuildFailed { output: log, .. }) => {
            let rule = "=".repeat(80);
            output::error("Build failed:");
            output::error(&rule);
            output::error(log);
            output::error(&rule);
            output::error("Failed with errors, aborting.");
        }
        (ErrorKind::Upload, ColocartError::Upload { bucket, source }) => {
            output::error(&format!("Upload to bucket [{bucket}] failed:"));
            eprintln!("{source}");
        }
        _ => output::error(&err.to_string()),
    }

    if let Some(hint) = hint(err) {
        output::warn(hint);
    }
}

/// Follow-up suggestion printed after the error itself.
fn hint(err: &ColocartError) -> Option<&'static str> {
    match err.kind() {
        ErrorKind::Upload => Some("Check your AWS permissions?"),
        ErrorKind::Usage if matches!(err, ColocartError::MissingBuildDirectory { .. }) => {
            Some("Have you run the 'build' command yet?")
        }
        ErrorKind::Usage | ErrorKind::Build => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failures_suggest_checking_permissions() {
        let upload = ColocartError::Upload {
            bucket: "site".into(),
            source: "AccessDenied".into(),
        };
        let walk = ColocartError::Io {
            path: PathBuf::from("build/secret"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(hint(&upload), Some("Check your AWS permissions?"));
        assert_eq!(hint(&walk), Some("Check your AWS permissions?"));
    }

    #[test]
    fn only_missing_build_directory_gets_usage_hint() {
        let missing_build = ColocartError::MissingBuildDirectory {
            project: PathBuf::from("site"),
            build_dir: "build".into(),
        };
        assert_eq!(hint(&missing_build), Some("Have you run the 'build' command yet?"));
        assert_eq!(hint(&ColocartError::MissingConfig(PathBuf::from("site"))), None);
    }

    #[test]
    fn build_failures_have_no_hint() {
        let failed = ColocartError::BuildFailed {
            marker: "Compiled".into(),
            output: "Failed to compile.".into(),
        };
        assert_eq!(hint(&failed), None);
    }
}
