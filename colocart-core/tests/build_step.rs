#![cfg(unix)]

use colocart_core::build::{build, current_user, BuildInfo};
use colocart_core::config::BuildSettings;
use colocart_core::{ColocartError, ErrorKind};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn settings(command: &str) -> BuildSettings {
    BuildSettings {
        command: command.to_string(),
        ..BuildSettings::default()
    }
}

#[test]
fn test_build_succeeds_when_marker_is_printed() {
    let project = tempdir().unwrap();
    fs::create_dir_all(project.path().join("src")).unwrap();

    let report = build(project.path(), &settings("echo 'Compiled successfully.'"))
        .expect("Build should succeed");

    assert!(report.output.contains("Compiled successfully."));
    assert_eq!(report.info_path, project.path().join("src/_build_info.js"));

    let written = fs::read_to_string(&report.info_path).unwrap();
    assert_eq!(written, report.info.render());
    assert!(written.starts_with("export default {"));
    assert!(written.contains(&format!("new Date({})", report.info.creation_ms)));
}

#[test]
fn test_build_runs_in_project_directory() {
    let project = tempdir().unwrap();
    fs::create_dir_all(project.path().join("src")).unwrap();

    // The build info is written before the command runs, relative to the project.
    build(
        project.path(),
        &settings("test -f src/_build_info.js && echo Compiled"),
    )
    .expect("Command must see the project as its working directory");
}

#[test]
fn test_build_without_marker_fails_with_full_output() {
    let project = tempdir().unwrap();
    fs::create_dir_all(project.path().join("src")).unwrap();

    let err = build(
        project.path(),
        &settings("echo 'Failed to compile.'; echo 'Module not found'"),
    )
    .expect_err("Missing marker must fail");

    assert_eq!(err.kind(), ErrorKind::Build);
    match err {
        ColocartError::BuildFailed { output, marker } => {
            assert_eq!(marker, "Compiled");
            assert!(output.contains("Failed to compile."));
            assert!(output.contains("Module not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_zero_exit_without_marker_still_fails() {
    let project = tempdir().unwrap();
    fs::create_dir_all(project.path().join("src")).unwrap();

    let err = build(project.path(), &settings("true")).unwrap_err();
    assert!(matches!(err, ColocartError::BuildFailed { .. }));
}

#[test]
fn test_custom_marker_and_info_path() {
    let project = tempdir().unwrap();
    fs::create_dir_all(project.path().join("app")).unwrap();

    let settings = BuildSettings {
        command: "echo 'built in 2.1s'".to_string(),
        success_marker: "built in".to_string(),
        build_info_path: PathBuf::from("app/info.js"),
    };
    let report = build(project.path(), &settings).expect("Build should succeed");
    assert!(report.info_path.ends_with("app/info.js"));
}

#[test]
fn test_nonexistent_project_never_runs_build_tool() {
    let root = tempdir().unwrap();
    let missing = root.path().join("missing");
    let sentinel = root.path().join("ran");

    let command = format!("touch {} && echo Compiled", sentinel.display());
    let err = build(&missing, &settings(&command)).unwrap_err();

    assert!(matches!(err, ColocartError::ProjectNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(!sentinel.exists(), "build tool must not be invoked");
}

#[test]
fn test_missing_info_directory_is_build_error() {
    let project = tempdir().unwrap();
    let sentinel = project.path().join("ran");

    let command = format!("touch {} && echo Compiled", sentinel.display());
    let err = build(project.path(), &settings(&command)).unwrap_err();

    assert!(matches!(err, ColocartError::BuildInfo { .. }));
    assert!(!sentinel.exists());
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args([
            "-c",
            "user.name=colocart",
            "-c",
            "user.email=colocart@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git runs");
    assert!(out.status.success(), "git {args:?} failed: {out:?}");
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

#[test]
#[serial]
fn test_commit_is_head_of_project_repository() {
    if !git_available() {
        eprintln!("Skipping test: git not available");
        return;
    }
    let project = tempdir().unwrap();
    git(project.path(), &["init", "--quiet"]);
    git(project.path(), &["commit", "--quiet", "--allow-empty", "-m", "initial"]);
    let head = git(project.path(), &["rev-parse", "HEAD"]);

    let info = BuildInfo::collect(project.path());

    assert_eq!(info.commit, head);
    assert_eq!(info.commit.len(), 40);
    assert!(info.render().contains(&format!("\"commit\": \"{head}\",")));
}

#[test]
#[serial]
fn test_commit_is_empty_outside_a_repository() {
    let root = tempdir().unwrap();
    let project = root.path().join("plain");
    fs::create_dir_all(&project).unwrap();

    // Stop git from discovering a repository above the temp directory.
    let previous = std::env::var_os("GIT_CEILING_DIRECTORIES");
    std::env::set_var("GIT_CEILING_DIRECTORIES", root.path());
    let info = BuildInfo::collect(&project);
    match previous {
        Some(v) => std::env::set_var("GIT_CEILING_DIRECTORIES", v),
        None => std::env::remove_var("GIT_CEILING_DIRECTORIES"),
    }

    assert_eq!(info.commit, "");
    assert!(info.render().contains("\"commit\": \"\","));
    assert!(info.creation_ms > 0);
}

#[test]
#[serial]
fn test_user_comes_from_environment() {
    let previous = std::env::var("USER").ok();
    std::env::set_var("USER", "deploy-bot");
    assert_eq!(current_user(), "deploy-bot");
    match previous {
        Some(v) => std::env::set_var("USER", v),
        None => std::env::remove_var("USER"),
    }
}
