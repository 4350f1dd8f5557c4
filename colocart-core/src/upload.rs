//! Directory-to-bucket upload.
//!
//! Walks a build directory and stores every file whose content type can be
//! guessed from its extension, one file at a time. Files without a known type
//! are skipped. The first backend error stops the walk; whatever was uploaded
//! before it stays in the bucket.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::contract::{NewObject, UploadedObject, Uploader};
use crate::error::ColocartError;

/// What an upload run did.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedObject>,
    pub skipped: Vec<PathBuf>,
}

/// Content type for `path`, from its extension.
pub fn guess_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first().map(|m| m.to_string())
}

/// Remote key for `file`: its path below `directory`, `/`-separated.
///
/// Returns `Ok(None)` when a component below `directory` is not valid UTF-8;
/// S3 keys are UTF-8 and a lossy conversion would let distinct files collide.
pub fn remote_key(directory: &Path, file: &Path) -> Result<Option<String>, ColocartError> {
    let relative = file.strip_prefix(directory).map_err(|_| ColocartError::Io {
        path: file.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not below {}", directory.display()),
        ),
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        if let Component::Normal(s) = component {
            match s.to_str() {
                Some(segment) => segments.push(segment),
                None => return Ok(None),
            }
        }
    }
    Ok(Some(segments.join("/")))
}

/// Upload every file under `directory` to `bucket`.
pub async fn upload_directory<U>(
    directory: &Path,
    bucket: &str,
    uploader: &U,
) -> Result<UploadReport, ColocartError>
where
    U: Uploader + ?Sized,
{
    info!(directory = %directory.display(), bucket = %bucket, "Uploading directory");
    let mut report = UploadReport::default();

    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| directory.to_path_buf());
            error!(error = %e, path = %path.display(), "Failed to walk build directory");
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            ColocartError::io(path, source)
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(content_type) = guess_content_type(path) else {
            let name = entry.file_name().to_string_lossy();
            println!("Skipping file {name} with no MIME type.");
            warn!(path = %path.display(), "Skipping file with no MIME type");
            report.skipped.push(path.to_path_buf());
            continue;
        };

        let Some(key) = remote_key(directory, path)? else {
            println!("Skipping file {} with a non UTF-8 name.", path.display());
            warn!(path = %path.display(), "Skipping file whose name is not valid UTF-8");
            report.skipped.push(path.to_path_buf());
            continue;
        };

        println!("{}\t{}", content_type, path.display());

        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| ColocartError::io(path, e))?
            .len();

        let req = NewObject {
            bucket: bucket.to_string(),
            key: key.clone(),
            content_type: content_type.clone(),
            local_path: path.to_path_buf(),
            size,
        };

        if let Err(source) = uploader.put_object(req).await {
            error!(
                error = %source,
                bucket = %bucket,
                key = %key,
                uploaded = report.uploaded.len(),
                "Upload failed; aborting"
            );
            return Err(ColocartError::Upload {
                bucket: bucket.to_string(),
                source,
            });
        }

        debug!(bucket = %bucket, key = %key, content_type = %content_type, size, "Uploaded object");
        report.uploaded.push(UploadedObject {
            key,
            content_type,
            size,
            local_path: path.to_path_buf(),
        });
    }

    info!(
        bucket = %bucket,
        uploaded = report.uploaded.len(),
        skipped = report.skipped.len(),
        "Directory upload complete"
    );
    Ok(report)
}
