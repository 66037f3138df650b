use std::{io, path::Path};

use axum::body::Bytes;
use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("failed to store upload {name}: {source}")]
    Write { name: String, source: io::Error },
}

/// Store one uploaded file under the uploads directory and return the path
/// recorded on the user. Names are `<unix-millis>-<sanitized original name>`
/// so repeated uploads of the same file never collide.
pub async fn store_file(
    uploads_dir: &Path,
    original_name: &str,
    bytes: Bytes,
) -> Result<String, UploadError> {
    let name = format!("{}-{}", Utc::now().timestamp_millis(), sanitize(original_name));

    fs::create_dir_all(uploads_dir)
        .await
        .map_err(|source| UploadError::Write {
            name: name.clone(),
            source,
        })?;

    let path = uploads_dir.join(&name);
    fs::write(&path, &bytes)
        .await
        .map_err(|source| UploadError::Write {
            name: name.clone(),
            source,
        })?;

    info!("Stored upload {name} ({} bytes)", bytes.len());

    Ok(path.to_string_lossy().into_owned())
}

/// Keep alphanumerics plus `.`/`-`/`_`, replace everything else. Strips any
/// path components a client smuggles into the original filename.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['_', '.']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
