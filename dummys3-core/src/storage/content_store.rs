use crate::error::{Result, StoreError};
use crate::storage::layout::{CONTENT_FILE, METADATA_FILE};
use crate::storage::metadata_codec::{self, ObjectMetadata};
use crate::storage::payload::UploadPayload;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use ulid::Ulid;

/// Copies an uploaded payload into `object_dir` and writes its descriptor.
///
/// The content artifact is fully in place before the metadata artifact is
/// written, so a present metadata file always describes complete content.
/// Size, hash and timestamps are derived from the persisted content file,
/// not from the upload.
pub async fn ingest(object_dir: &Path, payload: &UploadPayload) -> Result<ObjectMetadata> {
    let content_path = object_dir.join(CONTENT_FILE);
    let metadata_path = object_dir.join(METADATA_FILE);

    let data = fs::read(&payload.temp_path)
        .await
        .map_err(StoreError::io(&payload.temp_path))?;
    write_atomic(&content_path, &data).await?;

    let (stat, persisted) = tokio::try_join!(
        async {
            fs::metadata(&content_path)
                .await
                .map_err(StoreError::io(&content_path))
        },
        async {
            fs::read(&content_path)
                .await
                .map_err(StoreError::io(&content_path))
        },
    )?;
    let (modified_date, creation_date) = file_times(&content_path, &stat)?;

    let metadata = ObjectMetadata {
        md5: compute_md5(&persisted),
        content_type: payload.content_type.clone(),
        size: persisted.len() as u64,
        modified_date,
        creation_date,
        custom_meta_data: metadata_codec::custom_attribute_names(
            payload.header_names.iter().map(String::as_str),
        ),
    };

    let encoded = metadata_codec::encode(&metadata).map_err(|source| {
        StoreError::CorruptMetadata {
            path: metadata_path.clone(),
            source,
        }
    })?;
    write_atomic(&metadata_path, &encoded).await?;

    tracing::debug!(
        "Stored object content at {} ({} bytes, md5 {})",
        content_path.display(),
        metadata.size,
        metadata.md5
    );
    Ok(metadata)
}

/// Lowercase hex MD5 of `data`.
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Modification and creation time of a file. Filesystems without a birth
/// time report the modification time for both.
pub(crate) fn file_times(
    path: &Path,
    stat: &std::fs::Metadata,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let modified = stat.modified().map_err(StoreError::io(path))?;
    let created = stat.created().unwrap_or(modified);
    Ok((DateTime::from(modified), DateTime::from(created)))
}

// Write to a unique sibling and rename over the target.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = temp_sibling(path);

    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(error) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: error,
        });
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}.{}.tmp", name, Ulid::new()))
}
