use crate::error::{Result, StoreError};
use crate::storage::bucket_store::Bucket;
use crate::storage::content_store;
use crate::storage::layout::{self, CONTENT_FILE, METADATA_FILE};
use crate::storage::metadata_codec::{self, StorageObject};
use crate::storage::payload::{UploadPayload, ensure_multipart};
use bytes::Bytes;
use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Default)]
pub struct ListObjectsOptions {
    /// Literal, case-sensitive key prefix.
    pub prefix: Option<String>,
}

/// Objects live in `root/<bucket>/<key>/`, one directory per key holding a
/// content artifact and a metadata artifact. Nothing is cached; every call
/// reads the tree again.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn bucket_dir(&self, bucket: &Bucket) -> Result<PathBuf> {
        layout::bucket_path(&self.root, &bucket.name)
    }

    fn object_dir(&self, bucket: &Bucket, key: &str) -> Result<PathBuf> {
        layout::object_dir(&self.bucket_dir(bucket)?, key)
    }

    fn not_found(bucket: &Bucket, key: &str) -> StoreError {
        StoreError::ObjectNotFound {
            bucket: bucket.name.clone(),
            key: key.to_string(),
        }
    }

    /// Succeeds iff the object's directory exists.
    pub async fn exists(&self, bucket: &Bucket, key: &str) -> Result<()> {
        self.existing_dir(bucket, key).await.map(|_| ())
    }

    async fn existing_dir(&self, bucket: &Bucket, key: &str) -> Result<PathBuf> {
        let Ok(dir) = self.object_dir(bucket, key) else {
            return Err(Self::not_found(bucket, key));
        };
        match fs::metadata(&dir).await {
            Ok(stat) if stat.is_dir() => Ok(dir),
            _ => Err(Self::not_found(bucket, key)),
        }
    }

    /// Reads descriptor and content concurrently.
    pub async fn get(&self, bucket: &Bucket, key: &str) -> Result<(StorageObject, Bytes)> {
        let dir = self.existing_dir(bucket, key).await?;
        let content_path = dir.join(CONTENT_FILE);
        let metadata_path = dir.join(METADATA_FILE);

        let (content, metadata) = tokio::try_join!(
            async {
                fs::read(&content_path)
                    .await
                    .map_err(StoreError::io(&content_path))
            },
            async {
                fs::read(&metadata_path)
                    .await
                    .map_err(StoreError::io(&metadata_path))
            },
        )?;

        let object = metadata_codec::decode(key, &metadata).map_err(|source| {
            StoreError::CorruptMetadata {
                path: metadata_path.clone(),
                source,
            }
        })?;

        Ok((object, Bytes::from(content)))
    }

    /// Best-effort listing sorted by key. The tree is not locked, so objects
    /// written or removed during the walk may or may not appear; entries
    /// without a readable descriptor are skipped.
    pub async fn list(
        &self,
        bucket: &Bucket,
        options: &ListObjectsOptions,
    ) -> Result<Vec<StorageObject>> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let prefix = options.prefix.as_deref().unwrap_or_default();

        let mut objects = Vec::new();
        for dir in walk_dirs(&bucket_dir).await? {
            let Some(key) = relative_key(&bucket_dir, &dir) else {
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }

            let metadata_path = dir.join(METADATA_FILE);
            let Ok(bytes) = fs::read(&metadata_path).await else {
                continue;
            };
            match metadata_codec::decode(&key, &bytes) {
                Ok(object) => objects.push(object),
                Err(error) => {
                    tracing::warn!(
                        "Skipping unreadable metadata. path={} error={}",
                        metadata_path.display(),
                        error
                    );
                }
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    /// Stores an upload under `key`. Non-multipart uploads are rejected
    /// before anything touches the disk.
    pub async fn put(
        &self,
        bucket: &Bucket,
        key: &str,
        payload: &UploadPayload,
    ) -> Result<StorageObject> {
        ensure_multipart(payload.request_content_type.as_deref())?;

        let dir = self.object_dir(bucket, key)?;
        fs::create_dir_all(&dir).await.map_err(StoreError::io(&dir))?;

        let metadata = content_store::ingest(&dir, payload).await?;
        tracing::debug!("Put object {}/{}", bucket.name, key);

        Ok(StorageObject {
            key: key.to_string(),
            metadata,
        })
    }

    /// Unlinks both artifacts, then removes the object directory. Both
    /// unlinks are attempted; the first failure is returned after the
    /// directory removal has also been attempted.
    pub async fn delete(&self, bucket: &Bucket, key: &str) -> Result<()> {
        let dir = self.existing_dir(bucket, key).await?;
        let artifacts = [dir.join(METADATA_FILE), dir.join(CONTENT_FILE)];

        let results = join_all(artifacts.iter().map(|path| async move {
            fs::remove_file(path).await.map_err(StoreError::io(path))
        }))
        .await;
        let unlinked = results.into_iter().collect::<Result<Vec<()>>>();

        // Fails when nested objects still live below this key.
        if let Err(error) = fs::remove_dir(&dir).await {
            tracing::debug!(
                "Object directory not removed. path={} error={}",
                dir.display(),
                error
            );
        }

        unlinked?;
        tracing::debug!("Deleted object {}/{}", bucket.name, key);
        Ok(())
    }
}

/// Every directory strictly below `root`. Subdirectories that vanish or
/// become unreadable mid-walk are skipped.
async fn walk_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut first = true;

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(error) if first => return Err(StoreError::io(&dir)(error)),
            Err(_) => continue,
        };
        first = false;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_dir = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);
            if is_dir {
                let path = entry.path();
                found.push(path.clone());
                pending.push(path);
            }
        }
    }

    Ok(found)
}

fn relative_key(bucket_dir: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(bucket_dir).ok()?;
    let segments = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
