use crate::error::{Result, StoreError};
use crate::storage::content_store::file_times;
use crate::storage::layout;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    pub creation_date: DateTime<Utc>,
}

/// Buckets are the top-level directories under the storage root.
pub struct BucketStore {
    root: PathBuf,
}

impl BucketStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory backing `bucket`.
    pub fn bucket_path(&self, bucket: &Bucket) -> Result<PathBuf> {
        layout::bucket_path(&self.root, &bucket.name)
    }

    /// One entry per directory under the root, in enumeration order.
    pub async fn list(&self) -> Result<Vec<Bucket>> {
        let mut buckets = Vec::new();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(StoreError::io(&self.root))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(StoreError::io(&self.root))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let path = entry.path();
            let stat = match fs::metadata(&path).await {
                Ok(stat) => stat,
                // Removed between enumeration and stat.
                Err(error) if error.kind() == ErrorKind::NotFound => continue,
                Err(error) => return Err(StoreError::io(&path)(error)),
            };
            if !stat.is_dir() {
                continue;
            }

            let (_, creation_date) = file_times(&path, &stat)?;
            buckets.push(Bucket {
                name,
                creation_date,
            });
        }

        Ok(buckets)
    }

    /// Names that could never have been created are reported as not found.
    pub async fn get(&self, name: &str) -> Result<Bucket> {
        let Ok(path) = layout::bucket_path(&self.root, name) else {
            return Err(StoreError::BucketNotFound(name.to_string()));
        };
        match fs::metadata(&path).await {
            Ok(stat) if stat.is_dir() => {
                let (_, creation_date) = file_times(&path, &stat)?;
                Ok(Bucket {
                    name: name.to_string(),
                    creation_date,
                })
            }
            _ => Err(StoreError::BucketNotFound(name.to_string())),
        }
    }

    /// Creates the bucket directory; an existing one is not an error.
    pub async fn create(&self, name: &str) -> Result<Bucket> {
        let path = layout::bucket_path(&self.root, name)?;
        match fs::create_dir(&path).await {
            Ok(()) => tracing::debug!("Created bucket {}", name),
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {}
            Err(error) => return Err(StoreError::io(&path)(error)),
        }
        self.get(name).await
    }

    /// Removes an empty bucket. Buckets that still hold objects are kept.
    pub async fn delete(&self, bucket: &Bucket) -> Result<()> {
        let path = self.bucket_path(bucket)?;
        match fs::remove_dir(&path).await {
            Ok(()) => {
                tracing::debug!("Deleted bucket {}", bucket.name);
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::DirectoryNotEmpty => {
                Err(StoreError::DirectoryNotEmpty(path))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(StoreError::BucketNotFound(bucket.name.clone()))
            }
            Err(error) => Err(StoreError::io(&path)(error)),
        }
    }
}
