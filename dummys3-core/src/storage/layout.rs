//! On-disk layout: `root/<bucket>/<key segments...>/{content,metadata}`.

use crate::error::{Result, StoreError};
use std::path::{Path, PathBuf};

pub const CONTENT_FILE: &str = ".dummys3_content";
pub const METADATA_FILE: &str = ".dummys3_metadata";

pub fn bucket_path(root: &Path, bucket: &str) -> Result<PathBuf> {
    validate_bucket_name(bucket)?;
    Ok(root.join(bucket))
}

pub fn object_dir(bucket_path: &Path, key: &str) -> Result<PathBuf> {
    let mut path = bucket_path.to_path_buf();
    for segment in key_segments(key)? {
        path.push(segment);
    }
    Ok(path)
}

pub fn validate_bucket_name(name: &str) -> Result<()> {
    if name.contains('/') {
        return Err(StoreError::InvalidName(format!(
            "bucket name cannot contain '/': {}",
            name
        )));
    }
    validate_segment(name)
}

/// Splits a key into directory segments, rejecting anything that would
/// escape the bucket or alias another key.
pub fn key_segments(key: &str) -> Result<Vec<&str>> {
    if key.is_empty() {
        return Err(StoreError::InvalidName("object key cannot be empty".to_string()));
    }

    let segments: Vec<&str> = key.split('/').collect();
    for segment in &segments {
        validate_segment(segment)?;
    }
    Ok(segments)
}

fn validate_segment(segment: &str) -> Result<()> {
    let reserved = matches!(segment, "" | "." | ".." | CONTENT_FILE | METADATA_FILE);
    if reserved || segment.contains('\\') || segment.contains('\0') {
        return Err(StoreError::InvalidName(format!(
            "invalid path component: {:?}",
            segment
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_dir_nests_segments() {
        let dir = object_dir(Path::new("/data/photos"), "2020/a.jpg").unwrap();
        assert_eq!(dir, PathBuf::from("/data/photos/2020/a.jpg"));
    }

    #[test]
    fn test_rejects_traversal_and_aliases() {
        for key in ["", "../x", "a/../b", "a//b", "/a", "a/", "./a", "a/.dummys3_content"] {
            assert!(
                matches!(key_segments(key), Err(StoreError::InvalidName(_))),
                "key {:?} should be rejected",
                key
            );
        }
        assert!(key_segments("a.b/c d/.hidden").is_ok());
    }

    #[test]
    fn test_bucket_names() {
        assert!(bucket_path(Path::new("/data"), "photos").is_ok());
        assert!(bucket_path(Path::new("/data"), "a/b").is_err());
        assert!(bucket_path(Path::new("/data"), "..").is_err());
        assert!(bucket_path(Path::new("/data"), "").is_err());
    }
}
