//! Dummys3 Core - filesystem-backed emulation of an object storage service
//!
//! - one directory per bucket under a storage root
//! - one nested directory per object key, holding a content file and a
//!   JSON metadata file
//! - no in-memory state; every call re-reads the disk

pub mod error;
pub mod operations;
pub mod storage;

pub use error::{Result, StoreError};
pub use operations::{
    DeleteObjectOperation, DeleteObjectOperationRequest, ListObjectsOperation,
    ListObjectsOperationRequest, ListObjectsOperationResult, PutObjectOperation,
    PutObjectOperationRequest, ReadObjectOperation, ReadObjectOperationOutcome,
    ReadObjectOperationRequest, ReadObjectOperationResult,
};
pub use storage::{
    Bucket, BucketStore, CONTENT_FILE, CUSTOM_METADATA_PREFIX, ListObjectsOptions, METADATA_FILE,
    ObjectMetadata, ObjectStore, StorageObject, UploadPayload, compute_md5, ensure_multipart,
};
