//! Storage modules for Dummys3
//!
//! Maps buckets and objects onto directories under a storage root, with a
//! content file and a JSON metadata file per object.

pub mod bucket_store;
pub mod content_store;
pub mod layout;
pub mod metadata_codec;
pub mod object_store;
pub mod payload;

pub use bucket_store::{Bucket, BucketStore};
pub use content_store::compute_md5;
pub use layout::{CONTENT_FILE, METADATA_FILE};
pub use metadata_codec::{CUSTOM_METADATA_PREFIX, ObjectMetadata, StorageObject};
pub use object_store::{ListObjectsOptions, ObjectStore};
pub use payload::{UploadPayload, ensure_multipart};
