use crate::config::Config;
use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use dummys3_core::{
    BucketStore, DeleteObjectOperation, DeleteObjectOperationRequest, ListObjectsOperation,
    ListObjectsOperationRequest, ObjectStore, PutObjectOperation, PutObjectOperationRequest,
    ReadObjectOperation, ReadObjectOperationOutcome, ReadObjectOperationRequest, StorageObject,
    StoreError, UploadPayload, ensure_multipart,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

pub struct ServerState {
    pub bucket_store: Arc<BucketStore>,
    pub object_store: Arc<ObjectStore>,
    pub put_object: PutObjectOperation,
    pub read_object: ReadObjectOperation,
    pub list_objects: ListObjectsOperation,
    pub delete_object: DeleteObjectOperation,
}

impl ServerState {
    pub fn new(config: &Config) -> Self {
        let bucket_store = Arc::new(BucketStore::new(config.storage_root.clone()));
        let object_store = Arc::new(ObjectStore::new(config.storage_root.clone()));

        Self {
            put_object: PutObjectOperation::new(bucket_store.clone(), object_store.clone()),
            read_object: ReadObjectOperation::new(bucket_store.clone(), object_store.clone()),
            list_objects: ListObjectsOperation::new(bucket_store.clone(), object_store.clone()),
            delete_object: DeleteObjectOperation::new(bucket_store.clone(), object_store.clone()),
            bucket_store,
            object_store,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListObjectsResponse {
    bucket: String,
    prefix: Option<String>,
    is_truncated: bool,
    objects: Vec<StorageObject>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default, rename = "max-keys")]
    max_keys: Option<usize>,
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    if config.create_root {
        tokio::fs::create_dir_all(&config.storage_root).await?;
    } else if !tokio::fs::metadata(&config.storage_root).await?.is_dir() {
        anyhow::bail!(
            "storage root {} is not a directory",
            config.storage_root.display()
        );
    }

    let state = Arc::new(ServerState::new(&config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "Server listening on {} (storage root {})",
        config.bind_addr,
        config.storage_root.display()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(list_buckets))
        .route(
            "/:bucket",
            get(list_objects).put(create_bucket).delete(delete_bucket),
        )
        .route(
            "/:bucket/*key",
            get(get_object)
                .head(head_object)
                .put(put_object)
                .post(put_object)
                .delete(delete_object),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

fn error_response(error: StoreError) -> Response {
    let status = match &error {
        StoreError::BucketNotFound(_) | StoreError::ObjectNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        StoreError::DirectoryNotEmpty(_) => StatusCode::CONFLICT,
        StoreError::UnsupportedPayload(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StoreError::Io { .. } | StoreError::CorruptMetadata { .. } | StoreError::Config(_) => {
            tracing::warn!("Request failed: {}", error);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let resp = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(error.to_string()),
    };
    (status, axum::Json(resp)).into_response()
}

async fn list_buckets(State(state): State<Arc<ServerState>>) -> Response {
    match state.bucket_store.list().await {
        Ok(buckets) => (StatusCode::OK, axum::Json(ApiResponse::ok(buckets))).into_response(),
        Err(e) => error_response(e),
    }
}

async fn create_bucket(
    State(state): State<Arc<ServerState>>,
    Path(bucket): Path<String>,
) -> Response {
    match state.bucket_store.create(&bucket).await {
        Ok(bucket) => (StatusCode::OK, axum::Json(ApiResponse::ok(bucket))).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_bucket(
    State(state): State<Arc<ServerState>>,
    Path(bucket): Path<String>,
) -> Response {
    let result = match state.bucket_store.get(&bucket).await {
        Ok(bucket) => state.bucket_store.delete(&bucket).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_objects(
    State(state): State<Arc<ServerState>>,
    Path(bucket): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let request = ListObjectsOperationRequest {
        bucket,
        prefix: query.prefix,
        max_keys: query.max_keys,
    };

    match state.list_objects.run(request).await {
        Ok(result) => {
            let body = ListObjectsResponse {
                bucket: result.bucket,
                prefix: result.prefix,
                is_truncated: result.is_truncated,
                objects: result.objects,
            };
            (StatusCode::OK, axum::Json(ApiResponse::ok(body))).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn get_object(
    State(state): State<Arc<ServerState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    let request = ReadObjectOperationRequest { bucket, key };

    match state.read_object.run(request).await {
        Ok(ReadObjectOperationOutcome::Found(result)) => {
            let mut response = Response::new(Body::from(result.body));
            object_headers(response.headers_mut(), &result.object);
            response
        }
        Ok(ReadObjectOperationOutcome::NotFound) => {
            let resp = ApiResponse::<()> {
                success: false,
                data: None,
                error: Some("Object not found".to_string()),
            };
            (StatusCode::NOT_FOUND, axum::Json(resp)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn head_object(
    State(state): State<Arc<ServerState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    let result = match state.bucket_store.get(&bucket).await {
        Ok(bucket) => state.object_store.exists(&bucket, &key).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) if e.is_not_found() => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_response(e),
    }
}

async fn put_object(
    State(state): State<Arc<ServerState>>,
    Path((bucket, key)): Path<(String, String)>,
    request: Request,
) -> Response {
    let headers = request.headers().clone();
    let request_content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Err(e) = ensure_multipart(request_content_type.as_deref()) {
        return error_response(e);
    }

    let multipart = match Multipart::from_request(request, &state).await {
        Ok(multipart) => multipart,
        Err(rejection) => return rejection.into_response(),
    };

    // The temporary file is removed when `upload` drops.
    let upload = match spool_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => {
            let resp = ApiResponse::<()> {
                success: false,
                data: None,
                error: Some(message),
            };
            return (StatusCode::BAD_REQUEST, axum::Json(resp)).into_response();
        }
    };

    let request = PutObjectOperationRequest {
        bucket,
        key,
        payload: UploadPayload {
            request_content_type,
            content_type: upload.content_type.clone(),
            temp_path: upload.file.path().to_path_buf(),
            header_names: headers.keys().map(|name| name.as_str().to_string()).collect(),
        },
    };

    match state.put_object.run(request).await {
        Ok(object) => {
            tracing::info!("Stored object key={} size={}", object.key, object.metadata.size);
            (StatusCode::CREATED, axum::Json(ApiResponse::ok(object))).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn delete_object(
    State(state): State<Arc<ServerState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    let request = DeleteObjectOperationRequest { bucket, key };

    match state.delete_object.run(request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

struct SpooledUpload {
    file: NamedTempFile,
    content_type: String,
}

async fn spool_upload(mut multipart: Multipart) -> Result<SpooledUpload, String> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let file = NamedTempFile::new().map_err(|e| e.to_string())?;
        let mut writer = tokio::fs::File::create(file.path())
            .await
            .map_err(|e| e.to_string())?;
        while let Some(chunk) = field.chunk().await.map_err(|e| e.to_string())? {
            writer.write_all(&chunk).await.map_err(|e| e.to_string())?;
        }
        writer.flush().await.map_err(|e| e.to_string())?;

        return Ok(SpooledUpload { file, content_type });
    }

    Err(format!("multipart field '{}' is missing", UPLOAD_FIELD))
}

fn object_headers(headers: &mut HeaderMap, object: &StorageObject) {
    let metadata = &object.metadata;
    if let Ok(value) = HeaderValue::from_str(&metadata.content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", metadata.md5)) {
        headers.insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&http_date(&metadata.modified_date)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}

fn http_date(date: &chrono::DateTime<chrono::Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
