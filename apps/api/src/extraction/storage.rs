//! Object storage access for uploaded files.
//!
//! `S3Storage` talks to S3 or MinIO. Every SDK failure is folded into the
//! four-way `StorageError` taxonomy by matching on the service error code and,
//! when no code is available, on the rendered error message.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("storage credentials rejected: {0}")]
    CredentialsInvalid(String),

    #[error("storage request timed out: {0}")]
    Timeout(String),

    /// The object's declared length exceeds the caller's limit. Nothing was downloaded.
    #[error("object is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Anything the taxonomy does not cover.
    #[error("storage error: {0}")]
    Other(String),
}

/// Lifetime of a presigned upload URL.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// Access to uploaded files by key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Downloads an object, refusing up front any object whose declared
    /// length exceeds `max_bytes`.
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Bytes, StorageError>;

    /// Returns a URL a client can `PUT` the file to directly, valid for
    /// [`UPLOAD_URL_TTL`].
    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String, StorageError>;
}

/// Rejects an object by its declared length. Unknown lengths pass; the
/// caller still checks the downloaded size.
pub fn check_object_size(declared: Option<i64>, max_bytes: usize) -> Result<(), StorageError> {
    match declared {
        Some(size) if size > 0 && size as u64 > max_bytes as u64 => Err(StorageError::TooLarge {
            size: size as usize,
            limit: max_bytes,
        }),
        _ => Ok(()),
    }
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn get(&self, key: &str, max_bytes: usize) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        check_object_size(output.content_length(), max_bytes)?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| classify_storage_error(None, &format!("failed to read object body: {e}")))?;

        let bytes = data.into_bytes();
        debug!("Fetched s3://{}/{} ({} bytes)", self.bucket, key, bytes.len());
        Ok(bytes)
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| StorageError::Other(format!("invalid presigning config: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(config)
            .await
            .map_err(classify_sdk_error)?;

        debug!("Presigned upload for s3://{}/{}", self.bucket, key);
        Ok(request.uri().to_string())
    }
}

fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::TimeoutError(_) => {
            return StorageError::Timeout(DisplayErrorContext(&err).to_string())
        }
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            return StorageError::Timeout(DisplayErrorContext(&err).to_string())
        }
        _ => {}
    }
    let code = err.code().map(str::to_string);
    classify_storage_error(code.as_deref(), &DisplayErrorContext(&err).to_string())
}

/// Maps a storage error code (S3 style, e.g. `NoSuchKey`) or, failing that, the
/// error message onto `StorageError`.
pub fn classify_storage_error(code: Option<&str>, message: &str) -> StorageError {
    let message = message.to_string();
    match code {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => return StorageError::NotFound(message),
        Some("AccessDenied" | "AllAccessDisabled" | "Forbidden" | "AccountProblem") => {
            return StorageError::AccessDenied(message)
        }
        Some(
            "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken"
            | "TokenRefreshRequired"
            | "CredentialsNotLoaded",
        ) => return StorageError::CredentialsInvalid(message),
        Some("RequestTimeout" | "SlowDown" | "ServiceUnavailable") => {
            return StorageError::Timeout(message)
        }
        _ => {}
    }

    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        StorageError::Timeout(message)
    } else if lower.contains("credential") || lower.contains("signature") {
        StorageError::CredentialsInvalid(message)
    } else if lower.contains("access denied") || lower.contains("forbidden") {
        StorageError::AccessDenied(message)
    } else if lower.contains("not found") || lower.contains("no such key") {
        StorageError::NotFound(message)
    } else {
        StorageError::Other(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_to_taxonomy() {
        assert!(matches!(
            classify_storage_error(Some("NoSuchKey"), "x"),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            classify_storage_error(Some("AccessDenied"), "x"),
            StorageError::AccessDenied(_)
        ));
        assert!(matches!(
            classify_storage_error(Some("InvalidAccessKeyId"), "x"),
            StorageError::CredentialsInvalid(_)
        ));
        assert!(matches!(
            classify_storage_error(Some("RequestTimeout"), "x"),
            StorageError::Timeout(_)
        ));
    }

    #[test]
    fn test_message_fallback_when_code_missing() {
        assert!(matches!(
            classify_storage_error(None, "dispatch failure: operation timed out"),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            classify_storage_error(None, "failed to load credentials from provider chain"),
            StorageError::CredentialsInvalid(_)
        ));
    }

    #[test]
    fn test_declared_length_over_limit_is_rejected() {
        assert_eq!(
            check_object_size(Some(2048), 1024),
            Err(StorageError::TooLarge {
                size: 2048,
                limit: 1024
            })
        );
        assert_eq!(check_object_size(Some(1024), 1024), Ok(()));
        assert_eq!(check_object_size(None, 1024), Ok(()));
    }

    #[test]
    fn test_unmapped_error_is_other() {
        let err = classify_storage_error(Some("InternalError"), "We encountered an internal error");
        assert_eq!(
            err,
            StorageError::Other("We encountered an internal error".to_string())
        );
    }
}
