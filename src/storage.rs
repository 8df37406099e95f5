//! Binary object storage — Supabase Storage client and attachment resolver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::error::StorageError;

/// An uploaded binary blob as received from a caller.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Filename as declared by the uploader. Only its extension is trusted.
    pub file_name: String,
    /// Declared MIME type, passed through to the store.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Public reference to a stored attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentReference {
    pub public_url: String,
}

/// Write-once object storage boundary.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` in `bucket` and return the public URL.
    /// Never overwrites: an existing object at `path` is a [`StorageError::Conflict`].
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Supabase Storage REST client.
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
}

impl SupabaseStorage {
    pub fn new(
        base_url: impl Into<String>,
        service_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            StorageError::UploadFailed {
                bucket: String::new(),
                path: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
        })
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{path}", self.base_url)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let resp = self
            .client
            .post(self.object_url(bucket, path))
            .bearer_auth(self.service_key.expose_secret())
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StorageError::Timeout { path: path.into() }
                } else {
                    StorageError::UploadFailed {
                        bucket: bucket.into(),
                        path: path.into(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StorageError::Conflict {
                bucket: bucket.into(),
                path: path.into(),
            });
        }
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed {
                bucket: bucket.into(),
                path: path.into(),
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        Ok(self.public_url(bucket, path))
    }
}

/// Stores uploaded attachments under collision-free generated names.
pub struct AttachmentResolver {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl AttachmentResolver {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Store every attachment and return references in input order.
    ///
    /// Uploads are dispatched concurrently; `try_join_all` zips results back
    /// into input order. Any single failure aborts the whole batch.
    pub async fn store_all(
        &self,
        attachments: &[Attachment],
    ) -> Result<Vec<AttachmentReference>, StorageError> {
        let uploads = attachments.iter().map(|attachment| {
            let path = object_name(&attachment.file_name);
            async move {
                let public_url = self
                    .store
                    .put(
                        &self.bucket,
                        &path,
                        attachment.bytes.clone(),
                        &attachment.content_type,
                    )
                    .await?;
                tracing::info!(path = %path, "Stored attachment");
                Ok(AttachmentReference { public_url })
            }
        });

        futures::future::try_join_all(uploads).await
    }
}

/// Generate a globally-unique object name, keeping only the extension from
/// the declared filename.
fn object_name(declared_name: &str) -> String {
    let id = Uuid::new_v4();
    match extension_of(declared_name) {
        Some(ext) => format!("uploads/{id}.{ext}"),
        None => format!("uploads/{id}"),
    }
}

fn extension_of(name: &str) -> Option<&str> {
    let ext = name.rsplit_once('.')?.1;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every put and hands back deterministic URLs.
    struct RecordingStore {
        puts: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put(
            &self,
            bucket: &str,
            path: &str,
            _bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<String, StorageError> {
            self.puts
                .lock()
                .unwrap()
                .push((bucket.into(), path.into(), content_type.into()));
            Ok(format!("https://cdn.test/{bucket}/{path}"))
        }
    }

    fn png(name: &str) -> Attachment {
        Attachment {
            file_name: name.into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn object_name_keeps_extension_only() {
        let name = object_name("screenshot (3).PNG");
        assert!(name.starts_with("uploads/"));
        assert!(name.ends_with(".PNG"));
        assert!(!name.contains("screenshot"));
    }

    #[test]
    fn object_name_without_extension() {
        let name = object_name("raw-dump");
        assert!(name.starts_with("uploads/"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn object_names_are_unique_per_call() {
        assert_ne!(object_name("a.png"), object_name("a.png"));
    }

    #[test]
    fn extension_of_rejects_trailing_dot() {
        assert_eq!(extension_of("file."), None);
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("a.jpg"), Some("jpg"));
    }

    #[tokio::test]
    async fn store_all_preserves_input_order() {
        let store = Arc::new(RecordingStore::new());
        let resolver = AttachmentResolver::new(store.clone(), "shots");

        let refs = resolver
            .store_all(&[png("first.png"), png("second.png")])
            .await
            .unwrap();

        assert_eq!(refs.len(), 2);
        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 2);
        // Reference i corresponds to recorded put i.
        assert!(refs[0].public_url.ends_with(&puts[0].1));
        assert!(refs[1].public_url.ends_with(&puts[1].1));
        assert_eq!(puts[0].0, "shots");
        assert_eq!(puts[0].2, "image/png");
    }

    #[tokio::test]
    async fn store_all_empty_is_noop() {
        let store = Arc::new(RecordingStore::new());
        let resolver = AttachmentResolver::new(store.clone(), "shots");
        let refs = resolver.store_all(&[]).await.unwrap();
        assert!(refs.is_empty());
        assert!(store.puts.lock().unwrap().is_empty());
    }

    /// Store that fails on the nth call.
    struct FailingStore {
        calls: Mutex<usize>,
        fail_on: usize,
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put(
            &self,
            bucket: &str,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == self.fail_on {
                return Err(StorageError::UploadFailed {
                    bucket: bucket.into(),
                    path: path.into(),
                    reason: "disk full".into(),
                });
            }
            Ok(format!("https://cdn.test/{bucket}/{path}"))
        }
    }

    #[tokio::test]
    async fn store_all_aborts_on_failure() {
        let store = Arc::new(FailingStore {
            calls: Mutex::new(0),
            fail_on: 2,
        });
        let resolver = AttachmentResolver::new(store, "shots");

        let result = resolver.store_all(&[png("a.png"), png("b.png")]).await;
        assert!(matches!(result, Err(StorageError::UploadFailed { .. })));
    }
}
