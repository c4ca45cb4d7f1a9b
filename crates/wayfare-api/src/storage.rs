//! # Object Storage
//!
//! Thin wrapper over an S3-compatible bucket for media uploads: store
//! bytes under a random key, delete by key, and stream objects back for
//! the public media proxy. Custom endpoints (MinIO and friends) are
//! supported via `WAYFARE_S3_ENDPOINT` with path-style addressing.

use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use rand_core::{OsRng, RngCore};

use crate::config::StorageConfig;

/// A stored object streamed back through the media proxy.
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// S3-backed media storage.
#[derive(Clone)]
pub struct Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl Storage {
    /// Construct the storage client from configuration.
    pub async fn connect(config: &StorageConfig) -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self {
            client: S3Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Generate a random object key, preserving the upload's extension so
    /// public URLs stay content-type-hinted.
    pub fn random_key(filename: Option<&str>) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        let mut key = String::with_capacity(40);
        for b in bytes {
            key.push_str(&format!("{b:02x}"));
        }
        if let Some(ext) = filename.and_then(|f| f.rsplit_once('.')).map(|(_, ext)| ext) {
            if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                key.push('.');
                key.push_str(&ext.to_lowercase());
            }
        }
        key
    }

    /// Store bytes under `key` and return the public URL.
    pub async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| format!("storage put failed: {e}"))?;
        Ok(self.public_url(key))
    }

    /// Delete the object stored under `key`.
    pub async fn delete(&self, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| format!("storage delete failed: {e}"))?;
        Ok(())
    }

    /// Fetch the object stored under `key`, or `None` when absent.
    pub async fn get(&self, key: &str) -> Result<Option<StoredObject>, String> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(format!("storage get failed: {service_err}"));
            }
        };
        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| format!("storage read failed: {e}"))?
            .into_bytes()
            .to_vec();
        Ok(Some(StoredObject {
            content_type,
            bytes,
        }))
    }

    /// The public URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_key_is_hex_with_extension() {
        let key = Storage::random_key(Some("photo.JPG"));
        let (stem, ext) = key.rsplit_once('.').unwrap();
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn random_key_without_filename_has_no_extension() {
        let key = Storage::random_key(None);
        assert_eq!(key.len(), 32);
        assert!(!key.contains('.'));
    }

    #[test]
    fn random_key_ignores_suspicious_extensions() {
        let key = Storage::random_key(Some("weird.name/../x"));
        assert!(!key.contains('/'));
    }

    #[test]
    fn random_keys_differ() {
        assert_ne!(Storage::random_key(None), Storage::random_key(None));
    }
}
