//! Object storage gateway for template bundles and design artifacts.
//!
//! Two independent address spaces are distinguished by [`BucketClass`]:
//! the templates bucket is read-only from this system's perspective, the
//! designs bucket is write-only (humans later read artifacts by URL).
//! Backends never conflate the two.
//!
//! Writes are unconditional overwrites: retrying a put with the same key
//! and bytes leaves the store in the same observable state, which is the
//! only safety mechanism the pipeline relies on (no locking).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path as StorePath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore as _, PutOptions};

use crate::artifact::ArtifactLocation;
use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Which of the two bucket address spaces an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketClass {
    /// Template bundles, consumed read-only.
    Templates,
    /// Finished design artifacts, produced write-only.
    Designs,
}

impl BucketClass {
    /// Stable label used in errors, logs, and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Templates => "templates",
            Self::Designs => "designs",
        }
    }
}

/// Bucket names and region, resolved from configuration.
#[derive(Debug, Clone)]
pub struct Buckets {
    templates: String,
    designs: String,
    region: String,
}

impl Buckets {
    /// Builds bucket addressing from storage configuration.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            templates: config.templates_bucket.clone(),
            designs: config.designs_bucket.clone(),
            region: config.region.clone(),
        }
    }

    /// Returns the bucket name for a class.
    #[must_use]
    pub fn name(&self, class: BucketClass) -> &str {
        match class {
            BucketClass::Templates => &self.templates,
            BucketClass::Designs => &self.designs,
        }
    }

    /// Returns the deterministic public URL for a key in a class.
    #[must_use]
    pub fn public_url(&self, class: BucketClass, key: &str) -> String {
        ArtifactLocation {
            bucket: self.name(class).to_string(),
            region: self.region.clone(),
            key: key.to_string(),
        }
        .url()
    }
}

/// Object storage gateway used by the pipeline.
///
/// Production uses [`S3Store`]; tests substitute [`MemoryStore`] through
/// this trait. Implementations must keep the two bucket classes fully
/// independent.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Reads an object, failing with [`Error::AssetNotFound`] if the key
    /// does not exist in the addressed bucket.
    async fn fetch(&self, class: BucketClass, key: &str) -> Result<Bytes>;

    /// Writes an object unconditionally and returns its public URL.
    ///
    /// Idempotent to retry: a second put with identical key and bytes
    /// merely overwrites.
    async fn put(
        &self,
        class: BucketClass,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String>;
}

/// In-memory storage backend for testing.
///
/// Thread-safe via `RwLock`. Not suitable for production.
#[derive(Debug)]
pub struct MemoryStore {
    buckets: Buckets,
    objects: RwLock<HashMap<(BucketClass, String), StoredObject>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

impl MemoryStore {
    /// Creates an empty memory store with the given bucket addressing.
    #[must_use]
    pub fn new(buckets: Buckets) -> Self {
        Self {
            buckets,
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Seeds an object, typically a template bundle under test.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed(&self, class: BucketClass, key: &str, data: Bytes) {
        self.objects
            .write()
            .expect("memory store lock poisoned")
            .insert(
                (class, key.to_string()),
                StoredObject {
                    data,
                    content_type: "application/octet-stream".to_string(),
                },
            );
    }

    /// Returns the stored bytes for a key, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn object(&self, class: BucketClass, key: &str) -> Option<Bytes> {
        self.objects
            .read()
            .expect("memory store lock poisoned")
            .get(&(class, key.to_string()))
            .map(|o| o.data.clone())
    }

    /// Lists the keys stored in a bucket class, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn keys(&self, class: BucketClass) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .expect("memory store lock poisoned")
            .keys()
            .filter(|(c, _)| *c == class)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn fetch(&self, class: BucketClass, key: &str) -> Result<Bytes> {
        self.objects
            .read()
            .map_err(|_| Error::internal("memory store lock poisoned"))?
            .get(&(class, key.to_string()))
            .map(|o| o.data.clone())
            .ok_or_else(|| Error::AssetNotFound {
                bucket: class.label(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        class: BucketClass,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String> {
        self.objects
            .write()
            .map_err(|_| Error::internal("memory store lock poisoned"))?
            .insert(
                (class, key.to_string()),
                StoredObject {
                    data: bytes,
                    content_type: content_type.to_string(),
                },
            );
        Ok(self.buckets.public_url(class, key))
    }
}

/// S3-backed storage gateway.
///
/// One `object_store` client per bucket class so keys can never cross
/// address spaces.
pub struct S3Store {
    buckets: Buckets,
    templates: object_store::aws::AmazonS3,
    designs: object_store::aws::AmazonS3,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("buckets", &self.buckets)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    /// Builds an S3 gateway from storage configuration.
    ///
    /// Credentials are resolved from the standard AWS environment.
    ///
    /// # Errors
    ///
    /// Returns an error if either bucket client cannot be constructed.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let buckets = Buckets::new(config);
        let templates = Self::client(&config.templates_bucket, &config.region)?;
        let designs = Self::client(&config.designs_bucket, &config.region)?;
        Ok(Self {
            buckets,
            templates,
            designs,
        })
    }

    fn client(bucket: &str, region: &str) -> Result<object_store::aws::AmazonS3> {
        object_store::aws::AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()
            .map_err(|e| Error::store_write(format!("building S3 client for {bucket}"), e))
    }

    fn store(&self, class: BucketClass) -> &object_store::aws::AmazonS3 {
        match class {
            BucketClass::Templates => &self.templates,
            BucketClass::Designs => &self.designs,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn fetch(&self, class: BucketClass, key: &str) -> Result<Bytes> {
        let path = StorePath::from(key);
        let result = self.store(class).get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => Error::AssetNotFound {
                bucket: class.label(),
                key: key.to_string(),
            },
            other => Error::store_write(format!("fetching {key}"), other),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| Error::store_write(format!("reading {key}"), e))
    }

    async fn put(
        &self,
        class: BucketClass,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String> {
        let path = StorePath::from(key);
        let attributes = Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        )]);
        let mut options = PutOptions::default();
        options.attributes = attributes;

        self.store(class)
            .put_opts(&path, bytes.into(), options)
            .await
            .map_err(|e| Error::store_write(format!("putting {key}"), e))?;

        Ok(self.buckets.public_url(class, key))
    }
}
