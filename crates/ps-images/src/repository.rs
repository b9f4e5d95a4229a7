//! Image repository over a transactional key-value store.
//!
//! Every image is kept as two records written in the same transaction: the
//! raw upload under its logical key, and a PNG thumbnail under
//! [`THUMBS_PREFIX`]` + key`. Listing scans only the thumbnail namespace, so
//! it never touches full-size content.

use std::io::{Cursor, Read};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ps_core::{Error, Result};
use ps_store::{KvStore, KvStoreExt};
use ps_thumb::{PngThumbnailer, Thumbnailer};
use serde::Serialize;

use crate::key::{ImageKey, THUMBS_PREFIX};

/// Operations the request layer needs from an image store.
pub trait ImagesRepo: Send + Sync {
    /// Fetch an image. Fails with [`Error::NotFound`] if it does not exist.
    fn get(&self, key: &str) -> Result<ImageReader>;

    /// List every image with its base64 PNG thumbnail.
    fn list(&self) -> Result<Vec<ImageEntry>>;

    /// Create a new image. Fails with [`Error::AlreadyExists`] if it exists.
    fn create(&self, key: &str, content: &mut dyn Read) -> Result<()>;

    /// Replace an existing image. Fails with [`Error::NotFound`] if absent.
    fn update(&self, key: &str, content: &mut dyn Read) -> Result<()>;

    /// Remove an image and its thumbnail. Fails with [`Error::NotFound`] if
    /// absent.
    fn delete(&self, key: &str) -> Result<()>;
}

/// One row of [`ImagesRepo::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    /// Logical image key.
    pub key: String,
    /// Standard base64 of the PNG thumbnail.
    pub thumb: String,
}

impl ImageEntry {
    /// Decode [`thumb`](Self::thumb) back to PNG bytes.
    pub fn thumb_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.thumb)
            .map_err(|e| Error::Internal(format!("invalid thumbnail encoding: {e}")))
    }
}

/// Readable view over a private copy of a stored image.
#[derive(Debug)]
pub struct ImageReader {
    inner: Cursor<Vec<u8>>,
}

impl ImageReader {
    fn new(data: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// Total size of the image in bytes.
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    /// Take the full image, regardless of how much has been read.
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl Read for ImageReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

/// [`ImagesRepo`] backed by any [`KvStore`].
pub struct ImageRepository {
    store: Arc<dyn KvStore>,
    thumbnailer: Arc<dyn Thumbnailer>,
    thumb_width: u32,
    thumb_height: u32,
    max_content_bytes: Option<usize>,
}

impl ImageRepository {
    /// Create a repository generating default-size PNG thumbnails.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            thumbnailer: Arc::new(PngThumbnailer),
            thumb_width: ps_thumb::DEFAULT_WIDTH,
            thumb_height: ps_thumb::DEFAULT_HEIGHT,
            max_content_bytes: None,
        }
    }

    pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn Thumbnailer>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }

    pub fn with_thumbnail_size(mut self, width: u32, height: u32) -> Self {
        self.thumb_width = width;
        self.thumb_height = height;
        self
    }

    /// Reject uploads larger than `limit` bytes before touching the store.
    pub fn with_max_content_bytes(mut self, limit: usize) -> Self {
        self.max_content_bytes = Some(limit);
        self
    }

    /// Whether an image record exists for `key`.
    pub fn exists(&self, key: &str) -> Result<bool> {
        let key = ImageKey::parse(key)?;
        self.store.view(|txn| txn.contains(key.as_bytes()))
    }

    /// Raw PNG thumbnail stored for `key`, if any.
    pub fn thumbnail(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = ImageKey::parse(key)?;
        self.store.view(|txn| txn.get(&key.thumb_key()))
    }

    fn read_content(&self, content: &mut dyn Read) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        match self.max_content_bytes {
            Some(limit) => {
                let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
                content.take(cap).read_to_end(&mut data)?;
                if data.len() > limit {
                    return Err(Error::Validation(format!(
                        "image is larger than {limit} bytes"
                    )));
                }
            }
            None => {
                content.read_to_end(&mut data)?;
            }
        }
        Ok(data)
    }

    fn make_thumbnail(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.thumbnailer.thumbnail(data, self.thumb_width, self.thumb_height)
    }

    /// Write the image and its freshly generated thumbnail.
    ///
    /// `must_exist` selects update (`true`) or create (`false`) semantics.
    /// The thumbnail is generated before the write transaction opens, so
    /// writers to other keys only wait for the two puts and the commit. The
    /// presence check is repeated inside the transaction.
    fn write(&self, key: &ImageKey, data: Vec<u8>, must_exist: bool) -> Result<()> {
        let exists = self.store.view(|txn| txn.contains(key.as_bytes()))?;
        check_presence(key, must_exist, exists)?;

        let thumb = self.make_thumbnail(&data)?;

        self.store.update(|txn| {
            let exists = txn.contains(key.as_bytes())?;
            check_presence(key, must_exist, exists)?;
            txn.put(key.as_bytes(), data)?;
            txn.put(&key.thumb_key(), thumb)
        })
    }
}

fn check_presence(key: &ImageKey, must_exist: bool, exists: bool) -> Result<()> {
    match (must_exist, exists) {
        (true, false) => Err(Error::not_found(key.as_str())),
        (false, true) => Err(Error::already_exists(key.as_str())),
        _ => Ok(()),
    }
}

/// Log a failed operation once, at the repository boundary.
fn log_failure(op: &str, key: &str, err: &Error) {
    match err {
        Error::NotFound { .. } | Error::AlreadyExists { .. } | Error::Validation(_) => {
            tracing::debug!(key, error = %err, "{op} rejected");
        }
        Error::Decode(_) => {
            tracing::warn!(key, error = %err, "{op} failed: upload is not a supported image");
        }
        _ => {
            tracing::error!(key, error = %err, "{op} failed");
        }
    }
}

impl ImagesRepo for ImageRepository {
    fn get(&self, key: &str) -> Result<ImageReader> {
        tracing::debug!(key, "Get image");
        let result = ImageKey::parse(key).and_then(|key| {
            self.store
                .view(|txn| txn.get(key.as_bytes()))?
                .map(ImageReader::new)
                .ok_or_else(|| Error::not_found(key.as_str()))
        });
        result.inspect_err(|e| log_failure("get", key, e))
    }

    fn list(&self) -> Result<Vec<ImageEntry>> {
        tracing::debug!("List images");
        let result = self
            .store
            .view(|txn| txn.scan_prefix(THUMBS_PREFIX.as_bytes()))
            .and_then(|entries| {
                entries
                    .into_iter()
                    .map(|(thumb_key, thumb)| {
                        Ok(ImageEntry {
                            key: ImageKey::from_thumb_key(&thumb_key)?.into_string(),
                            thumb: STANDARD.encode(thumb),
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            });
        result.inspect_err(|e| log_failure("list", "", e))
    }

    fn create(&self, key: &str, content: &mut dyn Read) -> Result<()> {
        tracing::debug!(key, "Create image");
        let result = ImageKey::parse(key).and_then(|image_key| {
            let data = self.read_content(content)?;
            self.write(&image_key, data, false)
        });
        result.inspect_err(|e| log_failure("create", key, e))
    }

    fn update(&self, key: &str, content: &mut dyn Read) -> Result<()> {
        tracing::debug!(key, "Update image");
        let result = ImageKey::parse(key).and_then(|image_key| {
            let data = self.read_content(content)?;
            self.write(&image_key, data, true)
        });
        result.inspect_err(|e| log_failure("update", key, e))
    }

    fn delete(&self, key: &str) -> Result<()> {
        tracing::debug!(key, "Delete image");
        let result = ImageKey::parse(key).and_then(|image_key| {
            self.store.update(|txn| {
                if !txn.delete(image_key.as_bytes())? {
                    return Err(Error::not_found(image_key.as_str()));
                }
                if !txn.delete(&image_key.thumb_key())? {
                    tracing::warn!(key = image_key.as_str(), "Image had no thumbnail record");
                }
                Ok(())
            })
        });
        result.inspect_err(|e| log_failure("delete", key, e))
    }
}
