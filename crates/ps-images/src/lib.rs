//! ps-images: the image repository.
//!
//! Stores uploaded images together with a derived PNG thumbnail, keeping the
//! pair consistent through store transactions. See [`ImageRepository`].

pub mod key;
pub mod repository;

pub use key::{ImageKey, MAX_KEY_LEN, THUMBS_PREFIX};
pub use repository::{ImageEntry, ImageReader, ImageRepository, ImagesRepo};
