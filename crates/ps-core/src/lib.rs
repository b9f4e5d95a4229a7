//! ps-core: shared error type, configuration and build information.
//!
//! Every other ps-* crate funnels its failures into [`Error`] so that the
//! HTTP layer can classify them with [`Error::http_status`].

pub mod config;
pub mod error;
pub mod version;

pub use error::{Error, Result};
pub use version::VersionInfo;
