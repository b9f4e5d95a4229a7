//! Route handlers for the HTTP surface.

pub mod assets;
pub mod health;
pub mod images;
pub mod render;
pub mod version;
