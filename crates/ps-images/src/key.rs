//! Logical image keys and their derived thumbnail keys.

use std::fmt;

use ps_core::{Error, Result};

/// Namespace holding thumbnail records.
///
/// `/` is rejected in logical keys, so no image key can fall inside it.
pub const THUMBS_PREFIX: &str = "thumbs/";

/// Longest accepted logical key, in bytes.
pub const MAX_KEY_LEN: usize = 1024;

/// A validated logical image key, typically a base file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    /// Validate `key`.
    ///
    /// Rejects empty keys, keys longer than [`MAX_KEY_LEN`], and keys
    /// containing `/` or control characters.
    pub fn parse(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::Validation("image name is required".into()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(Error::Validation(format!(
                "image name is longer than {MAX_KEY_LEN} bytes"
            )));
        }
        if key.contains('/') {
            return Err(Error::Validation(format!(
                "image name must not contain '/': {key:?}"
            )));
        }
        if key.chars().any(char::is_control) {
            return Err(Error::Validation(format!(
                "image name must not contain control characters: {key:?}"
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key of the image record.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Store key of the thumbnail record.
    pub fn thumb_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(THUMBS_PREFIX.len() + self.0.len());
        key.extend_from_slice(THUMBS_PREFIX.as_bytes());
        key.extend_from_slice(self.0.as_bytes());
        key
    }

    /// Recover the logical key from a thumbnail store key.
    pub fn from_thumb_key(thumb_key: &[u8]) -> Result<Self> {
        let raw = thumb_key
            .strip_prefix(THUMBS_PREFIX.as_bytes())
            .ok_or_else(|| Error::Internal("key outside the thumbnail namespace".into()))?;
        let key = std::str::from_utf8(raw)
            .map_err(|e| Error::Internal(format!("thumbnail key is not UTF-8: {e}")))?;
        Ok(Self(key.to_string()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_file_names() {
        for name in ["cat.png", "holiday photo (1).JPG", "été.gif", "thumbs"] {
            assert_eq!(ImageKey::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(ImageKey::parse(""), Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_separator() {
        assert!(ImageKey::parse("thumbs/cat.png").is_err());
        assert!(ImageKey::parse("a/b").is_err());
    }

    #[test]
    fn rejects_control_characters() {
        assert!(ImageKey::parse("cat\0.png").is_err());
        assert!(ImageKey::parse("cat\n.png").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let name = "x".repeat(MAX_KEY_LEN + 1);
        assert!(ImageKey::parse(&name).is_err());
        assert!(ImageKey::parse(&name[1..]).is_ok());
    }

    #[test]
    fn thumb_key_round_trip() {
        let key = ImageKey::parse("cat.png").unwrap();
        assert_eq!(key.thumb_key(), b"thumbs/cat.png".to_vec());
        assert_eq!(ImageKey::from_thumb_key(&key.thumb_key()).unwrap(), key);
    }

    #[test]
    fn from_thumb_key_outside_namespace() {
        assert!(matches!(
            ImageKey::from_thumb_key(b"cat.png"),
            Err(Error::Internal(_))
        ));
    }
}
