//! Build version information.
//!
//! Values are captured at compile time from `PIXSHELF_VERSION`,
//! `PIXSHELF_BUILD_DATE`, `PIXSHELF_GIT_COMMIT` and `PIXSHELF_GIT_STATE`, e.g.
//!
//! ```sh
//! PIXSHELF_VERSION=$(git describe --tags) \
//! PIXSHELF_BUILD_DATE=$(date -u -R) \
//! PIXSHELF_GIT_COMMIT=$(git rev-parse HEAD) \
//! PIXSHELF_GIT_STATE=$(git diff --quiet || echo dirty) \
//!   cargo build --release
//! ```

use std::fmt;

use serde::Serialize;

/// Describes the build of the running binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub git_commit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub git_state: String,
}

impl VersionInfo {
    /// Version info baked into this binary.
    pub fn current() -> Self {
        Self::from_parts(
            option_env!("PIXSHELF_VERSION"),
            option_env!("PIXSHELF_BUILD_DATE"),
            option_env!("PIXSHELF_GIT_COMMIT"),
            option_env!("PIXSHELF_GIT_STATE"),
        )
    }

    /// An explicit release version implies a clean tree unless the build says
    /// otherwise; without one the crate version is reported with no state.
    pub fn from_parts(
        version: Option<&str>,
        build_date: Option<&str>,
        git_commit: Option<&str>,
        git_state: Option<&str>,
    ) -> Self {
        let mut info = VersionInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_date: build_date.unwrap_or_default().to_string(),
            git_commit: git_commit.unwrap_or_default().to_string(),
            git_state: String::new(),
        };

        if let Some(v) = version.filter(|v| !v.is_empty()) {
            info.version = v.to_string();
            info.git_state = "clean".to_string();
        }
        if let Some(state) = git_state.filter(|s| !s.is_empty()) {
            info.git_state = state.to_string();
        }

        info
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Build date: {}", self.build_date)?;
        writeln!(f, "Commit: {}", self.git_commit)?;
        writeln!(f, "Working tree: {}", self.git_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_crate_version() {
        let info = VersionInfo::from_parts(None, None, None, None);
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.git_state.is_empty());
    }

    #[test]
    fn explicit_version_is_clean() {
        let info = VersionInfo::from_parts(Some("v1.2.0"), Some("today"), Some("abc123"), None);
        assert_eq!(info.version, "v1.2.0");
        assert_eq!(info.git_state, "clean");
        assert_eq!(info.git_commit, "abc123");
    }

    #[test]
    fn git_state_overrides_clean() {
        let info = VersionInfo::from_parts(Some("v1.2.0"), None, None, Some("dirty"));
        assert_eq!(info.git_state, "dirty");
    }

    #[test]
    fn display_lists_every_field() {
        let info = VersionInfo::from_parts(Some("v1"), Some("d"), Some("c"), Some("s"));
        assert_eq!(
            info.to_string(),
            "Version: v1\nBuild date: d\nCommit: c\nWorking tree: s\n"
        );
    }

    #[test]
    fn json_omits_empty_fields() {
        let info = VersionInfo::from_parts(None, None, Some("abc"), None);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["gitCommit"], "abc");
        assert!(json.get("buildDate").is_none());
    }
}
