use axum::Json;
use ps_core::VersionInfo;

/// GET /version
pub async fn version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}
