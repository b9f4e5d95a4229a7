//! Embedded landing and upload pages.

use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};

pub const INDEX_HTML: &str = include_str!("../../assets/html/index.html");
pub const UPLOAD_HTML: &str = include_str!("../../assets/html/upload.html");

/// Look up an embedded page by request path.
pub fn lookup(path: &str) -> Option<&'static str> {
    match path {
        "/" | "/index.html" => Some(INDEX_HTML),
        "/upload.html" => Some(UPLOAD_HTML),
        _ => None,
    }
}

/// Fallback for every path not claimed by another route.
pub async fn embedded_page(method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    match lookup(uri.path()) {
        Some(page) => Html(page).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_links_to_upload_and_list() {
        let page = lookup("/").unwrap();
        assert!(page.contains("href=\"/upload.html\""));
        assert!(page.contains("href=\"/images\""));
        assert_eq!(lookup("/index.html"), Some(page));
    }

    #[test]
    fn upload_form_posts_file_field() {
        let page = lookup("/upload.html").unwrap();
        assert!(page.contains("action=\"/images\""));
        assert!(page.contains("enctype=\"multipart/form-data\""));
        assert!(page.contains("name=\"file\""));
    }

    #[test]
    fn unknown_path() {
        assert_eq!(lookup("/favicon.ico"), None);
    }
}
