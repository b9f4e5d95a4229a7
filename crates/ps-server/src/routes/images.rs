//! Image route handlers.
//!
//! Uploads arrive as `multipart/form-data` with a `file` part and an optional
//! `name` part. Repository calls are synchronous, so they run on the blocking
//! pool.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;

use ps_core::Error;
use ps_images::ImageEntry;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::render;

/// Fields collected from an upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<Bytes>,
    pub file_name: Option<String>,
    pub name: Option<String>,
}

impl UploadForm {
    /// Drain the multipart stream, keeping the `file` and `name` parts.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            match field.name() {
                Some("file") => {
                    form.file_name = field.file_name().map(str::to_string);
                    form.file = Some(field.bytes().await.map_err(invalid_form)?);
                }
                Some("name") => {
                    form.name = Some(field.text().await.map_err(invalid_form)?);
                }
                other => {
                    tracing::debug!("Ignoring form field {:?}", other);
                }
            }
        }

        Ok(form)
    }

    /// The uploaded content, or a 400 if no file part was sent.
    fn take_file(&mut self) -> Result<Bytes, AppError> {
        self.file
            .take()
            .ok_or_else(|| Error::Validation("multipart field \"file\" is required".into()).into())
    }

    /// Resolve the image key: explicit path parameter, then the `name` field,
    /// then the uploaded file name.
    fn key(&self, path_name: Option<String>) -> Result<String, AppError> {
        path_name
            .into_iter()
            .chain(self.name.clone())
            .chain(self.file_name.clone())
            .find(|k| !k.is_empty())
            .ok_or_else(|| Error::Validation("image name is required".into()).into())
    }
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> AppError {
    Error::Validation(format!("invalid multipart form: {e}")).into()
}

/// Run a repository call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> ps_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
        .map_err(AppError::from)
}

/// POST /images
pub async fn create_image(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let data = form.take_file()?;
    let key = form.key(None)?;

    blocking(move || ctx.images.create(&key, &mut &data[..])).await?;
    Ok((StatusCode::OK, Html("")))
}

/// GET /images
pub async fn list_images(State(ctx): State<AppContext>) -> Result<impl IntoResponse, AppError> {
    let entries = blocking(move || ctx.images.list()).await?;
    Ok(Html(render::list_page(&entries)))
}

/// GET /api/images
pub async fn list_images_json(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<ImageEntry>>, AppError> {
    let entries = blocking(move || ctx.images.list()).await?;
    Ok(Json(entries))
}

/// GET /images/:name
pub async fn get_image(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let data = blocking(move || ctx.images.get(&name).map(|r| r.into_bytes())).await?;

    let content_type = ps_thumb::sniff_format(&data)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], data))
}

/// PATCH /images/:name
pub async fn update_image(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let data = form.take_file()?;
    let key = form.key(Some(name))?;

    blocking(move || ctx.images.update(&key, &mut &data[..])).await?;
    Ok((StatusCode::OK, Html("")))
}

/// DELETE /images/:name
pub async fn delete_image(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    blocking(move || ctx.images.delete(&name)).await?;
    Ok((StatusCode::OK, Html("")))
}
