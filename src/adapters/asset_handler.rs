use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::adapters::page_renderer::Assets;

const STATIC_DIR: &str = "static/";

pub struct AssetHandler;

impl AssetHandler {
    /// Serve an embedded file from `assets/static`.
    pub async fn serve(Path(path): Path<String>) -> impl IntoResponse {
        let path = path.trim_start_matches('/');
        if path.is_empty() || path.split('/').any(|segment| segment == "..") {
            return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
        }

        match Assets::get(&format!("{}{}", STATIC_DIR, path)) {
            Some(content) => {
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                (
                    [
                        (header::CONTENT_TYPE, mime.as_ref().to_string()),
                        (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                    ],
                    content.data,
                )
                    .into_response()
            }
            None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        }
    }
}
