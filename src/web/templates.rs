use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use pixedit::common::StorageConfig;

/// Operations offered by the upload form, as `(identifier, label)`.
pub const FORM_OPERATIONS: [(&str, &str); 17] = [
    ("cgray", "Convert to grayscale"),
    ("cwebp", "Convert to WebP"),
    ("cjpg", "Convert to JPG"),
    ("cpng", "Convert to PNG"),
    ("rotate_90", "Rotate 90°"),
    ("rotate_180", "Rotate 180°"),
    ("rotate_270", "Rotate 270°"),
    ("flip_h", "Flip horizontally"),
    ("flip_v", "Flip vertically"),
    ("resize_25", "Resize to 25%"),
    ("resize_50", "Resize to 50%"),
    ("resize_75", "Resize to 75%"),
    ("resize_150", "Resize to 150%"),
    ("resize_200", "Resize to 200%"),
    ("blur", "Blur"),
    ("bright_inc", "Increase brightness"),
    ("bright_dec", "Decrease brightness"),
];

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub messages: Vec<String>,
    pub processed_image: Option<String>,
    pub allowed_extensions: String,
    pub max_upload_mib: usize,
    pub operations: &'static [(&'static str, &'static str)],
}

impl IndexTemplate {
    pub fn new(
        config: &StorageConfig,
        messages: Vec<String>,
        processed_image: Option<String>,
    ) -> Self {
        Self {
            messages,
            processed_image,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(","),
            max_upload_mib: config.max_upload_bytes / (1024 * 1024),
            operations: &FORM_OPERATIONS,
        }
    }
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate;

pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("Failed to render template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
