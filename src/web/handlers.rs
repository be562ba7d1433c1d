use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixedit::process::ProcessError;
use pixedit::upload::IntakeError;

use super::flash::{read_flash, redirect_with_flash, CLEAR_FLASH_COOKIE};
use super::templates::{render, AboutTemplate, IndexTemplate};
use super::{AppState, PROCESSED_URL_PREFIX};

const SUCCESS_MESSAGE: &str = "Image processed successfully.";

#[derive(Debug, thiserror::Error)]
enum EditError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl EditError {
    fn status_code(&self) -> StatusCode {
        match self {
            EditError::Intake(IntakeError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            EditError::Intake(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            EditError::Process(
                ProcessError::Decode(_)
                | ProcessError::InvalidParameter(_)
                | ProcessError::UnknownOperation(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_validation(&self) -> bool {
        matches!(self, EditError::Intake(e) if e.is_validation())
    }
}

struct Upload {
    file_name: String,
    bytes: Bytes,
}

#[derive(Default)]
struct EditForm {
    operation: Option<String>,
    file: Option<Upload>,
}

async fn read_edit_form(multipart: &mut Multipart) -> Result<EditForm, MultipartError> {
    let mut form = EditForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some(Upload { file_name, bytes });
            }
            Some("operation") => {
                form.operation = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Saves the upload and runs the requested operation on the blocking pool.
async fn run_edit(state: Arc<AppState>, form: EditForm) -> Result<PathBuf, EditError> {
    let upload = form.file.ok_or(IntakeError::MissingFile)?;
    if upload.file_name.is_empty() {
        return Err(IntakeError::NoSelectedFile.into());
    }
    let operation = form.operation;

    let output = tokio::task::spawn_blocking(move || -> Result<PathBuf, EditError> {
        let input = state.intake.save(&upload.file_name, &upload.bytes)?;
        let operation = state.dispatcher.parse_operation(operation.as_deref())?;
        Ok(state.dispatcher.process(&input, &operation)?)
    })
    .await??;

    Ok(output)
}

fn processed_url(output: &Path) -> String {
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    format!("{}/{}", PROCESSED_URL_PREFIX, file_name)
}

pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let flash = read_flash(&headers);
    let had_flash = flash.is_some();

    let page = IndexTemplate::new(state.config(), flash.into_iter().collect(), None);
    let response = render(&page);

    if had_flash {
        ([(header::SET_COOKIE, CLEAR_FLASH_COOKIE)], response).into_response()
    } else {
        response
    }
}

pub async fn about() -> Response {
    render(&AboutTemplate)
}

pub async fn edit(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let form = match read_edit_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Malformed edit form: {}", e);
            return e.into_response();
        }
    };

    match run_edit(state.clone(), form).await {
        Ok(output) => {
            let page = IndexTemplate::new(
                state.config(),
                vec![SUCCESS_MESSAGE.to_string()],
                Some(processed_url(&output)),
            );
            render(&page)
        }
        Err(e) if e.is_validation() => {
            log::warn!("Rejected upload: {}", e);
            redirect_with_flash("/", &e.to_string())
        }
        Err(e) => {
            log::error!("Processing failed: {}", e);
            let page =
                IndexTemplate::new(state.config(), vec![format!("Processing failed: {}", e)], None);
            render(&page)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub message: String,
    pub path: Option<String>,
}

pub async fn api_edit(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<ProcessResponse>) {
    let form = match read_edit_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Malformed edit form: {}", e);
            return (
                e.status(),
                Json(ProcessResponse {
                    success: false,
                    message: e.body_text(),
                    path: None,
                }),
            );
        }
    };

    match run_edit(state, form).await {
        Ok(output) => (
            StatusCode::OK,
            Json(ProcessResponse {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
                path: Some(processed_url(&output)),
            }),
        ),
        Err(e) => {
            if e.is_validation() {
                log::warn!("Rejected upload: {}", e);
            } else {
                log::error!("Processing failed: {}", e);
            }
            (
                e.status_code(),
                Json(ProcessResponse {
                    success: false,
                    message: e.to_string(),
                    path: None,
                }),
            )
        }
    }
}
