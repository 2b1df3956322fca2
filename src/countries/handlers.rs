use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    countries::{
        dto::{CountryList, UploadResponse},
        upload::{process_upload, UploadFailure, UploadOutcome, UploadedFile},
    },
    error::AppError,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/countries", get(list_mine))
        .route("/countries/all", get(list_all))
}

pub fn write_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/countries/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// POST /countries/upload (multipart, field `file`)
#[instrument(skip(state, mp), fields(user_id = %caller.id))]
pub async fn upload(
    State(state): State<AppState>,
    caller: AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut mp = mp?;
    let file = read_file_field(&mut mp).await?;

    match process_upload(state.countries.as_ref(), caller.id, file).await {
        UploadOutcome::Success(summary) => Ok(Json(UploadResponse {
            success: true,
            message: summary.message,
            countries_uploaded: summary.uploaded,
            uploaded_at: summary.uploaded_at,
            uploaded_by_user_id: caller.id,
        })),
        UploadOutcome::Failure(failure @ UploadFailure::Storage) => {
            Err(AppError::Storage(failure.message()))
        }
        UploadOutcome::Failure(failure) => Err(AppError::Validation(failure.message())),
    }
}

/// Returns the first part named `file`; other parts are drained and ignored.
async fn read_file_field(mp: &mut Multipart) -> Result<Option<UploadedFile>, AppError> {
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return Err(AppError::Validation(format!("Invalid upload: {}", e.body_text())));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read upload body");
            AppError::Validation(format!("Invalid upload: {}", e.body_text()))
        })?;
        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        }));
    }
}

#[instrument(skip(state), fields(user_id = %caller.id))]
pub async fn list_mine(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<CountryList>, AppError> {
    let countries = state
        .countries
        .list_by_owner(caller.id)
        .await
        .map_err(|e| AppError::Unexpected(e.into()))?;
    Ok(Json(countries.into()))
}

#[instrument(skip(state, _caller))]
pub async fn list_all(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<CountryList>, AppError> {
    let countries = state
        .countries
        .list_all()
        .await
        .map_err(|e| AppError::Unexpected(e.into()))?;
    Ok(Json(countries.into()))
}
