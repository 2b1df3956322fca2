//! Spreadsheet upload pipeline.
//!
//! A request moves through four stages and stops at the first failure:
//! file check, row extraction, per-row validation, then a single batch
//! write. Nothing is persisted unless the batch write succeeds as a whole.

use std::fmt;

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::countries::{
    repo::CountryStore,
    repo_types::Country,
    sheet,
    summary::{no_valid_rows_message, uploaded_message},
    validator::{validate_row, RawRow, RowRejection},
};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

/// The `file` part of an upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRejection {
    Missing,
    Empty,
    NotSpreadsheet,
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FileRejection::Missing => "No file selected",
            FileRejection::Empty => "File is empty",
            FileRejection::NotSpreadsheet => "File must be an Excel file (.xlsx or .xls)",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub skipped: usize,
    pub uploaded_at: OffsetDateTime,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum UploadFailure {
    InvalidFile(FileRejection),
    Unreadable,
    NoValidRows { rejections: Vec<RowRejection> },
    Storage,
}

impl UploadFailure {
    pub fn message(&self) -> String {
        match self {
            UploadFailure::InvalidFile(r) => r.to_string(),
            UploadFailure::Unreadable => "Could not read the Excel file".into(),
            UploadFailure::NoValidRows { rejections } => no_valid_rows_message(rejections),
            UploadFailure::Storage => "Error saving countries".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Success(UploadSummary),
    Failure(UploadFailure),
}

pub fn check_file(file: Option<&UploadedFile>) -> Result<&UploadedFile, FileRejection> {
    let file = file.ok_or(FileRejection::Missing)?;
    if file.bytes.is_empty() {
        return Err(FileRejection::Empty);
    }
    if !is_spreadsheet(file.content_type.as_deref(), file.file_name.as_deref()) {
        return Err(FileRejection::NotSpreadsheet);
    }
    Ok(file)
}

/// Either the declared media type or the file extension must name a spreadsheet.
pub fn is_spreadsheet(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim();
            essence.eq_ignore_ascii_case(XLSX_MIME) || essence.eq_ignore_ascii_case(XLS_MIME)
        })
        .unwrap_or(false);
    let by_name = file_name
        .map(|n| {
            let n = n.trim().to_ascii_lowercase();
            n.ends_with(".xlsx") || n.ends_with(".xls")
        })
        .unwrap_or(false);
    by_type || by_name
}

/// Accepted rows and rejection reasons of one sheet.
#[derive(Debug, Default)]
pub struct ValidatedRows {
    pub accepted: Vec<Country>,
    pub rejections: Vec<RowRejection>,
}

pub fn validate_rows(
    owner_id: Uuid,
    uploaded_at: OffsetDateTime,
    rows: &[(usize, RawRow)],
) -> ValidatedRows {
    let mut out = ValidatedRows::default();
    for (row_number, raw) in rows {
        match validate_row(*row_number, raw) {
            Ok(valid) => out.accepted.push(Country {
                id: Uuid::new_v4(),
                name: valid.name,
                capital: valid.capital,
                region: valid.region,
                population: valid.population,
                uploaded_by_user_id: owner_id,
                uploaded_at,
            }),
            Err(rejection) => out.rejections.push(rejection),
        }
    }
    out
}

/// Validates extracted rows and persists the accepted ones in one batch.
pub async fn ingest_rows(
    store: &dyn CountryStore,
    owner_id: Uuid,
    rows: &[(usize, RawRow)],
) -> UploadOutcome {
    let uploaded_at = OffsetDateTime::now_utc();
    let ValidatedRows {
        accepted,
        rejections,
    } = validate_rows(owner_id, uploaded_at, rows);

    if accepted.is_empty() {
        warn!(%owner_id, rejected = rejections.len(), "upload had no valid rows");
        return UploadOutcome::Failure(UploadFailure::NoValidRows { rejections });
    }

    if let Err(e) = store.add_batch(&accepted).await {
        error!(error = %e, %owner_id, rows = accepted.len(), "batch insert failed");
        return UploadOutcome::Failure(UploadFailure::Storage);
    }

    info!(
        %owner_id,
        uploaded = accepted.len(),
        skipped = rejections.len(),
        "countries uploaded"
    );
    UploadOutcome::Success(UploadSummary {
        uploaded: accepted.len(),
        skipped: rejections.len(),
        uploaded_at,
        message: uploaded_message(accepted.len(), rejections.len()),
    })
}

pub async fn process_upload(
    store: &dyn CountryStore,
    owner_id: Uuid,
    file: Option<UploadedFile>,
) -> UploadOutcome {
    let file = match check_file(file.as_ref()) {
        Ok(f) => f,
        Err(rejection) => {
            warn!(%owner_id, %rejection, "upload rejected");
            return UploadOutcome::Failure(UploadFailure::InvalidFile(rejection));
        }
    };

    let bytes = file.bytes.clone();
    let rows = match tokio::task::spawn_blocking(move || sheet::read_rows(&bytes)).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            warn!(error = %e, %owner_id, "workbook could not be read");
            return UploadOutcome::Failure(UploadFailure::Unreadable);
        }
        Err(e) => {
            error!(error = %e, %owner_id, "workbook reader task failed");
            return UploadOutcome::Failure(UploadFailure::Unreadable);
        }
    };

    ingest_rows(store, owner_id, &rows).await
}
