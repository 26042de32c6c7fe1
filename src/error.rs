use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to parse {field} timestamp {value:?}: {source}")]
    TimestampParse {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("received a non-200 status code from Notado: code {}", .status.as_u16())]
    RemoteRejection { status: StatusCode, body: String },
    #[error("upload cancelled before Notado responded")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device database not found at {0}")]
    NotFound(String),
    #[error("device database error: {0}")]
    Database(#[from] libsql::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no Notado token was configured")]
    MissingToken,
    #[error("your device doesn't seem to have any highlights so there is nothing left to sync")]
    NothingToSync,
    #[error(
        "store-bought syncing is disabled and there are no sideloaded highlights, so there is nothing left to sync"
    )]
    NoSideloadedHighlights,
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("batch {index} failed after {delivered} highlights were delivered: {source}")]
    PartialUpload {
        index: usize,
        delivered: usize,
        #[source]
        source: UploadError,
    },
}
