use tokio_util::sync::CancellationToken;

use crate::config::SendMode;
use crate::content::ContentIndex;
use crate::error::SyncError;
use crate::kobo::KoboDatabase;
use crate::notado::NotadoClient;
use crate::payload::PayloadBuilder;
use crate::unpack_error;

#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    pub token: String,
    pub upload_store_highlights: bool,
    pub send_mode: SendMode,
}

/// Reads every highlight off the device and uploads it to Notado.
///
/// Returns the number of notes submitted.
pub async fn forward_to_notado(
    device: &KoboDatabase,
    client: &NotadoClient,
    settings: &SyncSettings,
    cancel: &CancellationToken,
) -> Result<usize, SyncError> {
    let result = run(device, client, settings, cancel).await;
    if let Err(e) = &result {
        tracing::error!(error = %unpack_error(e), "sync to Notado failed");
    }
    result
}

async fn run(
    device: &KoboDatabase,
    client: &NotadoClient,
    settings: &SyncSettings,
    cancel: &CancellationToken,
) -> Result<usize, SyncError> {
    if settings.token.is_empty() {
        return Err(SyncError::MissingToken);
    }

    let counts = device.count_bookmarks().await?;
    tracing::info!(
        highlight_count_sideload = counts.sideloaded,
        highlight_count_official = counts.official,
        highlight_count_total = counts.total,
        "got highlight counts from device"
    );
    if counts.total == 0 {
        return Err(SyncError::NothingToSync);
    }

    let include_store_bought = settings.upload_store_highlights;
    if !include_store_bought && counts.sideloaded == 0 {
        return Err(SyncError::NoSideloadedHighlights);
    }

    let content = device.list_content(include_store_bought).await?;
    let index = ContentIndex::new(content);
    let bookmarks = device.list_bookmarks(include_store_bought).await?;

    let batches = PayloadBuilder::new(tracing::info_span!("build_payload", bookmarks = bookmarks.len()))
        .build(&bookmarks, &index)?;

    let uploaded = match settings.send_mode {
        SendMode::Combined => client.send_bookmarks(&batches, &settings.token, cancel).await?,
        SendMode::PerBatch => {
            let report = client.send_batches(&batches, &settings.token, cancel).await;
            if let Some((index, source)) = report.failure {
                return Err(SyncError::PartialUpload {
                    index,
                    delivered: report.highlights_sent,
                    source,
                });
            }
            report.highlights_sent
        }
    };

    tracing::info!(payload_count = uploaded, "successfully uploaded bookmarks to Notado");
    Ok(uploaded)
}
