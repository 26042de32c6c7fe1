use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::error::UploadError;
use crate::model::{Batch, Highlight};

pub const NOTADO_GRAPHQL_ENDPOINT: &str = "https://notado.app/graphql";

const IMPORT_NOTES_MUTATION: &str = r#"mutation ImportNotes($notes: [NewImportNote!]!) {
	importNotes(notes: $notes)
}"#;

pub fn user_agent(version: &str) -> String {
    format!("noctober/{}", version)
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'static str,
    variables: ImportNotesVariables<'a>,
}

#[derive(Debug, Serialize)]
struct ImportNotesVariables<'a> {
    notes: &'a [&'a Highlight],
}

/// Outcome of sending batches one request at a time.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub batches_sent: usize,
    pub highlights_sent: usize,
    /// Index of the batch that failed, with its error. Later batches were not attempted.
    pub failure: Option<(usize, UploadError)>,
}

pub struct NotadoClient {
    http: reqwest::Client,
    endpoint: String,
    span: Span,
}

impl NotadoClient {
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        span: Span,
    ) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            span,
        })
    }

    /// Sends every highlight from every batch in a single import request.
    ///
    /// Returns how many highlights were submitted. Nothing is sent when the batches are empty.
    pub async fn send_bookmarks(
        &self,
        batches: &[Batch],
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<usize, UploadError> {
        self.send_combined(batches, token, cancel)
            .instrument(self.span.clone())
            .await
    }

    /// Sends each non-empty batch as its own import request, in order.
    ///
    /// Stops at the first failing batch; earlier batches stay delivered.
    pub async fn send_batches(
        &self,
        batches: &[Batch],
        token: &str,
        cancel: &CancellationToken,
    ) -> BatchReport {
        self.send_each(batches, token, cancel)
            .instrument(self.span.clone())
            .await
    }

    async fn send_combined(
        &self,
        batches: &[Batch],
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<usize, UploadError> {
        let highlights = flatten(batches);
        if highlights.is_empty() {
            tracing::info!("no highlights to send to Notado");
            return Ok(0);
        }

        self.import_notes(&highlights, token, cancel).await?;

        tracing::info!(
            highlight_count = highlights.len(),
            "successfully sent bookmarks to Notado"
        );
        Ok(highlights.len())
    }

    async fn send_each(
        &self,
        batches: &[Batch],
        token: &str,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, batch) in batches.iter().enumerate() {
            if batch.is_empty() {
                continue;
            }

            let highlights = flatten(std::slice::from_ref(batch));
            if let Err(e) = self.import_notes(&highlights, token, cancel).await {
                tracing::error!(
                    batch = index,
                    error = %e,
                    batches_sent = report.batches_sent,
                    "failed to send batch to Notado"
                );
                report.failure = Some((index, e));
                return report;
            }

            report.batches_sent += 1;
            report.highlights_sent += highlights.len();
            tracing::debug!(batch = index, highlight_count = highlights.len(), "sent batch");
        }

        tracing::info!(
            batch_count = report.batches_sent,
            highlight_count = report.highlights_sent,
            "successfully sent batches to Notado"
        );
        report
    }

    async fn import_notes(
        &self,
        notes: &[&Highlight],
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<(), UploadError> {
        let payload = GraphqlRequest {
            query: IMPORT_NOTES_MUTATION,
            variables: ImportNotesVariables { notes },
        };

        let request = self
            .http
            .post(&self.endpoint)
            .header("X-API-TOKEN", token)
            .json(&payload)
            .send();

        let response = tokio::select! {
            result = request => result?,
            _ = cancel.cancelled() => {
                tracing::warn!(endpoint = %self.endpoint, "upload cancelled while waiting on Notado");
                return Err(UploadError::Cancelled);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status_code = status.as_u16(),
                response = %body,
                "received a non-200 response from Notado"
            );
            return Err(UploadError::RemoteRejection { status, body });
        }

        Ok(())
    }
}

fn flatten(batches: &[Batch]) -> Vec<&Highlight> {
    batches.iter().flat_map(|b| b.highlights.iter()).collect()
}
