use chrono::{Local, NaiveDateTime};

use crate::error::PayloadError;
use crate::model::Bookmark;

/// `DateCreated` as written by the device, e.g. `2006-01-02T15:04:05.000`.
pub const DATE_CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// `DateModified` as written by the device, e.g. `2006-01-02T15:04:05Z`.
pub const DATE_MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// What Notado expects in `created`, e.g. `2006-01-02T15:04:05+00:00`.
pub const NOTADO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Picks the best available creation time for a bookmark.
///
/// Date created wins, then date modified, then the current local time. A value that is present
/// but malformed is an error rather than a reason to fall through to the next candidate.
pub fn resolve_created(bookmark: &Bookmark, title: &str) -> Result<String, PayloadError> {
    if !bookmark.date_created.is_empty() {
        return reformat(&bookmark.date_created, DATE_CREATED_FORMAT, "date created", bookmark, title);
    }

    tracing::warn!(
        title,
        volume_id = %bookmark.volume_id,
        "no date created for bookmark, defaulting to date last modified"
    );

    if !bookmark.date_modified.is_empty() {
        return reformat(&bookmark.date_modified, DATE_MODIFIED_FORMAT, "date modified", bookmark, title);
    }

    tracing::warn!(
        title,
        volume_id = %bookmark.volume_id,
        "no date modified for bookmark, defaulting to current date"
    );

    Ok(Local::now().format(NOTADO_TIME_FORMAT).to_string())
}

// Device timestamps carry no zone information and are treated as UTC.
fn reformat(
    value: &str,
    format: &str,
    field: &'static str,
    bookmark: &Bookmark,
    title: &str,
) -> Result<String, PayloadError> {
    match NaiveDateTime::parse_from_str(value, format) {
        Ok(t) => Ok(t.and_utc().format(NOTADO_TIME_FORMAT).to_string()),
        Err(source) => {
            tracing::error!(
                error = %source,
                title,
                volume_id = %bookmark.volume_id,
                field,
                value,
                "failed to parse a valid timestamp from bookmark"
            );
            Err(PayloadError::TimestampParse {
                field,
                value: value.to_string(),
                source,
            })
        }
    }
}
