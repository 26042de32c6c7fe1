use std::error::Error;

pub mod config;
pub mod content;
pub mod error;
pub mod kobo;
pub mod model;
pub mod notado;
pub mod payload;
pub mod sync;
pub mod tags;
pub mod text;
pub mod timestamp;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

pub fn system_details(version: &str) -> String {
    format!(
        "{} ({} {})",
        version,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PayloadError, SyncError};

    #[test]
    fn test_unpack_error_walks_sources() {
        let source = chrono::NaiveDateTime::parse_from_str("nope", "%Y").unwrap_err();
        let err = SyncError::Payload(PayloadError::TimestampParse {
            field: "date created",
            value: "nope".to_string(),
            source,
        });

        let unpacked = unpack_error(&err);
        assert!(unpacked.starts_with("failed to parse date created timestamp \"nope\""));
        assert!(unpacked.ends_with(&source.to_string()));
    }

    #[test]
    fn test_system_details() {
        let details = system_details("1.0.0");
        assert!(details.starts_with("1.0.0 ("));
        assert!(details.contains(std::env::consts::OS));
    }
}
