use tracing::Span;

use crate::content::ContentIndex;
use crate::error::PayloadError;
use crate::model::{Batch, Bookmark, Highlight};
use crate::tags::extract_tags;
use crate::text::{MAX_HIGHLIGHT_LEN, normalise, split_highlight};
use crate::timestamp::resolve_created;

pub const HIGHLIGHT_REQUEST_BATCH_MAX: usize = 2000;

/// Note body sent when a bookmark only carries an annotation. Notado requires some content.
pub const ANNOTATION_PLACEHOLDER: &str = "Placeholder for attached annotation";

/// Turns device bookmarks into batches of Notado notes.
pub struct PayloadBuilder {
    span: Span,
    batch_max: usize,
    max_highlight_len: usize,
}

impl PayloadBuilder {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            batch_max: HIGHLIGHT_REQUEST_BATCH_MAX,
            max_highlight_len: MAX_HIGHLIGHT_LEN,
        }
    }

    pub fn with_batch_max(mut self, batch_max: usize) -> Self {
        self.batch_max = batch_max.max(1);
        self
    }

    pub fn with_max_highlight_len(mut self, max_highlight_len: usize) -> Self {
        self.max_highlight_len = max_highlight_len.max(1);
        self
    }

    /// Builds the batches for one sync.
    ///
    /// A new batch is started every `batch_max` input bookmarks, counted by position rather
    /// than by notes produced, so a bookmark that splits into several chunks can push a batch
    /// past the cap. The last batch is always returned, even when empty. Any timestamp error
    /// aborts the whole build.
    pub fn build(&self, bookmarks: &[Bookmark], index: &ContentIndex) -> Result<Vec<Batch>, PayloadError> {
        let _entered = self.span.enter();

        let mut batches = Vec::new();
        let mut current = Batch::default();
        let mut highlight_count = 0;

        for (count, entry) in bookmarks.iter().enumerate() {
            if count > 0 && count % self.batch_max == 0 {
                tracing::debug!(batch = count / self.batch_max, "batch full, starting another");
                batches.push(std::mem::take(&mut current));
            }

            let mut source = index.lookup(&entry.volume_id);
            tracing::debug!(title = %source.title, "parsing highlight");

            let created = resolve_created(entry, &source.title)?;

            let mut text = normalise(&entry.text);
            if !entry.annotation.is_empty() && text.is_empty() {
                text = ANNOTATION_PLACEHOLDER.to_string();
            }
            if entry.annotation.is_empty() && text.is_empty() {
                tracing::warn!(
                    title = %source.title,
                    volume_id = %entry.volume_id,
                    "found an entry with neither highlighted text nor an annotation, skipping"
                );
                continue;
            }

            // Kepubs carry a title in the device database, sideloaded epubs often don't.
            if source.title.is_empty() {
                match title_from_volume_id(&entry.volume_id) {
                    Some(title) => {
                        tracing::debug!(filename = %title, "no source title, using filename");
                        source.title = title;
                    }
                    None => {
                        tracing::warn!(
                            volume_id = ?entry.volume_id,
                            "failed to derive a title from the volume id, sending without one"
                        );
                    }
                }
            }

            let chunks = split_highlight(&text, self.max_highlight_len);
            let tags = extract_tags(&entry.annotation);
            let title = format!("{} - {}", source.title, source.attribution);

            for chunk in &chunks {
                current.highlights.push(Highlight {
                    content: chunk.clone(),
                    url: entry.volume_id.clone(),
                    title: title.clone(),
                    created: created.clone(),
                    tags: tags.clone(),
                    author: source.attribution.clone(),
                });
            }
            highlight_count += chunks.len();

            tracing::debug!(
                title = %source.title,
                volume_id = %entry.volume_id,
                chunks = chunks.len(),
                "compiled highlights for book"
            );
        }

        batches.push(current);
        tracing::info!(
            highlight_count,
            batch_count = batches.len(),
            "successfully parsed highlights"
        );

        Ok(batches)
    }
}

/// Builds batches with the default limits.
pub fn build_payload(bookmarks: &[Bookmark], index: &ContentIndex) -> Result<Vec<Batch>, PayloadError> {
    PayloadBuilder::new(tracing::info_span!("build_payload")).build(bookmarks, index)
}

/// Derives a book title from a volume id such as `file:///mnt/onboard/Dune.epub`.
///
/// The id is read as a URL: query and fragment are dropped, the last path segment is
/// percent-decoded and a trailing `.epub` removed. Returns `None` when the id contains ASCII
/// control characters or has no usable segment.
pub fn title_from_volume_id(volume_id: &str) -> Option<String> {
    if volume_id.chars().any(|c| c.is_ascii_control()) {
        return None;
    }

    let without_fragment = volume_id.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let rest = strip_scheme(without_query);
    let path = match rest.strip_prefix("//") {
        Some(authority) => authority.find('/').map(|i| &authority[i..]).unwrap_or_default(),
        None => rest,
    };

    let decoded = urlencoding::decode(path).ok()?;
    let file_name = decoded.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let title = file_name.strip_suffix(".epub").unwrap_or(file_name);

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn strip_scheme(s: &str) -> &str {
    match s.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => s,
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
