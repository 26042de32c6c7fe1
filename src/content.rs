use std::collections::HashMap;

use crate::model::Content;

/// Book metadata keyed by content id. Built once per sync.
#[derive(Debug, Default, Clone)]
pub struct ContentIndex {
    entries: HashMap<String, Content>,
}

impl ContentIndex {
    pub fn new(content: Vec<Content>) -> Self {
        content.into_iter().collect()
    }

    /// Missing ids resolve to empty metadata.
    pub fn lookup(&self, content_id: &str) -> Content {
        self.entries.get(content_id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Content> for ContentIndex {
    fn from_iter<I: IntoIterator<Item = Content>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|c| (c.content_id.clone(), c))
            .collect();
        ContentIndex { entries }
    }
}
