use crate::models::{ChatMessage, MessageKind};

use super::RenderSink;

/// Ordered, append-only list of displayed entries plus where the view is
/// scrolled to. Offsets count entries, the viewport is how many fit.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
    offset: usize,
    viewport: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            offset: 0,
            viewport: 1,
        }
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }

    pub fn count_kind(&self, kind: MessageKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn scroll_offset(&self) -> usize {
        self.offset
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn max_scroll(&self) -> usize {
        self.entries.len().saturating_sub(self.viewport)
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.max_scroll()
    }

    /// Called by the renderer whenever the visible area changes size.
    /// A view that was following the tail keeps following it.
    pub fn set_viewport(&mut self, rows: usize) {
        let following = self.is_at_end();
        self.viewport = rows.max(1);
        if following {
            self.offset = self.max_scroll();
        } else {
            self.offset = self.offset.min(self.max_scroll());
        }
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.offset = (self.offset + amount).min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    /// Entries currently inside the viewport.
    pub fn visible(&self) -> &[ChatMessage] {
        let start = self.offset.min(self.entries.len());
        let end = (start + self.viewport).min(self.entries.len());
        &self.entries[start..end]
    }
}

impl RenderSink for Transcript {
    fn append_entry(&mut self, entry: &ChatMessage) {
        self.entries.push(entry.clone());
    }

    fn scroll_to_end(&mut self) {
        self.offset = self.max_scroll();
    }
}
