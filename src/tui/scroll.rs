// Scroll state for TUI panels
//
// Each panel owns its scroll state; the render pass feeds in the current
// content and viewport sizes and the input handlers move the offset.

/// Scroll state for a single panel
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// Line/item index at top of viewport
    offset: usize,
    total: usize,
    viewport: usize,
    /// Keep the view pinned to the bottom as content grows (logs panel)
    pub auto_follow: bool,
}

impl ScrollState {
    /// Manual scrolling, starting at the top
    pub fn new() -> Self {
        Self::default()
    }

    /// Pinned to the bottom until the user scrolls up
    pub fn following() -> Self {
        Self {
            auto_follow: true,
            ..Self::default()
        }
    }

    /// Call each render frame with current sizes
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
            self.auto_follow = false;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport.max(1));
        self.auto_follow = false;
    }

    pub fn page_down(&mut self) {
        self.offset = (self.offset + self.viewport.max(1)).min(self.max_offset());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = false;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visible range (start_index, end_index)
    pub fn visible_range(&self) -> (usize, usize) {
        let end = (self.offset + self.viewport).min(self.total);
        (self.offset, end)
    }

    pub fn needs_scrollbar(&self) -> bool {
        self.total > self.viewport
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }
}
