/// A rendered page as laid out in the scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSurface {
    pub width_px: f64,
    pub height_px: f64,
}

impl PageSurface {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self { width_px, height_px }
    }

    pub fn from_points(width_pt: f32, height_pt: f32, scale: f32) -> Self {
        Self {
            width_px: f64::from((width_pt * scale).round().max(1.0)),
            height_px: f64::from((height_pt * scale).round().max(1.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pages: Vec<PageSurface>,
    page_margin_px: f64,
}

impl Document {
    pub fn new(pages: Vec<PageSurface>, page_margin_px: f64) -> Self {
        Self { pages, page_margin_px: page_margin_px.max(0.0) }
    }

    pub fn pages(&self) -> &[PageSurface] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn content_height_px(&self) -> f64 {
        self.pages.iter().map(|page| page.height_px + 2.0 * self.page_margin_px).sum()
    }

    /// Zero-based index of the page under a scroll offset, margins included.
    pub fn page_at_offset(&self, offset_px: f64) -> usize {
        let mut cursor = 0.0;

        for (index, page) in self.pages.iter().enumerate() {
            let page_end = cursor + page.height_px + 2.0 * self.page_margin_px;
            if offset_px < page_end {
                return index;
            }
            cursor = page_end;
        }

        self.pages.len().saturating_sub(1)
    }

    pub fn current_page(&self, viewport: &Viewport) -> usize {
        self.page_at_offset(viewport.position_px() + viewport.visible_height_px() / 2.0)
    }
}

/// The scroll container: content extent, visible extent and position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    content_height_px: f64,
    visible_height_px: f64,
    position_px: f64,
}

impl Viewport {
    pub fn new(content_height_px: f64, visible_height_px: f64) -> Self {
        Self {
            content_height_px: content_height_px.max(0.0),
            visible_height_px: visible_height_px.max(0.0),
            position_px: 0.0,
        }
    }

    pub fn content_height_px(&self) -> f64 {
        self.content_height_px
    }

    pub fn visible_height_px(&self) -> f64 {
        self.visible_height_px
    }

    pub fn position_px(&self) -> f64 {
        self.position_px
    }

    /// Scrollable extent. Non-positive when everything fits on screen.
    pub fn max_scroll_px(&self) -> f64 {
        self.content_height_px - self.visible_height_px
    }

    pub fn is_scrollable(&self) -> bool {
        self.max_scroll_px() > 0.0
    }

    pub fn is_at_end(&self, tolerance_px: f64) -> bool {
        self.position_px >= self.max_scroll_px() - tolerance_px
    }

    /// Sets the position, clamped to `[0, max_scroll]`. Returns the applied value.
    pub fn scroll_to(&mut self, position_px: f64) -> f64 {
        let max = self.max_scroll_px().max(0.0);
        self.position_px = if position_px.is_nan() { 0.0 } else { position_px.clamp(0.0, max) };
        self.position_px
    }

    pub fn scroll_by(&mut self, delta_px: f64) -> f64 {
        self.scroll_to(self.position_px + delta_px)
    }

    pub fn resize(&mut self, visible_height_px: f64) {
        self.visible_height_px = visible_height_px.max(0.0);
        self.scroll_to(self.position_px);
    }
}
