//! Vertical page layout of the scroll container and current-page detection.
//!
//! Pages are stacked top to bottom; each wrapper holds a page-number label,
//! then the page canvas (absent if the page failed to render), then a gap.

/// Height of the "k / N" label above each page.
pub const LABEL_HEIGHT: f32 = 20.0;
/// Space between consecutive page wrappers.
pub const PAGE_GAP: f32 = 16.0;

/// Where one page's canvas sits inside the scrollable content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlot {
    pub page: u32,
    pub top: f32,
    pub height: f32,
}

impl PageSlot {
    pub fn center(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Lays pages out in order. `heights[i]` is the canvas height of page `i + 1`,
/// or `None` when that page has no canvas. Returns the canvas slots and the
/// total content height.
pub fn stack_pages(heights: &[Option<f32>]) -> (Vec<PageSlot>, f32) {
    let mut slots = Vec::with_capacity(heights.len());
    let mut cursor = 0.0_f32;

    for (i, height) in heights.iter().enumerate() {
        cursor += LABEL_HEIGHT;
        if let Some(h) = height {
            slots.push(PageSlot {
                page: i as u32 + 1,
                top: cursor,
                height: *h,
            });
            cursor += h;
        }
        cursor += PAGE_GAP;
    }

    (slots, cursor)
}

/// The page whose canvas center is closest to the viewport's center.
/// Only a strictly smaller distance wins, so ties go to the lower page.
pub fn closest_page(slots: &[PageSlot], scroll_top: f32, viewport_height: f32) -> Option<u32> {
    let center = scroll_top + viewport_height / 2.0;
    let mut closest: Option<(u32, f32)> = None;

    for slot in slots {
        let distance = (slot.center() - center).abs();
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((slot.page, distance)),
        }
    }

    closest.map(|(page, _)| page)
}

/// Pages whose canvas overlaps the visible band of the container.
pub fn visible_pages(slots: &[PageSlot], scroll_top: f32, viewport_height: f32) -> Vec<u32> {
    let bottom = scroll_top + viewport_height;
    slots
        .iter()
        .filter(|s| s.bottom() > scroll_top && s.top < bottom)
        .map(|s| s.page)
        .collect()
}

pub fn max_scroll(content_height: f32, viewport_height: f32) -> f32 {
    (content_height - viewport_height).max(0.0)
}
