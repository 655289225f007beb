use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::canvas::{Canvas, ScaleMode, Viewport};
use super::document::{LopdfDocument, PdfDocument, PdfError};
use super::layout::{self, PageSlot, LABEL_HEIGHT};
use super::navigation::{resolve_page_nav_target, Key, KeyAction, NavState, ScrollRequest};

/// Per-page canvas renderer with a memoized render cache and scroll tracking.
pub struct CanvasViewer<D: PdfDocument = LopdfDocument> {
    document: Option<D>,
    scale_mode: ScaleMode,
    pixel_ratio: f32,
    container: Viewport,
    cache: BTreeMap<u32, Canvas>,
    visible: BTreeSet<u32>,
    current_page: u32,
    slots: Vec<PageSlot>,
    content_height: f32,
    scroll_top: f32,
    // Latest scroll offset not yet applied by an animation frame.
    pending_scroll: Option<f32>,
}

impl<D: PdfDocument> CanvasViewer<D> {
    pub fn new(scale_mode: ScaleMode, pixel_ratio: f32, container: Viewport) -> Self {
        Self {
            document: None,
            scale_mode,
            pixel_ratio,
            container,
            cache: BTreeMap::new(),
            visible: BTreeSet::new(),
            current_page: 0,
            slots: Vec::new(),
            content_height: 0.0,
            scroll_top: 0.0,
            pending_scroll: None,
        }
    }

    /// Replaces any loaded document and renders all of its pages.
    pub fn load(&mut self, document: D) -> u32 {
        self.reset();
        let count = document.page_count();
        self.document = Some(document);
        self.current_page = if count > 0 { 1 } else { 0 };
        self.render_all();
        info!("Loaded document with {count} pages");
        count
    }

    /// Renders every page not already in the cache, then lays pages out again
    /// and marks the current page on the fresh canvases.
    pub fn render_all(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };

        for page in 1..=document.page_count() {
            if self.cache.contains_key(&page) {
                continue;
            }
            match render_page(document, page, self.scale_mode, self.container.width, self.pixel_ratio) {
                Ok(canvas) => {
                    self.cache.insert(page, canvas);
                }
                Err(e) => warn!("Skipping page {page}: {e}"),
            }
        }

        self.relayout();
        self.highlight();
    }

    fn relayout(&mut self) {
        let count = self.page_count();
        let heights: Vec<Option<f32>> = (1..=count)
            .map(|page| self.cache.get(&page).map(|c| c.css_height as f32))
            .collect();
        let (slots, content_height) = layout::stack_pages(&heights);
        self.slots = slots;
        self.content_height = content_height;
    }

    /// Clears the render cache, re-renders at the new scale and restores the
    /// relative scroll position. Returns the new scroll offset.
    pub fn set_scale(&mut self, scale_mode: ScaleMode) -> f32 {
        let ratio = if self.content_height > 0.0 {
            self.scroll_top / self.content_height
        } else {
            0.0
        };

        self.scale_mode = scale_mode;
        self.cache.clear();
        self.visible.clear();
        self.render_all();

        self.pending_scroll = None;
        self.apply_scroll(ratio * self.content_height);
        debug!("Scale changed to {:?}; scroll restored to {}", scale_mode, self.scroll_top);
        self.scroll_top
    }

    /// The container changed size. Only fit-width depends on it.
    pub fn resize(&mut self, container: Viewport) -> Option<f32> {
        self.container = container;
        match self.scale_mode {
            ScaleMode::FitWidth if self.document.is_some() => Some(self.set_scale(ScaleMode::FitWidth)),
            _ => None,
        }
    }

    /// Records a scroll offset; applied on the next animation frame.
    pub fn on_scroll(&mut self, scroll_top: f32) {
        self.pending_scroll = Some(scroll_top);
    }

    /// Applies the latest recorded scroll, if any. Returns true when the
    /// current page changed.
    pub fn on_animation_frame(&mut self) -> bool {
        match self.pending_scroll.take() {
            Some(top) => self.apply_scroll(top),
            None => false,
        }
    }

    fn apply_scroll(&mut self, scroll_top: f32) -> bool {
        let max = layout::max_scroll(self.content_height, self.container.height);
        self.scroll_top = scroll_top.clamp(0.0, max);

        let height = self.container.height;
        self.visible = layout::visible_pages(&self.slots, self.scroll_top, height)
            .into_iter()
            .collect();

        match layout::closest_page(&self.slots, self.scroll_top, height) {
            Some(page) if page != self.current_page => {
                self.current_page = page;
                self.highlight();
                true
            }
            _ => false,
        }
    }

    fn highlight(&mut self) {
        let current = self.current_page;
        for (page, canvas) in self.cache.iter_mut() {
            canvas.is_current = *page == current;
        }
    }

    pub fn nav_state(&self) -> NavState {
        NavState::new(self.current_page, self.page_count())
    }

    /// Scroll that brings `page` (with its label) to the top of the container.
    pub fn go_to_page(&self, page: u32) -> Option<ScrollRequest> {
        let slot = self.slots.iter().find(|s| s.page == page)?;
        let max = layout::max_scroll(self.content_height, self.container.height);
        Some(ScrollRequest {
            page,
            top: (slot.top - LABEL_HEIGHT).clamp(0.0, max),
            smooth: true,
        })
    }

    pub fn handle_key(&self, key: Key, modal_open: bool) -> KeyAction {
        if !modal_open || self.document.is_none() {
            return KeyAction::Ignored;
        }
        let page = resolve_page_nav_target(self.current_page, self.page_count(), key.target());
        if page == self.current_page {
            KeyAction::Handled(None)
        } else {
            KeyAction::Handled(self.go_to_page(page))
        }
    }

    /// Drops the document and all per-document state.
    pub fn reset(&mut self) {
        self.document = None;
        self.cache.clear();
        self.visible.clear();
        self.slots.clear();
        self.current_page = 0;
        self.content_height = 0.0;
        self.scroll_top = 0.0;
        self.pending_scroll = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, PdfDocument::page_count)
    }

    #[cfg(test)]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn canvas(&self, page: u32) -> Option<&Canvas> {
        self.cache.get(&page)
    }

    pub fn rendered_pages(&self) -> Vec<u32> {
        self.cache.keys().copied().collect()
    }

    /// Pages intersecting the scroll container.
    pub fn visible_pages(&self) -> &BTreeSet<u32> {
        &self.visible
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }
}

impl CanvasViewer<LopdfDocument> {
    /// Parses `bytes` and loads the result. On failure the viewer is left empty.
    pub fn open(&mut self, bytes: &[u8]) -> Result<u32, PdfError> {
        match LopdfDocument::from_bytes(bytes) {
            Ok(document) => Ok(self.load(document)),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }
}

fn render_page<D: PdfDocument>(
    document: &D,
    page: u32,
    scale_mode: ScaleMode,
    container_width: f32,
    pixel_ratio: f32,
) -> Result<Canvas, PdfError> {
    let native = document.page_size(page)?;
    let scale = scale_mode.scale_for(native.width, container_width);
    let viewport = Viewport {
        width: native.width * scale,
        height: native.height * scale,
    };
    let mut canvas = Canvas::new(page, viewport, pixel_ratio);
    document.paint(page, &mut canvas)?;
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::document::fixtures::pdf_with_pages;
    use crate::viewer::document::PageSize;
    use std::cell::Cell;

    struct FakeDocument {
        sizes: Vec<PageSize>,
        broken: Vec<u32>,
        paints: Cell<usize>,
    }

    impl FakeDocument {
        fn uniform(count: usize, width: f32, height: f32) -> Self {
            Self {
                sizes: vec![PageSize { width, height }; count],
                broken: Vec::new(),
                paints: Cell::new(0),
            }
        }
    }

    impl PdfDocument for FakeDocument {
        fn page_count(&self) -> u32 {
            self.sizes.len() as u32
        }

        fn page_size(&self, page: u32) -> Result<PageSize, PdfError> {
            self.sizes
                .get(page as usize - 1)
                .copied()
                .ok_or(PdfError::PageOutOfRange {
                    page,
                    count: self.page_count(),
                })
        }

        fn paint(&self, page: u32, canvas: &mut Canvas) -> Result<(), PdfError> {
            if self.broken.contains(&page) {
                return Err(PdfError::Render {
                    page,
                    message: "bad content stream".to_string(),
                });
            }
            self.paints.set(self.paints.get() + 1);
            canvas.record(["BT", "Tj", "ET"].into_iter());
            Ok(())
        }
    }

    fn container() -> Viewport {
        Viewport {
            width: 640.0,
            height: 500.0,
        }
    }

    fn viewer(doc: FakeDocument, mode: ScaleMode) -> CanvasViewer<FakeDocument> {
        let mut viewer = CanvasViewer::new(mode, 2.0, container());
        viewer.load(doc);
        viewer
    }

    fn paints(viewer: &CanvasViewer<FakeDocument>) -> usize {
        viewer.document.as_ref().unwrap().paints.get()
    }

    #[test]
    fn test_load_renders_every_page_with_deterministic_sizes() {
        let v = viewer(FakeDocument::uniform(3, 600.0, 800.0), ScaleMode::FitWidth);

        assert_eq!(v.page_count(), 3);
        assert_eq!(v.rendered_pages(), vec![1, 2, 3]);
        let canvas = v.canvas(2).unwrap();
        assert_eq!((canvas.css_width, canvas.css_height), (600, 800));
        assert_eq!((canvas.pixel_width, canvas.pixel_height), (1200, 1600));
        assert_eq!(v.current_page(), 1);
        assert!(v.canvas(1).unwrap().is_current);
    }

    #[test]
    fn test_rendered_pages_are_memoized() {
        let mut v = viewer(FakeDocument::uniform(3, 600.0, 800.0), ScaleMode::Fixed(1.0));
        assert_eq!(paints(&v), 3);

        v.render_all();
        v.render_all();
        assert_eq!(paints(&v), 3);
    }

    #[test]
    fn test_scale_change_regenerates_cache_and_keeps_scroll_ratio() {
        let mut v = viewer(FakeDocument::uniform(4, 600.0, 800.0), ScaleMode::Fixed(1.0));
        let before_height = v.content_height();
        v.on_scroll(before_height / 2.0);
        v.on_animation_frame();
        let ratio = v.scroll_top() / before_height;

        let top = v.set_scale(ScaleMode::Fixed(1.5));

        assert_eq!(paints(&v), 8);
        assert_eq!(v.rendered_pages(), vec![1, 2, 3, 4]);
        assert_eq!(v.canvas(1).unwrap().css_width, 900);
        assert!((top / v.content_height() - ratio).abs() < 0.01);

        // Same scale again gives the same sizes.
        v.set_scale(ScaleMode::Fixed(1.5));
        assert_eq!(v.canvas(4).unwrap().css_height, 1200);
    }

    #[test]
    fn test_scale_change_keeps_current_page_highlighted() {
        let mut v = viewer(FakeDocument::uniform(3, 600.0, 800.0), ScaleMode::Fixed(1.0));
        let second = v.slots()[1];
        v.on_scroll(second.center() - container().height / 2.0);
        assert!(v.on_animation_frame());
        assert_eq!(v.current_page(), 2);

        v.set_scale(ScaleMode::Fixed(1.5));

        let highlighted: Vec<u32> = v
            .rendered_pages()
            .into_iter()
            .filter(|page| v.canvas(*page).unwrap().is_current)
            .collect();
        assert_eq!(v.current_page(), 2);
        assert_eq!(highlighted, vec![2]);
    }

    #[test]
    fn test_resize_keeps_current_page_highlighted() {
        let mut v = viewer(FakeDocument::uniform(2, 600.0, 800.0), ScaleMode::FitWidth);
        assert!(v.resize(Viewport { width: 340.0, height: 500.0 }).is_some());

        assert_eq!(v.current_page(), 1);
        assert!(v.canvas(1).unwrap().is_current);
        assert!(!v.canvas(2).unwrap().is_current);
    }

    #[test]
    fn test_failed_page_is_not_cached() {
        let mut doc = FakeDocument::uniform(3, 600.0, 800.0);
        doc.broken = vec![2];
        let mut v = viewer(doc, ScaleMode::Fixed(1.0));

        assert_eq!(v.rendered_pages(), vec![1, 3]);
        assert_eq!(v.slots().len(), 2);

        v.render_all();
        assert_eq!(v.rendered_pages(), vec![1, 3]);
    }

    #[test]
    fn test_scroll_is_applied_once_per_frame() {
        let mut v = viewer(FakeDocument::uniform(3, 600.0, 800.0), ScaleMode::Fixed(1.0));
        let third = v.slots()[2];

        v.on_scroll(100.0);
        v.on_scroll(third.center() - container().height / 2.0);
        assert_eq!(v.current_page(), 1);

        assert!(v.on_animation_frame());
        assert_eq!(v.current_page(), 3);
        assert!(v.canvas(3).unwrap().is_current);
        assert!(!v.canvas(1).unwrap().is_current);
        assert!(!v.on_animation_frame());

        let nav = v.nav_state();
        assert_eq!(nav.indicator(), "3 / 3");
        assert!(!nav.next_enabled);
    }

    #[test]
    fn test_keys_only_work_while_modal_is_open() {
        let v = viewer(FakeDocument::uniform(3, 600.0, 800.0), ScaleMode::Fixed(1.0));

        assert_eq!(v.handle_key(Key::ArrowDown, false), KeyAction::Ignored);
        // At page 1 "previous" is consumed without moving.
        assert_eq!(v.handle_key(Key::ArrowLeft, true), KeyAction::Handled(None));

        match v.handle_key(Key::End, true) {
            KeyAction::Handled(Some(request)) => {
                assert_eq!(request.page, 3);
                assert!(request.smooth);
                assert_eq!(request.top, v.go_to_page(3).unwrap().top);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_go_to_page_scrolls_label_into_view() {
        let v = viewer(FakeDocument::uniform(3, 600.0, 800.0), ScaleMode::Fixed(1.0));
        let second = v.slots()[1];
        assert_eq!(v.go_to_page(2).unwrap().top, second.top - LABEL_HEIGHT);
        assert_eq!(v.go_to_page(1).unwrap().top, 0.0);
        assert!(v.go_to_page(9).is_none());
    }

    #[test]
    fn test_reset_clears_document_state() {
        let mut v = viewer(FakeDocument::uniform(2, 600.0, 800.0), ScaleMode::Fixed(1.0));
        v.on_scroll(300.0);
        v.on_animation_frame();

        v.reset();
        assert!(!v.is_loaded());
        assert_eq!(v.page_count(), 0);
        assert!(v.rendered_pages().is_empty());
        assert!(v.visible_pages().is_empty());
        assert_eq!(v.current_page(), 0);
        assert_eq!(v.handle_key(Key::Home, true), KeyAction::Ignored);
    }

    #[test]
    fn test_resize_only_rerenders_fit_width() {
        let mut fixed = viewer(FakeDocument::uniform(1, 600.0, 800.0), ScaleMode::Fixed(1.0));
        assert!(fixed.resize(Viewport { width: 340.0, height: 500.0 }).is_none());
        assert_eq!(paints(&fixed), 1);

        let mut fit = viewer(FakeDocument::uniform(1, 600.0, 800.0), ScaleMode::FitWidth);
        assert!(fit.resize(Viewport { width: 340.0, height: 500.0 }).is_some());
        assert_eq!(fit.canvas(1).unwrap().css_width, 300);
    }

    #[test]
    fn test_open_parses_real_pdf_bytes() {
        let mut v: CanvasViewer = CanvasViewer::new(ScaleMode::Fixed(1.0), 1.0, container());
        assert_eq!(v.open(&pdf_with_pages(&[(612, 792), (612, 792)])).unwrap(), 2);
        assert_eq!(v.canvas(1).unwrap().text_runs(), 1);

        assert!(v.open(b"not a pdf").is_err());
        assert!(!v.is_loaded());
        assert!(v.rendered_pages().is_empty());
    }
}
