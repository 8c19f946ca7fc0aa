//! Pagination Controller
//!
//! A [`PageWindow`] is the numbered range shown under a list: at most
//! [`MAX_VISIBLE_PAGES`] buttons centred on the current page and clamped to
//! the available pages. [`PaginationControl`] binds a window to the loader
//! that fetches a page.

use futures_util::future::BoxFuture;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::render::widgets::pagination_bar;

pub const MAX_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub total_pages: u32,
    first: u32,
    last: u32,
}

impl PageWindow {
    pub fn new(page: u32, total_pages: u32) -> Self {
        if total_pages == 0 {
            return Self {
                page,
                total_pages,
                first: 1,
                last: 0,
            };
        }

        let half = MAX_VISIBLE_PAGES / 2;
        let mut first = page.saturating_sub(half).max(1);
        let last = first
            .saturating_add(MAX_VISIBLE_PAGES - 1)
            .min(total_pages);
        if last.saturating_sub(first) + 1 < MAX_VISIBLE_PAGES {
            first = last.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
        }

        Self {
            page,
            total_pages,
            first,
            last,
        }
    }

    /// Numbered buttons, in order; empty when there are no pages
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    pub fn prev_disabled(&self) -> bool {
        self.page <= 1
    }

    pub fn next_disabled(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Whether a click on `page` leads anywhere
    pub fn accepts(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }
}

/// Loads a page when a pagination button is activated
pub type PageCallback = Arc<dyn Fn(u32) -> BoxFuture<'static, ()> + Send + Sync>;

/// A window plus the callback that loads the clicked page
#[derive(Clone)]
pub struct PaginationControl {
    window: PageWindow,
    on_page: PageCallback,
}

impl PaginationControl {
    pub fn new(window: PageWindow, on_page: PageCallback) -> Self {
        Self { window, on_page }
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn markup(&self) -> String {
        pagination_bar(&self.window)
    }

    /// Load `page`; returns false when the click was ignored
    pub async fn click(&self, page: u32) -> bool {
        if !self.window.accepts(page) {
            tracing::debug!(page, total_pages = self.window.total_pages, "ignoring page click");
            return false;
        }
        (self.on_page)(page).await;
        true
    }

    pub async fn prev(&self) -> bool {
        if self.window.prev_disabled() {
            return false;
        }
        self.click(self.window.page - 1).await
    }

    pub async fn next(&self) -> bool {
        if self.window.next_disabled() {
            return false;
        }
        self.click(self.window.page + 1).await
    }
}

impl std::fmt::Debug for PaginationControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationControl")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn pages(window: PageWindow) -> Vec<u32> {
        window.pages().collect()
    }

    #[test]
    fn test_small_totals_show_every_page() {
        assert_eq!(pages(PageWindow::new(1, 1)), vec![1]);
        assert_eq!(pages(PageWindow::new(2, 3)), vec![1, 2, 3]);
        assert_eq!(pages(PageWindow::new(5, 5)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_large_totals_show_five_centred_and_clamped() {
        assert_eq!(pages(PageWindow::new(1, 12)), vec![1, 2, 3, 4, 5]);
        assert_eq!(pages(PageWindow::new(6, 12)), vec![4, 5, 6, 7, 8]);
        assert_eq!(pages(PageWindow::new(11, 12)), vec![8, 9, 10, 11, 12]);
        assert_eq!(pages(PageWindow::new(12, 12)), vec![8, 9, 10, 11, 12]);

        for page in 1..=40 {
            let window = PageWindow::new(page, 40);
            assert_eq!(window.pages().count(), 5);
            assert!(window.pages().contains(&page));
        }
    }

    #[test]
    fn test_page_beyond_total_is_clamped() {
        assert_eq!(pages(PageWindow::new(9, 3)), vec![1, 2, 3]);
        assert!(PageWindow::new(9, 3).next_disabled());
    }

    #[test]
    fn test_edges() {
        let first = PageWindow::new(1, 4);
        assert!(first.prev_disabled());
        assert!(!first.next_disabled());

        let last = PageWindow::new(4, 4);
        assert!(!last.prev_disabled());
        assert!(last.next_disabled());

        let none = PageWindow::new(1, 0);
        assert_eq!(none.pages().count(), 0);
        assert!(none.prev_disabled() && none.next_disabled());
    }

    fn recorder() -> (PageCallback, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: PageCallback = Arc::new(move |page| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().unwrap().push(page);
            }) as BoxFuture<'static, ()>
        });
        (callback, seen)
    }

    #[tokio::test]
    async fn test_control_invokes_callback() {
        let (callback, seen) = recorder();
        let control = PaginationControl::new(PageWindow::new(2, 3), callback);

        assert!(control.click(3).await);
        assert!(control.prev().await);
        assert!(control.next().await);
        assert_eq!(*seen.lock().unwrap(), vec![3, 1, 3]);
    }

    #[tokio::test]
    async fn test_control_ignores_out_of_range_and_disabled() {
        let (callback, seen) = recorder();
        let control = PaginationControl::new(PageWindow::new(1, 1), callback);

        assert!(!control.click(0).await);
        assert!(!control.click(2).await);
        assert!(!control.prev().await);
        assert!(!control.next().await);
        assert!(seen.lock().unwrap().is_empty());
        assert!(control.markup().contains("data-page=\"1\""));
    }
}
