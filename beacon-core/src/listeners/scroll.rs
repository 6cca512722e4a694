//! Scroll depth tracking

use tracing::trace;

use crate::dom::{DomEvent, DomEventKind, ScrollSnapshot};
use crate::emitter::EventEmitter;
use crate::event::{iso_timestamp, EventKind, ScrollDepthData};
use crate::listeners::Listener;
use crate::page::PageContext;

/// Emits `scroll_depth` each time the page is scrolled deeper than before
pub struct ScrollDepthListener;

impl Listener for ScrollDepthListener {
    fn name(&self) -> &'static str {
        "scroll_depth"
    }

    fn kind(&self) -> DomEventKind {
        DomEventKind::Scroll
    }

    fn on_event(&mut self, event: &DomEvent, page: &mut PageContext, emitter: &EventEmitter) {
        let DomEvent::Scroll(snapshot) = event else {
            return;
        };

        let Some(percent) = scroll_depth_percent(snapshot) else {
            trace!("page not scrollable, skipping scroll sample");
            return;
        };

        if page.record_scroll(percent) {
            let data = ScrollDepthData {
                scroll_depth_percentage: percent,
                timestamp: iso_timestamp(&emitter.clock().now()),
            };
            emitter.emit(EventKind::ScrollDepth, &data);
        }
    }
}

/// Scrolled share of the scrollable height, rounded, in `0..=100`
///
/// `None` when the page cannot scroll (scrollable height ≤ 0) or the
/// geometry is not finite.
pub fn scroll_depth_percent(snapshot: &ScrollSnapshot) -> Option<u32> {
    let scrollable = snapshot.scroll_height - snapshot.inner_height;
    if scrollable.is_nan() || scrollable <= 0.0 {
        return None;
    }

    let ratio = snapshot.scroll_y / scrollable;
    if !ratio.is_finite() {
        return None;
    }

    Some((ratio * 100.0).round().clamp(0.0, 100.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(scroll_y: f64, scroll_height: f64, inner_height: f64) -> ScrollSnapshot {
        ScrollSnapshot {
            scroll_y,
            scroll_height,
            inner_height,
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(scroll_depth_percent(&snapshot(0.0, 3000.0, 1000.0)), Some(0));
        assert_eq!(scroll_depth_percent(&snapshot(500.0, 3000.0, 1000.0)), Some(25));
        assert_eq!(scroll_depth_percent(&snapshot(2000.0, 3000.0, 1000.0)), Some(100));
        assert_eq!(scroll_depth_percent(&snapshot(333.0, 2000.0, 1000.0)), Some(33));
    }

    #[test]
    fn test_not_scrollable() {
        assert_eq!(scroll_depth_percent(&snapshot(0.0, 800.0, 800.0)), None);
        assert_eq!(scroll_depth_percent(&snapshot(0.0, 600.0, 800.0)), None);
        assert_eq!(scroll_depth_percent(&snapshot(0.0, f64::NAN, 800.0)), None);
    }

    #[test]
    fn test_overscroll_is_clamped() {
        assert_eq!(scroll_depth_percent(&snapshot(2100.0, 3000.0, 1000.0)), Some(100));
        assert_eq!(scroll_depth_percent(&snapshot(-40.0, 3000.0, 1000.0)), Some(0));
    }

    #[test]
    fn test_non_finite_offset() {
        assert_eq!(scroll_depth_percent(&snapshot(f64::INFINITY, 3000.0, 1000.0)), None);
    }
}
