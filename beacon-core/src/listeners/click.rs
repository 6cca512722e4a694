//! Click tracking

use std::time::Duration;

use crate::dom::{ClickSnapshot, DomEvent, DomEventKind};
use crate::emitter::EventEmitter;
use crate::event::{ClickData, EventKind, Position};
use crate::listeners::Listener;
use crate::page::PageContext;

/// Visible text is cut to this many characters
pub const MAX_TEXT_CHARS: usize = 100;

/// Emits `click` for every click that reaches the document and counts it
pub struct ClickListener;

impl Listener for ClickListener {
    fn name(&self) -> &'static str {
        "click"
    }

    fn kind(&self) -> DomEventKind {
        DomEventKind::Click
    }

    fn on_event(&mut self, event: &DomEvent, page: &mut PageContext, emitter: &EventEmitter) {
        let DomEvent::Click(snapshot) = event else {
            return;
        };

        let data = click_data(snapshot, emitter.clock().elapsed());
        emitter.emit(EventKind::Click, &data);
        page.record_click();
    }
}

fn click_data(snapshot: &ClickSnapshot, time_on_page: Duration) -> ClickData {
    ClickData {
        tag: snapshot.tag_name.to_lowercase(),
        id: non_empty(&snapshot.id),
        classes: snapshot
            .class_list
            .iter()
            .filter(|c| !c.is_empty())
            .cloned()
            .collect(),
        text: snapshot.inner_text.as_deref().and_then(normalize_text),
        href: snapshot.href.as_deref().and_then(non_empty),
        position: Position {
            x: snapshot.client_x,
            y: snapshot.client_y,
        },
        scroll_position: whole_pixels(snapshot.scroll_y),
        time_on_page: format_time_on_page(time_on_page),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn whole_pixels(offset: f64) -> i64 {
    if offset.is_finite() {
        offset.max(0.0).round() as i64
    } else {
        0
    }
}

/// Trim and truncate visible text; `None` if nothing is left
pub fn normalize_text(raw: &str) -> Option<String> {
    let text: String = raw.trim().chars().take(MAX_TEXT_CHARS).collect();
    (!text.is_empty()).then_some(text)
}

/// Seconds with exactly two decimals
pub fn format_time_on_page(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Buy now \n"), Some("Buy now".to_string()));
        assert_eq!(normalize_text("   "), None);
        assert_eq!(normalize_text(""), None);

        let long = "é".repeat(150);
        let text = normalize_text(&long).unwrap();
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_format_time_on_page() {
        assert_eq!(format_time_on_page(Duration::ZERO), "0.00");
        assert_eq!(format_time_on_page(Duration::from_millis(1234)), "1.23");
        assert_eq!(format_time_on_page(Duration::from_secs(65)), "65.00");
    }

    #[test]
    fn test_click_data_normalizes_snapshot() {
        let snapshot = ClickSnapshot {
            tag_name: "BUTTON".to_string(),
            id: String::new(),
            class_list: vec!["btn".to_string(), "btn-primary".to_string()],
            inner_text: Some("  Add to cart  ".to_string()),
            href: Some(String::new()),
            client_x: 120,
            client_y: 48,
            scroll_y: 310.6,
        };

        let data = click_data(&snapshot, Duration::from_millis(5000));

        assert_eq!(data.tag, "button");
        assert_eq!(data.id, None);
        assert_eq!(data.classes, vec!["btn", "btn-primary"]);
        assert_eq!(data.text.as_deref(), Some("Add to cart"));
        assert_eq!(data.href, None);
        assert_eq!(data.position, Position { x: 120, y: 48 });
        assert_eq!(data.scroll_position, 311);
        assert_eq!(data.time_on_page, "5.00");
    }

    #[test]
    fn test_click_data_keeps_link_details() {
        let snapshot = ClickSnapshot {
            tag_name: "A".to_string(),
            id: "home-link".to_string(),
            href: Some("https://example.com/".to_string()),
            inner_text: None,
            ..ClickSnapshot::default()
        };

        let data = click_data(&snapshot, Duration::ZERO);

        assert_eq!(data.id.as_deref(), Some("home-link"));
        assert_eq!(data.href.as_deref(), Some("https://example.com/"));
        assert_eq!(data.text, None);
        assert!(data.classes.is_empty());
    }

    #[test]
    fn test_whole_pixels_guards_non_finite() {
        assert_eq!(whole_pixels(f64::NAN), 0);
        assert_eq!(whole_pixels(-12.0), 0);
        assert_eq!(whole_pixels(99.5), 100);
    }
}
