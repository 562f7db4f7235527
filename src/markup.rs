// HTML rendering of the view models. Every string that came from the backend
// passes through escape_html before it lands in the output.

use std::fmt::Write;

use crate::format::escape_html;
use crate::view::{
    Badge, DashboardView, DeviceDetailView, DeviceTableView, EventListView, FieldValue,
    ModalView, StatisticsView, StatusBarView, ToastView, Tone, DEVICES_LOADING, EVENTS_LOADING,
    HISTORY_TITLE, MODAL_LOADING, NO_DEVICES, NO_EVENTS,
};

fn badge(badge: Badge) -> String {
    format!(
        r#"<span class="status-badge {}">{}</span>"#,
        badge.css_class(),
        badge.label()
    )
}

fn tone_color(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "var(--success-color)",
        Tone::Danger => "var(--danger-color)",
        Tone::Neutral => "inherit",
    }
}

pub fn status_bar(view: &StatusBarView) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="status-bar"><span id="statusText" style="color: {}">{}</span>"#,
        tone_color(view.tone),
        view.status_text
    );
    let _ = write!(
        html,
        r#"<span id="networkText">{}</span><span id="intervalText">{}</span>"#,
        escape_html(&view.network),
        escape_html(&view.scan_interval)
    );
    if let Some(last_update) = &view.last_update {
        let _ = write!(html, r#"<span id="lastUpdate">{}</span>"#, escape_html(last_update));
    }
    let _ = write!(
        html,
        r#"<span id="connectedCount">{}</span><span id="totalCount">{}</span>"#,
        view.connected_count, view.total_count
    );
    let _ = write!(
        html,
        r#"<button id="monitorToggle" class="{}"><i class="fas fa-{}"></i> <span id="monitorToggleText">{}</span></button></div>"#,
        view.toggle.css_class, view.toggle.icon, view.toggle.label
    );
    html
}

pub fn statistics(view: &StatisticsView) -> String {
    let mut html = format!(
        r#"<div class="statistics"><span id="connections24h">{}</span><span id="disconnections24h">{}</span>"#,
        view.connections_24h, view.disconnections_24h
    );
    if !view.hourly.is_empty() {
        html.push_str(r#"<table class="hourly-activity"><tbody>"#);
        for bucket in &view.hourly {
            let _ = write!(
                html,
                "<tr><td>{:02}:00</td><td>{}</td><td>{}</td></tr>",
                bucket.hour, bucket.connections, bucket.disconnections
            );
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</div>");
    html
}

pub fn device_rows(view: &DeviceTableView) -> String {
    let rows = match view {
        DeviceTableView::Loading => {
            return format!(r#"<tr><td colspan="7" class="loading">{}</td></tr>"#, DEVICES_LOADING)
        }
        DeviceTableView::Empty => {
            return format!(r#"<tr><td colspan="7" class="loading">{}</td></tr>"#, NO_DEVICES)
        }
        DeviceTableView::Rows(rows) => rows,
    };

    let mut html = String::new();
    for row in rows {
        let mac = escape_html(&row.mac_address);
        let _ = write!(
            html,
            concat!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td><code>{}</code></td><td>{}</td><td>{}</td>",
                r#"<td><div class="device-actions"><button class="action-btn" data-mac="{}" title="View Details">"#,
                r#"<i class="fas fa-info-circle"></i></button></div></td></tr>"#
            ),
            badge(row.badge),
            escape_html(&row.name),
            escape_html(&row.ip_address),
            mac,
            escape_html(&row.hostname),
            escape_html(&row.last_seen),
            mac,
        );
    }
    html
}

pub fn event_list(view: &EventListView) -> String {
    let items = match view {
        EventListView::Loading => {
            return format!(r#"<div class="loading">{}</div>"#, EVENTS_LOADING)
        }
        EventListView::Empty => return format!(r#"<div class="loading">{}</div>"#, NO_EVENTS),
        EventListView::Items(items) => items,
    };

    let mut html = String::new();
    for item in items {
        let _ = write!(
            html,
            concat!(
                r#"<div class="event-item"><div class="event-icon {}"><i class="fas fa-{}"></i></div>"#,
                r#"<div class="event-content"><div class="event-title">{}</div>"#,
                r#"<div class="event-details">{}</div></div><div class="event-time">{}</div></div>"#
            ),
            item.badge.css_class(),
            item.icon,
            escape_html(&item.title),
            escape_html(&item.details),
            escape_html(&item.time),
        );
    }
    html
}

fn device_detail(view: &DeviceDetailView) -> String {
    let mut html = String::from(r#"<div class="device-info">"#);
    for field in &view.fields {
        let value = match &field.value {
            FieldValue::Text(text) => escape_html(text),
            FieldValue::Code(text) => format!("<code>{}</code>", escape_html(text)),
            FieldValue::Badge(b) => badge(*b),
        };
        let _ = write!(
            html,
            r#"<div class="info-item"><div class="info-label">{}</div><div class="info-value">{}</div></div>"#,
            field.label, value
        );
    }
    html.push_str("</div>");

    let _ = write!(
        html,
        concat!(
            r#"<div class="history-section"><h3>{}</h3><div class="table-container"><table class="history-table">"#,
            "<thead><tr><th>Event</th><th>Time</th><th>IP Address</th></tr></thead><tbody>"
        ),
        HISTORY_TITLE
    );
    for row in &view.history {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            badge(row.badge),
            escape_html(&row.time),
            escape_html(&row.ip_address)
        );
    }
    html.push_str("</tbody></table></div></div>");
    html
}

/// Body of the device modal, or `None` while it is closed.
pub fn modal_body(view: &ModalView) -> Option<String> {
    match view {
        ModalView::Hidden => None,
        ModalView::Loading => Some(format!(r#"<div class="loading">{}</div>"#, MODAL_LOADING)),
        ModalView::Error(message) => Some(format!(
            r#"<div class="loading">{}</div>"#,
            escape_html(message)
        )),
        ModalView::Detail(detail) => Some(device_detail(detail)),
    }
}

pub fn toast(view: &ToastView) -> String {
    format!(
        r#"<div id="toast" class="toast {} show">{}</div>"#,
        view.css_class(),
        escape_html(&view.message)
    )
}

/// Whole dashboard as a standalone page.
pub fn document(view: &DashboardView) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Network Monitor Dashboard</title></head><body>",
    );
    html.push_str(&status_bar(&view.status_bar));
    html.push_str(&statistics(&view.statistics));
    let _ = write!(
        html,
        r#"<button id="scanBtn"{}>{}</button>"#,
        if view.scan_button.enabled { "" } else { " disabled" },
        view.scan_button.label
    );
    let _ = write!(
        html,
        r#"<table class="device-table"><tbody id="deviceTableBody">{}</tbody></table>"#,
        device_rows(&view.devices)
    );
    let _ = write!(html, r#"<div id="eventsList">{}</div>"#, event_list(&view.events));
    if let Some(body) = modal_body(&view.modal) {
        let _ = write!(
            html,
            r#"<div id="deviceModal" class="modal active"><div id="modalBody">{}</div></div>"#,
            body
        );
    }
    if let Some(t) = &view.toast {
        html.push_str(&toast(t));
    }
    html.push_str("</body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ModalState;
    use crate::models::Device;
    use crate::view::{device_row, modal};
    use chrono::Local;

    fn hostile_device() -> Device {
        Device {
            mac_address: "AA:BB:CC:DD:EE:FF\"><img src=x>".to_string(),
            ip_address: Some("192.168.1.66".to_string()),
            hostname: Some("<b>host</b>".to_string()),
            device_name: Some("<script>alert(1)</script>".to_string()),
            device_type: None,
            vendor: Some("Evil & Co".to_string()),
            is_connected: true,
            first_seen: None,
            last_seen: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_device_row_escapes_backend_text() {
        let rows = DeviceTableView::Rows(vec![device_row(&hostile_device(), Local::now())]);
        let html = device_rows(&rows);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;b&gt;host&lt;/b&gt;"));
        assert!(!html.contains("\"><img"));
        assert_eq!(html.matches("<tr>").count(), 1);
    }

    #[test]
    fn test_modal_detail_escapes_fields() {
        let view = modal(
            &ModalState::Loaded {
                device: hostile_device(),
            },
            Local::now(),
        );
        let html = modal_body(&view).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("Evil &amp; Co"));
        assert!(html.contains(HISTORY_TITLE));
    }

    #[test]
    fn test_modal_error_is_inline_text() {
        let html = modal_body(&ModalView::Error("Error: <i>nope</i>".to_string())).unwrap();
        assert_eq!(html, r#"<div class="loading">Error: &lt;i&gt;nope&lt;/i&gt;</div>"#);
        assert!(modal_body(&ModalView::Hidden).is_none());
    }

    #[test]
    fn test_empty_table_placeholder() {
        assert!(device_rows(&DeviceTableView::Empty).contains(NO_DEVICES));
        assert!(event_list(&EventListView::Empty).contains(NO_EVENTS));
    }
}
