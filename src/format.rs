use chrono::{DateTime, Local};

/// Shown wherever an optional backend field is missing or blank.
pub const PLACEHOLDER: &str = "-";

/// Elapsed time between `ts` and `now`, coarsened to minutes or hours for the
/// first day and an absolute local timestamp after that.
pub fn format_relative(ts: DateTime<Local>, now: DateTime<Local>) -> String {
    let minutes = (now - ts).num_minutes();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} min{} ago", minutes, plural(minutes))
    } else if minutes < 1440 {
        let hours = minutes / 60;
        format!("{} hour{} ago", hours, plural(hours))
    } else {
        format_absolute(ts)
    }
}

pub fn format_optional(ts: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    match ts {
        Some(ts) => format_relative(ts, now),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_absolute(ts: DateTime<Local>) -> String {
    ts.format("%x, %X").to_string()
}

pub fn format_clock(ts: DateTime<Local>) -> String {
    ts.format("%H:%M:%S").to_string()
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Escapes text for embedding in markup, element content or quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Blank or missing values collapse to the placeholder dash.
pub fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}
