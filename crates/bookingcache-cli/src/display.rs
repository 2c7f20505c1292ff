//! Plain-text rendering of booking data for the terminal.

use bookingcache_core::{BookingRecord, BookingSnapshot, CacheEntry};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

pub fn format_booking(record: &BookingRecord) -> String {
    let mut lines = vec![
        format!("Ship reference: {}", record.ship_reference),
        format!("Ship token:     {}", truncate_string(&record.ship_token, 24)),
        format!(
            "Ticket check:   {}",
            if record.can_issue_ticket_checking { "yes" } else { "no" }
        ),
        format!("Duration:       {}", record.duration_display()),
    ];
    if let Some(expiry) = record.expiry_time() {
        lines.push(format!("Expires:        {}", expiry.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.push(format!("Segments ({}):", record.segments.len()));
    for segment in &record.segments {
        lines.push(format!("  #{} {}", segment.id, segment.route.summary()));
    }
    lines.join("\n")
}

pub fn format_snapshot(snapshot: &BookingSnapshot) -> String {
    let mut out = String::new();
    if let Some(ref record) = snapshot.record {
        out.push_str(&format_booking(record));
        out.push('\n');
    }
    out.push_str(&snapshot.status_description());
    out
}

pub fn format_cache_status(entry: Option<&CacheEntry>, valid: bool) -> String {
    match entry {
        Some(entry) => format!(
            "Cache: {} (cached {}{}{})",
            if valid { "valid" } else { "needs refresh" },
            entry.age_display(),
            if entry.is_stale() { ", stale" } else { "" },
            if entry.is_expired() { ", expired" } else { "" },
        ),
        None => "Cache: empty".to_string(),
    }
}
