//! Widgets for the costboard TUI

pub mod breakdown;
pub mod help;
pub mod spinner;
pub mod status;
pub mod tabs;
pub mod trend;
pub mod weekly;

/// Visible data rows per view (excluding headers)
pub const VISIBLE_ROWS: usize = 15;

/// Maximum scroll offset for a view with `count` rows
pub fn max_scroll_offset(count: usize) -> usize {
    count.saturating_sub(VISIBLE_ROWS)
}

/// Format a usage bar based on cost ratio
/// Example: cost=500, max=1000, width=8 → "▓▓▓▓░░░░"
pub fn format_sparkline(cost: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || width == 0 {
        return "░".repeat(width);
    }
    let ratio = cost / max;
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width); // Clamp to prevent overflow when ratio > 1.0
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}

/// Format a cost as dollars with 2 decimals
pub fn format_money(cost: f64) -> String {
    format!("${cost:.2}")
}
