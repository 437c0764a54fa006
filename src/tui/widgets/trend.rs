//! Trend view widget - per-day cost of the selected series

use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::{format_money, format_sparkline, VISIBLE_ROWS};
use crate::tui::theme::{spike_level, Theme};

/// Bar width for the usage column
const BAR_WIDTH: usize = 24;

/// Trend view widget
pub struct TrendView<'a> {
    /// Per-day cost of the selected series, in filtered order
    series: &'a [(NaiveDate, f64)],
    /// Selected series label ("Total (All Services)" or a service name)
    label: &'a str,
    scroll_offset: usize,
    theme: Theme,
    /// Period's average daily cost, for spike coloring
    avg_cost: f64,
}

impl<'a> TrendView<'a> {
    pub fn new(
        series: &'a [(NaiveDate, f64)],
        label: &'a str,
        scroll_offset: usize,
        theme: Theme,
        avg_cost: f64,
    ) -> Self {
        Self {
            series,
            label,
            scroll_offset,
            theme,
            avg_cost,
        }
    }
}

impl Widget for TrendView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.series.is_empty() {
            let text = "No cost data in the selected range";
            let y = area.y + area.height / 2;
            let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
            buf.set_string(x, y, text, Style::default().fg(self.theme.muted()));
            return;
        }

        let max_cost = self
            .series
            .iter()
            .map(|(_, cost)| *cost)
            .fold(0.0_f64, f64::max);

        // Selected series label
        let label_line = Line::from(Span::styled(
            self.label.to_string(),
            Style::default()
                .fg(self.theme.accent())
                .add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(label_line)
            .alignment(Alignment::Center)
            .render(Rect { height: 1, ..area }, buf);

        // Table columns: date, cost, usage bar; centered as a block
        let table_width = 12 + 2 + 12 + 2 + BAR_WIDTH as u16;
        let x = area.x + (area.width.saturating_sub(table_width)) / 2;

        let header_y = area.y + 2;
        if header_y >= area.y + area.height {
            return;
        }
        let header = format!(
            "{:<12}  {:>12}  {:<width$}",
            "Date",
            "Cost",
            "Usage",
            width = BAR_WIDTH
        );
        buf.set_string(
            x,
            header_y,
            &header,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let start = self.scroll_offset.min(self.series.len());
        let end = (start + VISIBLE_ROWS).min(self.series.len());

        for (i, (date, cost)) in self.series[start..end].iter().enumerate() {
            let y = header_y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }

            let cost_color = self
                .theme
                .spike_color(spike_level(*cost, self.avg_cost));
            let bar = format_sparkline(*cost, max_cost, BAR_WIDTH);

            buf.set_string(
                x,
                y,
                format!("{:<12}", date),
                Style::default().fg(self.theme.date()),
            );
            buf.set_string(
                x + 14,
                y,
                format!("{:>12}", format_money(*cost)),
                Style::default().fg(cost_color),
            );
            buf.set_string(x + 28, y, &bar, Style::default().fg(self.theme.bar()));
        }
    }
}
