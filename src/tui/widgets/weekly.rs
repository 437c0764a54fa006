//! Weekly view widget - Sunday-to-Saturday rollup totals

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use super::{format_money, format_sparkline, VISIBLE_ROWS};
use crate::tui::theme::Theme;
use crate::types::WeekRecord;

const BAR_WIDTH: usize = 24;

/// Weekly view widget
pub struct WeeklyView<'a> {
    weeks: &'a [WeekRecord],
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> WeeklyView<'a> {
    pub fn new(weeks: &'a [WeekRecord], scroll_offset: usize, theme: Theme) -> Self {
        Self {
            weeks,
            scroll_offset,
            theme,
        }
    }
}

impl Widget for WeeklyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.weeks.is_empty() {
            let text = "No cost data in the selected range";
            let y = area.y + area.height / 2;
            let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
            buf.set_string(x, y, text, Style::default().fg(self.theme.muted()));
            return;
        }

        let max_total = self
            .weeks
            .iter()
            .map(WeekRecord::total)
            .fold(0.0_f64, f64::max);

        let table_width = 12 + 2 + 12 + 2 + 12 + 2 + BAR_WIDTH as u16;
        let x = area.x + (area.width.saturating_sub(table_width)) / 2;

        let header = format!(
            "{:<12}  {:<12}  {:>12}  {:<width$}",
            "Week Start",
            "Week End",
            "Total",
            "Usage",
            width = BAR_WIDTH
        );
        buf.set_string(
            x,
            area.y,
            &header,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let start = self.scroll_offset.min(self.weeks.len());
        let end = (start + VISIBLE_ROWS).min(self.weeks.len());

        for (i, week) in self.weeks[start..end].iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }

            let total = week.total();
            let bar = format_sparkline(total, max_total, BAR_WIDTH);

            buf.set_string(
                x,
                y,
                format!("{:<12}", week.start_date),
                Style::default().fg(self.theme.date()),
            );
            buf.set_string(
                x + 14,
                y,
                format!("{:<12}", week.end_date),
                Style::default().fg(self.theme.date()),
            );
            buf.set_string(
                x + 28,
                y,
                format!("{:>12}", format_money(total)),
                Style::default().fg(self.theme.cost()),
            );
            buf.set_string(x + 42, y, &bar, Style::default().fg(self.theme.bar()));
        }
    }
}
