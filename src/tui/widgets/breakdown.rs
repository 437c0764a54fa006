//! Breakdown view widget - per-day stacked service bars

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use super::{format_money, VISIBLE_ROWS};
use crate::tui::theme::Theme;
use crate::types::DayRecord;

/// Width of the stacked bar column
const BAR_WIDTH: usize = 40;

/// Breakdown view widget
pub struct BreakdownView<'a> {
    /// Filtered days, in filtered order
    days: &'a [DayRecord],
    /// All service names of the report, sorted (fixes legend colors)
    services: &'a [String],
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> BreakdownView<'a> {
    pub fn new(
        days: &'a [DayRecord],
        services: &'a [String],
        scroll_offset: usize,
        theme: Theme,
    ) -> Self {
        Self {
            days,
            services,
            scroll_offset,
            theme,
        }
    }

    /// Segment widths for one day's stacked bar. Bars scale against the
    /// costliest day so relative daily totals stay comparable.
    fn segments(&self, day: &DayRecord, max_total: f64) -> Vec<(usize, usize)> {
        if max_total <= 0.0 {
            return Vec::new();
        }
        let mut segments = Vec::new();
        for (idx, service) in self.services.iter().enumerate() {
            let cost = day.cost_for(service);
            if cost <= 0.0 {
                continue;
            }
            let cells = ((cost / max_total) * BAR_WIDTH as f64).round() as usize;
            if cells > 0 {
                segments.push((idx, cells));
            }
        }
        segments
    }
}

impl Widget for BreakdownView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.days.is_empty() {
            let text = "No cost data in the selected range";
            let y = area.y + area.height / 2;
            let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
            buf.set_string(x, y, text, Style::default().fg(self.theme.muted()));
            return;
        }

        let max_total = self
            .days
            .iter()
            .map(DayRecord::total)
            .fold(0.0_f64, f64::max);

        let table_width = 12 + 2 + BAR_WIDTH as u16 + 2 + 10;
        let x = area.x + (area.width.saturating_sub(table_width)) / 2;

        // Legend: one colored swatch per service, wrapped across lines
        let mut legend_x = x;
        let mut legend_y = area.y;
        for (idx, service) in self.services.iter().enumerate() {
            let entry_width = service.len() as u16 + 3;
            if legend_x + entry_width > area.x + area.width && legend_x > x {
                legend_x = x;
                legend_y += 1;
            }
            if legend_y >= area.y + area.height {
                break;
            }
            buf.set_string(
                legend_x,
                legend_y,
                "■",
                Style::default().fg(self.theme.series(idx)),
            );
            buf.set_string(
                legend_x + 2,
                legend_y,
                service,
                Style::default().fg(self.theme.text()),
            );
            legend_x += entry_width + 2;
        }

        // Days coming out of normalization always carry services, but an
        // empty list must not leave a blank legend row above the header
        let header_y = if self.services.is_empty() {
            area.y
        } else {
            legend_y + 2
        };
        if header_y >= area.y + area.height {
            return;
        }
        let header = format!(
            "{:<12}  {:<width$}  {:>10}",
            "Date",
            "Services",
            "Total",
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

        let start = self.scroll_offset.min(self.days.len());
        let end = (start + VISIBLE_ROWS).min(self.days.len());

        for (i, day) in self.days[start..end].iter().enumerate() {
            let y = header_y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }

            buf.set_string(
                x,
                y,
                format!("{:<12}", day.date),
                Style::default().fg(self.theme.date()),
            );

            let mut bar_x = x + 14;
            for (service_idx, cells) in self.segments(day, max_total) {
                let run = "█".repeat(cells);
                buf.set_string(
                    bar_x,
                    y,
                    &run,
                    Style::default().fg(self.theme.series(service_idx)),
                );
                bar_x += cells as u16;
            }

            buf.set_string(
                x + 14 + BAR_WIDTH as u16 + 2,
                y,
                format!("{:>10}", format_money(day.total())),
                Style::default().fg(self.theme.cost()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn day(date: &str, services: &[(&str, f64)]) -> DayRecord {
        DayRecord {
            date: date.parse().unwrap(),
            services: services
                .iter()
                .map(|(name, cost)| (name.to_string(), *cost))
                .collect(),
        }
    }

    fn render_to_string(view: BreakdownView, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_days_shows_placeholder() {
        let services: Vec<String> = vec![];
        let view = BreakdownView::new(&[], &services, 0, Theme::Dark);
        let out = render_to_string(view, 80, 10);
        assert!(out.contains("No cost data in the selected range"));
    }

    #[test]
    fn test_legend_and_rows_render() {
        let days = vec![day("2024-01-15", &[("Amazon EC2", 10.0), ("Amazon S3", 5.0)])];
        let services = vec!["Amazon EC2".to_string(), "Amazon S3".to_string()];
        let view = BreakdownView::new(&days, &services, 0, Theme::Dark);
        let out = render_to_string(view, 100, 24);
        assert!(out.contains("Amazon EC2"));
        assert!(out.contains("Amazon S3"));
        assert!(out.contains("2024-01-15"));
        assert!(out.contains("$15.00"));
    }

    #[test]
    fn test_segments_proportional_to_max_day() {
        let days = vec![
            day("2024-01-15", &[("Amazon EC2", 100.0)]),
            day("2024-01-16", &[("Amazon EC2", 50.0)]),
        ];
        let services = vec!["Amazon EC2".to_string()];
        let view = BreakdownView::new(&days, &services, 0, Theme::Dark);
        let segments = view.segments(&days[1], 100.0);
        assert_eq!(segments, vec![(0, BAR_WIDTH / 2)]);
    }

    #[test]
    fn test_header_on_first_row_without_legend() {
        let days = vec![day("2024-01-15", &[])];
        let view = BreakdownView::new(&days, &[], 0, Theme::Dark);
        let out = render_to_string(view, 100, 24);
        let first_line = out.lines().next().unwrap();
        assert!(first_line.contains("Date"));
        assert!(out.contains("2024-01-15"));
    }

    #[test]
    fn test_segments_skip_absent_services() {
        let days = vec![day("2024-01-15", &[("Amazon S3", 40.0)])];
        let services = vec!["Amazon EC2".to_string(), "Amazon S3".to_string()];
        let view = BreakdownView::new(&days, &services, 0, Theme::Dark);
        let segments = view.segments(&days[0], 40.0);
        assert_eq!(segments, vec![(1, BAR_WIDTH)]);
    }
}
