//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the help popup
const POPUP_WIDTH: u16 = 44;
const POPUP_HEIGHT: u16 = 20;

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear the area first (for overlay effect)
        Clear.render(area, buf);

        let title = format!(" costboard v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // [0] Padding
            Constraint::Length(1), // [1] Navigation header
            Constraint::Length(1), // [2] Separator
            Constraint::Length(1), // [3] Tab/Shift+Tab
            Constraint::Length(1), // [4] 1-3
            Constraint::Length(1), // [5] Left/Right
            Constraint::Length(1), // [6] [ ] { }
            Constraint::Length(1), // [7] r
            Constraint::Length(1), // [8] Up/Down
            Constraint::Length(1), // [9] Padding
            Constraint::Length(1), // [10] General header
            Constraint::Length(1), // [11] Separator
            Constraint::Length(1), // [12] c / x
            Constraint::Length(1), // [13] t
            Constraint::Length(1), // [14] q/Esc
            Constraint::Length(1), // [15] Padding
            Constraint::Length(1), // [16] Close hint
            Constraint::Min(0),    // Remaining
        ])
        .split(inner);

        // Navigation section
        let nav_header = Line::from(vec![Span::styled(
            "Navigation",
            Style::default()
                .fg(self.theme.date())
                .add_modifier(Modifier::BOLD),
        )]);
        Paragraph::new(nav_header)
            .alignment(Alignment::Left)
            .render(chunks[1], buf);

        let sep = "─".repeat(inner.width as usize);
        buf.set_string(
            chunks[2].x,
            chunks[2].y,
            &sep,
            Style::default().fg(self.theme.muted()),
        );

        render_keybinding(chunks[3], buf, "Tab / Shift+Tab", "Switch view", self.theme);
        render_keybinding(chunks[4], buf, "1-3", "Jump to view", self.theme);
        render_keybinding(chunks[5], buf, "Left/Right", "Select service", self.theme);
        render_keybinding(chunks[6], buf, "[ ] / { }", "Adjust start/end date", self.theme);
        render_keybinding(chunks[7], buf, "r", "Reset date range", self.theme);
        render_keybinding(chunks[8], buf, "Up/Down or j/k", "Scroll", self.theme);

        // General section
        let gen_header = Line::from(vec![Span::styled(
            "General",
            Style::default()
                .fg(self.theme.date())
                .add_modifier(Modifier::BOLD),
        )]);
        Paragraph::new(gen_header)
            .alignment(Alignment::Left)
            .render(chunks[10], buf);

        buf.set_string(
            chunks[11].x,
            chunks[11].y,
            &sep,
            Style::default().fg(self.theme.muted()),
        );

        render_keybinding(chunks[12], buf, "c / x", "Export CSV / JSON", self.theme);
        render_keybinding(chunks[13], buf, "t", "Toggle theme", self.theme);
        render_keybinding(chunks[14], buf, "q / Esc", "Quit", self.theme);

        // Close hint
        let hint = Line::from(vec![Span::styled(
            "Press ? to close",
            Style::default().fg(self.theme.muted()),
        )]);
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(chunks[16], buf);
    }
}

/// Render a single keybinding line
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<18}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc, Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}
