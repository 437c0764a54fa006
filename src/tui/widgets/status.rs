//! Status message line - the dashboard's one-message-per-event feedback

use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// How long transient (success/info) messages stay visible
const TRANSIENT_TTL: Duration = Duration::from_secs(2);

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// A single user-visible status message. Success and info messages expire;
/// errors persist until replaced.
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
    expires_at: Option<Instant>,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Info,
            expires_at: Some(Instant::now() + TRANSIENT_TTL),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Success,
            expires_at: Some(Instant::now() + TRANSIENT_TTL),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Error,
            expires_at: None,
        }
    }

    /// Whether this message should no longer be displayed
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Status bar widget rendering the active message, if any
pub struct StatusBar<'a> {
    message: Option<&'a Message>,
    theme: Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(message: Option<&'a Message>, theme: Theme) -> Self {
        Self { message, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let Some(message) = self.message else {
            return;
        };

        let color = match message.kind {
            MessageKind::Info => self.theme.muted(),
            MessageKind::Success => self.theme.success(),
            MessageKind::Error => self.theme.error(),
        };

        let text: String = message.text.chars().take(area.width as usize).collect();
        let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
        buf.set_string(x, area.y, &text, Style::default().fg(color));
    }
}
