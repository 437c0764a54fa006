//! Application state and event loop

use std::fs::File;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::config::Config;
use crate::export;
use crate::services::fetcher::fetch_report;
use crate::services::Aggregator;
use crate::types::{DateRange, DayRecord, NormalizedReport, WeekRecord};

use super::theme::Theme;
use super::widgets::{
    breakdown::BreakdownView,
    help::HelpPopup,
    max_scroll_offset,
    spinner::{LoadingStage, Spinner},
    status::{Message, StatusBar},
    tabs::{Tab, TabBar},
    trend::TrendView,
    weekly::WeeklyView,
};

/// Series label when no single service is selected
const TOTAL_LABEL: &str = "Total (All Services)";

/// Application state
pub enum AppState {
    /// Fetching the report with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Report loaded and views derived
    Ready { session: Box<Session> },
    /// Fetch or parse failed
    Error { message: String },
}

/// A loaded report plus everything derived from the active date range.
/// Derived views are recomputed whenever the range changes.
pub struct Session {
    pub report: NormalizedReport,
    /// Report's full date span; range adjustments clamp to it
    pub bounds: DateRange,
    pub range: DateRange,
    /// All service names of the report, sorted
    pub services: Vec<String>,
    pub filtered: Vec<DayRecord>,
    pub weeks: Vec<WeekRecord>,
    /// 0 selects the total; 1..=services.len() selects a single service
    selection: usize,
}

impl Session {
    pub fn new(report: NormalizedReport) -> Result<Box<Self>, String> {
        let (min, max) = report
            .date_bounds()
            .ok_or_else(|| "report contains no cost data".to_string())?;
        let bounds = DateRange::new(min, max);
        let services = Aggregator::services(&report.data);
        let mut session = Box::new(Self {
            report,
            bounds,
            range: bounds,
            services,
            filtered: Vec::new(),
            weeks: Vec::new(),
            selection: 0,
        });
        session.recompute();
        Ok(session)
    }

    /// Re-derive the filtered view and weekly rollup from the active range.
    /// An empty filter result is non-fatal here; the event loop reports it.
    fn recompute(&mut self) {
        self.filtered =
            Aggregator::filter_nonempty(&self.report.data, self.range).unwrap_or_default();
        self.weeks = Aggregator::group_by_week(&self.filtered);
    }

    /// Label of the selected series
    pub fn selected_label(&self) -> &str {
        match self.selection {
            0 => TOTAL_LABEL,
            n => &self.services[n - 1],
        }
    }

    /// Cycle to the next series (total, then each service, wrapping)
    pub fn select_next(&mut self) {
        self.selection = (self.selection + 1) % (self.services.len() + 1);
    }

    /// Cycle to the previous series (wrapping)
    pub fn select_prev(&mut self) {
        self.selection = self
            .selection
            .checked_sub(1)
            .unwrap_or(self.services.len());
    }

    /// Per-day cost of the selected series over the filtered view
    pub fn trend_series(&self) -> Vec<(NaiveDate, f64)> {
        self.filtered
            .iter()
            .map(|day| {
                let cost = match self.selection {
                    0 => day.total(),
                    n => day.cost_for(&self.services[n - 1]),
                };
                (day.date, cost)
            })
            .collect()
    }

    /// Average daily cost of the selected series, for spike coloring
    pub fn avg_cost(&self) -> f64 {
        let series = self.trend_series();
        if series.is_empty() {
            return 0.0;
        }
        series.iter().map(|(_, cost)| cost).sum::<f64>() / series.len() as f64
    }

    /// Shift the range start by whole days, clamped between the report's
    /// first day and the range end. Returns true if the range changed.
    pub fn shift_start(&mut self, delta: i64) -> bool {
        let shifted = shift_date(self.range.start, delta);
        let clamped = shifted.clamp(self.bounds.start, self.range.end);
        if clamped == self.range.start {
            return false;
        }
        self.range.start = clamped;
        self.recompute();
        true
    }

    /// Shift the range end by whole days, clamped between the range start
    /// and the report's last day. Returns true if the range changed.
    pub fn shift_end(&mut self, delta: i64) -> bool {
        let shifted = shift_date(self.range.end, delta);
        let clamped = shifted.clamp(self.range.start, self.bounds.end);
        if clamped == self.range.end {
            return false;
        }
        self.range.end = clamped;
        self.recompute();
        true
    }

    /// Restore the range to the report's full span. Returns true if the
    /// range changed.
    pub fn reset_range(&mut self) -> bool {
        if self.range == self.bounds {
            return false;
        }
        self.range = self.bounds;
        self.recompute();
        true
    }
}

fn shift_date(date: NaiveDate, delta: i64) -> NaiveDate {
    let result = if delta >= 0 {
        date.checked_add_days(Days::new(delta as u64))
    } else {
        date.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    result.unwrap_or(date)
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    theme: Theme,
    show_help: bool,
    message: Option<Message>,
    trend_scroll: usize,
    breakdown_scroll: usize,
    weekly_scroll: usize,
}

impl App {
    /// Create a new app in loading state
    pub fn new(theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Fetching,
            },
            should_quit: false,
            current_tab: Tab::default(),
            theme,
            show_help: false,
            message: None,
            trend_scroll: 0,
            breakdown_scroll: 0,
            weekly_scroll: 0,
        }
    }

    /// Apply the background fetch result to app state
    pub fn apply_session_result(&mut self, result: Result<Box<Session>, String>) {
        match result {
            Ok(session) => {
                self.reset_scrolls(&session);
                self.state = AppState::Ready { session };
            }
            Err(message) => self.state = AppState::Error { message },
        }
    }

    /// Scroll each view to its latest rows
    fn reset_scrolls(&mut self, session: &Session) {
        self.trend_scroll = max_scroll_offset(session.filtered.len());
        self.breakdown_scroll = max_scroll_offset(session.filtered.len());
        self.weekly_scroll = max_scroll_offset(session.weeks.len());
    }

    /// Get scroll offset for the current tab
    fn active_scroll(&self) -> usize {
        match self.current_tab {
            Tab::Trend => self.trend_scroll,
            Tab::Breakdown => self.breakdown_scroll,
            Tab::Weekly => self.weekly_scroll,
        }
    }

    /// Get mutable reference to scroll offset for the current tab
    fn active_scroll_mut(&mut self) -> &mut usize {
        match self.current_tab {
            Tab::Trend => &mut self.trend_scroll,
            Tab::Breakdown => &mut self.breakdown_scroll,
            Tab::Weekly => &mut self.weekly_scroll,
        }
    }

    /// Row count behind the current tab's view
    fn active_row_count(&self) -> usize {
        let AppState::Ready { session } = &self.state else {
            return 0;
        };
        match self.current_tab {
            Tab::Trend | Tab::Breakdown => session.filtered.len(),
            Tab::Weekly => session.weeks.len(),
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab => {
                self.current_tab = self.current_tab.next();
            }
            KeyCode::BackTab => {
                self.current_tab = self.current_tab.prev();
            }
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                    self.current_tab = tab;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_down();
            }
            KeyCode::Left => {
                if let AppState::Ready { session } = &mut self.state {
                    session.select_prev();
                }
            }
            KeyCode::Right => {
                if let AppState::Ready { session } = &mut self.state {
                    session.select_next();
                }
            }
            KeyCode::Char('[') => self.adjust_range(|s| s.shift_start(-1)),
            KeyCode::Char(']') => self.adjust_range(|s| s.shift_start(1)),
            KeyCode::Char('{') => self.adjust_range(|s| s.shift_end(-1)),
            KeyCode::Char('}') => self.adjust_range(|s| s.shift_end(1)),
            KeyCode::Char('r') => self.adjust_range(|s| s.reset_range()),
            KeyCode::Char('c') => self.export_csv(),
            KeyCode::Char('x') => self.export_json(),
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            _ => {}
        }
    }

    /// Apply a range mutation and refresh everything derived from it
    fn adjust_range(&mut self, op: impl FnOnce(&mut Session) -> bool) {
        let AppState::Ready { session } = &mut self.state else {
            return;
        };
        if !op(session) {
            return;
        }
        let session = &*session;
        let (filtered_empty, start, end) =
            (session.filtered.is_empty(), session.range.start, session.range.end);
        let scrolls: (usize, usize) = (
            max_scroll_offset(session.filtered.len()),
            max_scroll_offset(session.weeks.len()),
        );
        self.trend_scroll = scrolls.0;
        self.breakdown_scroll = scrolls.0;
        self.weekly_scroll = scrolls.1;
        if filtered_empty {
            self.message = Some(Message::info(format!(
                "{} ({start} to {end})",
                crate::types::CostboardError::EmptyData
            )));
        }
    }

    /// Write the weekly rollup CSV to the working directory
    fn export_csv(&mut self) {
        let AppState::Ready { session } = &self.state else {
            return;
        };
        let filename = export::csv_filename(Local::now().date_naive());
        let result = File::create(&filename).map_err(crate::types::CostboardError::from).and_then(
            |file| export::write_weekly_csv(file, &session.weeks, &session.services),
        );
        self.message = Some(match result {
            Ok(()) => Message::success(format!("Saved {filename}")),
            Err(e) => Message::error(format!("CSV export failed: {e}")),
        });
    }

    /// Write the filtered JSON payload to the working directory
    fn export_json(&mut self) {
        let AppState::Ready { session } = &self.state else {
            return;
        };
        let filename = export::json_filename(Local::now().date_naive());
        let payload =
            export::ExportPayload::new(&session.report, session.range, &session.filtered);
        let result = File::create(&filename)
            .map_err(crate::types::CostboardError::from)
            .and_then(|file| export::write_json(file, &payload));
        self.message = Some(match result {
            Ok(()) => Message::success(format!("Saved {filename}")),
            Err(e) => Message::error(format!("JSON export failed: {e}")),
        });
    }

    /// Scroll up in the current view
    fn scroll_up(&mut self) {
        let scroll = self.active_scroll_mut();
        *scroll = scroll.saturating_sub(1);
    }

    /// Scroll down in the current view
    fn scroll_down(&mut self) {
        let max = max_scroll_offset(self.active_row_count());
        let scroll = self.active_scroll_mut();
        *scroll = (*scroll + 1).min(max);
    }

    /// Advance spinner animation and expire transient messages
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
        if self.message.as_ref().is_some_and(Message::is_expired) {
            self.message = None;
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn render_header(&self, session: &Session, area: Rect, buf: &mut Buffer) {
        let updated = session
            .report
            .last_updated
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M");
        let title = format!("costboard  •  Last updated: {updated}");
        let x = area.x + (area.width.saturating_sub(title.chars().count() as u16)) / 2;
        buf.set_string(
            x,
            area.y,
            &title,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let range = format!("{} to {}", session.range.start, session.range.end);
        let x = area.x + (area.width.saturating_sub(range.len() as u16)) / 2;
        buf.set_string(x, area.y + 1, &range, Style::default().fg(self.theme.date()));
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage).render(area, buf);
            }
            AppState::Ready { session } => {
                if area.height < 6 {
                    return;
                }
                self.render_header(session, area, buf);

                let tab_area = Rect {
                    y: area.y + 3,
                    height: 1,
                    ..area
                };
                TabBar::new(self.current_tab, self.theme).render(tab_area, buf);

                let view_area = Rect {
                    y: area.y + 5,
                    height: area.height - 6,
                    ..area
                };
                match self.current_tab {
                    Tab::Trend => {
                        let series = session.trend_series();
                        TrendView::new(
                            &series,
                            session.selected_label(),
                            self.trend_scroll,
                            self.theme,
                            session.avg_cost(),
                        )
                        .render(view_area, buf);
                    }
                    Tab::Breakdown => {
                        BreakdownView::new(
                            &session.filtered,
                            &session.services,
                            self.breakdown_scroll,
                            self.theme,
                        )
                        .render(view_area, buf);
                    }
                    Tab::Weekly => {
                        WeeklyView::new(&session.weeks, self.weekly_scroll, self.theme)
                            .render(view_area, buf);
                    }
                }

                let status_area = Rect {
                    y: area.y + area.height - 1,
                    height: 1,
                    ..area
                };
                StatusBar::new(self.message.as_ref(), self.theme).render(status_area, buf);

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let text = format!("Error: {message}");
                let y = area.y + area.height / 2;
                let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.error()));
            }
        }
    }
}

/// Run the TUI application
pub fn run(config: Config) -> anyhow::Result<()> {
    // Theme probing talks to the terminal; do it before raw mode
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, config, theme);
    ratatui::restore();
    result
}

/// Fetch and derive a session (runs on the background thread)
fn load_session(url: &str) -> Result<Box<Session>, String> {
    let report = fetch_report(url).map_err(|e| e.to_string())?;
    Session::new(report)
}

fn run_app(terminal: &mut DefaultTerminal, config: Config, theme: Theme) -> anyhow::Result<()> {
    let mut app = App::new(theme);

    // Spawn background thread for the report fetch
    let (data_tx, data_rx) = mpsc::channel();
    let url = config.data_url.clone();
    thread::spawn(move || {
        let _ = data_tx.send(load_session(&url));
    });

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Check for fetch completion (non-blocking)
        if matches!(app.state, AppState::Loading { .. }) {
            if let Ok(result) = data_rx.try_recv() {
                app.apply_session_result(result);
            }
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}
