//! Terminal theme detection and color definitions

use ratatui::style::Color;

/// Spike detection level for cost coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikeLevel {
    Normal,
    Elevated,
    High,
}

/// Determine spike level for a day's cost relative to the period average.
/// Returns Normal if avg_cost is 0 (no data or single day).
pub fn spike_level(cost: f64, avg_cost: f64) -> SpikeLevel {
    if avg_cost > 0.0 && cost >= avg_cost * 2.0 {
        SpikeLevel::High
    } else if avg_cost > 0.0 && cost >= avg_cost * 1.5 {
        SpikeLevel::Elevated
    } else {
        SpikeLevel::Normal
    }
}

/// Colorblind-friendly series palette for the stacked breakdown view,
/// shared between themes (cycled by service index)
const SERIES_PALETTE: [Color; 9] = [
    Color::Indexed(32),  // blue
    Color::Indexed(208), // orange
    Color::Indexed(36),  // teal
    Color::Indexed(160), // red
    Color::Indexed(45),  // cyan
    Color::Indexed(133), // purple
    Color::Indexed(178), // yellow
    Color::Indexed(205), // pink
    Color::Indexed(28),  // green
];

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// The other theme (runtime toggle)
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (selected tabs, keybinding keys, selected service)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, inactive tabs, hints)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Date text color
    pub fn date(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Cost/money text color
    pub fn cost(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90), // dark magenta (ANSI 256)
        }
    }

    /// Bar/sparkline color
    pub fn bar(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22), // dark green (ANSI 256)
        }
    }

    /// Error/negative indicator color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Success indicator color (transient status messages)
    pub fn success(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(28), // dark green (ANSI 256)
        }
    }

    /// Spike warning color (1.5x~2x the period's daily average)
    pub fn spike_warn(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(208), // orange (ANSI 256)
            Self::Light => Color::Indexed(166), // dark orange (ANSI 256)
        }
    }

    /// Spike high color (>= 2x the period's daily average)
    pub fn spike_high(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(196), // bright red (ANSI 256)
            Self::Light => Color::Indexed(160), // strong red (ANSI 256)
        }
    }

    /// Series color for the breakdown view, cycled by service index
    pub fn series(self, index: usize) -> Color {
        SERIES_PALETTE[index % SERIES_PALETTE.len()]
    }

    /// Spike detection color based on spike level
    pub fn spike_color(self, level: SpikeLevel) -> Color {
        match level {
            SpikeLevel::Normal => self.cost(),
            SpikeLevel::Elevated => self.spike_warn(),
            SpikeLevel::High => self.spike_high(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_colors() {
        let t = Theme::Dark;
        assert_eq!(t.text(), Color::White);
        assert_eq!(t.accent(), Color::Cyan);
        assert_eq!(t.muted(), Color::DarkGray);
        assert_eq!(t.date(), Color::Yellow);
        assert_eq!(t.cost(), Color::Magenta);
        assert_eq!(t.bar(), Color::Green);
        assert_eq!(t.error(), Color::Red);
    }

    #[test]
    fn test_light_theme_colors() {
        let t = Theme::Light;
        assert_eq!(t.text(), Color::Black);
        assert_eq!(t.accent(), Color::Indexed(25));
        assert_eq!(t.muted(), Color::Gray);
        assert_eq!(t.error(), Color::Indexed(124));
    }

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_series_palette_cycles() {
        let t = Theme::Dark;
        assert_eq!(t.series(0), t.series(9));
        assert_ne!(t.series(0), t.series(1));
    }

    // ========== Spike level tests ==========

    #[test]
    fn test_spike_level_normal() {
        assert_eq!(spike_level(1.0, 1.0), SpikeLevel::Normal);
        assert_eq!(spike_level(1.49, 1.0), SpikeLevel::Normal);
    }

    #[test]
    fn test_spike_level_elevated() {
        assert_eq!(spike_level(1.5, 1.0), SpikeLevel::Elevated);
        assert_eq!(spike_level(1.99, 1.0), SpikeLevel::Elevated);
    }

    #[test]
    fn test_spike_level_high() {
        assert_eq!(spike_level(2.0, 1.0), SpikeLevel::High);
        assert_eq!(spike_level(5.0, 1.0), SpikeLevel::High);
    }

    #[test]
    fn test_spike_level_zero_avg() {
        assert_eq!(spike_level(0.0, 0.0), SpikeLevel::Normal);
        assert_eq!(spike_level(100.0, 0.0), SpikeLevel::Normal);
    }

    #[test]
    fn test_spike_color_mapping() {
        let t = Theme::Dark;
        assert_eq!(t.spike_color(SpikeLevel::Normal), t.cost());
        assert_eq!(t.spike_color(SpikeLevel::Elevated), t.spike_warn());
        assert_eq!(t.spike_color(SpikeLevel::High), t.spike_high());
    }
}
