//! Application settings

use chrono::{FixedOffset, Locale, Offset, Utc};

use crate::projection::TimeFormatter;

/// Application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Theme settings
    pub theme: ThemeSettings,

    /// Timestamp formatting
    pub time: TimeSettings,

    /// Table and chart behaviour
    pub views: ViewSettings,
}

/// Theme settings
#[derive(Debug, Clone)]
pub struct ThemeSettings {
    /// UI scale factor
    pub scale_factor: f32,

    /// Whether to use dark mode
    pub dark_mode: bool,
}

/// Locale and offset used for every formatted timestamp
#[derive(Debug, Clone)]
pub struct TimeSettings {
    pub locale: Locale,
    pub display_offset: FixedOffset,
}

/// View settings
#[derive(Debug, Clone)]
pub struct ViewSettings {
    /// Rows per table page
    pub default_page_size: usize,

    /// Draw the mean response time as a reference line
    pub show_average_line: bool,

    /// Highlight responses slower than mean + 2 standard deviations
    pub highlight_anomalies: bool,
}

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeSettings {
                scale_factor: 1.0,
                dark_mode: true,
            },
            time: TimeSettings {
                locale: Locale::en_US,
                display_offset: Utc.fix(),
            },
            views: ViewSettings {
                default_page_size: 25,
                show_average_line: true,
                highlight_anomalies: true,
            },
        }
    }
}

impl AppSettings {
    pub fn time_formatter(&self) -> TimeFormatter {
        TimeFormatter::new(self.time.locale, self.time.display_offset)
    }

    /// Use the machine's current UTC offset for display
    pub fn with_local_offset(mut self) -> Self {
        self.time.display_offset = chrono::Local::now().offset().fix();
        self
    }
}
