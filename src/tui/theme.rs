//! TUI color theme.

use ratatui::style::Color;

use crate::feedback::NoticeLevel;

/// Counter turns orange past this many characters.
const COUNTER_CAUTION_AT: usize = 300;
/// Counter turns red past this many characters.
const COUNTER_CRITICAL_AT: usize = 400;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    // Primary palette
    pub accent: Color,
    pub good: Color,
    pub caution: Color,
    pub critical: Color,
    pub star: Color,

    // UI chrome
    pub background: Color,
    pub border: Color,
    pub muted: Color,
    pub text: Color,
    pub text_dim: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            accent: Color::Rgb(96, 165, 250),
            good: Color::Rgb(74, 222, 128),
            caution: Color::Rgb(251, 146, 60),
            critical: Color::Rgb(248, 113, 113),
            star: Color::Rgb(251, 191, 36),
            background: Color::Rgb(17, 24, 39),
            border: Color::Rgb(75, 85, 99),
            muted: Color::Rgb(107, 114, 128),
            text: Color::White,
            text_dim: Color::Rgb(209, 213, 219),
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(37, 99, 235),
            good: Color::Rgb(22, 163, 74),
            caution: Color::Rgb(234, 88, 12),
            critical: Color::Rgb(220, 38, 38),
            star: Color::Rgb(217, 119, 6),
            background: Color::Rgb(239, 246, 255),
            border: Color::Rgb(156, 163, 175),
            muted: Color::Rgb(107, 114, 128),
            text: Color::Rgb(17, 24, 39),
            text_dim: Color::Rgb(55, 65, 81),
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn counter_color(&self, chars: usize) -> Color {
        if chars > COUNTER_CRITICAL_AT {
            self.critical
        } else if chars > COUNTER_CAUTION_AT {
            self.caution
        } else {
            self.good
        }
    }

    pub fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Success => self.good,
            NoticeLevel::Warning => self.caution,
            NoticeLevel::Error => self.critical,
        }
    }
}
