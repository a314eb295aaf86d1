//! CodeFlux Style System
//!
//! Colors and glyphs for plain CLI output. The TUI has its own palette in
//! `tui::TuiPalette`; both draw from the same indigo-and-slate scheme.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::{Colorize, CustomColor};

use crate::content::Difficulty;
use crate::progress::ProgressStatus;

/// When true, all glyphs use plain ASCII instead of Unicode/emoji.
static ASCII_MODE: AtomicBool = AtomicBool::new(false);

/// Enable ASCII-only mode (no emoji or extended Unicode).
pub fn set_ascii_mode(enabled: bool) {
    ASCII_MODE.store(enabled, Ordering::Relaxed);
}

/// Check if ASCII mode is active.
pub fn is_ascii_mode() -> bool {
    ASCII_MODE.load(Ordering::Relaxed)
}

pub struct Palette;

impl Palette {
    pub const INDIGO: CustomColor = CustomColor {
        r: 99,
        g: 102,
        b: 241,
    }; // #6366F1
    pub const VIOLET: CustomColor = CustomColor {
        r: 139,
        g: 92,
        b: 246,
    }; // #8B5CF6
    pub const SLATE: CustomColor = CustomColor {
        r: 100,
        g: 116,
        b: 139,
    }; // #64748B
    pub const EMERALD: CustomColor = CustomColor {
        r: 16,
        g: 185,
        b: 129,
    }; // #10B981
    pub const AMBER: CustomColor = CustomColor {
        r: 245,
        g: 158,
        b: 11,
    }; // #F59E0B
    pub const ROSE: CustomColor = CustomColor {
        r: 244,
        g: 63,
        b: 94,
    }; // #F43F5E
}

/// Semantic styling for CLI output
pub trait FluxStyle {
    fn title(self) -> colored::ColoredString;
    fn pattern_name(self) -> colored::ColoredString;
    fn success(self) -> colored::ColoredString;
    fn warning(self) -> colored::ColoredString;
    fn failure(self) -> colored::ColoredString;
    fn muted(self) -> colored::ColoredString;
    fn emphasis(self) -> colored::ColoredString;
    fn code(self) -> colored::ColoredString;
}

impl FluxStyle for &str {
    fn title(self) -> colored::ColoredString {
        self.custom_color(Palette::INDIGO).bold()
    }

    fn pattern_name(self) -> colored::ColoredString {
        self.custom_color(Palette::VIOLET).bold()
    }

    fn success(self) -> colored::ColoredString {
        self.custom_color(Palette::EMERALD)
    }

    fn warning(self) -> colored::ColoredString {
        self.custom_color(Palette::AMBER)
    }

    fn failure(self) -> colored::ColoredString {
        self.custom_color(Palette::ROSE).bold()
    }

    fn muted(self) -> colored::ColoredString {
        self.custom_color(Palette::SLATE)
    }

    fn emphasis(self) -> colored::ColoredString {
        self.custom_color(Palette::INDIGO)
    }

    fn code(self) -> colored::ColoredString {
        self.custom_color(Palette::SLATE).italic()
    }
}

impl FluxStyle for String {
    fn title(self) -> colored::ColoredString {
        self.as_str().title()
    }

    fn pattern_name(self) -> colored::ColoredString {
        self.as_str().pattern_name()
    }

    fn success(self) -> colored::ColoredString {
        self.as_str().success()
    }

    fn warning(self) -> colored::ColoredString {
        self.as_str().warning()
    }

    fn failure(self) -> colored::ColoredString {
        self.as_str().failure()
    }

    fn muted(self) -> colored::ColoredString {
        self.as_str().muted()
    }

    fn emphasis(self) -> colored::ColoredString {
        self.as_str().emphasis()
    }

    fn code(self) -> colored::ColoredString {
        self.as_str().code()
    }
}

/// Glyphs with a plain-ASCII fallback when [`set_ascii_mode`] is on.
pub struct Glyphs;

impl Glyphs {
    pub fn completed() -> &'static str {
        if is_ascii_mode() {
            "[x]"
        } else {
            "✅"
        }
    }
    pub fn in_progress() -> &'static str {
        if is_ascii_mode() {
            "[~]"
        } else {
            "⏳"
        }
    }
    pub fn not_started() -> &'static str {
        if is_ascii_mode() {
            "[ ]"
        } else {
            "⚪"
        }
    }
    pub fn bulb() -> &'static str {
        if is_ascii_mode() {
            "(i)"
        } else {
            "💡"
        }
    }
    pub fn play() -> &'static str {
        if is_ascii_mode() {
            ">"
        } else {
            "▶"
        }
    }
    pub fn pause() -> &'static str {
        if is_ascii_mode() {
            "||"
        } else {
            "⏸"
        }
    }
    pub fn video() -> &'static str {
        if is_ascii_mode() {
            "[video]"
        } else {
            "🎬"
        }
    }
    pub fn tutor() -> &'static str {
        if is_ascii_mode() {
            "[?]"
        } else {
            "💬"
        }
    }
    pub fn warning() -> &'static str {
        if is_ascii_mode() {
            "!"
        } else {
            "⚠"
        }
    }
    pub fn pointer() -> &'static str {
        if is_ascii_mode() {
            "^"
        } else {
            "▲"
        }
    }
    pub fn bullet() -> &'static str {
        if is_ascii_mode() {
            "-"
        } else {
            "•"
        }
    }
    pub fn arrow() -> &'static str {
        if is_ascii_mode() {
            "->"
        } else {
            "→"
        }
    }

    pub fn status(status: ProgressStatus) -> &'static str {
        match status {
            ProgressStatus::Completed => Self::completed(),
            ProgressStatus::InProgress => Self::in_progress(),
            ProgressStatus::YetToStart => Self::not_started(),
        }
    }
}

/// Progress status, colored by how far along it is.
pub fn status_label(status: ProgressStatus) -> colored::ColoredString {
    match status {
        ProgressStatus::Completed => status.as_str().success(),
        ProgressStatus::InProgress => status.as_str().warning(),
        ProgressStatus::YetToStart => status.as_str().muted(),
    }
}

pub fn difficulty_label(difficulty: Difficulty) -> colored::ColoredString {
    match difficulty {
        Difficulty::Easy => difficulty.label().success(),
        Difficulty::Medium => difficulty.label().warning(),
        Difficulty::Hard => difficulty.label().failure(),
        Difficulty::Unspecified => difficulty.label().muted(),
    }
}
