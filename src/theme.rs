//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Category grid --
    pub tile_normal: Style,
    pub tile_selected: Style,
    pub tile_count: Style,
    pub tile_image: Style,

    // -- Item table --
    pub item_header: Style,
    pub item_selected: Style,
    pub item_muted: Style,
    pub item_deleting: Style,

    // -- Stock status --
    pub stock_in: Style,
    pub stock_low: Style,
    pub stock_out: Style,
    pub stock_other: Style,

    // -- Forms --
    pub form_label: Style,
    pub form_input: Style,
    pub form_input_focused: Style,
    pub form_button: Style,

    // -- Notifications --
    pub notify_success: Style,
    pub notify_error: Style,
    pub notify_info: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub title: Style,
    pub empty_state: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            // Category grid
            tile_normal: Style::default(),
            tile_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            tile_count: Style::default().fg(Color::Cyan),
            tile_image: Style::default().fg(Color::DarkGray),

            // Item table
            item_header: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            item_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            item_muted: Style::default().fg(Color::Gray),
            item_deleting: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),

            // Stock status
            stock_in: Style::default().fg(Color::Green),
            stock_low: Style::default().fg(Color::Yellow),
            stock_out: Style::default().fg(Color::Red),
            stock_other: Style::default().fg(Color::Gray),

            // Forms
            form_label: Style::default().fg(Color::Gray),
            form_input: Style::default(),
            form_input_focused: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            form_button: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            // Notifications
            notify_success: Style::default().bg(Color::Green).fg(Color::Black),
            notify_error: Style::default().bg(Color::Red).fg(Color::White),
            notify_info: Style::default().bg(Color::DarkGray).fg(Color::White),

            // Chrome
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            empty_state: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light palette for light terminal backgrounds.
    fn light() -> Self {
        Self {
            // Category grid
            tile_normal: Style::default().fg(Color::Black),
            tile_selected: Style::default().bg(Color::Blue).fg(Color::White),
            tile_count: Style::default().fg(Color::Blue),
            tile_image: Style::default().fg(Color::DarkGray),

            // Item table
            item_header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            item_selected: Style::default().bg(Color::Blue).fg(Color::White),
            item_muted: Style::default().fg(Color::DarkGray),
            item_deleting: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),

            // Stock status
            stock_in: Style::default().fg(Color::Green),
            stock_low: Style::default().fg(Color::Magenta),
            stock_out: Style::default().fg(Color::Red),
            stock_other: Style::default().fg(Color::DarkGray),

            // Forms
            form_label: Style::default().fg(Color::DarkGray),
            form_input: Style::default().fg(Color::Black),
            form_input_focused: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            form_button: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            // Notifications
            notify_success: Style::default().bg(Color::Green).fg(Color::White),
            notify_error: Style::default().bg(Color::Red).fg(Color::White),
            notify_info: Style::default().bg(Color::White).fg(Color::Black),

            // Chrome
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            empty_state: Style::default().fg(Color::DarkGray),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup, built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 24] = [
    "tile_normal",
    "tile_selected",
    "tile_count",
    "tile_image",
    "item_header",
    "item_selected",
    "item_muted",
    "item_deleting",
    "stock_in",
    "stock_low",
    "stock_out",
    "stock_other",
    "form_label",
    "form_input",
    "form_input_focused",
    "form_button",
    "notify_success",
    "notify_error",
    "notify_info",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "title",
    "empty_state",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 24] = [
            p.tile_normal,
            p.tile_selected,
            p.tile_count,
            p.tile_image,
            p.item_header,
            p.item_selected,
            p.item_muted,
            p.item_deleting,
            p.stock_in,
            p.stock_low,
            p.stock_out,
            p.stock_other,
            p.form_label,
            p.form_input,
            p.form_input_focused,
            p.form_button,
            p.notify_success,
            p.notify_error,
            p.notify_info,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.title,
            p.empty_state,
        ];

        let map = ROLE_NAMES
            .iter()
            .copied()
            .zip(styles.iter().copied())
            .collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}
