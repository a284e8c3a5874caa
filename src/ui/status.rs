use crate::app::{App, Screen};
use crate::keybindings::Context as KbContext;
use crate::util::strip_control_chars;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

use super::render::spinner_glyph;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, style): (Cow<'_, str>, _) = if let Some((msg, kind, _)) = &app.status_message {
        // Server messages can reach here, so strip escapes
        (strip_control_chars(msg), app.style(kind.style_role()))
    } else if app.deleting.is_some() {
        (
            Cow::Owned(format!("{} Deleting item...", spinner_glyph(app.spinner_frame))),
            app.style("status_bar"),
        )
    } else {
        (Cow::Borrowed(hints(app)), app.style("status_bar"))
    };

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}

/// Static keybinding hints for the current screen.
fn hints(app: &App) -> &'static str {
    if app.form.is_some() {
        return "Tab/Shift+Tab move | Left/Right change status | Enter save | Esc cancel";
    }
    if app.screen == Screen::Signup {
        return "Tab/Shift+Tab move | Left/Right change role | Enter sign up | Esc back";
    }
    match app.key_context() {
        KbContext::Search => "Type to search | Esc clear | Enter keep",
        KbContext::Items => "[a]dd [e]dit [d]elete [o]pen image [/]search [r]eload [Esc]back [?]help [q]uit",
        _ => "[Enter]open [a]dd [/]search [r]eload [S]ign up [t]heme [?]help [q]uit",
    }
}
