//! Input handling for the TUI.
//!
//! Modal layers capture keys in order: help, delete prompt, item form,
//! signup screen, search typing. Whatever gets past them goes through the
//! keybinding registry for the current context.

use crate::app::{App, AppEvent, Screen};
use crate::forms::{ItemField, SignupField};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::MAX_INPUT_LENGTH;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{confirm_delete, open_selected_image, spawn_fetch, submit_form, submit_signup};
use super::Action;

const ERR_FIELD_FULL: &str = "Field is at maximum length";

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    if app.pending_confirm.is_some() {
        return Ok(handle_confirm_input(app, code, event_tx));
    }

    if app.form.is_some() {
        return Ok(handle_form_input(app, code, modifiers, event_tx));
    }

    if app.screen == Screen::Signup {
        return Ok(handle_signup_input(app, code, modifiers, event_tx));
    }

    if app.search_mode {
        return Ok(handle_search_input(app, code, modifiers));
    }

    handle_browse_input(app, code, modifiers, event_tx)
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// y confirms, n/Esc cancels, anything else is ignored.
fn handle_confirm_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            confirm_delete(app, event_tx);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Delete cancelled");
        }
        _ => {}
    }
    Action::Continue
}

fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let Some(form) = app.form.as_mut() else {
        return Action::Continue;
    };

    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => {
            submit_form(app, event_tx);
        }
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left if form.focus == ItemField::Status => form.cycle_status(false),
        KeyCode::Right if form.focus == ItemField::Status => form.cycle_status(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if !form.input_char(c) {
                app.set_status(ERR_FIELD_FULL);
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_signup_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let form = &mut app.signup;
    match code {
        KeyCode::Esc => app.leave_signup(),
        KeyCode::Enter => {
            submit_signup(app, event_tx);
        }
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left if form.focus == SignupField::Role => form.cycle_role(false),
        KeyCode::Right if form.focus == SignupField::Role => form.cycle_role(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if !form.input_char(c) {
                app.set_status(ERR_FIELD_FULL);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Typing edits the query live; Esc clears it, Enter keeps it.
fn handle_search_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Search) {
        Some(KbAction::ExitSearch) => {
            app.clear_search();
            return Action::Continue;
        }
        Some(KbAction::CommitSearch) => {
            app.search_mode = false;
            return Action::Continue;
        }
        _ => {}
    }

    match code {
        KeyCode::Backspace => {
            let mut query = std::mem::take(&mut app.search_query);
            query.pop();
            app.set_search_query(query);
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            // SEC: Bound the query like every other text input
            if app.search_query.chars().count() >= MAX_INPUT_LENGTH {
                app.set_status(ERR_FIELD_FULL);
            } else {
                let mut query = std::mem::take(&mut app.search_query);
                query.push(c);
                app.set_search_query(query);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Registry-driven dispatch for the category grid and item table.
fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let context = app.key_context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Ok(Action::Continue);
    };

    match action {
        KbAction::Quit => return Ok(Action::Quit),
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::NavLeft => app.nav_left(),
        KbAction::NavRight => app.nav_right(),
        KbAction::Select => {
            if context == KbContext::Items {
                app.open_edit_for_selected();
            } else {
                app.open_selected_tile();
            }
        }
        KbAction::Back => {
            if app.screen == Screen::Items {
                app.back_to_categories();
            } else if !app.search_query.is_empty() {
                app.clear_search();
            }
        }
        KbAction::Refresh => {
            app.set_status("Reloading inventory...");
            spawn_fetch(app, event_tx);
        }
        KbAction::AddItem => app.open_add_form(),
        KbAction::EditItem => {
            if !app.open_edit_for_selected() {
                app.set_status("No item selected");
            }
        }
        KbAction::DeleteItem => app.request_delete(),
        KbAction::OpenImage => open_selected_image(app),
        KbAction::EnterSearch => app.enter_search(),
        KbAction::ClearSearch => app.clear_search(),
        KbAction::Signup => app.enter_signup(),
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        // Search-only actions never resolve outside the search context
        KbAction::ExitSearch | KbAction::CommitSearch => {}
    }
    Ok(Action::Continue)
}
