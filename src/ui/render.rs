//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! screen based on application state and drawing overlays on top.

use crate::app::{App, ConfirmAction, Screen};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{categories, form, help, items, signup, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Braille spinner, one glyph per tick.
const SPINNER: [char; super::loop_runner::SPINNER_FRAMES] =
    ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub(super) fn spinner_glyph(frame: usize) -> char {
    SPINNER[frame % SPINNER.len()]
}

/// Main render dispatch function.
///
/// Takes `&mut App` because the category grid records its column count for
/// keyboard navigation.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // EDGE-001: Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.screen {
        Screen::Signup => signup::render(f, app, chunks[0]),
        _ => render_browse(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    if let Some(ref item_form) = app.form {
        form::render(f, app, item_form);
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }

    // Help goes last so it sits above everything else
    if app.show_help {
        help::render(f, app);
    }
}

/// Category grid or item table, with the search bar above when a query is live.
fn render_browse(f: &mut Frame, app: &mut App, area: Rect) {
    let show_search = app.search_mode || !app.search_query.is_empty();
    let main = if show_search {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        render_search_bar(f, app, chunks[0]);
        chunks[1]
    } else {
        area
    };

    if app.is_loading {
        render_loading(f, app, main);
        return;
    }

    if app.screen == Screen::Categories && !app.showing_search_results() {
        app.grid_columns = categories::columns_for_width(main.width);
        categories::render(f, app, main);
    } else {
        items::render(f, app, main);
    }
}

fn render_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let cursor = if app.search_mode { "_" } else { "" };
    let query = strip_control_chars(&app.search_query);
    let max = (area.width as usize).saturating_sub(4);
    let line = Line::from(vec![
        Span::styled(" / ", app.style("form_label")),
        Span::styled(
            format!("{}{}", truncate_to_width(&query, max), cursor),
            if app.search_mode {
                app.style("form_input_focused")
            } else {
                app.style("form_input")
            },
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"))
        .title(" Inventory ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height == 0 {
        return;
    }
    let y = inner.y + inner.height / 2;
    let text = format!("{} Loading inventory...", spinner_glyph(app.spinner_frame));
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(app.style("empty_state"));
    f.render_widget(paragraph, Rect::new(inner.x, y, inner.width, 1));
}

/// Fixed-size rectangle centered in `area`, shrunk to fit with a 2-cell margin.
pub(super) fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let text = match confirm {
        ConfirmAction::DeleteItem { name, .. } => {
            let name = strip_control_chars(name);
            format!(
                "{}\n\n\"{}\"\n\n(y) Delete  (n/Esc) Cancel",
                confirm.prompt(),
                truncate_to_width(&name, 40)
            )
        }
    };

    let overlay = centered_fixed(50, 8, f.area());
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Delete Item "),
        )
        .alignment(Alignment::Center)
        .style(app.style("form_input"));

    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InventoryClient, InventoryItem, ItemStatus};
    use ratatui::{backend::TestBackend, Terminal};
    use rust_decimal::Decimal;

    fn app_with_items() -> App {
        let client = InventoryClient::new("http://localhost:5000", 5, None).unwrap();
        let mut app = App::new(client);
        app.set_items(vec![InventoryItem {
            id: "1".into(),
            name: "Basmati Rice".into(),
            category: "Atta, Rice & Dal".into(),
            quantity: 12,
            price: Decimal::new(45, 1),
            status: ItemStatus::LowStock,
            image: None,
            minimum_quantity: Some(5),
        }]);
        app
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_too_small_terminal() {
        let mut app = app_with_items();
        let screen = draw(&mut app, 40, 8);
        assert!(screen.contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_grid_shows_populated_category_and_sets_columns() {
        let mut app = app_with_items();
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Atta, Rice & Dal"));
        assert!(screen.contains("1 item"));
        assert!(!screen.contains("Pet Care"));
        assert!(app.grid_columns >= 1 && app.grid_columns <= 5);
    }

    #[tokio::test]
    async fn test_item_table_formats_price() {
        let mut app = app_with_items();
        app.select_category("Atta, Rice & Dal");
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Basmati Rice"));
        assert!(screen.contains("4.50"));
        assert!(screen.contains("Low Stock"));
    }

    #[tokio::test]
    async fn test_deleting_row_marked() {
        let mut app = app_with_items();
        app.select_category("Atta, Rice & Dal");
        app.deleting = Some("1".into());
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Deleting..."));
    }

    #[tokio::test]
    async fn test_empty_category_message() {
        let mut app = app_with_items();
        app.select_category("Pet Care");
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("No items in inventory"));
        assert!(screen.contains("Get started by adding your first inventory item."));
    }

    #[tokio::test]
    async fn test_loading_spinner_replaces_main_panel() {
        let mut app = app_with_items();
        app.is_loading = true;
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Loading inventory..."));
        assert!(!screen.contains("Atta, Rice & Dal"));
    }

    #[tokio::test]
    async fn test_form_and_confirm_overlays() {
        let mut app = app_with_items();
        app.open_add_form();
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Add New Inventory Item"));
        assert!(screen.contains("Add Item"));

        app.is_submitting = true;
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Adding..."));

        app.close_form();
        app.is_submitting = false;
        app.select_category("Atta, Rice & Dal");
        app.request_delete();
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("Are you sure you want to delete this item?"));
    }
}
