//! Item table: the selected category's items, or search matches across all
//! categories when a query is typed from the grid.

use crate::api::{InventoryItem, ItemStatus};
use crate::app::{App, Screen};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use rust_decimal::RoundingStrategy;

fn status_role(status: &ItemStatus) -> &'static str {
    match status {
        ItemStatus::InStock => "stock_in",
        ItemStatus::LowStock => "stock_low",
        ItemStatus::OutOfStock => "stock_out",
        ItemStatus::Other(_) => "stock_other",
    }
}

/// Price with exactly two decimals, halves rounded away from zero.
pub(super) fn format_price(item: &InventoryItem) -> String {
    let rounded = item
        .price
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let across_categories = app.screen == Screen::Categories;
    let title = if across_categories {
        format!(
            " Search results for \"{}\" ",
            truncate_to_width(&strip_control_chars(&app.search_query), 30)
        )
    } else {
        let category = app.selected_category.as_deref().unwrap_or_default();
        format!(" {}  (Esc back) ", strip_control_chars(category))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(Span::styled(title, app.style("title")));

    let items = app.filtered_items();
    if items.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        render_empty_state(f, app, inner);
        return;
    }

    let muted = app.style("item_muted");
    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            let deleting = app.deleting.as_deref() == Some(item.id.as_str());
            let status_cell = if deleting {
                Cell::from("Deleting...").style(app.style("item_deleting"))
            } else {
                Cell::from(item.status.as_str().to_string())
                    .style(app.style(status_role(&item.status)))
            };

            let min_qty = item
                .minimum_quantity
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            let has_image = item.image.as_deref().is_some_and(|s| !s.trim().is_empty());

            let mut cells = vec![Cell::from(strip_control_chars(&item.name).into_owned())];
            if across_categories {
                cells.push(Cell::from(strip_control_chars(&item.category).into_owned()).style(muted));
            }
            cells.extend([
                Cell::from(item.quantity.to_string()),
                Cell::from(format_price(item)),
                status_cell,
                Cell::from(min_qty).style(muted),
                Cell::from(if has_image { "yes" } else { "" }).style(muted),
            ]);

            let row = Row::new(cells);
            if deleting {
                row.style(muted)
            } else {
                row
            }
        })
        .collect();

    let mut header_cells = vec!["Name"];
    let mut widths = vec![Constraint::Min(16)];
    if across_categories {
        header_cells.push("Category");
        widths.push(Constraint::Percentage(25));
    }
    header_cells.extend(["Qty", "Price", "Status", "Min", "Image"]);
    widths.extend([
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(5),
        Constraint::Length(5),
    ]);

    let header = Row::new(header_cells)
        .style(app.style("item_header").add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(app.style("item_selected"));

    let mut state = TableState::default().with_selected(Some(app.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

/// The "nothing here yet" message, vertically centered in `area`.
pub(super) fn render_empty_state(f: &mut Frame, app: &App, area: Rect) {
    if area.height < 2 {
        return;
    }
    let hint = app
        .keybindings
        .key_for(crate::keybindings::Action::AddItem)
        .map(|key| format!("Press {} to add an item", key))
        .unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled(
            "No items in inventory",
            app.style("empty_state").add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Get started by adding your first inventory item.",
            app.style("empty_state"),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().add_modifier(Modifier::DIM))),
    ];
    let height = (lines.len() as u16).min(area.height);
    let y = area.y + area.height.saturating_sub(height) / 2;
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(paragraph, Rect::new(area.x, y, area.width, height));
}
