use crate::app::App;
use crate::catalog::Category;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Narrowest a tile may get before a column is dropped.
const TILE_MIN_WIDTH: u16 = 26;
const TILE_HEIGHT: u16 = 5;
const MAX_COLUMNS: usize = 5;

/// Grid column count for a panel `width` columns wide (1 to 5).
pub(super) fn columns_for_width(width: u16) -> usize {
    ((width.saturating_sub(2) / TILE_MIN_WIDTH) as usize).clamp(1, MAX_COLUMNS)
}

/// Render the category grid, scrolled so the selected tile stays visible.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(Span::styled(" Categories ", app.style("title")));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let categories = app.visible_categories();
    if categories.is_empty() {
        if app.has_loaded {
            super::items::render_empty_state(f, app, inner);
        }
        return;
    }

    let cols = app.grid_columns.clamp(1, MAX_COLUMNS);
    let visible_rows = ((inner.height / TILE_HEIGHT) as usize).max(1);
    let selected_row = app.selected_tile / cols;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let row_areas = Layout::vertical(vec![Constraint::Length(TILE_HEIGHT); visible_rows]).split(inner);
    for (r, row_area) in row_areas.iter().enumerate() {
        let col_areas =
            Layout::horizontal(vec![Constraint::Ratio(1, cols as u32); cols]).split(*row_area);
        for (c, tile_area) in col_areas.iter().enumerate() {
            let idx = (first_row + r) * cols + c;
            let Some(category) = categories.get(idx) else {
                return;
            };
            render_tile(f, app, category, idx == app.selected_tile, *tile_area);
        }
    }
}

fn render_tile(f: &mut Frame, app: &App, category: &Category, selected: bool, area: Rect) {
    if area.width < 6 || area.height < 3 {
        return;
    }

    let border = if selected {
        app.style("tile_selected")
    } else {
        app.style("panel_border")
    };
    let name_style = if selected {
        app.style("tile_selected")
    } else {
        app.style("tile_normal")
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let count = app.category_count(category.name);
    let count_text = if count == 1 {
        "1 item".to_string()
    } else {
        format!("{} items", count)
    };
    let image = category.image.rsplit('/').next().unwrap_or(category.image);

    let lines = vec![
        Line::from(Span::styled(
            truncate_to_width(category.name, inner_width).into_owned(),
            name_style,
        )),
        Line::from(Span::styled(count_text, app.style("tile_count"))),
        Line::from(Span::styled(
            truncate_to_width(image, inner_width).into_owned(),
            app.style("tile_image"),
        )),
    ];

    let tile = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
    f.render_widget(tile, area);
}
