//! Add/edit item modal.

use crate::app::App;
use crate::forms::{ItemField, ItemForm};
use crate::util::{display_width, strip_control_chars};
use ratatui::{
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::render::{centered_fixed, spinner_glyph};

const LABEL_WIDTH: usize = 18;

pub fn render(f: &mut Frame, app: &App, form: &ItemForm) {
    let height = ItemField::ALL.len() as u16 + 6;
    let overlay = centered_fixed(64, height, f.area());
    if overlay.width < 30 || overlay.height < 8 {
        return;
    }
    f.render_widget(Clear, overlay);

    let value_width = (overlay.width as usize).saturating_sub(LABEL_WIDTH + 5);
    let mut lines: Vec<Line> = Vec::with_capacity(ItemField::ALL.len() + 4);

    for field in ItemField::ALL {
        let focused = form.focus == field;
        let label = Span::styled(
            format!("{:<width$}", field.label(), width = LABEL_WIDTH),
            app.style("form_label"),
        );
        let raw = strip_control_chars(form.value(field));
        let value = if field == ItemField::Status {
            if focused {
                format!("< {} >", raw)
            } else {
                raw.to_string()
            }
        } else {
            // Keep the tail visible while typing past the field width
            let shown = tail_to_width(&raw, value_width.saturating_sub(1));
            if focused {
                format!("{}_", shown)
            } else {
                shown.to_string()
            }
        };
        let style = if focused {
            app.style("form_input_focused")
        } else {
            app.style("form_input")
        };
        lines.push(Line::from(vec![label, Span::styled(value, style)]));
    }

    lines.push(Line::from(""));
    let button = if app.is_submitting {
        format!(
            "[ {} {} ]",
            spinner_glyph(app.spinner_frame),
            form.submit_label(true)
        )
    } else {
        format!("[ {} ]", form.submit_label(false))
    };
    lines.push(Line::from(Span::styled(
        button,
        app.style("form_button").add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "(Tab) Next  (Enter) Save  (Esc) Cancel",
        app.style("item_muted"),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(Span::styled(format!(" {} ", form.title()), app.style("title"))),
    );
    f.render_widget(paragraph, overlay);
}

/// Last `max_width` columns of `s`, so the cursor end of a long value shows.
pub(super) fn tail_to_width(s: &str, max_width: usize) -> &str {
    if display_width(s) <= max_width {
        return s;
    }
    let mut width = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = idx;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_edit_form_strips_control_chars() {
        use crate::api::{InventoryClient, InventoryItem, ItemStatus};
        use ratatui::{backend::TestBackend, Terminal};
        use rust_decimal::Decimal;

        let client = InventoryClient::new("http://localhost:5000", 5, None).unwrap();
        let mut app = App::new(client);
        let item = InventoryItem {
            id: "1".into(),
            name: "Ghee\x1b[2J".into(),
            category: "Pet\u{7}Care".into(),
            quantity: 1,
            price: Decimal::new(1, 0),
            status: ItemStatus::InStock,
            image: None,
            minimum_quantity: None,
        };
        app.open_edit_form(&item);
        let form = app.form.clone().unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app, &form)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Ghee"));
        assert!(!screen.contains("[2J"));
        assert!(screen.contains("PetCare"));
        assert!(!screen.contains('\x1b'));
        assert!(!screen.contains('\u{7}'));
    }

    #[test]
    fn test_tail_to_width() {
        assert_eq!(tail_to_width("short", 10), "short");
        assert_eq!(tail_to_width("abcdefghij", 4), "ghij");
        assert_eq!(tail_to_width("米米米", 4), "米米");
        assert_eq!(tail_to_width("abc", 0), "");
    }
}
