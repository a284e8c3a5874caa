//! Account creation screen.

use crate::app::App;
use crate::forms::SignupField;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::form::tail_to_width;
use super::render::{centered_fixed, spinner_glyph};

const LABEL_WIDTH: usize = 18;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"))
        .title(Span::styled(" Stockroom ", app.style("title")));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let height = SignupField::ALL.len() as u16 + 8;
    let panel = centered_fixed(64, height, inner);
    if panel.width < 30 || panel.height < 8 {
        return;
    }

    let form = &app.signup;
    let value_width = (panel.width as usize).saturating_sub(LABEL_WIDTH + 5);
    let mut lines: Vec<Line> = Vec::with_capacity(SignupField::ALL.len() + 6);
    lines.push(Line::from(Span::styled(
        "Set up an account to manage your inventory.",
        app.style("item_muted"),
    )));
    lines.push(Line::from(""));

    for field in SignupField::ALL {
        let focused = form.focus == field;
        let shown = form.display_value(field);
        let value = match (field, focused) {
            (SignupField::Role, true) => format!("< {} >", shown),
            (SignupField::Role, false) => shown,
            (_, true) => format!("{}_", tail_to_width(&shown, value_width.saturating_sub(1))),
            (_, false) => tail_to_width(&shown, value_width).to_string(),
        };
        let style = if focused {
            app.style("form_input_focused")
        } else {
            app.style("form_input")
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}", field.label(), width = LABEL_WIDTH),
                app.style("form_label"),
            ),
            Span::styled(value, style),
        ]));
    }

    lines.push(Line::from(""));
    let button = if app.signup_submitting {
        format!("[ {} Creating account... ]", spinner_glyph(app.spinner_frame))
    } else {
        "[ Create Account ]".to_string()
    };
    lines.push(Line::from(Span::styled(
        button,
        app.style("form_button").add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "(Tab) Next  (Enter) Sign up  (Esc) Back",
        app.style("item_muted"),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(Span::styled(" Create Account ", app.style("title"))),
    );
    f.render_widget(paragraph, panel);
}
