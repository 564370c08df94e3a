use tui::{
    style::{Modifier, Style},
    text::{Span, Spans},
};

use crate::theme::Palette;

/// One labeled "Name: value" form line: highlighted while focused, with a
/// cursor bar appended while editing.
pub fn field_line(
    name: &str,
    value: &str,
    focused: bool,
    editing: bool,
    palette: &Palette,
) -> Spans<'static> {
    let label_style = if focused {
        Style::default().fg(palette.highlight)
    } else {
        Style::default().fg(palette.dim)
    };

    let value_span = if focused && editing {
        Span::styled(
            format!("{}|", value),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(value.to_string(), Style::default().fg(palette.text))
    };

    Spans::from(vec![
        Span::styled(format!("{}: ", name), label_style),
        value_span,
    ])
}
