use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::theme::Palette;
use crate::ui::components::field::field_line;

pub enum CustomerWizardAction {
    Cancel,
    Save { name: String, address: String },
}

#[derive(Clone, Copy, PartialEq)]
enum CustomerField {
    Name,
    Address,
}

pub struct CustomerWizardState {
    name: String,
    address: String,
    current_field: CustomerField,
    editing: bool,
}

impl CustomerWizardState {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            current_field: CustomerField::Name,
            editing: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            CustomerField::Name => CustomerField::Address,
            CustomerField::Address => CustomerField::Name,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            CustomerField::Name => &mut self.name,
            CustomerField::Address => &mut self.address,
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.address.trim().is_empty()
    }
}

pub fn render_customer_wizard<B: Backend>(
    f: &mut Frame<B>,
    state: &CustomerWizardState,
    palette: &Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("New Customer")
        .style(Style::default().fg(palette.accent))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = [
        ("Name", &state.name, CustomerField::Name),
        ("Address", &state.address, CustomerField::Address),
    ]
    .into_iter()
    .map(|(name, value, field)| {
        ListItem::new(field_line(
            name,
            value,
            state.current_field == field,
            state.editing,
            palette,
        ))
    })
    .collect();

    let form = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Customer Details"),
    );
    f.render_widget(form, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | S - Save customer | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(palette.dim))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut CustomerWizardState) -> Result<Option<CustomerWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(CustomerWizardAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up | KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.is_valid() {
                    return Ok(Some(CustomerWizardAction::Save {
                        name: state.name.trim().to_string(),
                        address: state.address.trim().to_string(),
                    }));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}
