use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::date::CalendarDate;
use crate::draft::DateField;
use crate::store::{Action, InvoiceEdit, ItemEdit};
use crate::ui::components::field::field_line;

pub enum InvoiceFormAction {
    OpenSettings,
    NewCustomer,
    Generate,
    Exit,
}

#[derive(Clone, Copy, PartialEq)]
pub enum FormFocus {
    Customer,
    InvoiceDate,
    DueDate,
    Items,
}

#[derive(Clone, Copy, PartialEq)]
pub enum ItemColumn {
    Description,
    Date,
    Hours,
    Rate,
}

impl ItemColumn {
    fn next(self) -> Self {
        match self {
            ItemColumn::Description => ItemColumn::Date,
            ItemColumn::Date => ItemColumn::Hours,
            ItemColumn::Hours => ItemColumn::Rate,
            ItemColumn::Rate => ItemColumn::Description,
        }
    }

    fn previous(self) -> Self {
        match self {
            ItemColumn::Description => ItemColumn::Rate,
            ItemColumn::Date => ItemColumn::Description,
            ItemColumn::Hours => ItemColumn::Date,
            ItemColumn::Rate => ItemColumn::Hours,
        }
    }
}

pub struct InvoiceFormState {
    focus: FormFocus,
    editing: bool,
    item_column: ItemColumn,
    items_state: TableState,
    active_input: String,
    status: Option<String>,
    error: Option<String>,
}

impl InvoiceFormState {
    pub fn new() -> Self {
        let mut items_state = TableState::default();
        items_state.select(Some(0));

        Self {
            focus: FormFocus::Customer,
            editing: false,
            item_column: ItemColumn::Description,
            items_state,
            active_input: String::new(),
            status: None,
            error: None,
        }
    }

    fn selected_item(&self) -> usize {
        self.items_state.selected().unwrap_or(0)
    }

    /// The invoice was emitted: the store holds a fresh invoice now, so the
    /// selection collapses back to its single row.
    pub fn finish_emission(&mut self, status: String) {
        self.items_state.select(Some(0));
        self.editing = false;
        self.error = None;
        self.status = Some(status);
    }

    pub fn show_error(&mut self, message: String) {
        self.status = None;
        self.error = Some(message);
    }

    fn next_focus_down(&mut self, item_count: usize) {
        self.focus = match self.focus {
            FormFocus::Customer => FormFocus::InvoiceDate,
            FormFocus::InvoiceDate => FormFocus::DueDate,
            FormFocus::DueDate => FormFocus::Items,
            FormFocus::Items => {
                let selected = self.selected_item();
                if selected + 1 < item_count {
                    self.items_state.select(Some(selected + 1));
                }
                FormFocus::Items
            }
        };
    }

    fn next_focus_up(&mut self) {
        self.focus = match self.focus {
            FormFocus::Customer => FormFocus::Customer,
            FormFocus::InvoiceDate => FormFocus::Customer,
            FormFocus::DueDate => FormFocus::InvoiceDate,
            FormFocus::Items => {
                let selected = self.selected_item();
                if selected > 0 {
                    self.items_state.select(Some(selected - 1));
                    FormFocus::Items
                } else {
                    FormFocus::DueDate
                }
            }
        };
    }

    /// Cycle the invoice's customer through the committed customer list.
    fn cycle_customer(&mut self, app: &mut App, forward: bool) {
        let customers = &app.state().customers;
        if customers.is_empty() {
            return;
        }

        let current = app
            .state()
            .current_invoice
            .customer
            .and_then(|id| customers.iter().position(|c| c.id == id));
        let index = match (current, forward) {
            (Some(i), true) => (i + 1) % customers.len(),
            (Some(i), false) => (i + customers.len() - 1) % customers.len(),
            (None, _) => 0,
        };
        let id = customers[index].id;
        app.dispatch(Action::UpdateInvoiceField(InvoiceEdit::Customer(Some(id))));
    }

    fn start_editing(&mut self, app: &mut App) {
        match self.focus {
            FormFocus::Customer => {
                self.cycle_customer(app, true);
            }
            FormFocus::InvoiceDate | FormFocus::DueDate => {
                self.editing = true;
            }
            FormFocus::Items => {
                let index = self.selected_item();
                match self.item_column {
                    ItemColumn::Description | ItemColumn::Date => {}
                    ItemColumn::Hours => {
                        self.active_input =
                            app.state().current_invoice.items[index].hours.to_string();
                    }
                    ItemColumn::Rate => {
                        self.active_input =
                            app.state().current_invoice.items[index].rate.to_string();
                    }
                }
                self.editing = true;
            }
        }
        self.status = None;
        self.error = None;
    }

    /// Leave edit mode. Dates blur (reverting unparsable text); staged
    /// numerics commit when asked to, with malformed input coerced to zero.
    fn stop_editing(&mut self, app: &mut App, commit: bool) {
        match self.focus {
            FormFocus::InvoiceDate => app.blur_date(DateField::InvoiceDate),
            FormFocus::DueDate => app.blur_date(DateField::DueDate),
            FormFocus::Items => {
                let index = self.selected_item();
                match self.item_column {
                    ItemColumn::Description => {}
                    ItemColumn::Date => app.blur_date(DateField::Item(index)),
                    ItemColumn::Hours => {
                        if commit {
                            let hours = self.active_input.parse().unwrap_or(0.0_f64).max(0.0);
                            app.dispatch(Action::UpdateInvoiceItem {
                                index,
                                edit: ItemEdit::Hours(hours),
                            });
                        }
                    }
                    ItemColumn::Rate => {
                        if commit {
                            let rate = self.active_input.parse().unwrap_or(0.0_f64).max(0.0);
                            app.dispatch(Action::UpdateInvoiceItem {
                                index,
                                edit: ItemEdit::Rate(rate),
                            });
                        }
                    }
                }
            }
            FormFocus::Customer => {}
        }
        self.editing = false;
        self.active_input.clear();
    }

    /// Route a keystroke to whatever is being edited. Date fields go through
    /// the draft buffers (committing as soon as the text parses); the
    /// description commits on every keystroke; hours and rate stage locally
    /// until Enter.
    fn edit_key(&mut self, app: &mut App, key: KeyCode) {
        match self.focus {
            FormFocus::InvoiceDate => edit_date_key(app, DateField::InvoiceDate, key),
            FormFocus::DueDate => edit_date_key(app, DateField::DueDate, key),
            FormFocus::Items => {
                let index = self.selected_item();
                match self.item_column {
                    ItemColumn::Description => {
                        let mut text =
                            app.state().current_invoice.items[index].description.clone();
                        match key {
                            KeyCode::Char(c) => text.push(c),
                            KeyCode::Backspace => {
                                text.pop();
                            }
                            _ => return,
                        }
                        app.dispatch(Action::UpdateInvoiceItem {
                            index,
                            edit: ItemEdit::Description(text),
                        });
                    }
                    ItemColumn::Date => edit_date_key(app, DateField::Item(index), key),
                    ItemColumn::Hours | ItemColumn::Rate => match key {
                        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                            self.active_input.push(c);
                        }
                        KeyCode::Backspace => {
                            self.active_input.pop();
                        }
                        _ => {}
                    },
                }
            }
            FormFocus::Customer => {}
        }
    }

    fn add_item(&mut self, app: &mut App) {
        app.dispatch(Action::AddInvoiceItem {
            today: CalendarDate::today(),
        });
        let last = app.state().current_invoice.items.len() - 1;
        self.items_state.select(Some(last));
        self.focus = FormFocus::Items;
        self.item_column = ItemColumn::Description;
    }

    fn remove_item(&mut self, app: &mut App) {
        let count = app.state().current_invoice.items.len();
        if count == 1 {
            // the invoice always keeps at least one line item
            self.show_error("An invoice needs at least one line item".to_string());
            return;
        }

        let index = self.selected_item();
        app.dispatch(Action::RemoveInvoiceItem { index });

        let remaining = app.state().current_invoice.items.len();
        let new_selection = if index >= remaining { remaining - 1 } else { index };
        self.items_state.select(Some(new_selection));
    }
}

fn edit_date_key(app: &mut App, field: DateField, key: KeyCode) {
    let mut text = app.drafts().text(field).to_string();
    match key {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => return,
    }
    app.edit_date(field, text);
}

pub fn render_invoice_form<B: Backend>(f: &mut Frame<B>, state: &mut InvoiceFormState, app: &App) {
    let palette = app.palette();
    let snapshot = app.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Length(3), // Customer
                Constraint::Length(3), // Invoice number and dates
                Constraint::Min(6),    // Line items
                Constraint::Length(3), // Totals
                Constraint::Length(3), // Status / help
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Sinvoice - Invoices made simple")
        .style(Style::default().fg(palette.accent))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_customer_line(f, state, app, chunks[1]);
    render_details(f, state, app, chunks[2]);
    render_items(f, state, app, chunks[3]);

    let subtotal = snapshot.current_invoice.subtotal();
    let totals = Paragraph::new(Spans::from(vec![
        Span::styled("Subtotal: ", Style::default().fg(palette.dim)),
        Span::styled(
            format!("{} {:.2}", snapshot.settings.currency, subtotal),
            Style::default().fg(palette.text),
        ),
        Span::raw("    "),
        Span::styled("Total: ", Style::default().fg(palette.dim)),
        Span::styled(
            format!("{} {:.2}", snapshot.settings.currency, subtotal),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(totals, chunks[4]);

    render_message_bar(f, state, app, chunks[5]);
}

fn render_customer_line<B: Backend>(
    f: &mut Frame<B>,
    state: &InvoiceFormState,
    app: &App,
    area: Rect,
) {
    let palette = app.palette();
    let snapshot = app.state();

    let name = snapshot
        .current_invoice
        .customer
        .and_then(|id| snapshot.customer(id))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "(select a customer)".to_string());

    let line = field_line(
        "Customer",
        &name,
        state.focus == FormFocus::Customer,
        false,
        &palette,
    );
    let customer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(customer, area);
}

fn render_details<B: Backend>(f: &mut Frame<B>, state: &InvoiceFormState, app: &App, area: Rect) {
    let palette = app.palette();
    let snapshot = app.state();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(area);

    let number = Paragraph::new(Spans::from(vec![
        Span::styled("Invoice #: ", Style::default().fg(palette.dim)),
        Span::styled(
            snapshot.settings.invoice_label(),
            Style::default().fg(palette.text),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(number, columns[0]);

    let placeholder = snapshot.settings.date_format.placeholder();

    for (field, name, area) in [
        (DateField::InvoiceDate, "Invoice Date", columns[1]),
        (DateField::DueDate, "Due Date", columns[2]),
    ] {
        let focused = matches!(
            (field, state.focus),
            (DateField::InvoiceDate, FormFocus::InvoiceDate) | (DateField::DueDate, FormFocus::DueDate)
        );
        let text = app.drafts().text(field);
        let line = if text.is_empty() && !(focused && state.editing) {
            Spans::from(vec![
                Span::styled(
                    format!("{}: ", name),
                    if focused {
                        Style::default().fg(palette.highlight)
                    } else {
                        Style::default().fg(palette.dim)
                    },
                ),
                Span::styled(placeholder, Style::default().fg(palette.dim)),
            ])
        } else {
            field_line(name, text, focused, state.editing, &palette)
        };
        let widget = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, area);
    }
}

fn render_items<B: Backend>(f: &mut Frame<B>, state: &mut InvoiceFormState, app: &App, area: Rect) {
    let palette = app.palette();
    let snapshot = app.state();
    let focused = state.focus == FormFocus::Items;
    let selected = state.selected_item();

    let header_style = |column: ItemColumn| {
        if focused && state.item_column == column {
            Style::default()
                .fg(palette.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.dim)
        }
    };

    let header = Row::new(vec![
        Cell::from("Description").style(header_style(ItemColumn::Description)),
        Cell::from("Date").style(header_style(ItemColumn::Date)),
        Cell::from("Hours").style(header_style(ItemColumn::Hours)),
        Cell::from(format!("Rate ({})", snapshot.settings.currency))
            .style(header_style(ItemColumn::Rate)),
        Cell::from("Total").style(Style::default().fg(palette.dim)),
    ]);

    let editing_cell = |row: usize, column: ItemColumn| {
        focused && state.editing && row == selected && state.item_column == column
    };

    let rows: Vec<Row> = snapshot
        .current_invoice
        .items
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let description = if editing_cell(row, ItemColumn::Description) {
                format!("{}|", item.description)
            } else {
                item.description.clone()
            };
            let date = if editing_cell(row, ItemColumn::Date) {
                format!("{}|", app.drafts().text(DateField::Item(row)))
            } else {
                app.drafts().text(DateField::Item(row)).to_string()
            };
            let hours = if editing_cell(row, ItemColumn::Hours) {
                format!("{}|", state.active_input)
            } else {
                item.hours.to_string()
            };
            let rate = if editing_cell(row, ItemColumn::Rate) {
                format!("{}|", state.active_input)
            } else {
                format!("{:.2}", item.rate)
            };

            Row::new(vec![
                Cell::from(description),
                Cell::from(date),
                Cell::from(hours),
                Cell::from(rate),
                Cell::from(format!("{:.2}", item.total())),
            ])
            .style(Style::default().fg(palette.text))
        })
        .collect();

    let block_style = if focused {
        Style::default().fg(palette.highlight)
    } else {
        Style::default()
    };
    let widths = [
        Constraint::Percentage(38),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Line Items")
                .style(block_style),
        )
        .highlight_style(
            Style::default()
                .fg(palette.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ")
        .widths(&widths);

    f.render_stateful_widget(table, area, &mut state.items_state);
}

fn render_message_bar<B: Backend>(
    f: &mut Frame<B>,
    state: &InvoiceFormState,
    app: &App,
    area: Rect,
) {
    let palette = app.palette();

    let (text, style) = if let Some(error) = &state.error {
        (error.clone(), Style::default().fg(palette.danger))
    } else if let Some(status) = &state.status {
        (status.clone(), Style::default().fg(palette.accent))
    } else {
        let help = match (state.editing, state.focus) {
            (true, _) => "Enter - Save field | Esc - Cancel editing",
            (false, FormFocus::Customer) => {
                "Left/Right - Select customer | N - New customer | Down - Next field | G - Generate | S - Settings | Esc - Quit"
            }
            (false, FormFocus::Items) => {
                "Left/Right - Column | Up/Down - Row | Enter - Edit | A - Add item | D - Delete item | G - Generate | Esc - Quit"
            }
            (false, _) => {
                "Enter - Edit field | Up/Down - Navigate | G - Generate | S - Settings | Esc - Quit"
            }
        };
        (help.to_string(), Style::default().fg(palette.dim))
    };

    let bar = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}

pub fn handle_input(
    state: &mut InvoiceFormState,
    app: &mut App,
) -> Result<Option<InvoiceFormAction>> {
    if let Event::Key(key) = event::read()? {
        if state.editing {
            match key.code {
                KeyCode::Enter => state.stop_editing(app, true),
                KeyCode::Esc => state.stop_editing(app, false),
                code => state.edit_key(app, code),
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => return Ok(Some(InvoiceFormAction::Exit)),
            KeyCode::Char('s') => return Ok(Some(InvoiceFormAction::OpenSettings)),
            KeyCode::Char('g') => return Ok(Some(InvoiceFormAction::Generate)),
            KeyCode::Char('n') => return Ok(Some(InvoiceFormAction::NewCustomer)),
            KeyCode::Enter => state.start_editing(app),
            KeyCode::Down => state.next_focus_down(app.state().current_invoice.items.len()),
            KeyCode::Up => state.next_focus_up(),
            KeyCode::Left => match state.focus {
                FormFocus::Customer => state.cycle_customer(app, false),
                FormFocus::Items => state.item_column = state.item_column.previous(),
                _ => {}
            },
            KeyCode::Right => match state.focus {
                FormFocus::Customer => state.cycle_customer(app, true),
                FormFocus::Items => state.item_column = state.item_column.next(),
                _ => {}
            },
            KeyCode::Char('a') if state.focus == FormFocus::Items => state.add_item(app),
            KeyCode::Char('d') if state.focus == FormFocus::Items => state.remove_item(app),
            _ => {}
        }
    }

    Ok(None)
}
