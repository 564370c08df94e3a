use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::SettingsPatch;
use crate::store::Action;
use crate::ui::components::field::field_line;

pub enum SettingsFormAction {
    Back,
}

#[derive(Clone, Copy, PartialEq)]
pub enum SettingsField {
    CompanyName,
    CompanyAddress,
    CompanyIcon,
    InvoicePrefix,
    InvoiceNumber,
    DeadlineDays,
    DefaultHourlyRate,
    FooterText,
    OutputDir,
    BankName,
    BankAccountNumber,
    Currency,
    DateFormat,
    Theme,
}

pub struct SettingsFormState {
    current_field: SettingsField,
    editing: bool,
    active_input: String,
}

impl SettingsFormState {
    pub fn new() -> Self {
        Self {
            current_field: SettingsField::CompanyName,
            editing: false,
            active_input: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            SettingsField::CompanyName => SettingsField::CompanyAddress,
            SettingsField::CompanyAddress => SettingsField::CompanyIcon,
            SettingsField::CompanyIcon => SettingsField::InvoicePrefix,
            SettingsField::InvoicePrefix => SettingsField::InvoiceNumber,
            SettingsField::InvoiceNumber => SettingsField::DeadlineDays,
            SettingsField::DeadlineDays => SettingsField::DefaultHourlyRate,
            SettingsField::DefaultHourlyRate => SettingsField::FooterText,
            SettingsField::FooterText => SettingsField::OutputDir,
            SettingsField::OutputDir => SettingsField::BankName,
            SettingsField::BankName => SettingsField::BankAccountNumber,
            SettingsField::BankAccountNumber => SettingsField::Currency,
            SettingsField::Currency => SettingsField::DateFormat,
            SettingsField::DateFormat => SettingsField::Theme,
            SettingsField::Theme => SettingsField::CompanyName,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            SettingsField::CompanyName => SettingsField::Theme,
            SettingsField::CompanyAddress => SettingsField::CompanyName,
            SettingsField::CompanyIcon => SettingsField::CompanyAddress,
            SettingsField::InvoicePrefix => SettingsField::CompanyIcon,
            SettingsField::InvoiceNumber => SettingsField::InvoicePrefix,
            SettingsField::DeadlineDays => SettingsField::InvoiceNumber,
            SettingsField::DefaultHourlyRate => SettingsField::DeadlineDays,
            SettingsField::FooterText => SettingsField::DefaultHourlyRate,
            SettingsField::OutputDir => SettingsField::FooterText,
            SettingsField::BankName => SettingsField::OutputDir,
            SettingsField::BankAccountNumber => SettingsField::BankName,
            SettingsField::Currency => SettingsField::BankAccountNumber,
            SettingsField::DateFormat => SettingsField::Currency,
            SettingsField::Theme => SettingsField::DateFormat,
        };
    }

    /// Begin editing the focused field, staging its current value as text.
    fn start_editing(&mut self, app: &App) {
        let settings = &app.state().settings;
        self.active_input = match self.current_field {
            SettingsField::CompanyName => settings.company_name.clone(),
            SettingsField::CompanyAddress => settings.company_address.clone(),
            SettingsField::CompanyIcon => settings
                .company_icon
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            SettingsField::InvoicePrefix => settings.invoice_prefix.clone(),
            SettingsField::InvoiceNumber => settings.invoice_number.to_string(),
            SettingsField::DeadlineDays => settings.deadline_days.to_string(),
            SettingsField::DefaultHourlyRate => settings.default_hourly_rate.to_string(),
            SettingsField::FooterText => settings.footer_text.clone(),
            SettingsField::OutputDir => settings.output_dir.display().to_string(),
            SettingsField::BankName => settings.bank_name.clone(),
            SettingsField::BankAccountNumber => settings.bank_account_number.clone(),
            SettingsField::Currency => settings.currency.clone(),
            // enumerated fields cycle instead of taking text
            SettingsField::DateFormat | SettingsField::Theme => return,
        };
        self.editing = true;
    }

    /// Commit the staged text as a single-field settings patch. Malformed
    /// numeric input is coerced to zero, matching the numeric inputs on the
    /// invoice form.
    fn commit(&mut self, app: &mut App) {
        let text = self.active_input.trim().to_string();
        let mut patch = SettingsPatch::default();

        match self.current_field {
            SettingsField::CompanyName => patch.company_name = Some(text),
            SettingsField::CompanyAddress => patch.company_address = Some(text),
            SettingsField::CompanyIcon => {
                patch.company_icon = Some(if text.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(text))
                });
            }
            SettingsField::InvoicePrefix => patch.invoice_prefix = Some(text),
            SettingsField::InvoiceNumber => {
                patch.invoice_number = Some(text.parse().unwrap_or(0).max(1));
            }
            SettingsField::DeadlineDays => {
                patch.deadline_days = Some(text.parse().unwrap_or(0));
            }
            SettingsField::DefaultHourlyRate => {
                patch.default_hourly_rate = Some(text.parse().unwrap_or(0.0_f64).max(0.0));
            }
            SettingsField::FooterText => patch.footer_text = Some(text),
            SettingsField::OutputDir => patch.output_dir = Some(PathBuf::from(text)),
            SettingsField::BankName => patch.bank_name = Some(text),
            SettingsField::BankAccountNumber => patch.bank_account_number = Some(text),
            SettingsField::Currency => patch.currency = Some(text),
            SettingsField::DateFormat | SettingsField::Theme => return,
        }

        app.dispatch(Action::SetSettings(patch));
        self.editing = false;
        self.active_input.clear();
    }

    /// Enumerated fields advance to their next variant on activation.
    fn cycle(&self, app: &mut App) {
        let settings = &app.state().settings;
        let mut patch = SettingsPatch::default();
        match self.current_field {
            SettingsField::DateFormat => patch.date_format = Some(settings.date_format.cycled()),
            SettingsField::Theme => patch.theme = Some(settings.theme.cycled()),
            _ => return,
        }
        app.dispatch(Action::SetSettings(patch));
    }

    fn is_enumerated(&self) -> bool {
        matches!(
            self.current_field,
            SettingsField::DateFormat | SettingsField::Theme
        )
    }
}

pub fn render_settings_form<B: Backend>(f: &mut Frame<B>, state: &SettingsFormState, app: &App) {
    let palette = app.palette();
    let settings = &app.state().settings;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(16),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Settings")
        .style(Style::default().fg(palette.accent))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let fields = [
        (
            "Company Name",
            settings.company_name.clone(),
            SettingsField::CompanyName,
        ),
        (
            "Company Address",
            settings.company_address.clone(),
            SettingsField::CompanyAddress,
        ),
        (
            "Company Icon",
            settings
                .company_icon
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
            SettingsField::CompanyIcon,
        ),
        (
            "Invoice Prefix",
            settings.invoice_prefix.clone(),
            SettingsField::InvoicePrefix,
        ),
        (
            "Next Invoice Number",
            settings.invoice_number.to_string(),
            SettingsField::InvoiceNumber,
        ),
        (
            "Deadline (days)",
            settings.deadline_days.to_string(),
            SettingsField::DeadlineDays,
        ),
        (
            "Default Hourly Rate",
            format!("{:.2}", settings.default_hourly_rate),
            SettingsField::DefaultHourlyRate,
        ),
        (
            "Footer Text",
            settings.footer_text.clone(),
            SettingsField::FooterText,
        ),
        (
            "Output Directory",
            settings.output_dir.display().to_string(),
            SettingsField::OutputDir,
        ),
        ("Bank Name", settings.bank_name.clone(), SettingsField::BankName),
        (
            "Bank Account Number",
            settings.bank_account_number.clone(),
            SettingsField::BankAccountNumber,
        ),
        ("Currency", settings.currency.clone(), SettingsField::Currency),
        (
            "Date Format",
            settings.date_format.placeholder().to_string(),
            SettingsField::DateFormat,
        ),
        (
            "Theme",
            settings.theme.label().to_string(),
            SettingsField::Theme,
        ),
    ];

    let items: Vec<ListItem> = fields
        .into_iter()
        .map(|(name, value, field)| {
            let focused = state.current_field == field;
            let shown = if focused && state.editing {
                state.active_input.clone()
            } else {
                value
            };
            ListItem::new(field_line(name, &shown, focused, state.editing, &palette))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(form, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else if state.is_enumerated() {
        "Enter - Next value | Up/Down - Navigate fields | Esc - Back"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | Esc - Back"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(palette.dim))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(
    state: &mut SettingsFormState,
    app: &mut App,
) -> Result<Option<SettingsFormAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.editing = false;
                    state.active_input.clear();
                } else {
                    return Ok(Some(SettingsFormAction::Back));
                }
            }
            KeyCode::Enter => {
                if state.editing {
                    state.commit(app);
                } else if state.is_enumerated() {
                    state.cycle(app);
                } else {
                    state.start_editing(app);
                }
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char(c) if state.editing => {
                state.active_input.push(c);
            }
            KeyCode::Backspace if state.editing => {
                state.active_input.pop();
            }
            _ => {}
        }
    }

    Ok(None)
}
