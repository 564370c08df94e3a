mod app;
mod config;
mod date;
mod document;
mod draft;
mod models;
mod store;
mod theme;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::app::App;
use crate::date::CalendarDate;
use crate::document::DocumentWriter;
use crate::models::Customer;
use crate::store::{Action, InvoiceEdit, Store};
use crate::theme::{TerminalAppearance, ThemeEngine};
use crate::ui::{
    customer_wizard::{
        handle_input as handle_customer_wizard_input, render_customer_wizard,
        CustomerWizardAction, CustomerWizardState,
    },
    invoice_form::{
        handle_input as handle_invoice_form_input, render_invoice_form, InvoiceFormAction,
        InvoiceFormState,
    },
    settings_form::{
        handle_input as handle_settings_form_input, render_settings_form, SettingsFormAction,
        SettingsFormState,
    },
};

#[derive(Parser)]
#[command(name = "sinvoice", about = "Invoices made simple, in the terminal")]
struct Cli {
    /// Directory generated invoices are written to (overrides SINVOICE_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON file with the startup customer list (overrides SINVOICE_CUSTOMERS_FILE)
    #[arg(long)]
    customers_file: Option<PathBuf>,
}

// Represents the current screen in the app
enum AppScreen {
    InvoiceForm,
    SettingsForm,
    CustomerWizard,
}

// Main application state
struct Shell {
    app: App,
    screen: AppScreen,
    invoice_form: InvoiceFormState,
    settings_form: SettingsFormState,
    customer_wizard: Option<CustomerWizardState>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let cli = Cli::parse();
    let mut config = config::init()?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(file) = cli.customers_file {
        config.customers_file = Some(file);
    }

    // Inject startup state
    let customers = config.load_customers()?;
    let settings = config.into_settings();
    info!(customers = customers.len(), "starting session");

    let theme = ThemeEngine::new(Box::new(TerminalAppearance), settings.theme);
    let store = Store::new(settings, CalendarDate::today());
    let mut app = App::new(store, theme);
    if !customers.is_empty() {
        app.dispatch(Action::SetCustomers(customers));
    }

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut shell = Shell {
        app,
        screen: AppScreen::InvoiceForm,
        invoice_form: InvoiceFormState::new(),
        settings_form: SettingsFormState::new(),
        customer_wizard: None,
    };

    // Run the main app loop
    let result = run_app(&mut terminal, &mut shell).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, shell: &mut Shell) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match shell.screen {
            AppScreen::InvoiceForm => {
                render_invoice_form(f, &mut shell.invoice_form, &shell.app);
            }
            AppScreen::SettingsForm => {
                render_settings_form(f, &shell.settings_form, &shell.app);
            }
            AppScreen::CustomerWizard => {
                if let Some(state) = &shell.customer_wizard {
                    let palette = shell.app.palette();
                    render_customer_wizard(f, state, &palette);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match shell.screen {
            AppScreen::InvoiceForm => handle_invoice_form_screen(shell).await?,
            AppScreen::SettingsForm => handle_settings_form_screen(shell)?,
            AppScreen::CustomerWizard => handle_customer_wizard_screen(shell)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_invoice_form_screen(shell: &mut Shell) -> Result<bool> {
    match handle_invoice_form_input(&mut shell.invoice_form, &mut shell.app)? {
        Some(InvoiceFormAction::Exit) => {
            return Ok(true);
        }
        Some(InvoiceFormAction::OpenSettings) => {
            shell.screen = AppScreen::SettingsForm;
        }
        Some(InvoiceFormAction::NewCustomer) => {
            shell.customer_wizard = Some(CustomerWizardState::new());
            shell.screen = AppScreen::CustomerWizard;
        }
        Some(InvoiceFormAction::Generate) => {
            generate_invoice(shell).await?;
        }
        None => {}
    }

    Ok(false)
}

/// Emit the invoice document. The await below is the event loop's only
/// suspension point: no input is handled, and no transition dispatched, until
/// the emission resolves, so a second generate request cannot re-enter it.
async fn generate_invoice(shell: &mut Shell) -> Result<()> {
    let writer = DocumentWriter::new(&shell.app.state().settings.output_dir)?;

    match shell.app.emit(&writer).await {
        Ok((_, pdf_path)) => {
            shell
                .invoice_form
                .finish_emission(format!("Saved {}", pdf_path.display()));
        }
        Err(err) => {
            shell.invoice_form.show_error(err.to_string());
        }
    }

    Ok(())
}

fn handle_settings_form_screen(shell: &mut Shell) -> Result<bool> {
    match handle_settings_form_input(&mut shell.settings_form, &mut shell.app)? {
        Some(SettingsFormAction::Back) => {
            shell.screen = AppScreen::InvoiceForm;
        }
        None => {}
    }

    Ok(false)
}

fn handle_customer_wizard_screen(shell: &mut Shell) -> Result<bool> {
    if let Some(state) = &mut shell.customer_wizard {
        match handle_customer_wizard_input(state)? {
            Some(CustomerWizardAction::Cancel) => {
                shell.customer_wizard = None;
                shell.screen = AppScreen::InvoiceForm;
            }
            Some(CustomerWizardAction::Save { name, address }) => {
                // New customers are appended and immediately selected on the
                // invoice being built.
                let id = shell.app.state().next_customer_id();
                shell
                    .app
                    .dispatch(Action::AddCustomer(Customer { id, name, address }));
                shell
                    .app
                    .dispatch(Action::UpdateInvoiceField(InvoiceEdit::Customer(Some(id))));

                shell.customer_wizard = None;
                shell.screen = AppScreen::InvoiceForm;
            }
            None => {}
        }
    }

    Ok(false)
}
