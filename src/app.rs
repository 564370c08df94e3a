use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::date::{due, CalendarDate, DateFormat, Parsed};
use crate::document::{self, DocumentWriter};
use crate::draft::{DateField, DraftBuffers};
use crate::models::CurrentInvoice;
use crate::store::{Action, AppState, InvoiceEdit, ItemEdit, Store};
use crate::theme::{Palette, ThemeEngine};

/// Owns the session: the state store, the draft buffers layered over it, and
/// the theme engine. Every transition flows through [`App::dispatch`], which
/// runs the after-commit subscribers in a fixed order, so they only ever
/// observe fully committed state.
pub struct App {
    store: Store,
    drafts: DraftBuffers,
    theme: ThemeEngine,
}

impl App {
    pub fn new(store: Store, theme: ThemeEngine) -> Self {
        let drafts = DraftBuffers::seeded(store.state());
        App {
            store,
            drafts,
            theme,
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn drafts(&self) -> &DraftBuffers {
        &self.drafts
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    /// Commit one transition, then run the subscribers: due-date recompute,
    /// draft resync, theme resolution.
    pub fn dispatch(&mut self, action: Action) {
        let before_invoice = self.store.state().current_invoice.clone();
        let before_fmt = self.store.state().settings.date_format;
        let before_deadline = self.store.state().settings.deadline_days;

        self.store.dispatch(action);

        self.recompute_due_date(&before_invoice, before_deadline);
        self.resync_drafts(&before_invoice, before_fmt);
        self.resolve_theme();
    }

    /// Subscriber 1: the due date follows the invoice date and the deadline
    /// setting. It recomputes only when one of those two inputs changed
    /// across the commit, so a manual due-date edit stands until the next
    /// invoice-date or deadline change.
    fn recompute_due_date(&mut self, before: &CurrentInvoice, before_deadline: u32) {
        let state = self.store.state();
        let invoice_date = state.current_invoice.invoice_date;
        let deadline = state.settings.deadline_days;
        if invoice_date == before.invoice_date && deadline == before_deadline {
            return;
        }

        let recomputed = due::due_date(invoice_date, deadline);
        debug!(?recomputed, "recomputing due date");
        self.store
            .dispatch(Action::UpdateInvoiceField(InvoiceEdit::DueDate(recomputed)));
    }

    /// Subscriber 2: reformat draft text for fields whose committed value or
    /// display format changed under them.
    fn resync_drafts(&mut self, before: &CurrentInvoice, before_fmt: DateFormat) {
        self.drafts.resync(before, before_fmt, self.store.state());
    }

    /// Subscriber 3: re-resolve the theme. In `system` mode this re-probes
    /// the terminal, so preference changes are picked up live.
    fn resolve_theme(&mut self) {
        self.theme.resolve(self.store.state().settings.theme);
    }

    /// A keystroke in a date field: stage the text, and commit it when it
    /// parses (a cleared field commits as an unset date).
    pub fn edit_date(&mut self, field: DateField, text: String) {
        let fmt = self.store.state().settings.date_format;
        let Some(parsed) = self.drafts.edit(field, text, fmt) else {
            return;
        };

        let committed = match parsed {
            Parsed::Clear => None,
            Parsed::Date(date) => Some(date),
        };
        self.dispatch(match field {
            DateField::InvoiceDate => {
                Action::UpdateInvoiceField(InvoiceEdit::InvoiceDate(committed))
            }
            DateField::DueDate => Action::UpdateInvoiceField(InvoiceEdit::DueDate(committed)),
            DateField::Item(index) => Action::UpdateInvoiceItem {
                index,
                edit: ItemEdit::Date(committed),
            },
        });
    }

    /// Focus left a date field; unparsable text reverts to the committed
    /// value.
    pub fn blur_date(&mut self, field: DateField) {
        self.drafts.blur(field, self.store.state());
    }

    /// Emit the invoice document. On success the invoice number advances by
    /// exactly one and the form resets to a fresh invoice; on any failure
    /// nothing is mutated. The await on the writer is the session's only
    /// suspension point, and the caller handles no input while it is
    /// in flight.
    pub async fn emit(&mut self, writer: &DocumentWriter) -> Result<(PathBuf, PathBuf)> {
        let snapshot = document::snapshot(self.store.state())?;
        let paths = writer.emit(&snapshot).await?;

        self.dispatch(Action::IncrementInvoiceNumber);
        self.dispatch(Action::ResetInvoice {
            today: CalendarDate::today(),
        });

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Settings, SettingsPatch};
    use crate::theme::AppearanceProbe;

    struct DarkProbe;

    impl AppearanceProbe for DarkProbe {
        fn prefers_dark(&self) -> bool {
            true
        }
    }

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2024, 6, 15).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::from_ymd(year, month, day).unwrap()
    }

    fn app() -> App {
        let settings = Settings::sample();
        let theme = ThemeEngine::new(Box::new(DarkProbe), settings.theme);
        App::new(Store::new(settings, today()), theme)
    }

    #[test]
    fn changing_the_invoice_date_recomputes_the_due_date() {
        let mut app = app();
        app.dispatch(Action::UpdateInvoiceField(InvoiceEdit::InvoiceDate(Some(
            date(2024, 1, 25),
        ))));
        assert_eq!(
            app.state().current_invoice.due_date,
            Some(date(2024, 2, 4))
        );
        // the due-date draft was resynced to the recomputed value
        assert_eq!(app.drafts().text(DateField::DueDate), "2024/02/04");
    }

    #[test]
    fn changing_the_deadline_recomputes_the_due_date() {
        let mut app = app();
        app.dispatch(Action::SetSettings(SettingsPatch {
            deadline_days: Some(30),
            ..SettingsPatch::default()
        }));
        assert_eq!(
            app.state().current_invoice.due_date,
            Some(date(2024, 7, 15))
        );
    }

    #[test]
    fn clearing_the_invoice_date_clears_the_due_date() {
        let mut app = app();
        app.dispatch(Action::UpdateInvoiceField(InvoiceEdit::InvoiceDate(None)));
        assert_eq!(app.state().current_invoice.due_date, None);
    }

    #[test]
    fn manual_due_date_edit_stands_until_the_next_trigger() {
        let mut app = app();
        app.dispatch(Action::UpdateInvoiceField(InvoiceEdit::DueDate(Some(date(
            2024, 12, 24,
        )))));
        // unrelated transitions leave the manual edit alone
        app.dispatch(Action::AddInvoiceItem { today: today() });
        assert_eq!(
            app.state().current_invoice.due_date,
            Some(date(2024, 12, 24))
        );

        // the next invoice-date change takes precedence again
        app.dispatch(Action::UpdateInvoiceField(InvoiceEdit::InvoiceDate(Some(
            date(2024, 7, 1),
        ))));
        assert_eq!(
            app.state().current_invoice.due_date,
            Some(date(2024, 7, 11))
        );
    }

    #[test]
    fn typing_a_valid_date_commits_immediately() {
        let mut app = app();
        app.edit_date(DateField::InvoiceDate, "2024/07/01".to_string());
        assert_eq!(
            app.state().current_invoice.invoice_date,
            Some(date(2024, 7, 1))
        );
    }

    #[test]
    fn typing_an_invalid_date_leaves_committed_state_alone() {
        let mut app = app();
        app.edit_date(DateField::InvoiceDate, "2024/07".to_string());
        assert_eq!(app.state().current_invoice.invoice_date, Some(today()));
        assert_eq!(app.drafts().text(DateField::InvoiceDate), "2024/07");

        app.blur_date(DateField::InvoiceDate);
        assert_eq!(app.drafts().text(DateField::InvoiceDate), "2024/06/15");
    }

    #[test]
    fn clearing_a_date_field_commits_the_clear() {
        let mut app = app();
        app.edit_date(DateField::DueDate, String::new());
        assert_eq!(app.state().current_invoice.due_date, None);
    }

    #[test]
    fn partial_typing_survives_commits_to_other_fields() {
        let mut app = app();
        app.edit_date(DateField::DueDate, "2024/1".to_string());
        app.dispatch(Action::UpdateInvoiceItem {
            index: 0,
            edit: ItemEdit::Hours(3.0),
        });
        assert_eq!(app.drafts().text(DateField::DueDate), "2024/1");
    }

    #[tokio::test]
    async fn successful_emission_increments_and_resets() {
        let dir = std::env::temp_dir().join(format!("sinvoice-app-emit-{}", std::process::id()));
        let writer = DocumentWriter::new(&dir).unwrap();

        let mut app = app();
        app.dispatch(Action::AddCustomer(Customer {
            id: 1,
            name: "A".to_string(),
            address: "X".to_string(),
        }));
        app.dispatch(Action::UpdateInvoiceField(InvoiceEdit::Customer(Some(1))));
        app.dispatch(Action::AddInvoiceItem { today: today() });

        app.emit(&writer).await.unwrap();

        let state = app.state();
        assert_eq!(state.settings.invoice_number, 102);
        assert_eq!(state.current_invoice.customer, None);
        assert_eq!(state.current_invoice.items.len(), 1);
        assert_eq!(state.current_invoice.items[0].rate, 75.0);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn emission_without_a_customer_mutates_nothing() {
        let dir = std::env::temp_dir().join(format!("sinvoice-app-abort-{}", std::process::id()));
        let writer = DocumentWriter::new(&dir).unwrap();

        let mut app = app();
        let before = app.state().clone();

        let result = app.emit(&writer).await;

        assert!(result.is_err());
        assert_eq!(*app.state(), before);
        // nothing was written either
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
