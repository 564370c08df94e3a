use crate::date::{self, CalendarDate, DateFormat, Parsed};
use crate::models::CurrentInvoice;
use crate::store::AppState;

/// One date-bearing field of the invoice form.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DateField {
    InvoiceDate,
    DueDate,
    Item(usize),
}

/// Free-text staging for the date fields.
///
/// The buffer always holds exactly what the user typed, so a partial or
/// temporarily invalid date never corrupts the committed state behind it.
/// Text that parses is committed immediately by the caller; text that still
/// fails to parse when the field loses focus is reverted to the committed
/// value.
#[derive(Debug)]
pub struct DraftBuffers {
    invoice_date: String,
    due_date: String,
    items: Vec<String>,
}

impl DraftBuffers {
    pub fn seeded(state: &AppState) -> Self {
        let fmt = state.settings.date_format;
        let invoice = &state.current_invoice;
        DraftBuffers {
            invoice_date: date::format(invoice.invoice_date, fmt),
            due_date: date::format(invoice.due_date, fmt),
            items: invoice
                .items
                .iter()
                .map(|item| date::format(item.date, fmt))
                .collect(),
        }
    }

    pub fn text(&self, field: DateField) -> &str {
        match field {
            DateField::InvoiceDate => &self.invoice_date,
            DateField::DueDate => &self.due_date,
            DateField::Item(index) => &self.items[index],
        }
    }

    fn slot(&mut self, field: DateField) -> &mut String {
        match field {
            DateField::InvoiceDate => &mut self.invoice_date,
            DateField::DueDate => &mut self.due_date,
            DateField::Item(index) => &mut self.items[index],
        }
    }

    /// Record a keystroke. The buffer takes the new text unconditionally; the
    /// parse outcome, when committable, is returned for the caller to
    /// dispatch into the store.
    pub fn edit(&mut self, field: DateField, text: String, fmt: DateFormat) -> Option<Parsed> {
        let outcome = date::parse(&text, fmt);
        *self.slot(field) = text;
        outcome
    }

    /// Focus left the field: text that still does not parse reverts to the
    /// committed value, so no unparsable string survives a blur.
    pub fn blur(&mut self, field: DateField, state: &AppState) {
        let fmt = state.settings.date_format;
        if date::parse(self.text(field), fmt).is_none() {
            *self.slot(field) = date::format(committed(state, field), fmt);
        }
    }

    /// Resynchronize after a committed transition. Only fields whose
    /// committed value changed under them are reformatted (all of them when
    /// the display format changed, or when item rows shifted), so in-progress
    /// typing in an untouched field survives commits elsewhere.
    pub fn resync(&mut self, before: &CurrentInvoice, before_fmt: DateFormat, state: &AppState) {
        let fmt = state.settings.date_format;
        let invoice = &state.current_invoice;
        let all = fmt != before_fmt;

        if all || invoice.invoice_date != before.invoice_date {
            self.invoice_date = date::format(invoice.invoice_date, fmt);
        }
        if all || invoice.due_date != before.due_date {
            self.due_date = date::format(invoice.due_date, fmt);
        }

        if all || invoice.items.len() != before.items.len() {
            self.items = invoice
                .items
                .iter()
                .map(|item| date::format(item.date, fmt))
                .collect();
        } else {
            for (index, item) in invoice.items.iter().enumerate() {
                if before.items[index].date != item.date {
                    self.items[index] = date::format(item.date, fmt);
                }
            }
        }
    }
}

fn committed(state: &AppState, field: DateField) -> Option<CalendarDate> {
    let invoice = &state.current_invoice;
    match field {
        DateField::InvoiceDate => invoice.invoice_date,
        DateField::DueDate => invoice.due_date,
        DateField::Item(index) => invoice.items[index].date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;
    use crate::store::Store;

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2024, 6, 15).unwrap()
    }

    fn state() -> AppState {
        Store::new(Settings::sample(), today()).state().clone()
    }

    #[test]
    fn seeds_from_committed_state() {
        let state = state();
        let drafts = DraftBuffers::seeded(&state);
        assert_eq!(drafts.text(DateField::InvoiceDate), "2024/06/15");
        assert_eq!(drafts.text(DateField::DueDate), "2024/06/25");
        assert_eq!(drafts.text(DateField::Item(0)), "2024/06/15");
    }

    #[test]
    fn edit_stages_text_and_reports_the_parse() {
        let state = state();
        let mut drafts = DraftBuffers::seeded(&state);

        let partial = drafts.edit(
            DateField::DueDate,
            "2024/0".to_string(),
            DateFormat::YearMonthDay,
        );
        assert_eq!(partial, None);
        assert_eq!(drafts.text(DateField::DueDate), "2024/0");

        let complete = drafts.edit(
            DateField::DueDate,
            "2024/07/01".to_string(),
            DateFormat::YearMonthDay,
        );
        assert_eq!(
            complete,
            Some(Parsed::Date(CalendarDate::from_ymd(2024, 7, 1).unwrap()))
        );
    }

    #[test]
    fn invalid_blur_reverts_to_the_committed_value() {
        let state = state();
        let mut drafts = DraftBuffers::seeded(&state);
        drafts.edit(
            DateField::InvoiceDate,
            "2024/99".to_string(),
            DateFormat::YearMonthDay,
        );

        drafts.blur(DateField::InvoiceDate, &state);

        assert_eq!(drafts.text(DateField::InvoiceDate), "2024/06/15");
    }

    #[test]
    fn valid_text_survives_a_blur() {
        let state = state();
        let mut drafts = DraftBuffers::seeded(&state);
        drafts.edit(
            DateField::InvoiceDate,
            "2024-6-15".to_string(),
            DateFormat::YearMonthDay,
        );

        drafts.blur(DateField::InvoiceDate, &state);

        assert_eq!(drafts.text(DateField::InvoiceDate), "2024-6-15");
    }

    #[test]
    fn resync_touches_only_changed_fields() {
        let state = state();
        let mut drafts = DraftBuffers::seeded(&state);
        drafts.edit(
            DateField::InvoiceDate,
            "2024/0".to_string(),
            DateFormat::YearMonthDay,
        );

        // a commit elsewhere changed the due date but not the invoice date
        let before = state.current_invoice.clone();
        let mut after = state.clone();
        after.current_invoice.due_date = CalendarDate::from_ymd(2024, 8, 1);
        drafts.resync(&before, DateFormat::YearMonthDay, &after);

        assert_eq!(drafts.text(DateField::InvoiceDate), "2024/0");
        assert_eq!(drafts.text(DateField::DueDate), "2024/08/01");
    }

    #[test]
    fn format_change_reformats_everything() {
        let state = state();
        let mut drafts = DraftBuffers::seeded(&state);

        let before = state.current_invoice.clone();
        let mut after = state.clone();
        after.settings.date_format = DateFormat::DayMonthYear;
        drafts.resync(&before, DateFormat::YearMonthDay, &after);

        assert_eq!(drafts.text(DateField::InvoiceDate), "15/06/2024");
        assert_eq!(drafts.text(DateField::Item(0)), "15/06/2024");
    }
}
