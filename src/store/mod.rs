use crate::date::CalendarDate;
use crate::models::{Customer, CurrentInvoice, LineItem, Settings, SettingsPatch};

/// Edit to one named field of the current invoice.
#[derive(Debug, Clone)]
pub enum InvoiceEdit {
    Customer(Option<i32>),
    InvoiceDate(Option<CalendarDate>),
    DueDate(Option<CalendarDate>),
}

/// Edit to one named field of one line item.
#[derive(Debug, Clone)]
pub enum ItemEdit {
    Description(String),
    Date(Option<CalendarDate>),
    Hours(f64),
    Rate(f64),
}

/// The complete set of state transitions. Nothing outside this enum can
/// change the store, and [`Store::dispatch`] matches it exhaustively.
///
/// Transitions never read the clock; the variants that need "today" carry it,
/// supplied by the dispatching caller.
#[derive(Debug, Clone)]
pub enum Action {
    SetCustomers(Vec<Customer>),
    AddCustomer(Customer),
    SetSettings(SettingsPatch),
    UpdateInvoiceField(InvoiceEdit),
    UpdateInvoiceItem { index: usize, edit: ItemEdit },
    AddInvoiceItem { today: CalendarDate },
    RemoveInvoiceItem { index: usize },
    IncrementInvoiceNumber,
    ResetInvoice { today: CalendarDate },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub customers: Vec<Customer>,
    pub settings: Settings,
    pub current_invoice: CurrentInvoice,
}

impl AppState {
    /// Customer ids are monotonic: the next one is max existing + 1.
    pub fn next_customer_id(&self) -> i32 {
        self.customers.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn customer(&self, id: i32) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }
}

/// Holds the session state and applies transitions. The store is owned by the
/// session container and mutated from a single dispatch path; readers get
/// `&AppState`.
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(settings: Settings, today: CalendarDate) -> Self {
        let current_invoice = CurrentInvoice::fresh(&settings, today);
        Store {
            state: AppState {
                customers: Vec::new(),
                settings,
                current_invoice,
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply one transition. Every action is defined for every reachable
    /// state; an out-of-range item index is a caller bug, not a recoverable
    /// condition.
    pub fn dispatch(&mut self, action: Action) {
        let state = &mut self.state;
        match action {
            Action::SetCustomers(customers) => {
                state.customers = customers;
            }
            Action::AddCustomer(customer) => {
                state.customers.push(customer);
            }
            Action::SetSettings(patch) => {
                state.settings.merge(patch);
            }
            Action::UpdateInvoiceField(edit) => match edit {
                InvoiceEdit::Customer(id) => state.current_invoice.customer = id,
                InvoiceEdit::InvoiceDate(date) => state.current_invoice.invoice_date = date,
                InvoiceEdit::DueDate(date) => state.current_invoice.due_date = date,
            },
            Action::UpdateInvoiceItem { index, edit } => {
                let item = &mut state.current_invoice.items[index];
                match edit {
                    ItemEdit::Description(text) => item.description = text,
                    ItemEdit::Date(date) => item.date = date,
                    ItemEdit::Hours(hours) => item.hours = hours,
                    ItemEdit::Rate(rate) => item.rate = rate,
                }
            }
            Action::AddInvoiceItem { today } => {
                let rate = state.settings.default_hourly_rate;
                state.current_invoice.items.push(LineItem::fresh(today, rate));
            }
            Action::RemoveInvoiceItem { index } => {
                state.current_invoice.items.remove(index);
            }
            Action::IncrementInvoiceNumber => {
                state.settings.invoice_number += 1;
            }
            Action::ResetInvoice { today } => {
                state.current_invoice = CurrentInvoice::fresh(&state.settings, today);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::due;

    fn today() -> CalendarDate {
        CalendarDate::from_ymd(2024, 6, 15).unwrap()
    }

    fn store() -> Store {
        Store::new(Settings::sample(), today())
    }

    #[test]
    fn starts_with_a_fresh_invoice() {
        let store = store();
        let invoice = &store.state().current_invoice;
        assert_eq!(invoice.customer, None);
        assert_eq!(invoice.invoice_date, Some(today()));
        assert_eq!(invoice.due_date, due::due_date(Some(today()), 10));
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].hours, 1.0);
        assert_eq!(invoice.items[0].rate, 75.0);
    }

    #[test]
    fn empty_settings_patch_changes_nothing() {
        let mut store = store();
        let before = store.state().clone();
        store.dispatch(Action::SetSettings(SettingsPatch::default()));
        assert_eq!(*store.state(), before);
    }

    #[test]
    fn settings_patch_merges_only_present_fields() {
        let mut store = store();
        store.dispatch(Action::SetSettings(SettingsPatch {
            deadline_days: Some(30),
            ..SettingsPatch::default()
        }));
        assert_eq!(store.state().settings.deadline_days, 30);
        assert_eq!(store.state().settings.currency, "CHF");
    }

    #[test]
    fn next_customer_id_is_max_plus_one() {
        let mut store = store();
        assert_eq!(store.state().next_customer_id(), 1);
        store.dispatch(Action::AddCustomer(Customer {
            id: 7,
            name: "John Doe".to_string(),
            address: "123 Main St".to_string(),
        }));
        assert_eq!(store.state().next_customer_id(), 8);
    }

    #[test]
    fn removing_an_item_preserves_the_order_of_the_rest() {
        let mut store = store();
        store.dispatch(Action::AddInvoiceItem { today: today() });
        store.dispatch(Action::AddInvoiceItem { today: today() });
        for (index, description) in ["first", "second", "third"].iter().enumerate() {
            store.dispatch(Action::UpdateInvoiceItem {
                index,
                edit: ItemEdit::Description(description.to_string()),
            });
        }
        let before = store.state().current_invoice.items.clone();

        store.dispatch(Action::RemoveInvoiceItem { index: 1 });

        let items = &store.state().current_invoice.items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], before[0]);
        assert_eq!(items[1], before[2]);
    }

    #[test]
    fn added_items_take_the_default_rate() {
        let mut store = store();
        store.dispatch(Action::SetSettings(SettingsPatch {
            default_hourly_rate: Some(120.0),
            ..SettingsPatch::default()
        }));
        store.dispatch(Action::AddInvoiceItem { today: today() });
        let item = store.state().current_invoice.items.last().unwrap();
        assert_eq!(item.rate, 120.0);
        assert_eq!(item.hours, 1.0);
        assert_eq!(item.description, "");
    }

    #[test]
    fn subtotal_sums_all_items() {
        let mut store = store();
        store.dispatch(Action::AddCustomer(Customer {
            id: 1,
            name: "A".to_string(),
            address: "X".to_string(),
        }));
        store.dispatch(Action::UpdateInvoiceField(InvoiceEdit::Customer(Some(1))));
        store.dispatch(Action::AddInvoiceItem { today: today() });
        store.dispatch(Action::AddInvoiceItem { today: today() });
        store.dispatch(Action::UpdateInvoiceItem {
            index: 2,
            edit: ItemEdit::Hours(5.0),
        });
        store.dispatch(Action::UpdateInvoiceItem {
            index: 2,
            edit: ItemEdit::Rate(100.0),
        });

        // item0: 1h * 75, item1: 1h * 75, item2: 5h * 100
        let expected = 1.0 * 75.0 + 1.0 * 75.0 + 5.0 * 100.0;
        let subtotal = store.state().current_invoice.subtotal();
        assert!((subtotal - expected).abs() < 0.005);
    }

    #[test]
    fn increment_bumps_the_invoice_number_once() {
        let mut store = store();
        store.dispatch(Action::IncrementInvoiceNumber);
        assert_eq!(store.state().settings.invoice_number, 102);
    }

    #[test]
    fn reset_restores_the_fresh_default_shape() {
        let mut store = store();
        store.dispatch(Action::AddCustomer(Customer {
            id: 1,
            name: "A".to_string(),
            address: "X".to_string(),
        }));
        store.dispatch(Action::UpdateInvoiceField(InvoiceEdit::Customer(Some(1))));
        store.dispatch(Action::AddInvoiceItem { today: today() });

        let later = CalendarDate::from_ymd(2024, 7, 1).unwrap();
        store.dispatch(Action::ResetInvoice { today: later });

        let invoice = &store.state().current_invoice;
        assert_eq!(invoice.customer, None);
        assert_eq!(invoice.invoice_date, Some(later));
        assert_eq!(invoice.due_date, due::due_date(Some(later), 10));
        assert_eq!(invoice.items.len(), 1);
        // the customer list itself is untouched by a reset
        assert_eq!(store.state().customers.len(), 1);
    }
}
