use crate::date::{due, CalendarDate};

use super::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub date: Option<CalendarDate>,
    pub hours: f64,
    pub rate: f64,
}

impl LineItem {
    pub fn fresh(date: CalendarDate, rate: f64) -> Self {
        LineItem {
            description: String::new(),
            date: Some(date),
            hours: 1.0,
            rate,
        }
    }

    pub fn total(&self) -> f64 {
        self.hours * self.rate
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentInvoice {
    /// Non-owning reference into the customer list.
    pub customer: Option<i32>,
    pub invoice_date: Option<CalendarDate>,
    pub due_date: Option<CalendarDate>,
    /// Display and document row order; never empty.
    pub items: Vec<LineItem>,
}

impl CurrentInvoice {
    /// A fresh default invoice: today's date, the due date derived from the
    /// deadline setting, one default line item, no customer.
    pub fn fresh(settings: &Settings, today: CalendarDate) -> Self {
        CurrentInvoice {
            customer: None,
            invoice_date: Some(today),
            due_date: due::due_date(Some(today), settings.deadline_days),
            items: vec![LineItem::fresh(today, settings.default_hourly_rate)],
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::total).sum()
    }
}
