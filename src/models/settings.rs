use std::path::PathBuf;

use crate::date::DateFormat;
use crate::theme::ThemeMode;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub company_name: String,
    pub company_address: String,
    pub company_icon: Option<PathBuf>,
    pub deadline_days: u32,
    pub default_hourly_rate: f64,
    pub bank_name: String,
    pub bank_account_number: String,
    pub footer_text: String,
    pub invoice_prefix: String,
    pub invoice_number: u32,
    pub output_dir: PathBuf,
    pub currency: String,
    pub date_format: DateFormat,
    pub theme: ThemeMode,
}

impl Settings {
    /// The user-facing invoice number, e.g. "INV-101".
    pub fn invoice_label(&self) -> String {
        format!("{}-{}", self.invoice_prefix, self.invoice_number)
    }

    /// Shallow merge: fields present in the patch replace the current value,
    /// absent fields are left alone. An empty patch is a no-op.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.company_name {
            self.company_name = value;
        }
        if let Some(value) = patch.company_address {
            self.company_address = value;
        }
        if let Some(value) = patch.company_icon {
            self.company_icon = value;
        }
        if let Some(value) = patch.deadline_days {
            self.deadline_days = value;
        }
        if let Some(value) = patch.default_hourly_rate {
            self.default_hourly_rate = value;
        }
        if let Some(value) = patch.bank_name {
            self.bank_name = value;
        }
        if let Some(value) = patch.bank_account_number {
            self.bank_account_number = value;
        }
        if let Some(value) = patch.footer_text {
            self.footer_text = value;
        }
        if let Some(value) = patch.invoice_prefix {
            self.invoice_prefix = value;
        }
        if let Some(value) = patch.invoice_number {
            self.invoice_number = value;
        }
        if let Some(value) = patch.output_dir {
            self.output_dir = value;
        }
        if let Some(value) = patch.currency {
            self.currency = value;
        }
        if let Some(value) = patch.date_format {
            self.date_format = value;
        }
        if let Some(value) = patch.theme {
            self.theme = value;
        }
    }
}

/// A partial settings update. `None` means "leave unchanged"; for the icon,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_icon: Option<Option<PathBuf>>,
    pub deadline_days: Option<u32>,
    pub default_hourly_rate: Option<f64>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub footer_text: Option<String>,
    pub invoice_prefix: Option<String>,
    pub invoice_number: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub currency: Option<String>,
    pub date_format: Option<DateFormat>,
    pub theme: Option<ThemeMode>,
}

#[cfg(test)]
impl Settings {
    pub fn sample() -> Self {
        Settings {
            company_name: "My Awesome Company".to_string(),
            company_address: "789 Pine Ln, Yourtown, USA".to_string(),
            company_icon: None,
            deadline_days: 10,
            default_hourly_rate: 75.0,
            bank_name: "Global Bank".to_string(),
            bank_account_number: "123-456-7890".to_string(),
            footer_text: "Thank you for your business!".to_string(),
            invoice_prefix: "INV".to_string(),
            invoice_number: 101,
            output_dir: std::env::temp_dir().join("sinvoice-tests"),
            currency: "CHF".to_string(),
            date_format: DateFormat::YearMonthDay,
            theme: ThemeMode::System,
        }
    }
}
