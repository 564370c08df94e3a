use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::date::DateFormat;
use crate::models::{Customer, Settings};
use crate::theme::ThemeMode;

/// Startup configuration for the application, read from `SINVOICE_`-prefixed
/// environment variables (optionally via a .env file). Every field has a
/// default, so a bare environment still yields a usable session; a real
/// deployment injects company identity and invoice counters here.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_address: String,
    #[serde(default)]
    pub company_icon: Option<PathBuf>,
    #[serde(default = "default_deadline_days")]
    pub deadline_days: u32,
    #[serde(default = "default_hourly_rate")]
    pub default_hourly_rate: f64,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub bank_account_number: String,
    #[serde(default)]
    pub footer_text: String,
    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,
    #[serde(default = "default_invoice_number")]
    pub invoice_number: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_date_format")]
    pub date_format: DateFormat,
    #[serde(default = "default_theme")]
    pub theme: ThemeMode,
    /// JSON file holding the startup customer list.
    #[serde(default)]
    pub customers_file: Option<PathBuf>,
}

fn default_deadline_days() -> u32 {
    10
}

fn default_hourly_rate() -> f64 {
    50.0
}

fn default_invoice_prefix() -> String {
    "INV".to_string()
}

fn default_invoice_number() -> u32 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("invoices")
}

fn default_currency() -> String {
    "CHF".to_string()
}

fn default_date_format() -> DateFormat {
    DateFormat::YearMonthDay
}

fn default_theme() -> ThemeMode {
    ThemeMode::System
}

impl Config {
    /// Load configuration from environment variables, reading a .env file
    /// first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed("SINVOICE_").from_env::<Config>()?;

        Ok(config)
    }

    /// Customers injected at startup, when a customers file is configured.
    pub fn load_customers(&self) -> Result<Vec<Customer>> {
        let Some(path) = &self.customers_file else {
            return Ok(Vec::new());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading customers file {}", path.display()))?;
        let customers = serde_json::from_str(&raw)
            .with_context(|| format!("parsing customers file {}", path.display()))?;

        Ok(customers)
    }

    pub fn into_settings(self) -> Settings {
        Settings {
            company_name: self.company_name,
            company_address: self.company_address,
            company_icon: self.company_icon,
            deadline_days: self.deadline_days,
            default_hourly_rate: self.default_hourly_rate,
            bank_name: self.bank_name,
            bank_account_number: self.bank_account_number,
            footer_text: self.footer_text,
            invoice_prefix: self.invoice_prefix,
            invoice_number: self.invoice_number.max(1),
            output_dir: self.output_dir,
            currency: self.currency,
            date_format: self.date_format,
            theme: self.theme,
        }
    }
}

/// Initialize environment variables and load configuration.
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customers_file_round_trips_through_json() {
        let customers = vec![
            Customer {
                id: 1,
                name: "John Doe".to_string(),
                address: "123 Main St, Anytown, USA".to_string(),
            },
            Customer {
                id: 2,
                name: "Jane Smith".to_string(),
                address: "456 Oak Ave, Sometown, USA".to_string(),
            },
        ];

        let path = std::env::temp_dir().join(format!("sinvoice-customers-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string_pretty(&customers).unwrap()).unwrap();

        let config = Config {
            customers_file: Some(path.clone()),
            ..bare_config()
        };
        assert_eq!(config.load_customers().unwrap(), customers);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn no_customers_file_means_an_empty_list() {
        assert_eq!(bare_config().load_customers().unwrap(), Vec::new());
    }

    fn bare_config() -> Config {
        Config {
            company_name: String::new(),
            company_address: String::new(),
            company_icon: None,
            deadline_days: default_deadline_days(),
            default_hourly_rate: default_hourly_rate(),
            bank_name: String::new(),
            bank_account_number: String::new(),
            footer_text: String::new(),
            invoice_prefix: default_invoice_prefix(),
            invoice_number: default_invoice_number(),
            output_dir: default_output_dir(),
            currency: default_currency(),
            date_format: default_date_format(),
            theme: default_theme(),
            customers_file: None,
        }
    }
}
