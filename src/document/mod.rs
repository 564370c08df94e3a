use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

use crate::date;
use crate::models::{Customer, CurrentInvoice, Settings};
use crate::store::AppState;

/// Emission failures that abort before any document writing begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("no customer is selected for this invoice")]
    MissingCustomer,
    #[error("customer {0} no longer exists")]
    UnknownCustomer(i32),
}

/// Finalized, writer-facing view of the session: the settings, the committed
/// invoice, and the resolved customer.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub settings: Settings,
    pub invoice: CurrentInvoice,
    pub customer: Customer,
}

/// Resolve the store state into a snapshot the writer can consume. A missing
/// or dangling customer reference fails here, before anything is written and
/// with nothing mutated.
pub fn snapshot(state: &AppState) -> Result<DocumentSnapshot, EmitError> {
    let id = state
        .current_invoice
        .customer
        .ok_or(EmitError::MissingCustomer)?;
    let customer = state
        .customer(id)
        .ok_or(EmitError::UnknownCustomer(id))?
        .clone();

    Ok(DocumentSnapshot {
        settings: state.settings.clone(),
        invoice: state.current_invoice.clone(),
        customer,
    })
}

/// Service for writing invoice documents in Markdown and PDF format.
pub struct DocumentWriter {
    output_dir: PathBuf,
}

impl DocumentWriter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Write the Markdown invoice and convert it to PDF. Returns the Markdown
    /// and PDF paths.
    pub async fn emit(&self, snapshot: &DocumentSnapshot) -> Result<(PathBuf, PathBuf)> {
        let label = snapshot.settings.invoice_label();
        let markdown = render_markdown(snapshot);

        let md_path = self.output_dir.join(format!("invoice-{label}.md"));
        let pdf_path = self.output_dir.join(format!("invoice-{label}.pdf"));

        let mut file = File::create(&md_path)?;
        file.write_all(markdown.as_bytes())?;

        self.convert(&md_path, &pdf_path).await?;
        info!(invoice = %label, path = %pdf_path.display(), "invoice written");

        Ok((md_path, pdf_path))
    }

    /// Convert the Markdown file to PDF using pandoc. When the converter is
    /// missing or fails, a plain copy is left at the PDF path instead so the
    /// emission still produces both files.
    async fn convert(&self, md_path: &Path, pdf_path: &Path) -> Result<()> {
        let result = Command::new("pandoc")
            .arg(md_path)
            .arg("-o")
            .arg(pdf_path)
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "pandoc failed, leaving a markdown copy at the pdf path"
                );
                fs::copy(md_path, pdf_path)?;
            }
            Err(err) => {
                warn!(%err, "pandoc unavailable, leaving a markdown copy at the pdf path");
                fs::copy(md_path, pdf_path)?;
            }
        }

        Ok(())
    }
}

/// Render the invoice document: header, metadata, customer block, payment
/// block, line-item table, totals, footer.
fn render_markdown(snapshot: &DocumentSnapshot) -> String {
    let settings = &snapshot.settings;
    let invoice = &snapshot.invoice;
    let customer = &snapshot.customer;
    let fmt = settings.date_format;

    let mut content = String::new();

    // Header: the company icon when its file is readable, the company name
    // as text fallback otherwise.
    match icon_reference(settings) {
        Some(icon) => {
            content.push_str(&format!(
                "![{}]({})\n\n",
                settings.company_name,
                icon.display()
            ));
        }
        None => {
            content.push_str(&format!("# {}\n", settings.company_name));
        }
    }
    content.push_str(&format!("{}\n\n", settings.company_address));

    // Invoice metadata
    content.push_str("# Invoice\n\n");
    content.push_str(&format!("**Invoice No:** {}<br>\n", settings.invoice_label()));
    content.push_str(&format!(
        "**Date:** {}<br>\n",
        date::format(invoice.invoice_date, fmt)
    ));
    content.push_str(&format!(
        "**Due Date:** {}\n\n",
        date::format(invoice.due_date, fmt)
    ));

    // Customer block
    content.push_str("**Issued to**<br>\n");
    content.push_str(&format!("{}<br>\n", customer.name));
    content.push_str(&format!("{}\n\n", customer.address));

    // Payment block
    content.push_str("**Pay to**<br>\n");
    content.push_str(&format!("{}<br>\n", settings.bank_name));
    content.push_str(&format!("Account No.: {}\n\n", settings.bank_account_number));

    content.push_str("<hr>\n\n");

    // Line items table
    content.push_str("<table style=\"width: 100%; border-collapse: collapse;\">\n");

    content.push_str("<tr>\n");
    content.push_str("<th style=\"text-align: left;\">Description</th>\n");
    content.push_str("<th style=\"text-align: right;\">Date</th>\n");
    content.push_str("<th style=\"text-align: right;\">Hours</th>\n");
    content.push_str(&format!(
        "<th style=\"text-align: right;\">Rate ({})</th>\n",
        settings.currency
    ));
    content.push_str("<th style=\"text-align: right;\">Total</th>\n");
    content.push_str("</tr>\n");

    let mut subtotal = 0.0;
    for item in &invoice.items {
        let total = item.total();
        subtotal += total;

        content.push_str("<tr>\n");
        content.push_str(&format!(
            "<td style=\"text-align: left;\">{}</td>\n",
            item.description
        ));
        content.push_str(&format!(
            "<td style=\"text-align: right;\">{}</td>\n",
            date::format(item.date, fmt)
        ));
        content.push_str(&format!(
            "<td style=\"text-align: right;\">{}</td>\n",
            item.hours
        ));
        content.push_str(&format!(
            "<td style=\"text-align: right;\">{:.2}</td>\n",
            item.rate
        ));
        content.push_str(&format!(
            "<td style=\"text-align: right;\">{:.2}</td>\n",
            total
        ));
        content.push_str("</tr>\n");
    }

    // Subtotal and total are the same value: no tax or discount concept.
    content.push_str("<tr>\n");
    content.push_str("<td colspan=\"4\" style=\"text-align: right;\">Subtotal</td>\n");
    content.push_str(&format!(
        "<td style=\"text-align: right;\">{} {:.2}</td>\n",
        settings.currency, subtotal
    ));
    content.push_str("</tr>\n");
    content.push_str("<tr>\n");
    content.push_str("<td colspan=\"4\" style=\"text-align: right;\"><strong>Total</strong></td>\n");
    content.push_str(&format!(
        "<td style=\"text-align: right;\"><strong>{} {:.2}</strong></td>\n",
        settings.currency, subtotal
    ));
    content.push_str("</tr>\n");

    content.push_str("</table>\n\n");

    // Footer
    content.push_str(&format!(
        "<p style=\"text-align: center;\">{}</p>\n",
        settings.footer_text
    ));

    content
}

/// The icon path, if one is configured and its file is readable. Anything
/// else falls back to the text header rather than aborting the emission.
fn icon_reference(settings: &Settings) -> Option<&Path> {
    let path = settings.company_icon.as_deref()?;
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Some(path),
        _ => {
            warn!(path = %path.display(), "company icon unreadable, using text header");
            None
        }
    }
}
