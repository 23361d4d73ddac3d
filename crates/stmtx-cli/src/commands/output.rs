//! Rendering of extraction results.

use chrono::NaiveDate;

use stmtx_core::values::{format_amount, from_scaled, AMOUNT_PRECISION, SHARE_PRECISION};
use stmtx_core::{DocumentResult, Item, NumberLocale};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub const ITEM_HEADER: [&str; 12] = [
    "source",
    "bank",
    "type",
    "date",
    "security",
    "isin",
    "shares",
    "amount",
    "currency",
    "taxes",
    "fees",
    "note",
];

pub fn render(
    result: &DocumentResult,
    format: OutputFormat,
    locale: NumberLocale,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(ITEM_HEADER)?;
            for item in &result.items {
                wtr.write_record(item_record(result, item))?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(format_text(result, locale)),
    }
}

/// CSV fields of one item, in [`ITEM_HEADER`] order.
pub fn item_record(result: &DocumentResult, item: &Item) -> Vec<String> {
    let security = item.security();
    vec![
        result.source.clone(),
        result.bank.clone().unwrap_or_default(),
        item.type_label().to_string(),
        format_date(item.date()),
        security.map(|s| s.name.clone()).unwrap_or_default(),
        security.and_then(|s| s.isin.clone()).unwrap_or_default(),
        from_scaled(item.shares(), SHARE_PRECISION).normalize().to_string(),
        item.money()
            .map(|m| from_scaled(m.amount, AMOUNT_PRECISION).to_string())
            .unwrap_or_default(),
        item.money().map(|m| m.currency.clone()).unwrap_or_default(),
        from_scaled(item.total_taxes(), AMOUNT_PRECISION).to_string(),
        from_scaled(item.total_fees(), AMOUNT_PRECISION).to_string(),
        item.note().unwrap_or_default().to_string(),
    ]
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn format_item(item: &Item, locale: NumberLocale) -> String {
    let mut line = format!("  {:<11} {:<10}", item.type_label(), format_date(item.date()));

    if let Some(security) = item.security() {
        line.push_str(&format!("  {}", security.name));
        if let Some(isin) = &security.isin {
            line.push_str(&format!(" ({})", isin));
        }
    }
    if item.shares() != 0 {
        line.push_str(&format!(
            "  {} shares",
            from_scaled(item.shares(), SHARE_PRECISION).normalize()
        ));
    }
    if let Some(money) = item.money() {
        line.push_str(&format!("  {} {}", format_amount(money.amount, locale), money.currency));
    }
    if item.total_taxes() != 0 {
        line.push_str(&format!("  taxes {}", format_amount(item.total_taxes(), locale)));
    }
    if item.total_fees() != 0 {
        line.push_str(&format!("  fees {}", format_amount(item.total_fees(), locale)));
    }
    line
}

fn format_text(result: &DocumentResult, locale: NumberLocale) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document: {}\n", result.source));
    output.push_str(&format!(
        "Bank: {}\n",
        result.bank.as_deref().unwrap_or("not recognized")
    ));
    output.push('\n');

    output.push_str(&format!("Items ({}):\n", result.items.len()));
    for item in &result.items {
        output.push_str(&format_item(item, locale));
        output.push('\n');
    }

    if !result.errors.is_empty() {
        output.push('\n');
        output.push_str(&format!("Errors ({}):\n", result.errors.len()));
        for error in &result.errors {
            output.push_str(&format!("  {}\n", error));
        }
    }

    output
}
