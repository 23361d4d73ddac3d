//! Banks command - list built-in bank definitions.

use clap::Args;
use console::style;
use serde::Serialize;

use stmtx_core::banks;
use stmtx_core::StatementExtractor;

/// Arguments for the banks command.
#[derive(Args)]
pub struct BanksArgs {
    /// Print the list as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BankInfo<'a> {
    label: &'a str,
    identifiers: &'a [String],
    document_types: Vec<&'a str>,
}

pub async fn run(args: BanksArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let extractors = banks::all(&config)?;

    let infos: Vec<BankInfo<'_>> = extractors
        .iter()
        .map(|bank| BankInfo {
            label: bank.label(),
            identifiers: bank.identifiers(),
            document_types: bank.matchers().iter().map(|m| m.name()).collect(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        println!("{}", style(info.label).bold());
        println!("  Identifiers:    {}", info.identifiers.join(", "));
        println!("  Document types: {}", info.document_types.join(", "));
    }

    Ok(())
}
