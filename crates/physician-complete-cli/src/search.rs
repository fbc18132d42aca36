use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, Table};
use physician_complete::{BloomClient, SearchBackend, SearchQuery, SuggestionResult, WidgetConfig};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Physician name, e.g. "John Sm"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    npi: &'a str,
    name: String,
    address: String,
    first_name: &'a str,
    last_name: &'a str,
}

pub fn execute(args: SearchArgs, config: WidgetConfig) -> Result<()> {
    let text = args.text.join(" ");
    let Some(query) = SearchQuery::build(&text, config.zip_filter(), config.limit) else {
        anyhow::bail!("Nothing to search for");
    };

    let client = BloomClient::new(&config)?;
    let results = client
        .search(&query)
        .with_context(|| format!("Search for '{text}' failed"))?;

    if args.json {
        println!("{}", format_json(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No physicians found matching '{}'", text.cyan());
        return Ok(());
    }

    println!(
        "{} {} physicians matching '{}':",
        "Found".green().bold(),
        results.len(),
        text.cyan()
    );
    println!("{}", format_table(&results));
    Ok(())
}

fn format_json(results: &[SuggestionResult]) -> Result<String> {
    let rows: Vec<JsonResult> = results
        .iter()
        .map(|r| JsonResult {
            npi: &r.npi,
            name: r.display_name(),
            address: r.address_line(),
            first_name: &r.first_name,
            last_name: &r.last_name,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn format_table(results: &[SuggestionResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "NPI", "Practice"]);

    for result in results {
        table.add_row(vec![
            Cell::new(result.display_name()),
            Cell::new(&result.npi).fg(Color::Cyan),
            Cell::new(result.address_line()),
        ]);
    }
    table
}
