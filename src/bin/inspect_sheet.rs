use anyhow::Result;
use danceboard::fetch::{fetch_table, SheetRef};
use reqwest::Client;
use std::{env, process::exit};

/// Fetch a worksheet and print its columns with their distinct values.
/// Handy for working out what the filter widgets should offer.
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <SHEET_ID> <WORKSHEET> [API_KEY]", args[0]);
        exit(1);
    }

    let sheet = SheetRef {
        sheet_id: args[1].clone(),
        worksheet: args[2].clone(),
        api_key: args.get(3).cloned(),
    };
    let client = Client::new();
    let table = fetch_table(&client, &sheet).await?;

    println!(
        "=== Worksheet: {} ({} rows, {} columns) ===",
        sheet.worksheet,
        table.len(),
        table.headers.len()
    );
    for header in &table.headers {
        let values = table.unique_values(header);
        println!("- {:<20} {} distinct values", header, values.len());
        for v in values.iter().take(10) {
            println!("    {}", v);
        }
        if values.len() > 10 {
            println!("    ...");
        }
    }
    Ok(())
}
