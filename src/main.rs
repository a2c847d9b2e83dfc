use std::process::ExitCode;

use jobsheet::{Result, ScrapeConfig, ScrapePipeline};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    println!("============================================================");
    println!("Job Scraper → Google Sheets");
    println!("============================================================");

    let summary = ScrapePipeline::new(ScrapeConfig::default())
        .authorize()?
        .search()
        .fetch_details()
        .write()?;

    println!("\n============================================================");
    println!(
        "✅ Scraped {} listings ({} unique ids, {} duplicates, {} failed/skipped)",
        summary.rows_written, summary.unique_ids, summary.duplicates, summary.failed
    );
    if let Some(url) = &summary.sheet_url {
        println!("✅ Spreadsheet: {}", url);
    }
    println!("============================================================");
    Ok(())
}
