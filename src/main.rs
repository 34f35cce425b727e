use std::process::ExitCode;

use card_catalog_sync::logging::init_tracing;
use card_catalog_sync::CatalogScraper;
use tracing::error;

fn main() -> ExitCode {
    if let Err(e) = init_tracing("info") {
        eprintln!("{e}");
    }

    let scraper = match CatalogScraper::builder().build() {
        Ok(scraper) => scraper,
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    match scraper.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "scrape failed");
            ExitCode::FAILURE
        }
    }
}
