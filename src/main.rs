use std::path::Path;
use std::time::Instant;
use tracing::error;

use prospectus::{brochure::BrochureGenerator, config::AppConfig, display::ConsoleSink};

/// The main entry point of the application.
///
/// This function initializes logging, loads the configuration from the
/// environment, reads the company name, URL and output path from the command
/// line, and streams a brochure to the console while saving it to a file.
///
/// # Returns
///
/// A `Result` indicating the success or failure of the operation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = AppConfig::from_env();

    // Get company name and URL from command line arguments
    let company_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Tktah".to_string());

    let url = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "https://tktah.com".to_string());

    let output = std::env::args()
        .nth(3)
        .unwrap_or_else(|| format!("{company_name}_brochure.md"));

    let start_time = Instant::now();

    let generator = BrochureGenerator::new(config)?;

    println!("Generating brochure for {company_name}...\n");

    let mut sink = ConsoleSink;
    match generator
        .compose_streaming(&company_name, &url, Some(&mut sink), Some(Path::new(&output)))
        .await
    {
        Ok(brochure) => {
            let elapsed = start_time.elapsed();

            println!("\n=== Brochure Generated ===");
            println!("Company: {}", company_name);
            println!("Website: {}", url);
            println!("Processing time: {:.2?}", elapsed);
            println!("Length: {} characters", brochure.chars().count());
        }
        Err(e) => {
            error!("Failed to generate brochure: {}", e);
        }
    }

    Ok(())
}
