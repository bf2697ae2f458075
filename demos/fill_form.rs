//! Fill a form from a JSON list of field specs.
//!
//! cargo run --example fill_form -- <url> <specs.json>

use agentic_form_filler::{FieldSpec, FormBrowser, FormFiller};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> agentic_form_filler::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(url), Some(specs_path)) = (args.next(), args.next()) else {
        eprintln!("usage: fill_form <url> <specs.json>");
        std::process::exit(2);
    };

    let raw = std::fs::read_to_string(&specs_path)?;
    let specs: Vec<FieldSpec> = serde_json::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let browser = FormBrowser::builder().headless(false).build().await?;
    let page = browser.new_page(&url).await?;
    let filler = FormFiller::new(page);

    let outcomes = filler.fill_all(specs, Some(5)).await;
    let failed = outcomes.iter().filter(|o| !o.success).count();
    for outcome in &outcomes {
        match &outcome.error_reason {
            None => println!("ok    {}", outcome.field.selector),
            Some(reason) => println!("FAIL  {} ({reason})", outcome.field.selector),
        }
    }
    println!("{} filled, {} failed", outcomes.len() - failed, failed);

    filler.document().screenshot_to_file("form_filled.png").await?;
    Ok(())
}
