//! Example: run the demoqa scenario catalogue in Chromium
//!
//! Demonstrates: config loading, tracing setup, a browser-backed page factory
//! and the suite report.
//!
//! Run with: `cargo run --example demoqa --features browser [-- <filter>]`
//!
//! `UIPROBE_CONFIG` may point at a YAML config; `UIPROBE_*` variables
//! override it.

use uiprobe::prelude::*;
use uiprobe::{init_tracing, scenarios, ChromiumLauncher};

#[tokio::main]
async fn main() -> ProbeResult<()> {
    let config = match std::env::var("UIPROBE_CONFIG") {
        Ok(path) => HarnessConfig::from_yaml_file(path)?,
        Err(_) => HarnessConfig::default(),
    }
    .apply_env()?;
    init_tracing("uiprobe=info", config.log_format);

    let filter = std::env::args().nth(1).unwrap_or_default();
    println!("=== demoqa catalogue against {} ===\n", config.base_url);

    let factory = ChromiumLauncher::from(&config).with_no_sandbox().launch().await?;
    let suite = scenarios::suite(config);
    let results = suite.run_matching(&factory, &filter).await;
    factory.close().await?;

    println!("{}", results.summary());
    if !results.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}
