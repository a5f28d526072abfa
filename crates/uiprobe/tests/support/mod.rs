//! Shared setup for the integration tests: the simulated practice site and
//! a page factory serving it.

#![allow(dead_code, clippy::expect_used)]

pub mod demo_site;

use async_trait::async_trait;
use std::sync::Arc;
use uiprobe::sim::{SimPage, SimSite};
use uiprobe::{HarnessConfig, Page, PageFactory, ProbeResult};

/// Opens fresh pages on the simulated site
pub struct DemoFactory {
    site: Arc<SimSite>,
}

impl DemoFactory {
    pub fn new() -> Self {
        Self {
            site: Arc::new(demo_site::demo_site()),
        }
    }
}

#[async_trait]
impl PageFactory for DemoFactory {
    async fn new_page(&self, config: Arc<HarnessConfig>) -> ProbeResult<Page> {
        Ok(Page::new(SimPage::open(Arc::clone(&self.site)), config))
    }
}

/// Default configuration with uploads served from `fixtures/`
pub fn config() -> HarnessConfig {
    HarnessConfig::default().with_upload_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
}

/// A page on the simulated site, already at `path`
pub async fn page_at(path: &str) -> Page {
    let page = DemoFactory::new()
        .new_page(Arc::new(config()))
        .await
        .expect("sim page opens");
    page.goto(path).await.expect("route exists");
    page
}
