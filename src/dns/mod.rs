mod cloudflare;
mod provider;

pub use cloudflare::CloudflareProvider;
pub use provider::{Credentials, DnsApi, DnsRecord, RecordData, RecordType};

use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::config::Settings;

pub fn create_provider(
    name: &str,
    credentials: Credentials,
    settings: &Settings,
) -> Result<Arc<dyn DnsApi>> {
    match name.to_lowercase().as_str() {
        "cloudflare" => Ok(Arc::new(CloudflareProvider::with_config(
            credentials,
            &settings.cloudflare,
        )?)),
        _ => Err(anyhow!("Unknown DNS provider: {}", name)),
    }
}
