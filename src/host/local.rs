use std::process::Command;

use anyhow::{anyhow, Result};
use tracing::debug;

use super::inventory::HostSnapshot;
use crate::config::HostConfig;

/// Read the interface table and hostname from the running system.
///
/// `agent_id` defaults to the full hostname and `host` to its first label;
/// either can be pinned in the `[host]` settings section.
pub fn discover(config: &HostConfig) -> Result<HostSnapshot> {
    let addresses = local_ip_address::list_afinet_netifas()
        .map_err(|e| anyhow!("Failed to list network interfaces: {}", e))?;
    debug!("Discovered {} interface addresses", addresses.len());

    let hostname = match (&config.id, &config.host) {
        (Some(_), Some(_)) => String::new(),
        _ => system_hostname()?,
    };

    let agent_id = config.id.clone().unwrap_or_else(|| hostname.clone());
    let host = config
        .host
        .clone()
        .unwrap_or_else(|| short_name(&hostname).to_string());

    Ok(HostSnapshot::from_addresses(agent_id, host, addresses))
}

fn system_hostname() -> Result<String> {
    if let Ok(output) = Command::new("hostname").output() {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return Ok(name);
            }
        }
    }

    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| anyhow!("Unable to determine hostname; set [host] id and host in the config"))
}

fn short_name(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}
