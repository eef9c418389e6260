use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::dns::Credentials;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    providers: HashMap<String, ProviderCredentials>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProviderCredentials {
    email: String,
    api_key: String,
}

/// TOML file holding per-provider API credentials.
///
/// Every call re-reads the file; nothing is cached between invocations.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CredentialsFile> {
        if !self.path.exists() {
            return Ok(CredentialsFile::default());
        }

        let content = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read credentials file: {}", self.path.display())
        })?;

        toml::from_str(&content).with_context(|| {
            format!("Failed to parse credentials file: {}", self.path.display())
        })
    }

    fn save(&self, creds: &CredentialsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(creds).context("Failed to serialize credentials")?;

        fs::write(&self.path, &content).with_context(|| {
            format!("Failed to write credentials file: {}", self.path.display())
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms).with_context(|| {
                format!("Failed to set permissions on: {}", self.path.display())
            })?;
        }

        Ok(())
    }

    pub fn store(&self, provider: &str, email: &str, api_key: &str) -> Result<()> {
        let mut creds_file = self.load()?;

        creds_file.providers.insert(
            provider.to_string(),
            ProviderCredentials {
                email: email.to_string(),
                api_key: api_key.to_string(),
            },
        );

        self.save(&creds_file)
    }

    pub fn get(&self, provider: &str) -> Result<Credentials> {
        let creds_file = self.load()?;

        let provider_creds = creds_file.providers.get(provider).ok_or_else(|| {
            anyhow!(
                "Credentials not found for provider: {}. Use 'hostdns set-key' to store credentials.",
                provider
            )
        })?;

        Ok(Credentials {
            email: provider_creds.email.clone(),
            api_key: provider_creds.api_key.clone(),
        })
    }

    pub fn delete(&self, provider: &str) -> Result<()> {
        let mut creds_file = self.load()?;

        if creds_file.providers.remove(provider).is_none() {
            return Err(anyhow!("No credentials found for provider: {}", provider));
        }

        self.save(&creds_file)
    }
}
