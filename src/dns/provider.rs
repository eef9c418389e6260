use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

/// Address record types this tool manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(format!("unsupported record type: {}", other)),
        }
    }
}

/// A record as the remote provider reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsRecord {
    pub id: String,
    /// Fully-qualified name, `<host>.<zone>`
    pub name: String,
    pub record_type: String,
    pub content: String,
    pub ttl: u32,
}

/// The writable part of a record, sent on create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordData {
    pub record_type: String,
    /// Host label, relative to the zone
    pub name: String,
    pub content: String,
    pub ttl: u32,
}

impl RecordData {
    pub fn new(record_type: RecordType, name: &str, content: &str, ttl: u32) -> Self {
        Self {
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl,
        }
    }
}

#[async_trait]
pub trait DnsApi: Send + Sync {
    /// List every record in a zone
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>>;

    /// Create a record in a zone
    async fn create_record(&self, zone: &str, record: &RecordData) -> Result<()>;

    /// Replace an existing record
    async fn edit_record(&self, zone: &str, record_id: &str, record: &RecordData) -> Result<()>;

    /// Delete a record by id
    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
