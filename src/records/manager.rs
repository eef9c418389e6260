use std::sync::Arc;

use tracing::{debug, info, warn};

use super::name::interpret_name;
use super::outcome::{AddOutcome, DelOutcome};
use crate::dns::{DnsApi, DnsRecord, RecordData, RecordType};
use crate::error::RecordError;
use crate::host::HostInventory;
use crate::ip::{self, IpSource};

pub const DEFAULT_NAME_TEMPLATE: &str = "%H";
pub const DEFAULT_RECORD_TYPE: &str = "A";
/// Cloudflare reads a TTL of 1 as "automatic"
pub const DEFAULT_TTL: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecordRequest {
    pub zone: String,
    pub name: String,
    pub record_type: String,
    pub ttl: u32,
    pub edit_if_exists: bool,
    pub iface: Option<String>,
    pub cidr: Option<String>,
}

impl AddRecordRequest {
    pub fn new(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            name: DEFAULT_NAME_TEMPLATE.to_string(),
            record_type: DEFAULT_RECORD_TYPE.to_string(),
            ttl: DEFAULT_TTL,
            edit_if_exists: false,
            iface: None,
            cidr: None,
        }
    }

    pub fn name(mut self, template: impl Into<String>) -> Self {
        self.name = template.into();
        self
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn edit_if_exists(mut self, edit: bool) -> Self {
        self.edit_if_exists = edit;
        self
    }

    pub fn iface(mut self, iface: impl Into<String>) -> Self {
        self.iface = Some(iface.into());
        self
    }

    pub fn cidr(mut self, cidr: impl Into<String>) -> Self {
        self.cidr = Some(cidr.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelRecordRequest {
    pub zone: String,
    pub name: String,
    pub record_type: String,
}

impl DelRecordRequest {
    pub fn new(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            name: DEFAULT_NAME_TEMPLATE.to_string(),
            record_type: DEFAULT_RECORD_TYPE.to_string(),
        }
    }

    pub fn name(mut self, template: impl Into<String>) -> Self {
        self.name = template.into();
        self
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }
}

/// Keeps host records in a zone pointed at local addresses.
///
/// Each call performs its own lookups against the DNS API; nothing is
/// remembered between calls.
pub struct RecordManager {
    api: Arc<dyn DnsApi>,
    inventory: Arc<dyn HostInventory>,
}

impl RecordManager {
    pub fn new(api: Arc<dyn DnsApi>, inventory: Arc<dyn HostInventory>) -> Self {
        Self { api, inventory }
    }

    pub fn interpret_name(&self, template: &str) -> String {
        interpret_name(self.inventory.as_ref(), template)
    }

    /// First record in `zone` named `<host_label>.<zone>` with the given type.
    pub async fn find_record(
        &self,
        zone: &str,
        host_label: &str,
        record_type: &str,
    ) -> Result<Option<DnsRecord>, RecordError> {
        let fqdn = format!("{}.{}", host_label, zone);
        let records = self.api.list_records(zone).await?;
        debug!(
            "Scanning {} records in {} for {} ({})",
            records.len(),
            zone,
            fqdn,
            record_type
        );

        Ok(records
            .into_iter()
            .find(|rec| rec.name == fqdn && rec.record_type == record_type))
    }

    pub async fn create(
        &self,
        zone: &str,
        record_type: RecordType,
        host_label: &str,
        content: &str,
        ttl: u32,
    ) -> Result<(), RecordError> {
        let data = RecordData::new(record_type, host_label, content, ttl);
        self.api.create_record(zone, &data).await?;
        Ok(())
    }

    pub async fn update(
        &self,
        zone: &str,
        record_type: RecordType,
        record_id: &str,
        host_label: &str,
        content: &str,
        ttl: u32,
    ) -> Result<(), RecordError> {
        let data = RecordData::new(record_type, host_label, content, ttl);
        self.api.edit_record(zone, record_id, &data).await?;
        Ok(())
    }

    pub async fn delete(&self, zone: &str, record_id: &str) -> Result<(), RecordError> {
        self.api.delete_record(zone, record_id).await?;
        Ok(())
    }

    /// Point `<name>.<zone>` at the address selected by the request's
    /// interface or CIDR, creating the record or, when allowed, editing it.
    pub async fn add_record(&self, req: &AddRecordRequest) -> Result<AddOutcome, RecordError> {
        if req.zone.is_empty() {
            return Err(RecordError::validation("you must provide a DNS zone."));
        }

        let source = IpSource::from_options(req.iface.as_deref(), req.cidr.as_deref())
            .ok_or_else(|| {
                RecordError::validation(
                    "you must provide a source for IP address (one of iface, cidr)",
                )
            })?;

        let record_type: RecordType = req
            .record_type
            .parse()
            .map_err(|_| RecordError::validation("record type must be A or AAAA."))?;

        let content = ip::resolve(self.inventory.as_ref(), &source, record_type.as_str())
            .ok_or_else(|| {
                RecordError::resolution("unable to get IP address from information provided.")
            })?
            .to_string();

        let host_label = self.interpret_name(&req.name);
        let fqdn = format!("{}.{}", host_label, req.zone);

        let existing = self
            .find_record(&req.zone, &host_label, record_type.as_str())
            .await?;

        match existing {
            Some(record) if req.edit_if_exists => {
                info!(
                    "Editing {} ({}) from {} to {}",
                    fqdn, record_type, record.content, content
                );
                self.update(
                    &req.zone,
                    record_type,
                    &record.id,
                    &host_label,
                    &content,
                    req.ttl,
                )
                .await?;
                Ok(AddOutcome::Edited {
                    fqdn,
                    record_type,
                    content,
                })
            }
            Some(record) => {
                warn!(
                    "{} ({}) already points to {}; not editing",
                    fqdn, record_type, record.content
                );
                Ok(AddOutcome::Unchanged { fqdn, record_type })
            }
            None => {
                info!("Creating {} ({}) => {}", fqdn, record_type, content);
                self.create(&req.zone, record_type, &host_label, &content, req.ttl)
                    .await?;
                Ok(AddOutcome::Created {
                    fqdn,
                    record_type,
                    content,
                })
            }
        }
    }

    /// Remove the record matching the request's name and type.
    pub async fn del_record(&self, req: &DelRecordRequest) -> Result<DelOutcome, RecordError> {
        if req.zone.is_empty() {
            return Err(RecordError::validation(
                "you must provide a zone to search for records to delete.",
            ));
        }

        let host_label = self.interpret_name(&req.name);
        let record = self
            .find_record(&req.zone, &host_label, &req.record_type)
            .await?
            .ok_or_else(|| {
                RecordError::not_found(format!(
                    "Unable to find existing record for '{}' in zone '{}'.",
                    host_label, req.zone
                ))
            })?;

        info!("Deleting {} ({}) id={}", record.name, req.record_type, record.id);
        self.delete(&req.zone, &record.id).await?;

        Ok(DelOutcome {
            name: record.name,
            record_type: req.record_type.clone(),
        })
    }
}
