use std::fmt;

use crate::dns::RecordType;

/// What `add_record` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created {
        fqdn: String,
        record_type: RecordType,
        content: String,
    },
    Edited {
        fqdn: String,
        record_type: RecordType,
        content: String,
    },
    /// A matching record exists and editing was not requested
    Unchanged { fqdn: String, record_type: RecordType },
}

impl AddOutcome {
    pub fn messages(&self) -> Vec<String> {
        match self {
            AddOutcome::Created {
                fqdn,
                record_type,
                content,
            } => vec![format!(
                "added {} record: {} => {}",
                record_type, fqdn, content
            )],
            AddOutcome::Edited {
                fqdn,
                record_type,
                content,
            } => vec![
                exists_message(fqdn, *record_type),
                format!("edited record; now points to {}", content),
            ],
            AddOutcome::Unchanged { fqdn, record_type } => vec![
                exists_message(fqdn, *record_type),
                "not editing because edit_if_exists=False".to_string(),
            ],
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, AddOutcome::Unchanged { .. })
    }
}

fn exists_message(fqdn: &str, record_type: RecordType) -> String {
    format!("record {} ({}) already exists", fqdn, record_type)
}

/// A record removed by `del_record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelOutcome {
    pub name: String,
    pub record_type: String,
}

impl fmt::Display for DelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deleted record {} ({})", self.name, self.record_type)
    }
}

impl DelOutcome {
    pub fn messages(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}
