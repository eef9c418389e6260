mod manager;
mod name;
mod outcome;

pub use manager::{
    AddRecordRequest, DelRecordRequest, RecordManager, DEFAULT_NAME_TEMPLATE,
    DEFAULT_RECORD_TYPE, DEFAULT_TTL,
};
pub use name::{interpret_name, AGENT_ID_PLACEHOLDER, HOST_PLACEHOLDER};
pub use outcome::{AddOutcome, DelOutcome};
