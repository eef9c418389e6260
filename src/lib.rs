pub mod config;
pub mod dns;
pub mod error;
pub mod host;
pub mod ip;
pub mod records;
pub mod secrets;

pub use error::RecordError;
pub use records::{AddOutcome, AddRecordRequest, DelOutcome, DelRecordRequest, RecordManager};
