mod settings;

pub use settings::{CloudflareConfig, HostConfig, LoggingConfig, Settings};
