mod inventory;
mod local;

pub use inventory::{HostInventory, HostSnapshot, Interface};
pub use local::discover;
