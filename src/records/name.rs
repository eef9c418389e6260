use crate::host::HostInventory;

pub const AGENT_ID_PLACEHOLDER: &str = "%M";
pub const HOST_PLACEHOLDER: &str = "%H";

/// Expand a record-name template into the host label of a record.
///
/// `%M` wins over `%H`: when it is present, `%H` is left as written. A
/// template with neither placeholder is replaced by the host grain.
pub fn interpret_name(inventory: &dyn HostInventory, template: &str) -> String {
    if template.contains(AGENT_ID_PLACEHOLDER) {
        template.replace(AGENT_ID_PLACEHOLDER, inventory.agent_id())
    } else if template.contains(HOST_PLACEHOLDER) {
        template.replace(HOST_PLACEHOLDER, inventory.host())
    } else {
        inventory.host().to_string()
    }
}
