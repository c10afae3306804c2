//TODO: allow overriding the settings location from the command line

pub const SETTINGS: &str = "config/provisioner.yml";
pub const AZURE_CONF: &str = "azure.conf";
pub const GCP_CONF: &str = "GCP.conf";
pub const AUDIT_LOG: &str = "VM_creation.txt";
pub const ARCHIVE_EXT: &str = "conf";
