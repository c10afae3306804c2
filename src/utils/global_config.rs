// global_config.rs
//
// Author: Jonathan Scanzi
// Date: 15 Jul 2019
//
// All the global variables that would not make sense to pass along the data hierarchy are here.
// Obviously, there should be as few of them as possible.

// - Shell used to run the provider CLIs
// - Per provider file names, environment variable names and CLI binaries

use crate::paths;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    /// Refer to load_settings() definition for details
    pub static ref SETTINGS: Settings = load_settings(paths::SETTINGS);
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {

    pub shell: String,
    /// Shared by both providers, only ever appended to
    pub audit_log: PathBuf,
    pub azure: AzureSettings,
    pub gcp: GcpSettings,
}

/// What both providers need to know about themselves
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {

    pub cli_binary: String,
    pub config_file: PathBuf,
    /// Archived config files are named <archive_prefix><timestamp>.conf
    pub archive_prefix: String,
    /// Environment variable holding the name of the person running the provisioning
    pub admin_env: String,
    /// Accept images that could not be found in the provider image list (with a warning)
    pub lenient_image_check: bool,
}

// serde's flatten does not combine with per-provider defaults, so the common
// fields are spelled out in each provider struct and gathered here
macro_rules! provider_settings {
    ($($struct_name: ident),*) => {
        $(impl $struct_name {
            pub fn common(&self) -> ProviderSettings {
                ProviderSettings {
                    cli_binary: self.cli_binary.clone(),
                    config_file: self.config_file.clone(),
                    archive_prefix: self.archive_prefix.clone(),
                    admin_env: self.admin_env.clone(),
                    lenient_image_check: self.lenient_image_check,
                }
            }
        })*
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AzureSettings {

    pub cli_binary: String,
    pub config_file: PathBuf,
    pub archive_prefix: String,
    pub admin_env: String,
    pub lenient_image_check: bool,
    pub subscription_env: String,
    /// Region every resource group gets created in, whatever the VM location is
    pub resource_group_region: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GcpSettings {

    pub cli_binary: String,
    pub config_file: PathBuf,
    pub archive_prefix: String,
    pub admin_env: String,
    pub lenient_image_check: bool,
}

provider_settings!(AzureSettings, GcpSettings);

impl Default for Settings {
    fn default() -> Self {
        Settings {
            shell: "sh".to_string(),
            audit_log: PathBuf::from(paths::AUDIT_LOG),
            azure: AzureSettings::default(),
            gcp: GcpSettings::default(),
        }
    }
}

impl Default for AzureSettings {
    fn default() -> Self {
        AzureSettings {
            cli_binary: "az".to_string(),
            config_file: PathBuf::from(paths::AZURE_CONF),
            archive_prefix: "azure_".to_string(),
            admin_env: "AZURE_USERNAME".to_string(),
            lenient_image_check: true,
            subscription_env: "AZURE_SUBSCRIPTION_ID".to_string(),
            resource_group_region: "canadacentral".to_string(),
        }
    }
}

impl Default for GcpSettings {
    fn default() -> Self {
        GcpSettings {
            cli_binary: "gcloud".to_string(),
            config_file: PathBuf::from(paths::GCP_CONF),
            archive_prefix: "GCP".to_string(),
            admin_env: "GCP_USERNAME".to_string(),
            lenient_image_check: false,
        }
    }
}

/// Loads the settings file. Without one, every value falls back to its default;
/// a file that exists but is not proper YAML is a hard error.
fn load_settings(filename: &str) -> Settings {
    if !Path::new(filename).is_file() {
        println_with_time!("No settings file at {}, using default settings", filename);
        return Settings::default();
    }
    let text = fs::read_to_string(filename).unwrap_or_else(|e| panic!("Error: could not read settings file {}: {}", filename, e));
    parse_settings(&text).unwrap_or_else(|e| panic!("Error: could not parse settings file {} into YAML. Issue:\n{}\n", filename, e))
}

pub fn parse_settings(text: &str) -> Result<Settings, serde_yaml::Error> {
    serde_yaml::from_str(text)
}
