use crate::cloud_functions::{self, gcp};
use crate::config_file::Section;
use crate::error::ProvisionError;
use crate::machines::GcpVm;
use crate::pipelines::ProvisionPipeline;
use crate::shell_tools::CommandRunner;
use crate::utils::global_config::{GcpSettings, ProviderSettings};
use crate::validation::{self, KeySet, GCP_KEYS};

use std::path::Path;

pub struct GcpCliPipeline<'a> {
    runner: &'a dyn CommandRunner,
    common: ProviderSettings,
    audit_log: &'a Path,
}

impl<'a> GcpCliPipeline<'a> {
    pub fn new(runner: &'a dyn CommandRunner, gcp: &'a GcpSettings, audit_log: &'a Path) -> Self {
        GcpCliPipeline { runner, common: gcp.common(), audit_log }
    }

    fn gcloud(&self) -> &str {
        &self.common.cli_binary
    }
}

impl<'a> ProvisionPipeline for GcpCliPipeline<'a> {

    type Vm = GcpVm;

    fn provider_name(&self) -> &'static str {
        "GCP"
    }

    fn settings(&self) -> &ProviderSettings {
        &self.common
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.runner
    }

    fn audit_log(&self) -> &Path {
        self.audit_log
    }

    fn key_set(&self) -> &'static KeySet {
        &GCP_KEYS
    }

    fn check_cli(&self) -> Result<(), ProvisionError> {
        cloud_functions::check_cli_install(self.runner, self.gcloud())
            .map_err(|reason| ProvisionError::CliUnavailable { binary: self.gcloud().to_string(), reason })
    }

    /// GCP only needs the VM name to follow its naming rule
    fn check_resources(&self, section: &Section) -> Result<(), ProvisionError> {
        let name = validation::required(section, "name")?;
        match cloud_functions::check_name(name) {
            true => Ok(()),
            false => Err(ProvisionError::InvalidName { section: section.name().to_string(), name: name.to_string() }),
        }
    }

    fn image_list_command(&self) -> String {
        gcp::image_list_command(self.gcloud())
    }

    fn create_command(&self, vm: &GcpVm) -> String {
        gcp::create_command(self.gcloud(), vm)
    }

    fn get_status(&self, vm: &GcpVm) -> String {
        gcp::get_status(self.runner, self.gcloud(), vm)
    }
}
