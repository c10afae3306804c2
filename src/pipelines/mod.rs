pub mod azure_cli;
pub mod gcp_cli;

use crate::audit;
use crate::cloud_functions;
use crate::config_file::{ConfigFile, Section};
use crate::error::{ErrorKind, ProvisionError, Warning};
use crate::machines::{AuditEntry, VmDescriptor};
use crate::shell_tools::{CommandRunner, RunInfo};
use crate::utils::global_config::ProviderSettings;
use crate::validation::{self, KeySet};

use std::path::{Path, PathBuf};

/// A VM whose create command was issued
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedVm {
    pub name: String,
    /// None when the CLI could not be started at all
    pub exit_code: Option<isize>,
}

/// What a provider batch that ran to the end did
#[derive(Debug)]
pub struct BatchReport {
    pub provider: &'static str,
    pub created: Vec<CreatedVm>,
    pub archive: PathBuf,
    pub warnings: Vec<Warning>,
}

pub trait ProvisionPipeline {

    type Vm: VmDescriptor;

    fn provider_name(&self) -> &'static str;

    fn settings(&self) -> &ProviderSettings;

    fn runner(&self) -> &dyn CommandRunner;

    fn audit_log(&self) -> &Path;

    fn key_set(&self) -> &'static KeySet;

    /// The CLI must be installed (and usable) before anything else is attempted
    fn check_cli(&self) -> Result<(), ProvisionError>;

    /// Provider specific checks on the resources a section refers to
    fn check_resources(&self, section: &Section) -> Result<(), ProvisionError>;

    fn image_list_command(&self) -> String;

    /// Strips whatever decoration the image list puts around image names
    fn normalize_image_token<'t>(&self, token: &'t str) -> &'t str {
        token
    }

    fn create_command(&self, vm: &Self::Vm) -> String;

    /// What gets printed before running create_command()
    fn printable_create_command(&self, vm: &Self::Vm) -> String {
        self.create_command(vm)
    }

    fn get_status(&self, vm: &Self::Vm) -> String;

    // ================================================ SHARED STEPS =======================================================

    fn check_image(&self, section: &Section, image: &str) -> Result<Option<Warning>, ProvisionError> {
        let listed = cloud_functions::check_image(self.runner(), &self.image_list_command(), image, |t| self.normalize_image_token(t));
        match (listed, self.settings().lenient_image_check) {
            (true, _) => Ok(None),
            (false, true) => Ok(Some(Warning::new(ErrorKind::Precondition,
                format!("{} - image '{}' of section [{}] is not in the image list, using it anyway", self.provider_name(), image, section.name())))),
            (false, false) => Err(ProvisionError::UnknownImage { section: section.name().to_string(), image: image.to_string() }),
        }
    }

    /// Validation, then resource checks, then image check. Only then is the VM described.
    fn prepare_vm(&self, section: &Section, warnings: &mut Vec<Warning>) -> Result<Self::Vm, ProvisionError> {
        validation::validate_section(section, self.key_set())?;
        self.check_resources(section)?;
        let image = validation::required(section, "image")?;
        if let Some(w) = self.check_image(section, image)? {
            warnings.push(w);
        }
        <Self::Vm as VmDescriptor>::from_section(section)
    }

    /// The exit code of the CLI is not a reason to stop: the VM counts as created either way
    fn create_vm(&self, vm: &Self::Vm, warnings: &mut Vec<Warning>) -> CreatedVm {
        println_with_time!("{} - {}", self.provider_name(), self.printable_create_command(vm));
        let res = self.runner().run_interactive(&self.create_command(vm));
        if res.not_found() {
            warnings.push(Warning::new(ErrorKind::Provisioning,
                format!("{} - could not run the create command for {}", self.provider_name(), vm.name())));
        } else if res.non_zero_exit() {
            warnings.push(Warning::new(ErrorKind::Provisioning,
                format!("{} - create command for {} returned non-zero code ({})", self.provider_name(), vm.name(), res.exit_code())));
        }
        CreatedVm {
            name: vm.name().to_string(),
            exit_code: if res.not_found() { None } else { Some(res.exit_code()) },
        }
    }

    /// Archives the config file first: if it is gone, nothing gets written to the audit log
    fn write_audit(&self, vms: &[Self::Vm], warnings: &mut Vec<Warning>) -> Result<PathBuf, ProvisionError> {
        let now = audit::timestamp(&chrono::Local::now());
        let archive = audit::archive_config(&self.settings().config_file, &self.settings().archive_prefix, &now)?;
        println_with_time!("{} - archived configuration as {}", self.provider_name(), archive.display());

        let (admin, warning) = audit::admin_name(&self.settings().admin_env);
        warnings.extend(warning);

        let entries: Vec<(AuditEntry, String)> = vms.iter().map(|vm| (vm.audit_entry(), self.get_status(vm))).collect();
        audit::append_record(self.audit_log(), &audit::format_record(&now, &admin, &entries))?;
        Ok(archive)
    }

    /// Runs the whole batch of one provider. Any validation or precondition failure stops the batch:
    /// VMs of earlier sections stay created, and nothing is archived or logged.
    fn run(&self) -> Result<BatchReport, ProvisionError> {
        let config = ConfigFile::load(&self.settings().config_file)?;
        println_with_time!("{} - sections found in {}: {:?}", self.provider_name(), config.path().display(), config.section_names());
        self.check_cli()?;

        let mut warnings = Vec::new();
        let mut vms = Vec::new();
        let mut created = Vec::new();
        for section in config.sections() {
            let vm = self.prepare_vm(&section, &mut warnings)?;
            created.push(self.create_vm(&vm, &mut warnings));
            vms.push(vm);
        }

        let archive = self.write_audit(&vms, &mut warnings)?;
        println_with_time!("{} - finished, {} vm(s) created", self.provider_name(), created.len());
        Ok(BatchReport { provider: self.provider_name(), created, archive, warnings })
    }
}
