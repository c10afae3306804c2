use crate::cloud_functions::azure;
use crate::config_file::Section;
use crate::error::ProvisionError;
use crate::machines::AzureVm;
use crate::pipelines::ProvisionPipeline;
use crate::shell_tools::CommandRunner;
use crate::utils::global_config::{AzureSettings, ProviderSettings};
use crate::validation::{self, KeySet, AZURE_KEYS};

use std::env;
use std::path::Path;

pub struct AzureCliPipeline<'a> {
    runner: &'a dyn CommandRunner,
    azure: &'a AzureSettings,
    common: ProviderSettings,
    audit_log: &'a Path,
}

impl<'a> AzureCliPipeline<'a> {
    pub fn new(runner: &'a dyn CommandRunner, azure: &'a AzureSettings, audit_log: &'a Path) -> Self {
        AzureCliPipeline { runner, azure, common: azure.common(), audit_log }
    }

    fn az(&self) -> &str {
        &self.common.cli_binary
    }

    fn subscription(&self) -> Option<String> {
        env::var(&self.azure.subscription_env).ok().filter(|s| !s.trim().is_empty())
    }
}

impl<'a> ProvisionPipeline for AzureCliPipeline<'a> {

    type Vm = AzureVm;

    fn provider_name(&self) -> &'static str {
        "Azure"
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
        &AZURE_KEYS
    }

    fn check_cli(&self) -> Result<(), ProvisionError> {
        azure::check_azure_cli_install(self.runner, self.az())
            .map_err(|reason| ProvisionError::CliUnavailable { binary: self.az().to_string(), reason })
    }

    /// Creates (or updates) the resource group of the section, in the configured region
    fn check_resources(&self, section: &Section) -> Result<(), ProvisionError> {
        let group = validation::required(section, "resource-group")?;
        println_with_time!("Azure - making sure resource group {} exists", group);
        let subscription = self.subscription();
        azure::ensure_resource_group(self.runner, self.az(), group, &self.azure.resource_group_region, subscription.as_deref())
            .map_err(|reason| ProvisionError::ResourceGroup {
                section: section.name().to_string(),
                group: group.to_string(),
                reason,
            })
    }

    fn image_list_command(&self) -> String {
        azure::image_list_command(self.az())
    }

    fn normalize_image_token<'t>(&self, token: &'t str) -> &'t str {
        azure::normalize_image_token(token)
    }

    fn create_command(&self, vm: &AzureVm) -> String {
        azure::create_command(self.az(), vm)
    }

    fn printable_create_command(&self, vm: &AzureVm) -> String {
        azure::printable_create_command(self.az(), vm)
    }

    fn get_status(&self, vm: &AzureVm) -> String {
        azure::get_status(self.runner, self.az(), vm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_functions::tests::ScriptedRunner;
    use crate::error::ErrorKind;
    use regex::Regex;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const WEB1: &str = "
[web1]
name = web1
resource-group = shop-rg
image = UbuntuLTS
location = canadacentral
admin-username = azureuser
admin-password = S3cretPass!
purpose = storefront
os = linux
team = web
size = Standard_B1s
disk = 32
";

    const IMAGES: &str = "[\n  {\n    \"offer\": \"UbuntuServer\",\n    \"urnAlias\": \"UbuntuLTS\",\n    \"version\": \"latest\"\n  }\n]\n";

    fn settings(dir: &TempDir, admin_env: &str, lenient: bool) -> AzureSettings {
        AzureSettings {
            config_file: dir.path().join("azure.conf"),
            admin_env: admin_env.to_string(),
            subscription_env: "PROVISIONER_TEST_AZ_SUBSCRIPTION_NEVER_SET".to_string(),
            lenient_image_check: lenient,
            ..AzureSettings::default()
        }
    }

    fn scripted() -> ScriptedRunner {
        ScriptedRunner::new(&[
            ("az vm image list", IMAGES, 0),
            ("az vm get-instance-view", "VM running\n", 0),
        ])
    }

    fn archives(dir: &TempDir) -> Vec<PathBuf> {
        let pattern = Regex::new(r"^azure_\d{4}-\d{2}-\d{2}:\d{2}:\d{2}:\d{2}\.conf$").unwrap();
        fs::read_dir(dir.path()).unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| pattern.is_match(&p.file_name().unwrap().to_string_lossy()))
            .collect()
    }

    #[test]
    fn one_section_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("azure.conf"), WEB1).unwrap();
        env::set_var("PROVISIONER_TEST_AZ_ADMIN_E2E", "alice");
        let settings = settings(&dir, "PROVISIONER_TEST_AZ_ADMIN_E2E", false);
        let log = dir.path().join("VM_creation.txt");
        let runner = scripted();

        let report = AzureCliPipeline::new(&runner, &settings, &log).run().unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].exit_code, Some(0));
        assert!(report.warnings.is_empty());

        let creates = runner.interactive.borrow().clone();
        assert_eq!(creates.len(), 1);
        for flag in &["--resource-group shop-rg", "--location canadacentral", "--name web1", "--image UbuntuLTS",
                      "--admin-username azureuser", "--admin-password 'S3cretPass!'", "--size Standard_B1s", "--data-disk-sizes-gb 32"] {
            assert!(creates[0].contains(flag), "missing {} in {}", flag, creates[0]);
        }

        let captured = runner.captured.borrow().clone();
        assert!(captured.iter().any(|c| c == "az group create --name shop-rg --location canadacentral"));

        assert!(!dir.path().join("azure.conf").exists());
        assert_eq!(archives(&dir), vec![report.archive.clone()]);

        let text = fs::read_to_string(&log).unwrap();
        assert!(text.contains("System Admin Name: alice\n"));
        assert!(text.contains("name: web1\nproject: shop-rg\npurpose: storefront\nteam: web\nos: linux\nstatus: VM running\n"));
    }

    #[test]
    fn failing_create_is_only_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("azure.conf"), WEB1).unwrap();
        let settings = settings(&dir, "PROVISIONER_TEST_AZ_ADMIN_NEVER_SET", false);
        let log = dir.path().join("VM_creation.txt");
        let runner = ScriptedRunner::new(&[("az vm image list", IMAGES, 0), ("az vm create", "", 2)]);

        let report = AzureCliPipeline::new(&runner, &settings, &log).run().unwrap();

        assert_eq!(report.created[0].exit_code, Some(2));
        let kinds: Vec<ErrorKind> = report.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Provisioning, ErrorKind::Environment]);
        assert!(fs::read_to_string(&log).unwrap().contains("System Admin Name: Unknown\n"));
    }

    #[test]
    fn resource_group_failure_aborts_before_creating() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("azure.conf"), WEB1).unwrap();
        let settings = settings(&dir, "AZURE_USERNAME", false);
        let log = dir.path().join("VM_creation.txt");
        let runner = ScriptedRunner::new(&[("az group create", "", 1)]);

        let err = AzureCliPipeline::new(&runner, &settings, &log).run().unwrap_err();

        assert!(matches!(err, ProvisionError::ResourceGroup { ref group, .. } if group == "shop-rg"));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(runner.interactive.borrow().is_empty());
        assert!(dir.path().join("azure.conf").exists());
        assert!(!log.exists());
    }

    #[test]
    fn unlisted_image_depends_on_leniency() {
        let dir = tempfile::tempdir().unwrap();
        let text = WEB1.replace("image = UbuntuLTS", "image = Win2019Datacenter");
        fs::write(dir.path().join("azure.conf"), &text).unwrap();
        let log = dir.path().join("VM_creation.txt");

        let strict = settings(&dir, "AZURE_USERNAME", false);
        let runner = scripted();
        let err = AzureCliPipeline::new(&runner, &strict, &log).run().unwrap_err();
        assert!(matches!(err, ProvisionError::UnknownImage { .. }));
        assert!(runner.interactive.borrow().is_empty());

        let lenient = settings(&dir, "AZURE_USERNAME", true);
        let runner = scripted();
        let report = AzureCliPipeline::new(&runner, &lenient, &log).run().unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.warnings[0].kind, ErrorKind::Precondition);
    }

    #[test]
    fn later_invalid_section_aborts_the_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}\n[web2]\nname = web2\nimage = UbuntuLTS\n", WEB1);
        fs::write(dir.path().join("azure.conf"), &text).unwrap();
        let settings = settings(&dir, "AZURE_USERNAME", false);
        let log = dir.path().join("VM_creation.txt");
        let runner = scripted();

        let err = AzureCliPipeline::new(&runner, &settings, &log).run().unwrap_err();

        assert!(matches!(err, ProvisionError::MissingKeys { ref section, .. } if section == "web2"));
        // first VM was already created, no rollback, no archive, no log
        assert_eq!(runner.interactive.borrow().len(), 1);
        assert!(dir.path().join("azure.conf").exists());
        assert!(archives(&dir).is_empty());
        assert!(!log.exists());
    }

    #[test]
    fn missing_config_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir, "AZURE_USERNAME", false);
        let log = dir.path().join("VM_creation.txt");
        let runner = scripted();

        let err = AzureCliPipeline::new(&runner, &settings, &log).run().unwrap_err();
        assert!(err.is_fatal());
        assert!(runner.all_commands().is_empty());
    }

    #[test]
    fn cli_not_logged_in_stops_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("azure.conf"), WEB1).unwrap();
        let settings = settings(&dir, "AZURE_USERNAME", false);
        let log = dir.path().join("VM_creation.txt");
        let runner = ScriptedRunner::new(&[("az account show", "", 1)]);

        let err = AzureCliPipeline::new(&runner, &settings, &log).run().unwrap_err();
        assert!(matches!(err, ProvisionError::CliUnavailable { .. }));
    }
}
