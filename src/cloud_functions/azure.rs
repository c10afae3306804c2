use crate::machines::{AzureVm, VmDescriptor};
use crate::shell_tools::{CommandRunner, RunInfo};
use crate::shell_tools::shell_quote as q;

/// Shown instead of the admin password when a command gets printed
const MASK: &str = "********";

pub fn image_list_command(az: &str) -> String {
    format!("{} vm image list", q(az))
}

/// `az vm image list` prints JSON, so a token looks like `"UbuntuLTS",`
pub fn normalize_image_token(token: &str) -> &str {
    token.trim_matches(|c: char| c == '"' || c == ',')
}

pub fn resource_group_command(az: &str, group: &str, region: &str, subscription: Option<&str>) -> String {
    let mut ret = format!("{} group create --name {} --location {}", q(az), q(group), q(region));
    if let Some(sub) = subscription {
        ret.push_str(&format!(" --subscription {}", q(sub)));
    }
    ret
}

fn create_command_with_password(az: &str, vm: &AzureVm, password: &str) -> String {
    format!("{} vm create --resource-group {} --location {} --name {} --image {} --admin-username {} --admin-password {} --size {} --data-disk-sizes-gb {} --verbose",
        q(az), q(vm.resource_group()), q(vm.location()), q(vm.name()), q(vm.image()),
        q(vm.admin_username()), password, q(vm.size()), q(vm.disk()))
}

pub fn create_command(az: &str, vm: &AzureVm) -> String {
    create_command_with_password(az, vm, &q(vm.admin_password()))
}

/// Same as create_command() but safe to print
pub fn printable_create_command(az: &str, vm: &AzureVm) -> String {
    create_command_with_password(az, vm, MASK)
}

pub fn status_command(az: &str, vm: &AzureVm) -> String {
    format!("{} vm get-instance-view --name {} --resource-group {} --query \"instanceView.statuses[?starts_with(code, 'PowerState/')].displayStatus\" -o tsv",
        q(az), q(vm.name()), q(vm.resource_group()))
}

/// Creates the resource group, or updates it if it already exists
pub fn ensure_resource_group(runner: &dyn CommandRunner, az: &str, group: &str, region: &str, subscription: Option<&str>) -> Result<(), String> {
    let res = runner.run(&resource_group_command(az, group, region, subscription));
    match res.failure() {
        false => Ok(()),
        true => Err(res.failure_reason()),
    }
}

/// Power state as the CLI displays it (e.g. "VM running"), or whatever the CLI printed
pub fn get_status(runner: &dyn CommandRunner, az: &str, vm: &AzureVm) -> String {
    runner.run(&status_command(az, vm)).stdout().trim().to_string()
}

fn check_logged_in(runner: &dyn CommandRunner, az: &str) -> Result<(), String> {
    match runner.run(&format!("{} account show", q(az))).non_zero_exit() {
        false => Ok(()),
        true => Err("Azure CLI is installed but does not seem to be logged in. Please run \"az login\".".to_string()),
    }
}

pub fn check_azure_cli_install(runner: &dyn CommandRunner, az: &str) -> Result<(), String> {
    super::check_cli_install(runner, az)?;
    check_logged_in(runner, az)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_functions::tests::ScriptedRunner;
    use crate::cloud_functions::image_listed;
    use crate::machines::tests::azure_section;

    fn vm() -> AzureVm {
        AzureVm::from_section(&azure_section("web1")).unwrap()
    }

    #[test]
    fn create_command_has_every_flag_in_order() {
        let cmd = create_command("az", &vm());
        assert_eq!(cmd, "az vm create --resource-group shop-rg --location canadacentral --name web1 --image UbuntuLTS \
--admin-username azureuser --admin-password 'S3cret pass!' --size Standard_B1s --data-disk-sizes-gb 32 --verbose");
    }

    #[test]
    fn printed_command_hides_the_password() {
        let cmd = printable_create_command("az", &vm());
        assert!(!cmd.contains("S3cret"));
        assert!(cmd.contains("--admin-password ******** --size"));
    }

    #[test]
    fn json_tokens_are_unwrapped() {
        let listing = "[\n  {\n    \"offer\": \"UbuntuServer\",\n    \"urnAlias\": \"UbuntuLTS\",\n    \"version\": \"latest\"\n  }\n]";
        assert!(image_listed(listing, "UbuntuLTS", normalize_image_token));
        assert!(image_listed(listing, "latest", normalize_image_token));
        assert!(!image_listed(listing, "Debian", normalize_image_token));
        assert_eq!(normalize_image_token("\"UbuntuLTS\","), "UbuntuLTS");
    }

    #[test]
    fn resource_group_uses_fixed_region_and_optional_subscription() {
        assert_eq!(resource_group_command("az", "shop-rg", "canadacentral", None),
                   "az group create --name shop-rg --location canadacentral");
        assert_eq!(resource_group_command("az", "shop-rg", "canadacentral", Some("0000-1111")),
                   "az group create --name shop-rg --location canadacentral --subscription 0000-1111");
    }

    #[test]
    fn resource_group_failure_is_reported_not_raised() {
        let runner = ScriptedRunner::new(&[("az group create", "", 1)]);
        let res = ensure_resource_group(&runner, "az", "shop-rg", "canadacentral", None);
        assert!(res.unwrap_err().contains("non-zero code (1)"));
        let runner = ScriptedRunner::new(&[]);
        assert!(ensure_resource_group(&runner, "az", "shop-rg", "canadacentral", None).is_ok());
    }

    #[test]
    fn status_is_the_trimmed_query_output() {
        let runner = ScriptedRunner::new(&[("az vm get-instance-view", "VM running\n", 0)]);
        assert_eq!(get_status(&runner, "az", &vm()), "VM running");
        let issued = runner.all_commands();
        assert!(issued[0].contains("--query \"instanceView.statuses[?starts_with(code, 'PowerState/')].displayStatus\" -o tsv"));
    }

    #[test]
    fn not_logged_in_is_an_error() {
        let runner = ScriptedRunner::new(&[("az account show", "", 1)]);
        assert!(check_azure_cli_install(&runner, "az").is_err());
        let runner = ScriptedRunner::new(&[]);
        assert!(check_azure_cli_install(&runner, "az").is_ok());
    }

    #[test]
    fn cli_path_is_quoted_for_the_shell() {
        let az = "/opt/Azure CLI/bin/az";
        assert_eq!(image_list_command(az), "'/opt/Azure CLI/bin/az' vm image list");
        assert!(create_command(az, &vm()).starts_with("'/opt/Azure CLI/bin/az' vm create "));
        assert!(status_command(az, &vm()).starts_with("'/opt/Azure CLI/bin/az' vm get-instance-view "));
        let runner = ScriptedRunner::new(&[]);
        assert!(check_azure_cli_install(&runner, az).is_ok());
        assert_eq!(runner.all_commands(), vec!["'/opt/Azure CLI/bin/az' account show".to_string()]);
    }
}
