use crate::machines::{GcpVm, VmDescriptor};
use crate::shell_tools::CommandRunner;
use crate::shell_tools::shell_quote as q;

/// Status reported for a VM that is not in the instance list
pub const VM_MISSING_STATUS: &str = "vm does not exist";

pub fn image_list_command(gcloud: &str) -> String {
    format!("{} compute images list", q(gcloud))
}

pub fn instance_list_command(gcloud: &str) -> String {
    format!("{} compute instances list", q(gcloud))
}

pub fn create_command(gcloud: &str, vm: &GcpVm) -> String {
    format!("{} compute instances create {} --image={} --image-project={} --zone={}",
        q(gcloud), q(vm.name()), q(vm.image()), q(vm.image_project()), q(vm.zone()))
}

/// Scans the `gcloud compute instances list` table (header first) for the row of the given VM
/// and returns its last column, the status.
pub fn status_from_table(table: &str, vm_name: &str) -> String {
    for row in table.lines().skip(1) {
        let columns: Vec<&str> = row.split_whitespace().collect();
        let first = unwrap_or_continue!(columns.first());
        if *first == vm_name {
            // a row always has a last column when it has a first one
            return columns.last().map_or(VM_MISSING_STATUS, |c| *c).to_string();
        }
    }
    VM_MISSING_STATUS.to_string()
}

pub fn get_status(runner: &dyn CommandRunner, gcloud: &str, vm: &GcpVm) -> String {
    status_from_table(runner.run(&instance_list_command(gcloud)).stdout(), vm.name())
}
