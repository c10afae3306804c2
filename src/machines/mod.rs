//machines/mod.rs
//in-memory description of the VMs to create, one per validated configuration section

use crate::config_file::Section;
use crate::error::ProvisionError;
use crate::validation::required;

/// What ends up in the audit log for one VM (the status is looked up separately)
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry<'a> {
    pub name: &'a str,
    /// GCP project, or Azure resource group
    pub project: &'a str,
    pub purpose: &'a str,
    pub team: &'a str,
    pub os: &'a str,
}

pub trait VmDescriptor: Sized {
    /// Builds the VM from a section that already passed validation
    fn from_section(section: &Section) -> Result<Self, ProvisionError>;

    fn name(&self) -> &str;

    fn image(&self) -> &str;

    fn audit_entry(&self) -> AuditEntry<'_>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AzureVm {
    name: String,
    purpose: String,
    os: String,
    team: String,
    image: String,
    resource_group: String,
    location: String,
    admin_username: String,
    admin_password: String,
    size: String,
    disk: String,
}

impl AzureVm {
    make_str_getter!(purpose, os, team, resource_group, location, admin_username, admin_password, size, disk);
}

impl VmDescriptor for AzureVm {
    fn from_section(section: &Section) -> Result<Self, ProvisionError> {
        let get = |key: &str| required(section, key).map(String::from);
        Ok(AzureVm {
            name: get("name")?,
            purpose: get("purpose")?,
            os: get("os")?,
            team: get("team")?,
            image: get("image")?,
            resource_group: get("resource-group")?,
            location: get("location")?,
            admin_username: get("admin-username")?,
            admin_password: get("admin-password")?,
            size: get("size")?,
            disk: get("disk")?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn audit_entry(&self) -> AuditEntry<'_> {
        AuditEntry {
            name: &self.name,
            project: &self.resource_group,
            purpose: &self.purpose,
            team: &self.team,
            os: &self.os,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GcpVm {
    name: String,
    purpose: String,
    os: String,
    team: String,
    image: String,
    zone: String,
    image_project: String,
    project: String,
}

impl GcpVm {
    make_str_getter!(purpose, os, team, zone, image_project, project);
}

impl VmDescriptor for GcpVm {
    fn from_section(section: &Section) -> Result<Self, ProvisionError> {
        let get = |key: &str| required(section, key).map(String::from);
        Ok(GcpVm {
            name: get("name")?,
            purpose: get("purpose")?,
            os: get("os")?,
            team: get("team")?,
            image: get("image")?,
            zone: get("zone")?,
            image_project: get("imageproject")?,
            project: get("project")?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn audit_entry(&self) -> AuditEntry<'_> {
        AuditEntry {
            name: &self.name,
            project: &self.project,
            purpose: &self.purpose,
            team: &self.team,
            os: &self.os,
        }
    }
}
