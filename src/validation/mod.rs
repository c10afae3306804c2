//validation/mod.rs
//checks that a configuration section holds exactly the keys a provider expects
use crate::config_file::Section;
use crate::error::ProvisionError;

/// The two disjoint groups of keys a provider expects in every section
#[derive(Debug, Clone, Copy)]
pub struct KeySet {
    /// Passed to the provider CLI
    pub mandatory: &'static [&'static str],
    /// Only recorded in the audit log
    pub descriptive: &'static [&'static str],
}

pub const AZURE_KEYS: KeySet = KeySet {
    mandatory: &["name", "resource-group", "image", "location", "admin-username", "admin-password"],
    descriptive: &["purpose", "os", "team", "size", "disk"],
};

pub const GCP_KEYS: KeySet = KeySet {
    mandatory: &["name", "imageproject", "image", "zone"],
    descriptive: &["project", "team", "purpose", "os"],
};

impl KeySet {
    pub fn len(&self) -> usize {
        self.mandatory.len() + self.descriptive.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.mandatory.contains(&key) || self.descriptive.contains(&key)
    }

    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        self.mandatory.iter().chain(self.descriptive.iter()).copied()
    }
}

/// A section is valid iff its keys are exactly the mandatory and descriptive ones, all with a value.
/// The count check comes first and alone only catches missing keys; the membership check catches
/// extra (or misspelled) ones.
pub fn validate_section(section: &Section, keys: &KeySet) -> Result<(), ProvisionError> {

    if keys.len() > section.len() {
        let missing = keys.all().filter(|k| !section.contains_key(k)).map(String::from).collect();
        return Err(ProvisionError::MissingKeys { section: section.name().to_string(), missing });
    }

    let unknown: Vec<String> = section.keys().filter(|k| !keys.contains(k)).map(String::from).collect();
    if !unknown.is_empty() {
        return Err(ProvisionError::UnknownKeys { section: section.name().to_string(), unknown });
    }

    match section.iter().find(|(_, v)| v.trim().is_empty()) {
        Some((k, _)) => Err(ProvisionError::EmptyValue { section: section.name().to_string(), key: k.to_string() }),
        None => Ok(()),
    }
}

/// Only call on a section that passed validate_section()
pub fn required<'a>(section: &'a Section, key: &str) -> Result<&'a str, ProvisionError> {
    section.get(key).ok_or_else(|| ProvisionError::MissingKeys {
        section: section.name().to_string(),
        missing: vec![key.to_string()],
    })
}
