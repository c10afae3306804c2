//config_file/mod.rs
//reads the provider configuration files: one [section] per VM to create, made of `key = value` lines
use crate::error::ProvisionError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

// whatever follows the closing bracket of a header is ignored
const SECTION_RE: &str = r"^\[(.+)\]";
const OPTION_RE: &str = r"^([^=:]+?)\s*[=:]\s*(.*?)\s*$";
const COMMENT_RE: &str = r"^\s*[#;]";

/// Entries of this section are inherited by every other section
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// A named group of `key = value` entries, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: &str) -> Self {
        Section { name: name.to_string(), entries: Vec::new() }
    }

    /// Convenience constructor, mostly for tests
    #[allow(dead_code)]
    pub fn from_pairs(name: &str, pairs: &[(&str, &str)]) -> Self {
        let mut ret = Section::new(name);
        pairs.iter().for_each(|(k, v)| { ret.insert(k, v); });
        ret
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns false (and leaves the old value) if the key was already there
    fn insert(&mut self, key: &str, value: &str) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.entries.push((key.to_string(), value.to_string()));
        true
    }

    fn append_to_last(&mut self, continuation: &str) -> bool {
        match self.entries.last_mut() {
            Some((_, v)) => {
                v.push('\n');
                v.push_str(continuation);
                true
            },
            None => false,
        }
    }

    /// This section with the default entries it does not override added at the end
    fn with_defaults(&self, defaults: &Section) -> Section {
        let mut ret = self.clone();
        defaults.iter().for_each(|(k, v)| { ret.insert(k, v); });
        ret
    }
}

/// One parsed configuration file. Each provider loads its own.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    defaults: Section,
    sections: Vec<Section>,
}

impl ConfigFile {

    /// Loading a config file that is not there is fatal: there is nothing to provision without one
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ProvisionError::ConfigMissing(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|e| ProvisionError::ConfigParse {
            path: path.to_path_buf(),
            line: 0,
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// `origin` is only used to report errors
    pub fn parse<P: AsRef<Path>>(text: &str, origin: P) -> Result<Self, ProvisionError> {

        lazy_static! {
            static ref SECTION: Regex = Regex::new(SECTION_RE).unwrap();
            static ref OPTION: Regex = Regex::new(OPTION_RE).unwrap();
            static ref COMMENT: Regex = Regex::new(COMMENT_RE).unwrap();
        }

        let origin = origin.as_ref().to_path_buf();
        let error = |line: usize, reason: String| ProvisionError::ConfigParse { path: origin.clone(), line, reason };

        let mut ret = ConfigFile {
            path: origin.clone(),
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        };
        // None until the first header is met; Some(None) while inside [DEFAULT]
        let mut current: Option<Option<usize>> = None;
        // a continuation line is only valid right after an option (or another continuation)
        let mut continuable = false;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;

            if raw_line.trim().is_empty() || COMMENT.is_match(raw_line) {
                continuable = false;
                continue;
            }

            if raw_line.starts_with(|c: char| c.is_whitespace()) && continuable {
                let target = match current {
                    Some(Some(i)) => &mut ret.sections[i],
                    _ => &mut ret.defaults,
                };
                target.append_to_last(raw_line.trim());
                continue;
            }

            let line = raw_line.trim();

            if let Some(caps) = SECTION.captures(line) {
                let name = caps[1].trim();
                continuable = false;
                if name == DEFAULT_SECTION {
                    current = Some(None);
                    continue;
                }
                if ret.sections.iter().any(|s| s.name() == name) {
                    return Err(error(line_no, format!("section [{}] already exists", name)));
                }
                ret.sections.push(Section::new(name));
                current = Some(Some(ret.sections.len() - 1));
                continue;
            }

            let caps = match OPTION.captures(line) {
                Some(caps) => caps,
                None => return Err(error(line_no, format!("expected '[section]' or 'key = value', found '{}'", line))),
            };
            let key = caps[1].trim().to_lowercase();
            let value = &caps[2];

            let target = match current {
                None => return Err(error(line_no, format!("'{}' is not inside a section", key))),
                Some(None) => &mut ret.defaults,
                Some(Some(i)) => &mut ret.sections[i],
            };
            if !target.insert(&key, value) {
                return Err(error(line_no, format!("option '{}' appears twice in section [{}]", key, target.name())));
            }
            continuable = true;
        }
        Ok(ret)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The VM sections, in file order, each including the [DEFAULT] entries it does not override
    pub fn sections(&self) -> Vec<Section> {
        self.sections.iter().map(|s| s.with_defaults(&self.defaults)).collect()
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name()).collect()
    }
}
