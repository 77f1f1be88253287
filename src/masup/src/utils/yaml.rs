use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use yaml_rust2::YamlLoader;
// re-export Yaml for convenience
pub use yaml_rust2::Yaml;

/// Where a YAML definition document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlFile {
    Embedded(&'static str),
    Path(PathBuf),
}

impl YamlFile {
    pub fn read(&self) -> Result<String> {
        match self {
            YamlFile::Embedded(contents) => Ok((*contents).to_string()),
            YamlFile::Path(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

impl From<&Path> for YamlFile {
    fn from(path: &Path) -> Self {
        YamlFile::Path(path.to_path_buf())
    }
}

/// Parses `yaml_str` and returns its single top-level hash.
pub fn load_yaml_document(yaml_str: &str) -> Result<Yaml> {
    let docs = YamlLoader::load_from_str(yaml_str)?;
    let doc = docs.into_iter().next().ok_or(anyhow!("Empty yaml file"))?;
    if doc.as_hash().is_none() {
        bail!("Expected top-level element to be a hash");
    }
    Ok(doc)
}

/// Converts every element of the top-level array under `key`, failing on the first bad element.
pub fn load_from_yaml_array<T: TryFrom<Yaml, Error = anyhow::Error>>(
    doc: &Yaml,
    key: &'static str,
) -> Result<Vec<T>> {
    doc.required_vec(key)?
        .iter()
        .enumerate()
        .map(|(i, yaml)| {
            T::try_from(yaml.clone()).with_context(|| format!("{}[{}]", key, i))
        })
        .collect()
}

pub trait YamlExt: Sized {
    fn required(&self, key: &'static str) -> Result<&Yaml>;

    fn optional(&self, key: &'static str) -> Option<&Yaml>;

    fn required_string(&self, key: &'static str) -> Result<String>;

    fn optional_string(&self, key: &'static str) -> Result<Option<String>>;

    fn required_vec(&self, key: &'static str) -> Result<&Vec<Self>>;

    fn optional_vec(&self, key: &'static str) -> Result<Option<&Vec<Self>>>;

    fn to_string(&self) -> Result<String>;

    fn to_string_vec(&self) -> Result<Vec<String>>;
}

impl YamlExt for Yaml {
    fn required(&self, key: &'static str) -> Result<&Yaml> {
        let value = &self[key];
        if value.is_badvalue() {
            bail!("Missing key {}", key)
        } else {
            Ok(value)
        }
    }

    fn optional(&self, key: &'static str) -> Option<&Yaml> {
        let value = &self[key];
        if value.is_badvalue() {
            None
        } else {
            Some(value)
        }
    }

    fn required_string(&self, key: &'static str) -> Result<String> {
        match &self[key] {
            Yaml::String(s) => Ok(s.clone()),
            Yaml::BadValue => bail!("Missing key {}", key),
            _ => bail!("Expected {} to be a string", key),
        }
    }

    fn optional_string(&self, key: &'static str) -> Result<Option<String>> {
        match &self[key] {
            Yaml::String(s) => Ok(Some(s.clone())),
            Yaml::BadValue | Yaml::Null => Ok(None),
            _ => bail!("Expected {} to be a string", key),
        }
    }

    fn required_vec(&self, key: &'static str) -> Result<&Vec<Self>> {
        match &self[key] {
            Yaml::Array(v) => Ok(v),
            Yaml::BadValue => bail!("Missing key {}", key),
            _ => bail!("Expected {} to be an array", key),
        }
    }

    fn optional_vec(&self, key: &'static str) -> Result<Option<&Vec<Self>>> {
        match &self[key] {
            Yaml::Array(v) => Ok(Some(v)),
            Yaml::BadValue | Yaml::Null => Ok(None),
            _ => bail!("Expected {} to be an array", key),
        }
    }

    fn to_string(&self) -> Result<String> {
        match self {
            Yaml::String(s) => Ok(s.clone()),
            _ => bail!("Expected a string"),
        }
    }

    fn to_string_vec(&self) -> Result<Vec<String>> {
        match self {
            Yaml::Array(items) => items.iter().map(YamlExt::to_string).collect(),
            _ => bail!("Expected an array of strings"),
        }
    }
}
