use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use zzt_router::AllowHeader;

use crate::error::ConfigError;

/// Application configuration.
///
/// Loaded from JSON shaped like:
///
/// ```json
/// {
///   "base_path": "/srv/app",
///   "base": {
///     "modules_folder": "modules",
///     "module_file": "module.rs",
///     "allow_header": "legacy"
///   }
/// }
/// ```
///
/// `base_path` and `base.modules_folder` are required. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application root directory.
    pub base_path: PathBuf,

    /// Folder, relative to `base_path`, holding one sub-folder per module.
    pub modules_folder: String,

    /// Entry file expected inside each module folder.
    pub module_file: String,

    /// Header name used for 405 responses.
    pub allow_header: AllowHeader,
}

#[derive(Deserialize)]
struct RawConfig {
    base_path: Option<PathBuf>,
    #[serde(default)]
    base: RawBase,
}

#[derive(Default, Deserialize)]
struct RawBase {
    modules_folder: Option<String>,
    module_file: Option<String>,
    #[serde(default)]
    allow_header: AllowHeader,
}

const DEFAULT_MODULE_FILE: &str = "module.rs";

impl Config {
    pub fn new(base_path: impl Into<PathBuf>, modules_folder: impl Into<String>) -> Self {
        Config {
            base_path: base_path.into(),
            modules_folder: modules_folder.into(),
            module_file: DEFAULT_MODULE_FILE.to_owned(),
            allow_header: AllowHeader::default(),
        }
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;

        Ok(Config {
            base_path: raw.base_path.ok_or(ConfigError::Missing("base_path"))?,
            modules_folder: raw
                .base
                .modules_folder
                .ok_or(ConfigError::Missing("modules_folder"))?,
            module_file: raw
                .base
                .module_file
                .unwrap_or_else(|| DEFAULT_MODULE_FILE.to_owned()),
            allow_header: raw.base.allow_header,
        })
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Directory holding the module folders.
    pub fn modules_dir(&self) -> PathBuf {
        self.base_path.join(&self.modules_folder)
    }

    /// Directory of a single module.
    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.modules_dir().join(module)
    }

    /// Scans the modules folder and maps each module name to its entry file path.
    ///
    /// Every sub-directory is a module; plain files in the modules folder are skipped.
    pub fn module_paths(&self) -> Result<BTreeMap<String, PathBuf>, ConfigError> {
        let mut modules = BTreeMap::new();

        for entry in fs::read_dir(self.modules_dir())? {
            let entry = entry?;

            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path().join(&self.module_file);
            modules.insert(name, path);
        }

        Ok(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let cfg = Config::from_json(
            r#"{
                "base_path": "/srv/app",
                "base": {
                    "modules_folder": "modules",
                    "module_file": "routes.rs",
                    "allow_header": "standard",
                    "cache": { "template_dir": "/tmp" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.base_path, PathBuf::from("/srv/app"));
        assert_eq!(cfg.modules_dir(), PathBuf::from("/srv/app/modules"));
        assert_eq!(cfg.module_dir("blog"), PathBuf::from("/srv/app/modules/blog"));
        assert_eq!(cfg.module_file, "routes.rs");
        assert_eq!(cfg.allow_header, AllowHeader::Standard);
    }

    #[test]
    fn defaults() {
        let cfg =
            Config::from_json(r#"{ "base_path": "/a", "base": { "modules_folder": "m" } }"#)
                .unwrap();
        assert_eq!(cfg, Config::new("/a", "m"));
    }

    #[test]
    fn missing_keys() {
        let err = Config::from_json(r#"{ "base": { "modules_folder": "m" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("base_path")));

        let err = Config::from_json(r#"{ "base_path": "/a" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("modules_folder")));

        let err = Config::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn scan_modules() {
        let dir = tempfile::tempdir().unwrap();
        let modules = dir.path().join("modules");
        fs::create_dir_all(modules.join("blog")).unwrap();
        fs::create_dir_all(modules.join("shop")).unwrap();
        fs::write(modules.join("README"), "not a module").unwrap();

        let cfg = Config::new(dir.path(), "modules");
        let paths = cfg.module_paths().unwrap();

        assert_eq!(paths.keys().collect::<Vec<_>>(), ["blog", "shop"]);
        assert_eq!(paths["blog"], modules.join("blog").join("module.rs"));

        let missing = Config::new(dir.path(), "nope");
        assert!(matches!(missing.module_paths(), Err(ConfigError::Io(_))));
    }
}
