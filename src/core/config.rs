use crate::core::UnitValue;
use crate::core::error::LoadError;
use crate::core::loader::{MARKER_KEY, load_str};
use crate::core::module::ModuleTable;
use crate::core::registry::UnitRegistry;
use std::path::{Path, PathBuf};

/// Environment variable holding the `:`-separated config search path.
pub const CFG_PATH_ENV: &str = "ALCH_CFG_PATH";

/// Where configuration files are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub search_path: Vec<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_path: vec![PathBuf::from(".")],
        }
    }
}

impl LoaderConfig {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Reads the search path from `ALCH_CFG_PATH`, defaulting to `.`.
    pub fn from_env() -> Self {
        match std::env::var(CFG_PATH_ENV) {
            Ok(value) => Self::from_path_list(&value),
            Err(_) => Self::default(),
        }
    }

    fn from_path_list(value: &str) -> Self {
        let search_path: Vec<PathBuf> = value
            .split(':')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        if search_path.is_empty() {
            Self::default()
        } else {
            Self { search_path }
        }
    }

    /// Finds `file`: absolute paths and paths that exist as given are used
    /// directly, anything else is tried against each search directory.
    pub fn resolve(&self, file: impl AsRef<Path>) -> Result<PathBuf, LoadError> {
        let file = file.as_ref();
        if file.is_absolute() || file.is_file() {
            return Ok(file.to_path_buf());
        }

        self.search_path
            .iter()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| LoadError::NotFound(file.to_path_buf()))
    }

    /// Reads and loads one configuration file into a registry.
    pub fn load_config(
        &self,
        file: impl AsRef<Path>,
        table: &ModuleTable,
    ) -> Result<UnitRegistry, LoadError> {
        let path = self.resolve(file)?;
        log::info!("Config file: {}", path.display());

        let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        load_str(&text, table)
    }

    /// Config files (`.yml` / `.yaml` with an `alchemy` section) found
    /// directly inside the search directories.
    pub fn list_config_files(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in &self.search_path {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Skipping search directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            let mut paths: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("yml") | Some("yaml")
                    )
                })
                .filter(|path| is_cfg_file(path))
                .collect();
            paths.sort();
            found.extend(paths);
        }
        found
    }
}

/// Whether `path` is a readable YAML mapping with an `alchemy` section.
pub fn is_cfg_file(path: impl AsRef<Path>) -> bool {
    let Ok(text) = std::fs::read_to_string(path) else {
        return false;
    };
    match serde_yaml::from_str::<UnitValue>(&text) {
        Ok(doc) => doc.get(MARKER_KEY).is_some(),
        Err(_) => false,
    }
}
