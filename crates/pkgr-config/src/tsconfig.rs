//! TypeScript compiler configuration for a single entry point.
//!
//! Only the options the analysis needs are modelled as fields. Everything else
//! in `compilerOptions` is carried through untouched in `extra` so a config can
//! be round-tripped to a downstream compiler without losing settings.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// `compilerOptions` block of a tsconfig.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// Module specifier patterns mapped to candidate locations, in priority order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompilerOptions {
    /// Append `target` to the candidates for `pattern`.
    ///
    /// Existing candidates keep their priority; a target already present is not
    /// added twice.
    pub fn add_path_mapping(&mut self, pattern: impl Into<String>, target: impl Into<String>) {
        let target = target.into();
        let targets = self.paths.entry(pattern.into()).or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    /// Candidate locations for an exact `paths` key.
    pub fn path_targets(&self, pattern: &str) -> Option<&[String]> {
        self.paths.get(pattern).map(Vec::as_slice)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
    #[serde(default)]
    files: Vec<PathBuf>,
}

/// Parsed compiler configuration: root files plus options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsConfig {
    pub root_names: Vec<PathBuf>,
    pub options: CompilerOptions,
    /// Directory the config was loaded from. Relative `paths` targets resolve
    /// against it when no `baseUrl` is set.
    pub config_dir: Option<PathBuf>,
}

impl TsConfig {
    pub fn new(root_names: Vec<PathBuf>, options: CompilerOptions) -> Self {
        Self {
            root_names,
            options,
            config_dir: None,
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Load a `tsconfig.json`.
    ///
    /// `files` entries and a relative `baseUrl` are resolved against the
    /// directory containing the config. `extends` and `include` globs are not
    /// interpreted.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::TsConfigNotFound(path.to_path_buf()));
        }

        tracing::debug!("Loading tsconfig from: {}", path.display());
        let content = fs::read_to_string(path)?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Self::from_json_str(&content, &dir).map_err(|e| match e {
            ConfigError::InvalidValue { hint, .. } => ConfigError::InvalidTsConfig {
                path: path.to_path_buf(),
                message: hint,
            },
            other => other,
        })
    }

    /// Parse tsconfig JSON text as if it lived in `config_dir`.
    pub fn from_json_str(content: &str, config_dir: &Path) -> Result<Self> {
        let raw: RawTsConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::InvalidValue {
                field: "tsconfig".to_string(),
                hint: format!("Invalid JSON: {}", e),
            })?;

        let root_names = raw
            .files
            .iter()
            .map(|file| config_dir.join(file).clean())
            .collect();

        let mut options = raw.compiler_options;
        if let Some(base_url) = options.base_url.take() {
            options.base_url = Some(config_dir.join(base_url).clean());
        }

        Ok(Self {
            root_names,
            options,
            config_dir: Some(config_dir.to_path_buf()),
        })
    }

    /// Directory that relative `paths` targets are resolved against.
    pub fn paths_base(&self) -> Option<&Path> {
        self.options
            .base_url
            .as_deref()
            .or(self.config_dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_path_mapping_appends_after_user_mappings() {
        let mut options = CompilerOptions::default();
        options.add_path_mapping("@lib/core", "./custom/core");
        options.add_path_mapping("@lib/core", "/repo/core/src/public-api.ts");
        options.add_path_mapping("@lib/core", "./custom/core");

        assert_eq!(
            options.path_targets("@lib/core").unwrap(),
            &["./custom/core", "/repo/core/src/public-api.ts"]
        );
    }

    #[test]
    fn unknown_compiler_options_survive_round_trip() {
        let json = r#"{
            "compilerOptions": {
                "target": "es2022",
                "strict": true,
                "paths": { "@lib/*": ["libs/*"] }
            },
            "files": ["src/public-api.ts"]
        }"#;

        let config = TsConfig::from_json_str(json, Path::new("/repo/lib")).unwrap();
        assert_eq!(
            config.root_names,
            vec![PathBuf::from("/repo/lib/src/public-api.ts")]
        );
        assert_eq!(config.options.extra.get("target"), Some(&Value::from("es2022")));

        let value = serde_json::to_value(&config.options).unwrap();
        assert_eq!(value["strict"], Value::Bool(true));
        assert_eq!(value["paths"]["@lib/*"][0], Value::from("libs/*"));
    }

    #[test]
    fn base_url_is_resolved_against_config_dir() {
        let json = r#"{ "compilerOptions": { "baseUrl": "./src" } }"#;
        let config = TsConfig::from_json_str(json, Path::new("/repo/lib")).unwrap();
        assert_eq!(config.paths_base(), Some(Path::new("/repo/lib/src")));
    }

    #[test]
    fn paths_base_falls_back_to_config_dir() {
        let config = TsConfig::from_json_str("{}", Path::new("/repo/lib")).unwrap();
        assert_eq!(config.paths_base(), Some(Path::new("/repo/lib")));
        assert!(config.root_names.is_empty());
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = TsConfig::from_json_str("{ not json", Path::new("/")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
