//! Settings for the source analysis pass.
//!
//! Settings are layered with figment.
//! Priority: environment variables > `pkgr.toml` > defaults

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// File name searched for in the project root.
pub const SETTINGS_FILE: &str = "pkgr.toml";

/// Prefix for environment overrides (`PKGR_VENDOR_DIR`, `PKGR_REJECT_CYCLES`, ...).
pub const ENV_PREFIX: &str = "PKGR_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Path segment marking vendored third-party sources.
    pub vendor_dir: String,

    /// File name markers of compiler-generated artifacts.
    pub generated_markers: Vec<String>,

    /// Map cross-entry-point imports to sources instead of built typings.
    pub resolve_to_source: bool,

    /// Fail the pass when the finished graph contains a cycle spanning
    /// several entry points. Direct self-imports always fail.
    ///
    /// Only reachable with compiler services that do not follow imports. When
    /// the program follows `paths` into sibling sources, a cycle already shows
    /// up as a self-import of the first entry point analysed.
    pub reject_cycles: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            vendor_dir: "node_modules".to_string(),
            generated_markers: vec![".ngfactory".to_string(), ".ngstyle".to_string()],
            resolve_to_source: true,
            reject_cycles: false,
        }
    }
}

impl AnalysisSettings {
    /// Load settings for a project rooted at `root`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        Self::figment(root.as_ref()).extract().map_err(|e| ConfigError::InvalidValue {
            field: "analysis settings".to_string(),
            hint: format!("Check {} syntax and field types: {}", SETTINGS_FILE, e),
        })
    }

    /// The provider stack used by [`AnalysisSettings::load`].
    pub fn figment(root: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let file = root.join(SETTINGS_FILE);
        if file.exists() {
            tracing::debug!("Loading analysis settings from: {}", file.display());
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}
