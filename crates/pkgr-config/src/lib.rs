pub mod error;
pub mod settings;
pub mod tsconfig;

pub use error::*;
pub use settings::{AnalysisSettings, ENV_PREFIX, SETTINGS_FILE};
pub use tsconfig::{CompilerOptions, TsConfig};
