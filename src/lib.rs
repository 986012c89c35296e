pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::args::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::{DocxTemplateEngine, SofficeConverter};
pub use core::{
    engine::{BatchEngine, BatchReport},
    pipeline::LetterPipeline,
};
pub use domain::model::OutputMode;
pub use utils::error::{LetterError, Result};
