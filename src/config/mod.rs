#[cfg(feature = "cli")]
pub mod args;
pub mod cli;
pub mod toml_config;

use crate::adapters::dataset::SUPPORTED_EXTENSIONS;
use crate::core::conversion::DEFAULT_CONVERSION_TIMEOUT;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;

pub const DEFAULT_NAME_FORMAT: &str = "{employee_name} Appointment Letter";
pub const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_CONVERSION_TIMEOUT.as_secs();
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Checks shared by every configuration source. `prefix` qualifies field names
/// in error messages (e.g. `input.` for job files).
pub(crate) fn validate_provider(config: &impl ConfigProvider, prefix: &str) -> Result<()> {
    let field = |name: &str| format!("{}{}", prefix, name);

    validation::validate_path(&field("dataset"), config.dataset_path())?;
    validation::validate_file_extensions(
        &field("dataset"),
        &[config.dataset_path()],
        &SUPPORTED_EXTENSIONS,
    )?;

    validation::validate_path(&field("template"), config.template_path())?;
    validation::validate_file_extensions(&field("template"), &[config.template_path()], &["docx"])?;

    validation::validate_path(&field("output_path"), config.output_path())?;
    validation::validate_name_pattern(&field("name_format"), config.name_format())?;
    validation::validate_file_extensions(&field("archive_name"), &[config.archive_name()], &["zip"])?;
    validation::validate_non_empty_string(&field("converter"), config.converter_command())?;
    validation::validate_range(
        &field("conversion_timeout"),
        config.conversion_timeout().as_secs(),
        1,
        MAX_TIMEOUT_SECS,
    )?;

    Ok(())
}
