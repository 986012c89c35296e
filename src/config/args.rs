use crate::adapters::soffice::DEFAULT_CONVERTER;
use crate::config::{validate_provider, DEFAULT_NAME_FORMAT, DEFAULT_TIMEOUT_SECS};
use crate::core::archive::DEFAULT_ARCHIVE_NAME;
use crate::core::ConfigProvider;
use crate::domain::model::OutputMode;
use crate::domain::schema::FieldSchema;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "letter-merge")]
#[command(about = "Generate personalised letters from an employee sheet and a Word template")]
pub struct CliConfig {
    /// Employee data (.xlsx or .csv) with one row per employee
    #[arg(long, required_unless_present = "list_columns")]
    pub dataset: Option<String>,

    /// Word template (.docx) with {{ field }} placeholders
    #[arg(long, required_unless_present = "list_columns")]
    pub template: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// File name pattern; {employee_name} is replaced per record
    #[arg(long, default_value = DEFAULT_NAME_FORMAT)]
    pub name_format: String,

    #[arg(long, value_enum, default_value_t = OutputMode::Both)]
    pub mode: OutputMode,

    /// Program used for PDF conversion
    #[arg(long, default_value = DEFAULT_CONVERTER)]
    pub converter: String,

    /// Seconds to wait for each PDF conversion
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub conversion_timeout: u64,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Print the run summary as JSON")]
    pub json: bool,

    #[arg(long, help = "Print the required data headers and exit")]
    pub list_columns: bool,

    #[arg(skip)]
    #[serde(default)]
    pub schema: FieldSchema,
}

impl ConfigProvider for CliConfig {
    fn dataset_path(&self) -> &str {
        self.dataset.as_deref().unwrap_or_default()
    }

    fn template_path(&self) -> &str {
        self.template.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn name_format(&self) -> &str {
        &self.name_format
    }

    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn converter_command(&self) -> &str {
        &self.converter
    }

    fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout)
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.list_columns {
            return Ok(());
        }
        validate_provider(self, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["letter-merge"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--dataset", "staff.xlsx", "--template", "offer.docx"]);

        assert_eq!(config.output_mode(), OutputMode::Both);
        assert_eq!(config.name_format(), "{employee_name} Appointment Letter");
        assert_eq!(config.conversion_timeout(), Duration::from_secs(30));
        assert_eq!(config.archive_name(), "Appointment_Letters.zip");
        assert_eq!(config.converter_command(), "soffice");
        assert_eq!(config.schema(), &FieldSchema::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_values() {
        let config = parse(&["--dataset", "a.csv", "--template", "b.docx", "--mode", "pdf"]);
        assert_eq!(config.output_mode(), OutputMode::Pdf);
    }

    #[test]
    fn test_inputs_required_unless_listing_columns() {
        assert!(CliConfig::try_parse_from(["letter-merge"]).is_err());

        let config = parse(&["--list-columns"]);
        assert!(config.list_columns);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let bad_pattern = parse(&[
            "--dataset", "a.csv", "--template", "b.docx", "--name-format", "Letter",
        ]);
        assert!(bad_pattern.validate().is_err());

        let bad_template = parse(&["--dataset", "a.csv", "--template", "b.pdf"]);
        assert!(bad_template.validate().is_err());

        let bad_timeout = parse(&[
            "--dataset", "a.csv", "--template", "b.docx", "--conversion-timeout", "0",
        ]);
        assert!(bad_timeout.validate().is_err());
    }
}
