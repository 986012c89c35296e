use crate::adapters::soffice::DEFAULT_CONVERTER;
use crate::config::{validate_provider, DEFAULT_NAME_FORMAT, DEFAULT_TIMEOUT_SECS};
use crate::core::archive::DEFAULT_ARCHIVE_NAME;
use crate::core::ConfigProvider;
use crate::domain::model::OutputMode;
use crate::domain::schema::{FieldSchema, NAME_FIELD};
use crate::utils::error::{LetterError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Letter job described in a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub schema: FieldSchema,
    pub output: OutputConfig,
    pub conversion: Option<ConversionConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub dataset: String,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub name_format: Option<String>,
    pub mode: Option<OutputMode>,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub command: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| LetterError::ConfigError {
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LetterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HR_SHARE})；未定義的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;
        validate_provider(self, "")?;

        if !self.schema.required_fields.iter().any(|f| f == NAME_FIELD) {
            return Err(LetterError::InvalidConfigValueError {
                field: "schema.required_fields".to_string(),
                value: self.schema.required_fields.join(", "),
                reason: format!("Must include {}", NAME_FIELD),
            });
        }

        Ok(())
    }

    pub fn verbose_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn dataset_path(&self) -> &str {
        &self.input.dataset
    }

    fn template_path(&self) -> &str {
        &self.input.template
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn name_format(&self) -> &str {
        self.output
            .name_format
            .as_deref()
            .unwrap_or(DEFAULT_NAME_FORMAT)
    }

    fn output_mode(&self) -> OutputMode {
        self.output.mode.unwrap_or_default()
    }

    fn converter_command(&self) -> &str {
        self.conversion
            .as_ref()
            .and_then(|c| c.command.as_deref())
            .unwrap_or(DEFAULT_CONVERTER)
    }

    fn conversion_timeout(&self) -> Duration {
        let secs = self
            .conversion
            .as_ref()
            .and_then(|c| c.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    fn archive_name(&self) -> &str {
        self.output
            .archive_name
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[job]
name = "march-joiners"

[input]
dataset = "joiners.xlsx"
template = "appointment.docx"

[output]
path = "./out"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.job.name, "march-joiners");
        assert_eq!(config.output_mode(), OutputMode::Both);
        assert_eq!(config.name_format(), DEFAULT_NAME_FORMAT);
        assert_eq!(config.archive_name(), "Appointment_Letters.zip");
        assert_eq!(config.converter_command(), "soffice");
        assert_eq!(config.conversion_timeout(), Duration::from_secs(30));
        assert_eq!(config.schema(), &FieldSchema::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[job]
name = "interns"
description = "Summer interns"
version = "2"

[input]
dataset = "interns.csv"
template = "intern.docx"

[schema]
required_fields = ["employee_name", "joining_date", "stipend"]

[output]
path = "./interns"
name_format = "Internship - {employee_name}"
mode = "pdf"
archive_name = "interns.zip"

[conversion]
command = "/opt/libreoffice/program/soffice"
timeout_seconds = 90

[logging]
verbose = true
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.output_mode(), OutputMode::Pdf);
        assert_eq!(config.name_format(), "Internship - {employee_name}");
        assert_eq!(config.conversion_timeout(), Duration::from_secs(90));
        assert_eq!(config.converter_command(), "/opt/libreoffice/program/soffice");
        assert_eq!(config.schema.required_fields.len(), 3);
        // date_fields 未指定時沿用預設
        assert_eq!(config.schema.date_fields, FieldSchema::default().date_fields);
        assert!(config.verbose_logging());
        assert!(!config.json_logging());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LETTER_TEST_SHARE", "/srv/hr");

        let toml_content = r#"
[job]
name = "env"

[input]
dataset = "${LETTER_TEST_SHARE}/staff.xlsx"
template = "${LETTER_TEST_UNSET_VAR}/offer.docx"

[output]
path = "./out"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.dataset, "/srv/hr/staff.xlsx");
        assert_eq!(config.input.template, "${LETTER_TEST_UNSET_VAR}/offer.docx");

        std::env::remove_var("LETTER_TEST_SHARE");
    }

    #[test]
    fn test_config_validation() {
        let bad_mode = MINIMAL.replace("path = \"./out\"", "path = \"./out\"\nname_format = \"letter\"");
        let config = TomlConfig::from_toml_str(&bad_mode).unwrap();
        assert!(config.validate().is_err());

        let no_name = MINIMAL.replace(
            "[output]",
            "[schema]\nrequired_fields = [\"joining_date\"]\n\n[output]",
        );
        let config = TomlConfig::from_toml_str(&no_name).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LetterError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let content = MINIMAL.replace("path = \"./out\"", "path = \"./out\"\nmode = \"html\"");
        assert!(matches!(
            TomlConfig::from_toml_str(&content),
            Err(LetterError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "march-joiners");

        assert!(matches!(
            TomlConfig::from_file("no-such-job.toml"),
            Err(LetterError::ConfigError { .. })
        ));
    }
}
