use thiserror::Error;

/// Batch-level failures. Anything in here stops the run.
#[derive(Error, Debug)]
pub enum LetterError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetError(#[from] calamine::XlsxError),

    #[error("Audit report error: {0}")]
    ReportError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing headers: {}", .fields.join(", "))]
    MissingFieldsError { fields: Vec<String> },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    InputData,
    Packaging,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a failed run.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,     // 設定或資料錯誤
            ErrorSeverity::Medium => 2,   // 打包錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl LetterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LetterError::ConfigError { .. }
            | LetterError::ConfigValidationError { .. }
            | LetterError::InvalidConfigValueError { .. }
            | LetterError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LetterError::CsvError(_)
            | LetterError::SpreadsheetError(_)
            | LetterError::MissingFieldsError { .. }
            | LetterError::ProcessingError { .. } => ErrorCategory::InputData,
            LetterError::ZipError(_)
            | LetterError::ReportError(_)
            | LetterError::SerializationError(_) => ErrorCategory::Packaging,
            LetterError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::InputData => ErrorSeverity::High,
            ErrorCategory::Packaging => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LetterError::MissingFieldsError { fields } => {
                format!("Excel Header Error: Missing headers: {}", fields.join(", "))
            }
            LetterError::SpreadsheetError(_) | LetterError::CsvError(_) => {
                format!("Could not read the employee data file: {}", self)
            }
            LetterError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LetterError::MissingFieldsError { .. } => {
                "Add the missing columns to the header row (run with --list-columns to see them all)"
            }
            LetterError::SpreadsheetError(_) | LetterError::CsvError(_) => {
                "Make sure the data file is a valid .xlsx or .csv with a header row"
            }
            LetterError::ConfigError { .. }
            | LetterError::ConfigValidationError { .. }
            | LetterError::InvalidConfigValueError { .. }
            | LetterError::MissingConfigError { .. } => "Check the command line flags or job file",
            LetterError::ZipError(_) | LetterError::ReportError(_) => {
                "Check free disk space in the output directory and try again"
            }
            LetterError::IoError(_) => "Check that the paths exist and are readable/writable",
            LetterError::SerializationError(_) | LetterError::ProcessingError { .. } => {
                "Re-run with --verbose for details"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LetterError>;

/// Failure to reinterpret a date cell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot read '{value}' in '{field}' as a date")]
pub struct DateFormatError {
    pub field: String,
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template is not a valid document: {0}")]
    MalformedTemplate(String),

    #[error("unclosed placeholder near '{0}'")]
    UnclosedPlaceholder(String),

    #[error("invalid placeholder '{{{{{0}}}}}'")]
    InvalidPlaceholder(String),

    #[error("file name pattern produced an empty file name")]
    EmptyFileName,

    #[error("could not write rendered document: {0}")]
    Package(String),
}

/// Record-local failures. Caught at the record boundary and turned into an
/// audit status, never propagated out of the batch loop.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Date(#[from] DateFormatError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
