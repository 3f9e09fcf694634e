use console::style;
use plzmap_core::error::PlzmapError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    /// Put the outer context message in front of the existing context
    fn with_context_prefix(mut self, prefix: &str) -> Self {
        self.context = Some(match self.context.take() {
            Some(context) => format!("{}\n\n{}", prefix, context),
            None => prefix.to_string(),
        });
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Source or config file that cannot be read
pub fn file_not_found(path: &Path, detail: &str) -> CliError {
    CliError::new("Input file not readable")
        .with_context(format!("Path: {}\n\nError: {}", path.display(), detail))
        .with_suggestion("Check that the data directory holds all four source files")
        .with_suggestion("Point to it with --data-dir or PLZMAP_DATA_DIR")
        .with_suggestion("Or set absolute paths in the [sources] table of plzmap.toml")
        .with_help("Run: plzmap config")
}

/// Source file lacks a configured column
pub fn missing_column(dataset: &str, column: &str) -> CliError {
    CliError::new(format!("Column '{}' not found", column))
        .with_context(format!(
            "The source file does not match the configured schema.\n\nDataset: {}",
            dataset
        ))
        .with_suggestion("List the actual columns: plzmap inspect <source>")
        .with_suggestion("Set the column name in plzmap.toml, e.g. [charging.columns] or [residents.columns]")
        .with_suggestion("For the charging register, check skip_lines if the header is not found")
        .with_help("Run: plzmap inspect --help")
}

/// Cell that cannot be parsed as the required number
pub fn malformed_value(dataset: &str, row: usize, column: &str, value: &str, reason: &str) -> CliError {
    CliError::new("Malformed value in source data")
        .with_context(format!(
            "Dataset: {}\nRow: {}\nColumn: {}\nValue: '{}'\n\nReason: {}",
            dataset, row, column, value, reason
        ))
        .with_suggestion("Fix or remove the row in the source file")
        .with_suggestion("Or drop malformed rows with --validity lenient")
        .with_suggestion("Check the [decimal] separators in plzmap.toml")
}

/// WKT text that does not parse into a valid geometry
pub fn invalid_geometry(postal_code: u32, reason: &str) -> CliError {
    CliError::new(format!("Invalid geometry for postal code {}", postal_code))
        .with_context(format!("Reason: {}", reason))
        .with_suggestion("Fix the WKT cell in the postal geometry file")
        .with_suggestion("Or drop affected rows with --validity lenient")
        .with_help("Run: plzmap inspect postal-geometries")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check plzmap.toml for syntax errors")
        .with_suggestion("Check PLZMAP_DATA_DIR, PLZMAP_REGION and PLZMAP_VALIDITY")
        .with_help("Run: plzmap config")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let message = error.to_string();
    let cause = error.chain().find_map(|e| e.downcast_ref::<PlzmapError>());

    let cli_error = match cause {
        Some(PlzmapError::FileAccess { path, source }) => file_not_found(path, &source.to_string()),
        Some(PlzmapError::MissingColumn { dataset, column }) => missing_column(dataset, column),
        Some(PlzmapError::Parse { dataset, row, column, value, reason }) => {
            malformed_value(dataset, *row, column, value, reason)
        }
        Some(PlzmapError::InvalidGeometry { postal_code, reason }) => invalid_geometry(*postal_code, reason),
        Some(PlzmapError::ConfigInvalid { key, reason }) => invalid_config(key, reason),
        Some(PlzmapError::ConfigMissing { key }) => invalid_config(key, "value is missing or empty"),
        Some(PlzmapError::Csv { path, reason }) => CliError::new("Malformed CSV file")
            .with_context(format!("Path: {}\n\nError: {}", path.display(), reason))
            .with_suggestion("Check the delimiter configured for this source"),
        _ if message.contains("permission denied") => CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions"),
        _ => return CliError::new(message),
    };

    if cause.map(|c| c.to_string()) != Some(message.clone()) {
        cli_error.with_context_prefix(&message)
    } else {
        cli_error
    }
}
