use std::fmt;

#[derive(Debug, Clone)]
pub enum CardtraceError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Serialization(String),
    DateParse(String),
}

impl CardtraceError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CardtraceError::DatabaseConfig(_) => "E001",
            CardtraceError::DatabaseConnection(_) => "E002",
            CardtraceError::DatabaseOperation(_) => "E003",
            CardtraceError::Validation(_) => "E004",
            CardtraceError::NotFound(_) => "E005",
            CardtraceError::Unauthorized(_) => "E006",
            CardtraceError::Serialization(_) => "E007",
            CardtraceError::DateParse(_) => "E008",
        }
    }

    /// Human-readable error type name
    pub fn error_type(&self) -> &'static str {
        match self {
            CardtraceError::DatabaseConfig(_) => "Database Configuration Error",
            CardtraceError::DatabaseConnection(_) => "Database Connection Error",
            CardtraceError::DatabaseOperation(_) => "Database Operation Error",
            CardtraceError::Validation(_) => "Validation Error",
            CardtraceError::NotFound(_) => "Resource Not Found",
            CardtraceError::Unauthorized(_) => "Unauthorized",
            CardtraceError::Serialization(_) => "Serialization Error",
            CardtraceError::DateParse(_) => "Date Parse Error",
        }
    }

    /// Error detail message
    pub fn message(&self) -> &str {
        match self {
            CardtraceError::DatabaseConfig(msg) => msg,
            CardtraceError::DatabaseConnection(msg) => msg,
            CardtraceError::DatabaseOperation(msg) => msg,
            CardtraceError::Validation(msg) => msg,
            CardtraceError::NotFound(msg) => msg,
            CardtraceError::Unauthorized(msg) => msg,
            CardtraceError::Serialization(msg) => msg,
            CardtraceError::DateParse(msg) => msg,
        }
    }

    /// Colored output for server logs
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// Plain one-line output
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for CardtraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CardtraceError {}

// Convenience constructors
impl CardtraceError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        CardtraceError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        CardtraceError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        CardtraceError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        CardtraceError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        CardtraceError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        CardtraceError::Unauthorized(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        CardtraceError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        CardtraceError::DateParse(msg.into())
    }
}

impl From<sea_orm::DbErr> for CardtraceError {
    fn from(err: sea_orm::DbErr) -> Self {
        CardtraceError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CardtraceError {
    fn from(err: serde_json::Error) -> Self {
        CardtraceError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for CardtraceError {
    fn from(err: chrono::ParseError) -> Self {
        CardtraceError::DateParse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for CardtraceError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        CardtraceError::Unauthorized(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CardtraceError>;
