use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank column name, empty sheet name, etc.).
    ConfigValidation(String),
    /// An input table has no rows.
    EmptyTable { table: String },
    /// Required columns absent from an input table's header.
    MissingColumns { table: String, columns: Vec<String> },
    /// CSV read error.
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyTable { table } => write!(f, "{table} table has no rows"),
            Self::MissingColumns { table, columns } => {
                write!(f, "{table} table: missing required column(s): {}", columns.join(", "))
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
