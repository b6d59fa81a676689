use std::fmt;

#[derive(Debug)]
pub enum CheckError {
    /// Input document is not valid JSON.
    Json(String),
    /// Input document is valid JSON but not an array of entries.
    NotAnArray { what: &'static str },
    /// A single input entry failed to construct. Wraps the cause.
    Entry { what: &'static str, index: usize, source: Box<CheckError> },
    /// Entry is missing a required key.
    MissingKey(&'static str),
    /// Entry key holds a value of the wrong shape.
    InvalidType { key: &'static str, expected: &'static str },
    /// Time or tolerance does not parse as a number.
    NumberParse { key: &'static str, value: String },
    /// Tolerance is negative or not finite.
    InvalidTolerance(f64),
    /// checkMode token is not one of one/not/more.
    UnknownCheckMode(String),
    /// fieldsToCheck names a field the expectation's message does not declare.
    UnknownCheckedField(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty name, missing file reference, etc.).
    ConfigValidation(String),
}

impl CheckError {
    pub(crate) fn at(self, what: &'static str, index: usize) -> Self {
        Self::Entry { what, index, source: Box::new(self) }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::NotAnArray { what } => write!(f, "{what} document must be a JSON array"),
            Self::Entry { what, index, source } => write!(f, "{what} #{index}: {source}"),
            Self::MissingKey(key) => write!(f, "missing key '{key}'"),
            Self::InvalidType { key, expected } => write!(f, "key '{key}' must be {expected}"),
            Self::NumberParse { key, value } => {
                write!(f, "cannot parse '{key}' value {value} as a number")
            }
            Self::InvalidTolerance(value) => {
                write!(f, "tolerance must be a non-negative number, got {value}")
            }
            Self::UnknownCheckMode(value) => {
                write!(f, "unknown checkMode '{value}' (expected one, not or more)")
            }
            Self::UnknownCheckedField(field) => {
                write!(f, "field '{field}' is listed in fieldsToCheck but absent from message")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Entry { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
