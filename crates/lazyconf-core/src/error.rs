//! Error types for lazyconf
//!
//! Structured errors with context and actionable help messages. Only key
//! lookup, typed conversion, I/O, and (under `RecursionPolicy::Fail`) cycle
//! detection can fail; tokenization itself has no error path.

use std::fmt;

/// Result type alias for lazyconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lazyconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Store key the error relates to, if any
    pub key: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Key absent from the store
    KeyNotFound,
    /// Typed reader could not convert the expanded text
    Conversion,
    /// Reference cycle hit under `RecursionPolicy::Fail`
    CircularReference,
    /// I/O error reading a configuration source
    Io,
}

impl Error {
    /// Create a key-not-found error
    pub fn key_not_found(key: impl Into<String>) -> Self {
        let key_str = key.into();
        Self {
            kind: ErrorKind::KeyNotFound,
            help: Some(format!("Check that '{}' was set or loaded", key_str)),
            key: Some(key_str),
            cause: None,
        }
    }

    /// Create a conversion error for a typed reader
    pub fn conversion(key: impl Into<String>, expected: &str, got: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Conversion,
            key: Some(key.into()),
            help: Some(format!("Ensure the value can be parsed as {}", expected)),
            cause: Some(format!("Got: \"{}\"", got.into())),
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(key: impl Into<String>, chain: Vec<String>) -> Self {
        let chain_str = chain.join(" -> ");
        Self {
            kind: ErrorKind::CircularReference,
            key: Some(key.into()),
            help: Some("Break the cycle by removing one of the references".into()),
            cause: Some(format!("Chain: {}", chain_str)),
        }
    }

    /// Create an I/O error for a source file
    pub fn io(path: impl Into<String>, cause: impl Into<String>) -> Self {
        let path_str = path.into();
        Self {
            kind: ErrorKind::Io,
            key: None,
            help: Some(format!("Check that '{}' is readable", path_str)),
            cause: Some(cause.into()),
        }
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::KeyNotFound => write!(f, "Key not found")?,
            ErrorKind::Conversion => write!(f, "Conversion failed")?,
            ErrorKind::CircularReference => write!(f, "Circular reference detected")?,
            ErrorKind::Io => write!(f, "I/O error")?,
        }

        if let Some(key) = &self.key {
            write!(f, "\n  Key: {}", key)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
