use std::path::Path;

use crate::core::RawTransaction;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(e) => write!(f, "io error: {e}"),
            ImportError::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::Io(e)
    }
}

pub trait StatementImporter {
    fn parse(path: &Path) -> Result<Vec<RawTransaction>, ImportError>;
}

pub mod csv;
