//! Error types for the CityGML mesher.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ConvertError.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for conversion runs.
///
/// Only fatal conditions are represented here. Problems with individual
/// elements (missing `gml:id`, bad coordinates, degenerate rings) are logged
/// and skipped by the parser instead.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input document does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input path has an extension the pipeline cannot handle.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// The document is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document parsed, but does not declare the CityGML namespaces.
    #[error("Not a CityGML 2.0 document: {0}")]
    NotCityGml(String),

    /// Failed to parse or write JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to format text output.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Binary buffer bookkeeping disagrees with the bytes actually assembled.
    #[error("Internal layout error: {0}")]
    Layout(String),

    /// Failed to export a mesh.
    #[error("Export error: {0}")]
    Export(String),
}

impl ConvertError {
    /// Name of the pipeline stage this error belongs to, for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            ConvertError::InputNotFound(_) | ConvertError::UnsupportedInput(_) => "input",
            ConvertError::Xml(_) | ConvertError::NotCityGml(_) => "parse",
            ConvertError::Layout(_) | ConvertError::Export(_) | ConvertError::Fmt(_) => "export",
            ConvertError::Json(_) | ConvertError::Io(_) => "io",
        }
    }
}
