use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("No document loaded; call load_pdf first")]
    NotLoaded,

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Image unavailable: {0}")]
    Image(String),
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::OperationError(err.to_string())
    }
}
