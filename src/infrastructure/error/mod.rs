use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtenderError {
    #[error("Envelope decode error: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Payload is not a JSON object")]
    PayloadNotObject,
}

/// Failure of a single payload parsing step.
///
/// Every variant is recovered locally: the parser logs it and leaves the
/// affected field absent.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("custom data is missing")]
    MissingCustomData,

    #[error("custom data is not a JSON object: {0}")]
    InvalidCustomData(String),

    #[error("visibility {value:?} is not an integer: {source}")]
    InvalidVisibility {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("action buttons are malformed: {0}")]
    InvalidActionButtons(String),

    #[error("background image layout is malformed: {0}")]
    InvalidBackgroundImage(String),
}

impl PayloadError {
    /// Short field label used for metrics and log fields
    pub fn field(&self) -> &'static str {
        match self {
            PayloadError::MissingCustomData | PayloadError::InvalidCustomData(_) => "custom",
            PayloadError::InvalidVisibility { .. } => "vis",
            PayloadError::InvalidActionButtons(_) => "actionButtons",
            PayloadError::InvalidBackgroundImage(_) => "bg_img",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtenderError>;
