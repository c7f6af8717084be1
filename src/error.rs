use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisclosureError {
    #[error("Missing API credential: {0}")]
    MissingCredential(String),

    #[error("Invalid company identity: {0}")]
    InvalidCompany(String),

    #[error("No listed company matches {0}")]
    CompanyNotFound(String),

    #[error("Unrecognized reporting unit '{unit}' in {section} footnote")]
    UnrecognizedUnit { section: String, unit: String },

    #[error("Invalid year range {start}..={end}: start must not be after end")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTML parsing error: {0}")]
    Html(String),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "dart")]
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl From<quick_xml::DeError> for DisclosureError {
    fn from(error: quick_xml::DeError) -> Self {
        DisclosureError::Xml(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DisclosureError>;
