use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bad user input: empty message, missing file, unknown target language
    #[error("{0}")]
    Validation(String),

    #[error("PDF extraction error: {0}")]
    Extraction(String),

    #[error("Language classification error: {0}")]
    Classification(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl DeskError {
    /// Short category label used when surfacing errors to the agent
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Extraction(_) => "extraction",
            Self::Classification(_) => "classification",
            Self::Translation(_) | Self::Http(_) => "translation",
            Self::Config(_) | Self::Toml(_) => "config",
            Self::Io(_) | Self::FileNotFound(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
