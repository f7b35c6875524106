use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unreachable: {0}")]
    Unreachable(String),
}

#[derive(Error, Debug)]
pub enum IdeationError {
    #[error("Topic pool is empty")]
    EmptyPool,

    #[error("LLM ideation failed: {0}")]
    Llm(#[from] crate::llm::LlmError),
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Topic brief is empty (missing title or category)")]
    EmptyBrief,

    #[error("Not enough reachable images: found {found}, need {required}")]
    InsufficientImages { found: usize, required: usize },
}

/// Errors from the publishing stage.
///
/// Kept free of any database-library types so the `Publisher` trait can be
/// implemented against different stores (and faked in tests).
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("No publisher account available (no admin user found)")]
    NoAuthor,

    #[error("Could not find a unique slug for '{0}'")]
    SlugExhausted(String),

    #[error("Database error: {0}")]
    Database(String),
}
