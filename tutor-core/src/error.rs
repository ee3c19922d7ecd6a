use thiserror::Error;

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Recoverable conditions raised while processing a turn. None of these
/// crash a session; the orchestrator converts them to fallback replies or
/// rejects the input before any state is touched.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Empty or whitespace-only input")]
    EmptyInput,

    #[error("Reply generation timed out")]
    GenerationTimeout,

    #[error("Reply generation failed: {0}")]
    GenerationFailed(String),

    #[error("Session state error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, TutorError>;
