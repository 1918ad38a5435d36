use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Invalid input argument: {0}")]
    InvalidInputArgument(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Terminal not found for handle: {0}")]
    TerminalNotFound(String),

    #[error("Caption already in use: {0}")]
    CaptionInUse(String),
}
