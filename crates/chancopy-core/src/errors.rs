/// Core error type for the copier.
///
/// Adapter crates map their specific failures into this type so the copy
/// engine can apply one error policy regardless of which collaborator failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("telegram error: {0}")]
    Telegram(String),

    #[error("media tool error: {0}")]
    MediaTool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
