use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Input ended in the middle of a turn while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("Invalid integer {token:?} while reading {context}")]
    InvalidNumber {
        context: &'static str,
        token: String,
    },

    #[error("Negative {context} count: {count}")]
    NegativeCount { context: &'static str, count: i64 },
}

pub type Result<T> = std::result::Result<T, VigilError>;
