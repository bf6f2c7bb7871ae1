
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeftError {
    #[error("Ordering comparison not allowed between {left} and {right}")]
    Comparison { left: &'static str, right: &'static str },
    #[error("Document conversion error: {0}")]
    Conversion(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WeftError>;
