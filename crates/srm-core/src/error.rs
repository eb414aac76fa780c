use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Cannot parse unit '{input}': {reason}")]
    UnitParse { input: String, reason: String },

    #[error("Unknown unit symbol '{symbol}' in '{input}'")]
    UnknownUnit { input: String, symbol: String },

    #[error("Cannot parse value '{input}': {reason}")]
    ValueParse { input: String, reason: String },
}
