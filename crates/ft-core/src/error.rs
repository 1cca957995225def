use thiserror::Error;

pub type FtResult<T> = Result<T, FtError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FtError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
