use thiserror::Error;

pub type TlmResult<T> = Result<T, TlmError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TlmError {
    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
