use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MALFORMED_THUNK: line {line}: no '_' terminates the thunk prefix in '{text}'")]
    MalformedThunk { line: usize, text: String },

    #[error("MALFORMED_VIRTUAL_PROTOTYPE: line {line}: {reason} in '{text}'")]
    MalformedVirtualPrototype {
        line: usize,
        text: String,
        reason: &'static str,
    },

    #[error("DEMANGLE_FAILED: line {line}: could not demangle '{symbol}'")]
    DemangleFailed { line: usize, symbol: String },

    #[error("SIGNATURE_TOO_SHORT: line {line}: '{signature}' is shorter than the class qualifier ({offset} bytes)")]
    SignatureTooShort {
        line: usize,
        signature: String,
        offset: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
