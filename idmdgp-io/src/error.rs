use thiserror::Error;

/// Errors raised while writing or parsing a DMDGP text file.
#[derive(Debug, Error)]
pub enum IoError {
    /// Propagated from the peptide/graph model the writer reads from
    /// or the reader writes into.
    #[error(transparent)]
    Core(#[from] idmdgp_core::CoreError),

    /// An underlying file or stream operation failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The input did not match the DMDGP grammar at the given line.
    #[error("malformed DMDGP input at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, IoError>;
