use std::io;

use thiserror::Error;

/// Failures while decoding or encoding the wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("buffer too small for the structure being decoded")]
    TruncatedInput,

    #[error("question section starts with a zero-length label")]
    EmptyQuestionSection,

    #[error("compressed name pointer (length byte {0:#04x}) is not supported")]
    CompressedName(u8),

    #[error("label longer than 63 bytes: {0}")]
    LabelTooLong(String),

    #[error("domain name longer than 255 bytes: {0}")]
    NameTooLong(String),

    #[error("domain label is not valid UTF-8")]
    InvalidLabel,
}

/// The upstream resolver could not be reached within the deadline.
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("resolver {resolver} unavailable: {source}")]
    ForwardUnavailable {
        resolver: String,
        #[source]
        source: io::Error,
    },
}

/// Errors that stop the server loop.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("listener failed: {0}")]
    ListenerFatal(#[source] io::Error),
}
