//! Error types shared by every stage of the codec.

use thiserror::Error;

/// Errors that can occur while compressing, framing, embedding, or recovering text.
///
/// Every error aborts the call that produced it. No partial result is
/// returned and no caller-owned buffer is left half-modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// Empty or malformed input (text, bit string, code table, configuration).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The payload does not fit into the available LSB slots.
    #[error("Payload too large for image capacity ({required} bits needed, {available} bits available)")]
    Capacity { required: usize, available: usize },

    /// Embedded data is inconsistent with the buffer or cannot be parsed.
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// No code table is registered for the given session id.
    #[error("Unknown or expired session: {0}")]
    MissingSession(String),

    /// The compressed bitstream ended in the middle of a code.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The image library failed to read or write an image file.
    #[error("Image error: {0}")]
    Image(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StegoError>;
