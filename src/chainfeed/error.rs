use thiserror::Error;

/// Errors surfaced at the store boundary.
///
/// The transition function itself is total and never fails; everything here
/// happens while decoding an action envelope, before the reducer runs.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A recognized action tag arrived with a payload that does not match
    /// its expected shape.
    #[error("malformed payload for `{tag}`: {source}")]
    Payload {
        tag: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The tag is recognized but its payload carries a caller-supplied
    /// function and cannot travel over the wire. Construct the action
    /// directly instead of going through an envelope.
    #[error("`{tag}` cannot be decoded from an envelope")]
    NotWireDecodable { tag: &'static str },

    /// The envelope itself failed to parse.
    #[error("malformed action envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
