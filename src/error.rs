use std::fmt;

/// Failure modes of the encryption and steganography engine.
///
/// Every variant is safe to show to an end user. None of them carry key
/// material or derivation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed call arguments: bad lengths, short or empty password.
    InvalidInput(String),
    /// Tag mismatch. Wrong password and tampering are deliberately not told apart.
    AuthenticationFailure,
    /// The `.enc` bytes are structurally invalid.
    MalformedContainer(String),
    /// The message does not fit the cover image.
    MessageTooLarge {
        required_bits: u64,
        available_bits: u64,
    },
    /// The embedded length prefix points past the end of the carrier.
    CorruptPayload {
        declared_bytes: u32,
        available_bits: u64,
    },
    /// The recovered message bytes are not UTF-8.
    InvalidEncoding,
    /// The image could not be decoded or encoded.
    Image(String),
    /// The OS random generator is unavailable.
    Random,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::AuthenticationFailure => write!(f, "invalid password or corrupted file"),
            Error::MalformedContainer(msg) => write!(f, "malformed container: {msg}"),
            Error::MessageTooLarge {
                required_bits,
                available_bits,
            } => write!(
                f,
                "message too large for image capacity: need {required_bits} bits but only {available_bits} available"
            ),
            Error::CorruptPayload {
                declared_bytes,
                available_bits,
            } => write!(
                f,
                "no hidden message found or file corrupted: length prefix claims {declared_bytes} bytes, image holds {available_bits} bits"
            ),
            Error::InvalidEncoding => write!(f, "hidden message is not valid UTF-8"),
            Error::Image(msg) => write!(f, "image error: {msg}"),
            Error::Random => write!(f, "OS random generator unavailable"),
        }
    }
}

impl std::error::Error for Error {}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
