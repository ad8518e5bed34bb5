//! Motion error types

use thiserror::Error;

/// Errors reported by the motion core.
///
/// None of these are fatal: the operation that produced one is a no-op and
/// the affected motion keeps its last valid state.
#[derive(Error, Debug)]
pub enum MotionError {
    /// Spring parameters outside the accepted range
    #[error("Invalid spring parameters: {0}")]
    InvalidSpring(String),

    /// A receiver was handed data for a kind it does not consume
    #[error("Motion data kind mismatch: expected `{expected}`, got `{actual}`")]
    DataKindMismatch { expected: String, actual: String },

    /// Incoming data has a different number of channels than the motion
    #[error("Motion data `{data}` has {actual} channels, motion expects {expected}")]
    ChannelCountMismatch {
        data: String,
        expected: usize,
        actual: usize,
    },

    /// The same receiver was registered twice for one kind
    #[error("Receiver already registered for kind `{0}`")]
    DuplicateRegistration(String),

    /// A receiver was mutably borrowed elsewhere when it had to be read
    #[error("Receiver for kind `{0}` is busy")]
    ReceiverBusy(String),

    /// A preset was popped that is not on the stack
    #[error("Preset stack inconsistency: {0}")]
    StackConsistency(String),

    /// A motion library declaration is malformed
    #[error("Invalid motion library: {0}")]
    InvalidLibrary(String),

    /// A motion library referenced an undeclared entry
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    /// Motion library could not be parsed
    #[error("Failed to parse motion library: {0}")]
    Parse(#[from] toml::de::Error),

    /// Motion library could not be read
    #[error("Failed to read motion library: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
