//! Error handling for PuzzleBot
//!
//! Provides error types for all layers of the driver:
//! - Controller errors (preconditions on motion and accessory commands)
//! - Connection errors (transport to the motion controller)
//! - Configuration errors (coordinate system construction)
//! - Protocol errors (TinyG JSON frames, always recovered locally)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Controller error type
///
/// Represents precondition failures of the motion state machine. None of
/// these are raised after a command reached the wire.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// A motion was requested before mechanical homing completed
    #[error("Machine not homed")]
    NotHomed,

    /// A motion was requested while the controller was not idle
    #[error("Controller busy: status is {status}")]
    Busy {
        /// The status observed when the request was rejected.
        status: String,
    },

    /// The requested destination lies outside the travel bounds
    #[error("Destination {target} out of bounds [{min}, {max}]")]
    OutOfBounds {
        /// The rejected logical destination.
        target: String,
        /// Lower logical bound.
        min: String,
        /// Upper logical bound.
        max: String,
    },

    /// Translating the destination produced NaN or infinity
    #[error("Non-finite inner coordinate: {coordinate}")]
    NonFiniteCoordinate {
        /// The offending inner coordinate.
        coordinate: String,
    },

    /// The controller reported a fault; cleared only by `reset()`
    #[error("Controller fault latched; reset required")]
    LatchedFault,

    /// A move command carried no axis
    #[error("Invalid command: {reason}")]
    InvalidCommand {
        /// Why the command was rejected.
        reason: String,
    },
}

/// Connection error type
///
/// Represents errors related to the persistent line connection to the
/// motion controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// Failed to open the connection
    #[error("Failed to connect to {address}: {reason}")]
    FailedToOpen {
        /// The host:port that could not be reached.
        address: String,
        /// The reason the connection failed.
        reason: String,
    },

    /// Connection timeout
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Connection lost
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },
}

/// Configuration error type
///
/// Raised only while building a coordinate system or translator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Min is not strictly below Max on an axis
    #[error("Invalid bounds on axis {axis}: min {min} must be < max {max}")]
    InvalidBounds {
        /// Axis letter.
        axis: char,
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },

    /// Scale factor is zero, negative, NaN or infinite
    #[error("Invalid scale factor on axis {axis}: {factor}")]
    InvalidScale {
        /// Axis letter.
        axis: char,
        /// Rejected factor.
        factor: f64,
    },

    /// Shear factor outside the open interval (-1, 1)
    #[error("Invalid shear factor {shear}: must lie in (-1, 1)")]
    InvalidShear {
        /// Rejected shear.
        shear: f64,
    },
}

/// Protocol error type
///
/// Failures decoding an incoming controller frame. The ingestion path logs
/// and discards these; they never reach a caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Frame is not a JSON object
    #[error("Failed to parse controller response: {reason}")]
    ResponseParseError {
        /// The reason the response parsing failed.
        reason: String,
    },

    /// `stat` does not map to a known machine status
    #[error("Unknown machine status code {code}")]
    UnknownStatus {
        /// The raw status code.
        code: i64,
    },

    /// Status report lacks a required field
    #[error("Status report missing field '{field}'")]
    MissingField {
        /// Name of the missing key.
        field: &'static str,
    },
}

/// Main error type for PuzzleBot
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Controller error
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::ConnectionTimeout { .. })
        )
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a controller precondition error
    pub fn is_controller_error(&self) -> bool {
        matches!(self, Error::Controller(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Check if the controller rejected the call because of a latched fault
    pub fn is_latched_fault(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::LatchedFault))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
