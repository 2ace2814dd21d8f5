//! # Error Types
//!
//! Error handling for the spell protocol codec.
//!
//! Decoding distinguishes two failure families so the session layer can react
//! differently to each:
//! - **Truncated**: the payload ended before the layout was complete
//! - **Malformed**: the bytes were present but carried a value the layout does
//!   not allow (unknown discriminant, bad UTF-8, inconsistent length)
//!
//! Encoding never fails. Oversized collections and over-wide bit fields are
//! clamped to what the wire can represent and reported through `tracing` and
//! the metrics counters instead.
//!
//! ## Example Usage
//! ```rust
//! use spellwire::error::{ProtocolError, Result};
//! use spellwire::protocol::message::{Message, Opcode};
//! use tracing::{info, warn};
//!
//! fn handle(payload: &[u8]) -> Result<()> {
//!     let message = Message::decode(Opcode::CastSpell, payload)?;
//!     info!(opcode = message.opcode().name(), "decoded");
//!     Ok(())
//! }
//!
//! match handle(&[0x01]) {
//!     Err(e) if e.is_truncated() => warn!(error = %e, "short payload"),
//!     Err(e) => warn!(error = %e, "rejected payload"),
//!     Ok(()) => {}
//! }
//! ```

use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// String decoding errors
    pub const ERR_INVALID_UTF8: &str = "String is not valid UTF-8";
    pub const ERR_NAME_LENGTH_MISMATCH: &str = "Declared name length does not match the string";

    /// Configuration errors
    pub const ERR_CONFIG_OPEN: &str = "Failed to open config file";
    pub const ERR_CONFIG_READ: &str = "Failed to read config file";
    pub const ERR_CONFIG_PARSE: &str = "Failed to parse TOML";
    pub const ERR_CONFIG_SERIALIZE: &str = "Failed to serialize config";
    pub const ERR_CONFIG_WRITE: &str = "Failed to write config file";
    pub const ERR_LOGGING_INIT: &str = "Failed to install tracing subscriber";
}

// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Truncated message: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Invalid value {value} for {field}")]
    InvalidDiscriminant { field: &'static str, value: u32 },

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Trailing bytes after message body: {0}")]
    TrailingBytes(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// True when the payload ended before the layout was complete.
    pub fn is_truncated(&self) -> bool {
        matches!(self, ProtocolError::Truncated { .. })
    }

    /// True when the payload carried values the layout does not allow.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidDiscriminant { .. }
                | ProtocolError::Malformed(_)
                | ProtocolError::OversizedPacket(_)
                | ProtocolError::TrailingBytes(_)
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_is_not_malformed() {
        let err = ProtocolError::Truncated {
            needed: 4,
            remaining: 1,
        };
        assert!(err.is_truncated());
        assert!(!err.is_malformed());
        assert_eq!(
            err.to_string(),
            "Truncated message: needed 4 bytes, 1 remaining"
        );
    }

    #[test]
    fn test_discriminant_is_malformed() {
        let err = ProtocolError::InvalidDiscriminant {
            field: "miss reason",
            value: 42,
        };
        assert!(err.is_malformed());
        assert!(!err.is_truncated());
        assert_eq!(err.to_string(), "Invalid value 42 for miss reason");
    }
}
