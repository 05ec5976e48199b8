//! Error types and result handling for pg-rowdesc.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use pg_rowdesc::{Error, Result};
//!
//! fn read_message() -> Result<()> {
//!     // Simulating a truncated message
//!     Err(Error::InvalidMessage {
//!         message: "need 4 bytes, have 2".to_string(),
//!     })
//! }
//!
//! match read_message() {
//!     Ok(()) => println!("Decoded"),
//!     Err(Error::InvalidMessage { message }) => eprintln!("Bad message: {}", message),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for pg-rowdesc operations.
///
/// A decode error is unrecoverable for the current message: the stream is
/// desynchronized and the caller should treat the connection as broken
/// rather than retry the load.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or malformed message bytes, typically a truncated read.
    #[error("Invalid message format: {message}")]
    InvalidMessage {
        /// Description of what was invalid
        message: String,
    },

    /// Protocol-level violation, such as an unknown format code.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// A convenient Result type alias for pg-rowdesc operations.
///
/// This is equivalent to `std::result::Result<T, pg_rowdesc::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
