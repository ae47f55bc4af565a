//! Error types for the link bridge.
//!
//! Every failure in this crate degrades to "feature temporarily unavailable";
//! nothing here is meant to halt the host process. Errors carry enough
//! structured context to be logged once and dropped.
//!
//! ## Error Categories
//!
//! - **Link Errors**: the shared segment is missing, too small or inaccessible
//! - **Protocol Errors**: a launch URL message failed to decode
//! - **URI Errors**: the negotiated launch URI is malformed
//! - **Launch Errors**: the environment cannot open URIs
//! - **Config Errors**: reading or writing a configuration file failed
//! - **Windows API Errors**: platform-specific Windows operation failures
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use mumblelink::LinkError;
//!
//! let error = LinkError::unavailable("Mumble is not running");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for link operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Shared link segment unavailable: {reason}")]
    Unavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Shared link segment too small: expected {expected} bytes, found {found}")]
    SegmentTooSmall { expected: usize, found: usize },

    #[error("Decode error in {context}: {details}")]
    Decode { context: String, details: String },

    #[error("Invalid VoIP client URI \"{input}\": {reason}")]
    InvalidUri { input: String, reason: String },

    #[error("Unable to open URI: {reason}")]
    Launch {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file error: {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error in {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transport error sending to {recipient}: {reason}")]
    Transport { recipient: String, reason: String },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl LinkError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Unavailable { .. } => true,
            LinkError::SegmentTooSmall { .. } => true,
            LinkError::Launch { .. } => true,
            LinkError::Transport { .. } => true,
            LinkError::Decode { .. } => false,
            LinkError::InvalidUri { .. } => false,
            LinkError::Config { .. } => false,
            LinkError::Serialization { .. } => false,
            LinkError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            LinkError::WindowsApi { .. } => true,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LinkError::Unavailable { .. } => vec![
                "Start Mumble and enable the Link positional audio plugin",
                "Check that both processes run as the same user",
                "Wait for the next tick, the link retries automatically",
            ],
            LinkError::SegmentTooSmall { .. } => vec![
                "Update Mumble to a version using the current Link layout",
                "Restart Mumble so it recreates the shared segment",
            ],
            LinkError::Decode { .. } => vec![
                "Check that both sides use the same protocol version",
                "Verify the message channel identifier",
            ],
            LinkError::InvalidUri { .. } => vec![
                "Check the server host for illegal characters",
                "Ensure paths start with '/' when a host is configured",
                "Use -1 for an unspecified port",
            ],
            LinkError::Launch { .. } => vec![
                "Check that a desktop session is available",
                "Register a handler for the VoIP client's URI scheme",
                "Disable auto-launch and connect manually",
            ],
            LinkError::Config { .. } => vec![
                "Check the configuration directory exists and is writable",
                "Check file permissions",
            ],
            LinkError::Serialization { .. } => vec![
                "Check the configuration file is valid JSON",
                "Delete the file to regenerate defaults",
            ],
            LinkError::Transport { .. } => vec![
                "Check the recipient is still connected",
                "Resend on the next world or team change",
            ],
            LinkError::UnsupportedPlatform { .. } => vec![
                "Use the in-memory backend on this platform",
                "Check documentation for platform requirements",
            ],
            #[cfg(windows)]
            LinkError::WindowsApi { .. } => vec![
                "Check Windows API permissions",
                "Verify Mumble and the host run in the same session",
            ],
        }
    }

    /// Helper constructor for an unavailable link segment.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        LinkError::Unavailable { reason: reason.into(), source: None }
    }

    /// Helper constructor for an unavailable link segment with source.
    pub fn unavailable_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Unavailable { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for decode errors.
    pub fn decode(context: impl Into<String>, details: impl Into<String>) -> Self {
        LinkError::Decode { context: context.into(), details: details.into() }
    }

    /// Helper constructor for malformed URIs.
    pub fn invalid_uri(input: impl Into<String>, reason: impl Into<String>) -> Self {
        LinkError::InvalidUri { input: input.into(), reason: reason.into() }
    }

    /// Helper constructor for launch failures.
    pub fn launch_failed(reason: impl Into<String>) -> Self {
        LinkError::Launch { reason: reason.into(), source: None }
    }

    /// Helper constructor for launch failures with source.
    pub fn launch_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Launch { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration file errors with path context.
    pub fn config_error(path: PathBuf, source: std::io::Error) -> Self {
        LinkError::Config { path, source }
    }

    /// Helper constructor for transport errors.
    pub fn transport_failed(recipient: impl Into<String>, reason: impl Into<String>) -> Self {
        LinkError::Transport { recipient: recipient.into(), reason: reason.into() }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        LinkError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        LinkError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Serialization { context: "JSON".to_string(), source: err }
    }
}

#[cfg(windows)]
impl From<core::Error> for LinkError {
    fn from(err: core::Error) -> Self {
        LinkError::WindowsApi { operation: "Unknown Windows operation".to_string(), source: err }
    }
}
