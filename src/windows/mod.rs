//! Mumble Link shared memory on Windows
//!
//! Mumble publishes the Link record through a named file mapping. This module
//! maps it for writing and follows the official plugin's conventions: same
//! name, same struct layout, create-if-missing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mumblelink::windows::WindowsBackend;
//! use mumblelink::{LinkSession, Snapshot};
//!
//! let mut session = LinkSession::new(WindowsBackend::new());
//! let linked = session.ensure_linked()?;
//! linked.publish(snapshot)?;
//! session.ensure_closed();
//! ```

mod connection;

pub use connection::{WindowsBackend, WindowsSegment};
