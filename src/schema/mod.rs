//! Shared memory record layout
//!
//! The byte layout of the Link record is a strict binary contract with the
//! voice client. Everything that touches raw segment bytes goes through
//! [`LinkedMem`].

pub mod linked_mem;

pub use linked_mem::{LINKED_MEM_SIZE, LinkedMem, WChar};
