//! Core types for link state representation.
//!
//! - [`Vec3`] is a host-space vector with the conversion into link axes
//! - [`PlayerState`], [`WorldState`] and [`TickState`] are the host's per-tick input
//! - [`Snapshot`] is the record written into the shared segment
//! - [`LinkStatus`] is what the driver reports back

mod snapshot;
mod state;
mod status;
mod vector;

pub use snapshot::{Context, Identity, LINK_VERSION, Snapshot};
pub use state::{PlayerState, TickState, WorldState};
pub use status::LinkStatus;
pub use vector::{Vec3, link_magnitude};
