//! Launch URL negotiation
//!
//! The server sends one [`MumbleUrlMessage`] per player over the host's
//! channel; the client turns it into a URI and, if the player accepts
//! auto-launch, opens it with the system handler.

mod broadcast;
pub mod codec;
mod message;
mod receiver;
mod uri;

pub use broadcast::{Recipient, Transport, UrlBroadcaster, UrlTrigger};
pub use message::{BROADCAST_MUMBLE_URL_CHANNEL, MumbleUrlMessage, VoipClient};
pub use receiver::{ReceiveOutcome, UrlReceiver};
