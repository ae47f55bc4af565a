//! Server-side distribution of launch URLs
//!
//! Path, query and fragment of the configured URL may contain `{world}` and
//! `{team}`; both are resolved per recipient so players end up in a channel
//! matching where they are.

use bytes::Bytes;
use tracing::{debug, trace, warn};

use super::message::{BROADCAST_MUMBLE_URL_CHANNEL, MumbleUrlMessage};
use crate::Result;
use crate::config::ServerConfig;

/// Host-side channel for sending a payload to one player
pub trait Transport {
    fn send(&mut self, recipient: &str, channel: &str, payload: Bytes) -> Result<()>;
}

/// A player that should receive the launch URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipient<'a> {
    pub name: &'a str,
    /// World identifier; the namespace prefix is dropped when templating
    pub world: &'a str,
    pub team: Option<&'a str>,
}

impl<'a> Recipient<'a> {
    pub fn new(name: &'a str, world: &'a str) -> Self {
        Self { name, world, team: None }
    }

    pub fn with_team(mut self, team: &'a str) -> Self {
        self.team = Some(team);
        self
    }

    fn world_name(&self) -> &'a str {
        self.world.rsplit_once(':').map_or(self.world, |(_, path)| path)
    }
}

/// Why a launch URL is being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlTrigger {
    Joined,
    ChangedWorld,
    TeamsModified,
}

/// Builds and sends launch URL messages from the server configuration
#[derive(Debug, Clone)]
pub struct UrlBroadcaster {
    config: ServerConfig,
}

impl UrlBroadcaster {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The message a given recipient should get
    pub fn message_for(&self, recipient: &Recipient<'_>) -> MumbleUrlMessage {
        let world = recipient.world_name();
        let team = recipient.team.unwrap_or("");
        let fill = |template: &str| template.replace("{world}", world).replace("{team}", team);

        MumbleUrlMessage {
            voip_client: self.config.voip_client,
            userinfo: self.config.userinfo.clone(),
            host: self.config.host.clone(),
            port: self.config.port,
            path: fill(&self.config.path),
            query: fill(&self.config.query),
            fragment: fill(&self.config.fragment),
        }
    }

    /// Encode and send to one recipient
    pub fn send_to<T: Transport>(
        &self,
        transport: &mut T,
        recipient: &Recipient<'_>,
        trigger: UrlTrigger,
    ) -> Result<()> {
        let payload = self.message_for(recipient).encode()?;
        trace!(recipient = recipient.name, ?trigger, bytes = payload.len(), "Sending launch URL");
        transport.send(recipient.name, BROADCAST_MUMBLE_URL_CHANNEL, payload)
    }

    /// Send to every recipient; failures are logged and skipped.
    ///
    /// Returns how many sends succeeded.
    pub fn broadcast<'a, T, I>(&self, transport: &mut T, recipients: I, trigger: UrlTrigger) -> usize
    where
        T: Transport,
        I: IntoIterator<Item = Recipient<'a>>,
    {
        if self.config.host.is_empty() {
            debug!(?trigger, "No VoIP host configured, skipping launch URL broadcast");
            return 0;
        }

        let mut sent = 0;
        for recipient in recipients {
            match self.send_to(transport, &recipient, trigger) {
                Ok(()) => sent += 1,
                Err(e) => warn!(recipient = recipient.name, error = %e, "Failed to send launch URL"),
            }
        }
        debug!(?trigger, sent, "Broadcast launch URL");
        sent
    }
}
