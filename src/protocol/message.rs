//! The launch URL message

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::codec::{get_i32, get_string, get_var_int, put_string, put_var_int};
use super::uri::UriParts;
use crate::{LinkError, Result};

/// Channel identifier the message travels on
pub const BROADCAST_MUMBLE_URL_CHANNEL: &str = "mumblelink:broadcast_mumble_url_v2";

/// Voice client the URL is meant for; decides the URI scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum VoipClient {
    #[default]
    Mumble,
    TeamSpeak,
}

impl VoipClient {
    /// Wire order; the ordinal is the variant's index here
    pub const ALL: [VoipClient; 2] = [VoipClient::Mumble, VoipClient::TeamSpeak];

    pub fn scheme(self) -> &'static str {
        match self {
            VoipClient::Mumble => "mumble",
            VoipClient::TeamSpeak => "ts3server",
        }
    }

    pub fn default_port(self) -> i32 {
        match self {
            VoipClient::Mumble => 64738,
            VoipClient::TeamSpeak => 9987,
        }
    }

    pub fn ordinal(self) -> i32 {
        match self {
            VoipClient::Mumble => 0,
            VoipClient::TeamSpeak => 1,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Everything needed to rebuild the voice client's launch URI
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct MumbleUrlMessage {
    pub voip_client: VoipClient,
    pub userinfo: String,
    pub host: String,
    /// -1 means "no port"
    pub port: i32,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl MumbleUrlMessage {
    /// Message with only a client kind and host; port unspecified
    pub fn new(voip_client: VoipClient, host: impl Into<String>) -> Self {
        Self { voip_client, host: host.into(), port: -1, ..Self::default() }
    }

    /// Serialize in wire order: client ordinal, userinfo, host, port, path,
    /// query, fragment
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(
            16 + self.userinfo.len()
                + self.host.len()
                + self.path.len()
                + self.query.len()
                + self.fragment.len(),
        );
        put_var_int(&mut buf, self.voip_client.ordinal());
        put_string(&mut buf, &self.userinfo, "userinfo")?;
        put_string(&mut buf, &self.host, "host")?;
        buf.put_i32(self.port);
        put_string(&mut buf, &self.path, "path")?;
        put_string(&mut buf, &self.query, "query")?;
        put_string(&mut buf, &self.fragment, "fragment")?;
        Ok(buf.freeze())
    }

    /// Parse one complete message; trailing bytes are an error
    pub fn decode(mut buf: impl Buf) -> Result<Self> {
        let ordinal = get_var_int(&mut buf, "voip_client")?;
        let voip_client = VoipClient::from_ordinal(ordinal).ok_or_else(|| {
            LinkError::decode("voip_client", format!("unknown VoIP client ordinal {}", ordinal))
        })?;

        let message = Self {
            voip_client,
            userinfo: get_string(&mut buf, "userinfo")?,
            host: get_string(&mut buf, "host")?,
            port: get_i32(&mut buf, "port")?,
            path: get_string(&mut buf, "path")?,
            query: get_string(&mut buf, "query")?,
            fragment: get_string(&mut buf, "fragment")?,
        };

        if buf.has_remaining() {
            return Err(LinkError::decode(
                "message",
                format!("{} trailing bytes", buf.remaining()),
            ));
        }

        trace!(client = ?message.voip_client, host = %message.host, "Decoded launch URL message");
        Ok(message)
    }

    fn uri_parts(&self) -> UriParts<'_> {
        UriParts {
            scheme: self.voip_client.scheme(),
            userinfo: &self.userinfo,
            host: &self.host,
            port: self.port,
            path: &self.path,
            query: &self.query,
            fragment: &self.fragment,
        }
    }

    /// Assemble and validate the launch URI
    pub fn to_uri(&self) -> Result<String> {
        self.uri_parts().build()
    }

    /// Unescaped concatenation of the parts, as reported for invalid URIs
    pub fn raw_uri(&self) -> String {
        self.uri_parts().raw()
    }
}
