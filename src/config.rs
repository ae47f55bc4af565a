//! Role-specific JSON configuration
//!
//! Each participant role has its own document in the configuration
//! directory: `mumblelink-client.json` for the player side and
//! `mumblelink-server.json` for the side that hands out launch URLs. A missing
//! document is written with defaults first and then read back, so a broken
//! directory shows up at startup instead of on the first save.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LinkError;
use crate::protocol::VoipClient;

/// What to do with launch URLs sent by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum AutoLaunchOption {
    /// Drop every launch URL
    Ignore,
    /// Open launch URLs with the system handler
    #[default]
    Accept,
}

/// Player-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ClientConfig {
    pub auto_launch_option: AutoLaunchOption,
    /// Vertical distance per hash unit separating worlds; 0 disables muting
    pub world_axis_adjust: f32,
    /// Start with URI opening disabled until first needed
    pub headless: bool,
    /// Snapshot rate of the async driver
    pub tick_rate_hz: u32,
    /// Published as the link `name`
    pub application_name: String,
    /// Published as the link `description`
    pub description: String,
    /// Published in the link `context`
    pub context_domain: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auto_launch_option: AutoLaunchOption::Accept,
            world_axis_adjust: 1.0,
            headless: false,
            tick_rate_hz: 20,
            application_name: "Minecraft".to_string(),
            description: "A Minecraft mod that provides position data to VoIP clients.".to_string(),
            context_domain: "AllTalk".to_string(),
        }
    }
}

/// Side that sends launch URLs to players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ServerConfig {
    pub voip_client: VoipClient,
    pub userinfo: String,
    pub host: String,
    /// -1 leaves the port out of the URI
    pub port: i32,
    /// May contain `{world}` and `{team}` placeholders
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            voip_client: VoipClient::Mumble,
            userinfo: String::new(),
            host: String::new(),
            port: VoipClient::Mumble.default_port(),
            path: String::new(),
            query: String::new(),
            fragment: String::new(),
        }
    }
}

/// A configuration document bound to one role
pub trait ConfigRole: Serialize + DeserializeOwned + Default {
    /// Role name, used in the file name
    const ROLE: &'static str;
}

impl ConfigRole for ClientConfig {
    const ROLE: &'static str = "client";
}

impl ConfigRole for ServerConfig {
    const ROLE: &'static str = "server";
}

/// Loads and saves role documents in one directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for role `C`
    pub fn path_for<C: ConfigRole>(&self) -> PathBuf {
        self.dir.join(format!("mumblelink-{}.json", C::ROLE))
    }

    /// Read the role document, writing defaults first when it does not exist
    pub fn load_or_create<C: ConfigRole>(&self) -> Result<C> {
        let path = self.path_for::<C>();
        if !path.exists() {
            info!(path = %path.display(), role = C::ROLE, "Writing default configuration");
            self.save(&C::default())?;
        }

        // Reading back verifies the save as well
        self.load(&path)
    }

    /// Write the role document
    pub fn save<C: ConfigRole>(&self, config: &C) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| LinkError::config_error(self.dir.clone(), e))?;

        let path = self.path_for::<C>();
        let json = serde_json::to_string_pretty(config)
            .with_context(|| format!("Failed to serialize {} configuration", C::ROLE))?;
        fs::write(&path, json).map_err(|e| LinkError::config_error(path.clone(), e))?;

        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    fn load<C: ConfigRole>(&self, path: &Path) -> Result<C> {
        let raw = fs::read_to_string(path).map_err(|e| LinkError::config_error(path.to_path_buf(), e))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid {} configuration in {}", C::ROLE, path.display()))?;

        debug!(path = %path.display(), role = C::ROLE, "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TempDir;

    #[test]
    fn missing_document_is_created_with_defaults() {
        let dir = TempDir::new("config-create");
        let store = ConfigStore::new(dir.path().join("nested"));

        let config: ClientConfig = store.load_or_create().expect("load");
        assert_eq!(config, ClientConfig::default());
        assert!(store.path_for::<ClientConfig>().exists());
    }

    #[test]
    fn existing_document_is_not_overwritten() {
        let dir = TempDir::new("config-existing");
        let store = ConfigStore::new(dir.path());
        let custom = ClientConfig {
            auto_launch_option: AutoLaunchOption::Ignore,
            world_axis_adjust: 4.0,
            ..ClientConfig::default()
        };
        store.save(&custom).expect("save");

        let loaded: ClientConfig = store.load_or_create().expect("load");
        assert_eq!(loaded, custom);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = TempDir::new("config-partial");
        let store = ConfigStore::new(dir.path());
        fs::write(store.path_for::<ClientConfig>(), r#"{ "autoLaunchOption": "ignore" }"#)
            .expect("write");

        let loaded: ClientConfig = store.load_or_create().expect("load");
        assert_eq!(loaded.auto_launch_option, AutoLaunchOption::Ignore);
        assert_eq!(loaded.world_axis_adjust, 1.0);
        assert_eq!(loaded.context_domain, "AllTalk");
    }

    #[test]
    fn invalid_json_reports_path() {
        let dir = TempDir::new("config-invalid");
        let store = ConfigStore::new(dir.path());
        fs::write(store.path_for::<ServerConfig>(), "{ not json").expect("write");

        let err = store.load_or_create::<ServerConfig>().expect_err("invalid json");
        assert!(format!("{err:#}").contains("mumblelink-server.json"));
    }

    #[test]
    fn roles_use_separate_files() {
        let store = ConfigStore::new("/etc/mumblelink");
        assert!(store.path_for::<ClientConfig>().ends_with("mumblelink-client.json"));
        assert!(store.path_for::<ServerConfig>().ends_with("mumblelink-server.json"));
    }

    #[test]
    fn server_defaults_to_mumble_port() {
        let config = ServerConfig::default();
        assert_eq!(config.voip_client, VoipClient::Mumble);
        assert_eq!(config.port, 64738);
    }

    #[test]
    fn keys_are_camel_case() {
        let json = serde_json::to_value(ClientConfig::default()).expect("json");
        assert_eq!(json["autoLaunchOption"], "accept");
        assert!(json.get("worldAxisAdjust").is_some());

        let json = serde_json::to_value(ServerConfig::default()).expect("json");
        assert_eq!(json["voipClient"], "mumble");
    }
}
