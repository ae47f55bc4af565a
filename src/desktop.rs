//! Opening URIs with the system handler

use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::{LinkError, Result};

/// The environment's "open this URI" facility
pub trait Desktop: Send + Sync {
    /// Whether URI opening is currently disabled
    fn is_headless(&self) -> bool;

    /// Re-enable URI opening
    fn clear_headless(&self);

    /// Hand the URI to the registered handler without waiting for it
    fn browse(&self, uri: &str) -> Result<()>;
}

/// Launches the platform's URL handler as a child process
#[derive(Debug, Default)]
pub struct SystemDesktop {
    headless: AtomicBool,
}

impl SystemDesktop {
    pub fn new(headless: bool) -> Self {
        Self { headless: AtomicBool::new(headless) }
    }

    /// Headless when configured so, or when no display server is reachable
    pub fn detect(configured_headless: bool) -> Self {
        Self::new(configured_headless || !display_available())
    }

    fn handler_command(uri: &str) -> Command {
        #[cfg(windows)]
        {
            let mut command = Command::new("rundll32");
            command.args(["url.dll,FileProtocolHandler", uri]);
            command
        }
        #[cfg(target_os = "macos")]
        {
            let mut command = Command::new("open");
            command.arg(uri);
            command
        }
        #[cfg(not(any(windows, target_os = "macos")))]
        {
            let mut command = Command::new("xdg-open");
            command.arg(uri);
            command
        }
    }
}

impl Desktop for SystemDesktop {
    fn is_headless(&self) -> bool {
        self.headless.load(Ordering::Acquire)
    }

    fn clear_headless(&self) {
        self.headless.store(false, Ordering::Release);
    }

    fn browse(&self, uri: &str) -> Result<()> {
        if self.is_headless() {
            return Err(LinkError::launch_failed("environment is headless"));
        }

        let mut child = Self::handler_command(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LinkError::launch_failed_with_source("failed to start URI handler", Box::new(e)))?;

        debug!(pid = child.id(), "Started URI handler");

        // Reap the handler in the background
        let reaper = std::thread::Builder::new()
            .name("mumblelink-browse".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => trace!(%status, "URI handler exited"),
                Err(e) => trace!(error = %e, "Failed to wait for URI handler"),
            });
        if let Err(e) = reaper {
            debug!(error = %e, "Could not spawn URI handler reaper");
        }
        Ok(())
    }
}

#[cfg(any(windows, target_os = "macos"))]
fn display_available() -> bool {
    true
}

#[cfg(not(any(windows, target_os = "macos")))]
fn display_available() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|value| !value.is_empty()))
}
