//! Client-side handling of launch URL messages

use bytes::Buf;
use tracing::{debug, info, warn};

use super::message::MumbleUrlMessage;
use crate::config::AutoLaunchOption;
use crate::desktop::Desktop;

/// What happened to one received message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Auto-launch is disabled
    Ignored,
    /// The URI was handed to the system handler
    Launched { uri: String },
    /// The parts did not form a valid URI
    InvalidUri { input: String },
    /// The handler could not be started
    LaunchFailed { uri: String, reason: String },
    /// The payload did not decode
    Malformed { details: String },
}

impl ReceiveOutcome {
    pub fn is_launched(&self) -> bool {
        matches!(self, ReceiveOutcome::Launched { .. })
    }
}

/// Applies the auto-launch preference to inbound launch URLs
pub struct UrlReceiver<D> {
    option: AutoLaunchOption,
    desktop: D,
}

impl<D: Desktop> UrlReceiver<D> {
    pub fn new(option: AutoLaunchOption, desktop: D) -> Self {
        Self { option, desktop }
    }

    pub fn option(&self) -> AutoLaunchOption {
        self.option
    }

    pub fn set_option(&mut self, option: AutoLaunchOption) {
        self.option = option;
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// Decode a raw channel payload, then [`receive`](Self::receive) it
    pub fn receive_bytes(&self, payload: impl Buf) -> ReceiveOutcome {
        match MumbleUrlMessage::decode(payload) {
            Ok(message) => self.receive(&message),
            Err(e) => {
                warn!(error = %e, "Dropping malformed launch URL message");
                ReceiveOutcome::Malformed { details: e.to_string() }
            }
        }
    }

    /// Open the message's URI if auto-launch is accepted.
    ///
    /// Never fails; every problem is logged and reported in the outcome.
    pub fn receive(&self, message: &MumbleUrlMessage) -> ReceiveOutcome {
        if self.option == AutoLaunchOption::Ignore {
            debug!("Auto-launch disabled, ignoring launch URL");
            return ReceiveOutcome::Ignored;
        }

        let uri = match message.to_uri() {
            Ok(uri) => uri,
            Err(e) => {
                let input = message.raw_uri();
                warn!(error = %e, "Ignoring invalid VoIP client URI \"{}\"", input);
                return ReceiveOutcome::InvalidUri { input };
            }
        };

        if self.desktop.is_headless() {
            warn!("Environment is headless, enabling URI opening to launch the VoIP client");
            self.desktop.clear_headless();
        }

        match self.desktop.browse(&uri) {
            Ok(()) => {
                info!(uri = %uri, "Launched VoIP client");
                ReceiveOutcome::Launched { uri }
            }
            Err(e) => {
                warn!(uri = %uri, error = %e, "Failed to open VoIP client URI");
                ReceiveOutcome::LaunchFailed { uri, reason: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::VoipClient;
    use crate::test_utils::{LogCapture, RecordingDesktop};
    use tracing::Level;

    fn message(host: &str) -> MumbleUrlMessage {
        MumbleUrlMessage {
            port: 64738,
            path: "/lobby".to_string(),
            ..MumbleUrlMessage::new(VoipClient::Mumble, host)
        }
    }

    #[test]
    fn ignore_has_no_side_effect() {
        let receiver = UrlReceiver::new(AutoLaunchOption::Ignore, RecordingDesktop::new());
        assert_eq!(receiver.receive(&message("voice.example.com")), ReceiveOutcome::Ignored);
        assert!(receiver.desktop().opened().is_empty());
    }

    #[test]
    fn accept_opens_the_uri() {
        let receiver = UrlReceiver::new(AutoLaunchOption::Accept, RecordingDesktop::new());
        let outcome = receiver.receive(&message("voice.example.com"));

        assert_eq!(
            outcome,
            ReceiveOutcome::Launched { uri: "mumble://voice.example.com:64738/lobby".to_string() }
        );
        assert_eq!(receiver.desktop().opened(), vec!["mumble://voice.example.com:64738/lobby"]);
    }

    #[test]
    fn invalid_host_is_reported_not_opened() {
        let receiver = UrlReceiver::new(AutoLaunchOption::Accept, RecordingDesktop::new());
        let logs = LogCapture::new();
        let outcome = logs.run(Level::WARN, || receiver.receive(&message("bad host")));

        match outcome {
            ReceiveOutcome::InvalidUri { input } => {
                assert_eq!(input, "mumble://bad host:64738/lobby")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(receiver.desktop().opened().is_empty());

        let warnings = logs.lines_at(Level::WARN);
        assert_eq!(warnings.len(), 1, "{}", logs.contents());
        assert!(warnings[0].contains(r#"Ignoring invalid VoIP client URI "mumble://bad host:64738/lobby""#));
    }

    #[test]
    fn headless_flag_is_cleared_before_opening() {
        let receiver = UrlReceiver::new(AutoLaunchOption::Accept, RecordingDesktop::headless());
        let outcome = receiver.receive(&message("voice.example.com"));

        assert!(outcome.is_launched());
        assert!(!receiver.desktop().is_headless());
        assert_eq!(receiver.desktop().clear_count(), 1);
    }

    #[test]
    fn launch_failure_is_reported() {
        let receiver = UrlReceiver::new(AutoLaunchOption::Accept, RecordingDesktop::failing());
        let outcome = receiver.receive(&message("voice.example.com"));
        assert!(matches!(outcome, ReceiveOutcome::LaunchFailed { .. }));
    }

    #[test]
    fn payload_bytes_are_decoded_first() {
        let receiver = UrlReceiver::new(AutoLaunchOption::Accept, RecordingDesktop::new());
        let payload = message("voice.example.com").encode().expect("encode");
        assert!(receiver.receive_bytes(payload).is_launched());

        let outcome = receiver.receive_bytes(&[0x05u8][..]);
        assert!(matches!(outcome, ReceiveOutcome::Malformed { .. }));
        assert_eq!(receiver.desktop().opened().len(), 1);
    }
}
