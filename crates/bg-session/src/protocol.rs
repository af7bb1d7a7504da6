use bg_core::{BgError, InternalFault};

use crate::event::Event;
use crate::message::InboundEvent;

/// Encodes an outbound [`Event`] into the `{"type": "...", "payload": {...}}`
/// wire shape described for the socket transport.
pub fn encode(event: &Event) -> Result<String, BgError> {
    serde_json::to_string(event)
        .map_err(|e| BgError::Internal(InternalFault::Serialization(e.to_string())))
}

/// Decodes a raw client message into an [`InboundEvent`].
pub fn decode(raw: &str) -> Result<InboundEvent, BgError> {
    serde_json::from_str(raw).map_err(|_| BgError::rejection("malformed message"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_request_player_roll() {
        let raw = r#"{"event":"request_player_roll","payload":null}"#;
        assert!(matches!(decode(raw), Ok(InboundEvent::RequestPlayerRoll)));
    }

    #[test]
    fn decodes_send_player_step() {
        let raw = r#"{"event":"send_player_step","payload":{"step":{"from":24,"to":18}}}"#;
        match decode(raw).unwrap() {
            InboundEvent::SendPlayerStep { step } => {
                assert_eq!(step.from, 24);
                assert_eq!(step.to, 18);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_message() {
        assert!(decode("not json").is_err());
    }
}
