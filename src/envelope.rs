use serde::Deserialize;

use crate::errors::ConsumerError;

/// Detail-type marker for Chime media pipeline state change events.
pub const DETAIL_TYPE_CHIME_MEDIA_PIPELINE_STATE_CHANGE: &str =
    "Chime Media Pipeline State Change";

/// Detail-type marker for Chime meeting state change events.
pub const DETAIL_TYPE_CHIME_MEETING_STATE_CHANGE: &str = "Chime Meeting State Change";

/// A decoded message payload: the detail-type discriminator plus the
/// variant-specific detail.
///
/// The wire format follows EventBridge event envelopes, where the
/// discriminator is spelled `detail-type`. The detail is kept as raw JSON
/// because its shape depends entirely on the detail-type; handlers pull out
/// the fields they recognize.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Identifies the schema variant of `detail`.
    #[serde(rename = "detail-type", alias = "detailType")]
    pub detail_type: String,

    /// Variant-specific payload, left untyped.
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl Envelope {
    /// Decodes a raw message body into an envelope.
    pub fn decode(body: &str) -> Result<Self, ConsumerError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Returns the media pipeline identifier carried by pipeline state
    /// change events, if present in the detail.
    pub fn media_pipeline_id(&self) -> Option<&str> {
        self.detail.get("mediaPipelineId").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_eventbridge_envelope() {
        let body = r#"{
            "detail-type": "Chime Media Pipeline State Change",
            "detail": { "mediaPipelineId": "pid-123", "eventType": "chime:MediaPipelineInProgress" }
        }"#;

        let envelope = Envelope::decode(body).unwrap();

        assert_eq!(
            envelope.detail_type,
            DETAIL_TYPE_CHIME_MEDIA_PIPELINE_STATE_CHANGE
        );
        assert_eq!(envelope.media_pipeline_id(), Some("pid-123"));
    }

    #[test]
    fn accepts_camel_case_discriminator() {
        let body = r#"{"detailType": "Chime Meeting State Change", "detail": {}}"#;

        let envelope = Envelope::decode(body).unwrap();

        assert_eq!(envelope.detail_type, DETAIL_TYPE_CHIME_MEETING_STATE_CHANGE);
        assert_eq!(envelope.media_pipeline_id(), None);
    }

    #[test]
    fn missing_detail_defaults_to_null() {
        let envelope = Envelope::decode(r#"{"detail-type": "something-else"}"#).unwrap();

        assert!(envelope.detail.is_null());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(Envelope::decode("not json at all").is_err());
        assert!(Envelope::decode(r#"{"detail": {}}"#).is_err());
    }
}
