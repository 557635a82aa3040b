//! Volume-service payloads.

use serde::Deserialize;

/// Volume metadata reported by the volume service.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Volume {
    /// Volume identifier.
    pub id: String,
    /// Provisioned size in GiB.
    pub size: u64,
    /// Lifecycle status, for example `available` or `in-use`.
    #[serde(default)]
    pub status: String,
    /// Display name, if set.
    #[serde(default)]
    pub name: Option<String>,
}

/// Envelope wrapping `GET /volumes/{id}` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct VolumeEnvelope {
    pub(crate) volume: Volume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_show_response() {
        let body = r#"{"volume": {"id": "v-1", "size": 5, "status": "available",
            "name": null, "attachments": [], "bootable": "false"}}"#;
        let envelope: VolumeEnvelope = serde_json::from_str(body).expect("decodes");
        assert_eq!(envelope.volume.size, 5);
        assert_eq!(envelope.volume.status, "available");
        assert_eq!(envelope.volume.name, None);
    }
}
