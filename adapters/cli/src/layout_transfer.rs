//! Single-line transfer format for defense layouts.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use geometry_defense_core::DefenseKind;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "geodef";
const LAYOUT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Defenses captured from a session, replayable with `--layout`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct DefenseLayout {
    /// Defenses in placement order.
    pub(crate) defenses: Vec<LayoutDefense>,
}

impl DefenseLayout {
    /// Encodes the layout as `geodef:v1:<payload>`.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(self).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{LAYOUT_DOMAIN}{FIELD_DELIMITER}{LAYOUT_VERSION}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a layout from its transfer string.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)
    }
}

/// One defense within a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutDefense {
    /// Archetype to place.
    pub(crate) kind: DefenseKind,
    /// Field position of the defense.
    pub(crate) position: Vec2,
}

/// Errors that can occur while encoding or decoding layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The payload segment was missing.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The string used an unexpected prefix.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be converted to or from JSON.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> DefenseLayout {
        DefenseLayout {
            defenses: vec![
                LayoutDefense {
                    kind: DefenseKind::Sniper,
                    position: Vec2::new(320.0, 200.0),
                },
                LayoutDefense {
                    kind: DefenseKind::Rapid,
                    position: Vec2::new(200.0, 130.5),
                },
            ],
        }
    }

    #[test]
    fn encoded_layout_decodes_to_the_same_defenses() {
        let encoded = layout().encode().expect("layout encodes");
        assert!(encoded.starts_with("geodef:v1:"));
        assert!(!encoded.contains('\n'));

        let decoded = DefenseLayout::decode(&encoded).expect("layout decodes");
        assert_eq!(decoded, layout());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = layout().encode().expect("layout encodes");
        let padded = format!("  {encoded}\n");
        assert_eq!(DefenseLayout::decode(&padded).expect("decodes"), layout());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            DefenseLayout::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        assert!(matches!(
            DefenseLayout::decode("maze:v1:abc"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        assert!(matches!(
            DefenseLayout::decode("geodef:v2:abc"),
            Err(LayoutTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
    }

    #[test]
    fn truncated_string_reports_missing_payload() {
        assert!(matches!(
            DefenseLayout::decode("geodef:v1"),
            Err(LayoutTransferError::MissingPayload)
        ));
    }

    #[test]
    fn corrupt_payload_is_rejected() {
        assert!(matches!(
            DefenseLayout::decode("geodef:v1:!!!"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
        let not_json = STANDARD_NO_PAD.encode(b"not json");
        assert!(matches!(
            DefenseLayout::decode(&format!("geodef:v1:{not_json}")),
            Err(LayoutTransferError::InvalidPayload(_))
        ));
    }
}
