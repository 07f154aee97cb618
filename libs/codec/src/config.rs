//! # Codec Configuration Module
//!
//! Provides deployment-tunable limits for encode/decode instead of hardcoded
//! values. The wire format itself is not configurable.

use serde::{Deserialize, Serialize};

/// Codec configuration for different deployment environments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest PDU accepted on encode or decode (in bytes)
    pub max_pdu_size: usize,

    /// Reject buffers longer than the metadata's `total_size`
    ///
    /// Transport buffers are often larger than the PDU they carry, so this is
    /// off unless the caller owns exact framing.
    pub require_exact_length: bool,

    /// Reject metadata whose version differs from ours
    pub verify_version: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_pdu_size: 1024 * 1024, // 1 MiB
            require_exact_length: false,
            verify_version: true,
        }
    }
}

impl CodecConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HAKO_PDU_MAX_SIZE") {
            if let Ok(size) = val.parse() {
                config.max_pdu_size = size;
            }
        }

        if let Ok(val) = std::env::var("HAKO_PDU_EXACT_LENGTH") {
            if let Some(flag) = parse_flag(&val) {
                config.require_exact_length = flag;
            }
        }

        if let Ok(val) = std::env::var("HAKO_PDU_VERIFY_VERSION") {
            if let Some(flag) = parse_flag(&val) {
                config.verify_version = flag;
            }
        }

        config
    }

    /// Exact framing, version pinned, smaller size ceiling
    pub fn strict() -> Self {
        Self {
            max_pdu_size: 64 * 1024,
            require_exact_length: true,
            verify_version: true,
        }
    }

    /// Relaxed limits for development and mixed-version test rigs
    pub fn relaxed() -> Self {
        Self {
            max_pdu_size: 16 * 1024 * 1024,
            require_exact_length: false,
            verify_version: false,
        }
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = CodecConfig::default();
        assert!(!default.require_exact_length);
        assert!(default.verify_version);

        assert!(CodecConfig::strict().require_exact_length);
        assert!(!CodecConfig::relaxed().verify_version);
        assert!(CodecConfig::relaxed().max_pdu_size > default.max_pdu_size);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{"max_pdu_size": 4096}"#).unwrap();
        assert_eq!(config.max_pdu_size, 4096);
        assert!(config.verify_version);
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
