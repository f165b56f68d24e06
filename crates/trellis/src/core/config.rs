use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for the layout scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// How many times a node's layout may repeat because it was invalidated
    /// while being computed. Also bounds how many rounds of queued passes a
    /// single flush will run.
    pub max_relayout_retries: usize,
    /// Width given to a wrapping node with no children, on top of its padding.
    pub empty_wrap_width: i32,
    /// Height given to a wrapping node with no children, on top of its padding.
    pub empty_wrap_height: i32,
    /// Emit a warning for each broken reference cycle.
    pub log_cycles: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_relayout_retries: 16,
            empty_wrap_width: 0,
            empty_wrap_height: 0,
            log_cycles: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn partial_json_fills_defaults() -> Result<()> {
        let cfg = LayoutConfig::from_json(r#"{ "max_relayout_retries": 3, "empty_wrap_width": 80 }"#)?;
        assert_eq!(cfg.max_relayout_retries, 3);
        assert_eq!(cfg.empty_wrap_width, 80);
        assert_eq!(cfg.empty_wrap_height, 0);
        assert!(cfg.log_cycles);
        Ok(())
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = LayoutConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn json_roundtrip() -> Result<()> {
        let cfg = LayoutConfig {
            log_cycles: false,
            ..LayoutConfig::default()
        };
        assert_eq!(LayoutConfig::from_json(&cfg.to_json()?)?, cfg);
        Ok(())
    }
}
