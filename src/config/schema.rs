use crate::version::GameVersion;
use serde::{Deserialize, Deserializer};

/// Contents of a `ksp-version-gate.toml` settings file.
///
/// `game_version` is parsed while deserializing, so a partial or garbled
/// version is reported as a TOML error pointing at the offending key.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Running game version, `major.minor.revision`
    #[serde(default)]
    pub game_version: Option<GameVersion>,
    /// Default log filter when `RUST_LOG` is unset (e.g. "info")
    #[serde(default, deserialize_with = "non_blank")]
    pub log_level: Option<String>,
}

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let level = String::deserialize(deserializer)?;
    if level.trim().is_empty() {
        return Err(serde::de::Error::custom("log_level can't be blank"));
    }
    Ok(Some(level))
}
