use std::path::Path;

use serde::Deserialize;
use waymask_zones::{ObfuscateError, Result, ZoneConfig};

#[derive(Debug, Deserialize)]
struct ZonesToml {
    #[serde(default)]
    zones: Vec<ZoneConfig>,
}

/// Reads a zone list: a JSON array of zone objects, or a TOML file with
/// `[[zones]]` tables.
pub async fn load_zone_list(path: &Path) -> Result<Vec<ZoneConfig>> {
    let s = tokio::fs::read_to_string(path).await
        .map_err(|e| ObfuscateError::Config(format!("read zone list {}: {}", path.display(), e)))?;
    let is_toml = path.extension().and_then(|e| e.to_str()).map_or(false, |e| e.eq_ignore_ascii_case("toml"));
    parse_zone_list(&s, is_toml).map_err(|e| match e {
        ObfuscateError::Config(msg) => ObfuscateError::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

pub fn parse_zone_list(s: &str, is_toml: bool) -> Result<Vec<ZoneConfig>> {
    if is_toml {
        toml::from_str::<ZonesToml>(s)
            .map(|z| z.zones)
            .map_err(|e| ObfuscateError::Config(e.to_string()))
    } else {
        serde_json::from_str(s).map_err(|e| ObfuscateError::Config(e.to_string()))
    }
}
