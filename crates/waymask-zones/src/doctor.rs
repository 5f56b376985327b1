use anyhow::Result;
use std::collections::HashMap;
use tracing::warn;

use crate::config::ZoneConfig;

/// Validates the zone list and warns about entries that are legal but
/// probably not what the author meant.
pub fn check_zone_list(configs: &[ZoneConfig]) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, cfg) in configs.iter().enumerate() {
        cfg.validate().map_err(|e| anyhow::anyhow!("zones[{}]: {}", i, e))?;
        if cfg.is_ghost() { continue; }
        if let Some(prev) = seen.insert(cfg.name.as_str(), i) {
            warn!("doctor: zones[{}] and zones[{}] share name '{}'; the later entry wins", prev, i, cfg.name);
        }
    }
    if configs.is_empty() {
        warn!("doctor: zone list is empty; output geometry will equal input");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_list() {
        let cfgs = vec![
            ZoneConfig::named("Home", 103, 8.0),
            ZoneConfig::named("Home", 5, 3.0),
            ZoneConfig::ghost("Cabin", 7, 2.0, 45.0, -121.0),
        ];
        assert!(check_zone_list(&cfgs).is_ok());
    }

    #[test]
    fn reports_offending_index() {
        let cfgs = vec![ZoneConfig::named("Home", 103, 8.0), ZoneConfig::named("Work", 1, 0.0)];
        let err = check_zone_list(&cfgs).unwrap_err().to_string();
        assert!(err.contains("zones[1]"), "{}", err);
    }
}
