use serde::{Deserialize, Serialize};
use waymask_geo::GeoPoint;

use crate::error::{ObfuscateError, Result};

/// One entry of the sensitive zone list.
///
/// `lat`/`lon` present selects the ghost rule, absent selects lookup of a
/// waypoint by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    pub seed: i64,
    #[serde(rename = "radius")]
    pub radius_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneRule {
    Ghost(GeoPoint),
    Named,
}

impl ZoneConfig {
    pub fn named(name: impl Into<String>, seed: i64, radius_km: f64) -> Self {
        Self { name: name.into(), seed, radius_km, lat: None, lon: None }
    }

    pub fn ghost(name: impl Into<String>, seed: i64, radius_km: f64, lat: f64, lon: f64) -> Self {
        Self { name: name.into(), seed, radius_km, lat: Some(lat), lon: Some(lon) }
    }

    pub fn rule(&self) -> Result<ZoneRule> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(ZoneRule::Ghost(GeoPoint { lat, lon })),
            (None, None) => Ok(ZoneRule::Named),
            _ => Err(ObfuscateError::Config(format!(
                "zone '{}' must set both lat and lon or neither", self.name
            ))),
        }
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.rule(), Ok(ZoneRule::Ghost(_)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ObfuscateError::Config("zone name is empty".into()));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(ObfuscateError::Config(format!(
                "zone '{}' radius must be > 0 km, got {}", self.name, self.radius_km
            )));
        }
        if let ZoneRule::Ghost(p) = self.rule()? {
            if !p.is_valid() {
                return Err(ObfuscateError::Config(format!(
                    "ghost zone '{}' has invalid coordinate {}", self.name, p
                )));
            }
        }
        Ok(())
    }
}

pub fn validate_all(configs: &[ZoneConfig]) -> Result<()> {
    configs.iter().try_for_each(ZoneConfig::validate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_shape() {
        let raw = r#"[
            {"name": "My House", "seed": 103, "radius": 8},
            {"name": "Trailhead", "seed": -7, "radius": 2.5, "lat": 45.1, "lon": -121.9}
        ]"#;
        let cfgs: Vec<ZoneConfig> = serde_json::from_str(raw).unwrap();
        assert_eq!(cfgs[0], ZoneConfig::named("My House", 103, 8.0));
        assert_eq!(cfgs[0].rule().unwrap(), ZoneRule::Named);
        assert_eq!(cfgs[1].rule().unwrap(), ZoneRule::Ghost(GeoPoint::new(45.1, -121.9)));
        assert!(validate_all(&cfgs).is_ok());
    }

    #[test]
    fn missing_seed_is_rejected_by_serde() {
        let raw = r#"[{"name": "My House", "radius": 8}]"#;
        assert!(serde_json::from_str::<Vec<ZoneConfig>>(raw).is_err());
    }

    #[test]
    fn half_ghost_is_config_error() {
        let mut cfg = ZoneConfig::named("Half", 1, 1.0);
        cfg.lat = Some(10.0);
        assert!(matches!(cfg.validate(), Err(ObfuscateError::Config(_))));
    }

    #[test]
    fn bad_radius_is_config_error() {
        for r in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let cfg = ZoneConfig::named("Home", 1, r);
            assert!(matches!(cfg.validate(), Err(ObfuscateError::Config(_))), "radius {}", r);
        }
    }

    #[test]
    fn blank_name_is_config_error() {
        assert!(ZoneConfig::named("  ", 1, 1.0).validate().is_err());
    }
}
