use serde::Serialize;
use tracing::info;
use waymask_geo::{destination_point, GeoPoint};

use crate::config::ZoneConfig;
use crate::rng::DecoyRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Ghost,
    Named,
}

/// A sensitive location paired with its decoy and exclusion radius.
///
/// Built once by the pipeline from a validated [`ZoneConfig`] and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitiveZone {
    name: String,
    kind: ZoneKind,
    original: GeoPoint,
    decoy: GeoPoint,
    radius_km: f64,
    displacement_km: f64,
    bearing_deg: f64,
}

impl SensitiveZone {
    /// Ghost rule: one discarded bearing draw, then a displacement sampled
    /// in [0, radius] and a bearing.
    pub(crate) fn ghost(cfg: &ZoneConfig, original: GeoPoint) -> Self {
        let mut rng = DecoyRng::new(cfg.seed);
        // Legacy draw. Removing it shifts every decoy built from an existing seed.
        let _ = rng.bearing_deg();
        let dist = rng.displacement_km(cfg.radius_km);
        let bearing = rng.bearing_deg();
        Self::project(cfg, ZoneKind::Ghost, original, dist, bearing)
    }

    /// Named rule: a single bearing draw, displaced by the full radius.
    pub(crate) fn named(cfg: &ZoneConfig, original: GeoPoint) -> Self {
        let mut rng = DecoyRng::new(cfg.seed);
        let bearing = rng.bearing_deg();
        Self::project(cfg, ZoneKind::Named, original, cfg.radius_km, bearing)
    }

    fn project(cfg: &ZoneConfig, kind: ZoneKind, original: GeoPoint, dist: f64, bearing: f64) -> Self {
        let decoy = destination_point(original, dist, bearing);
        info!("zones: {:?} zone '{}' moved {:.2}km @ {:.0}°", kind, cfg.name, dist, bearing);
        Self {
            name: cfg.name.clone(),
            kind,
            original,
            decoy,
            radius_km: cfg.radius_km,
            displacement_km: dist,
            bearing_deg: bearing,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> ZoneKind { self.kind }
    pub fn original(&self) -> GeoPoint { self.original }
    pub fn decoy(&self) -> GeoPoint { self.decoy }
    pub fn radius_km(&self) -> f64 { self.radius_km }
    pub fn displacement_km(&self) -> f64 { self.displacement_km }
    pub fn bearing_deg(&self) -> f64 { self.bearing_deg }
}

/// Registered zones in registration order. No merging, no dedup: two zones
/// sharing an original are both kept and the first one wins exact matches.
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Vec<SensitiveZone>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, zone: SensitiveZone) {
        self.zones.push(zone);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SensitiveZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn into_vec(self) -> Vec<SensitiveZone> {
        self.zones
    }
}

impl<'a> IntoIterator for &'a ZoneSet {
    type Item = &'a SensitiveZone;
    type IntoIter = std::slice::Iter<'a, SensitiveZone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}
