use serde::Serialize;
use tracing::{info, warn};
use waymask_geo::GeoPoint;
use waymask_proto::RouteDocument;

use crate::config::{validate_all, ZoneConfig, ZoneRule};
use crate::error::{ObfuscateError, Result};
use crate::relocate::{named_lookup, relocate_waypoints};
use crate::scrub::scrub_tracks;
use crate::zone::{SensitiveZone, ZoneSet};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObfuscationReport {
    pub zones: Vec<SensitiveZone>,
    pub waypoints_moved: usize,
    pub track_points_moved: usize,
    pub track_points_deleted: usize,
    /// Named configs that matched no waypoint.
    pub unmatched: Vec<String>,
}

/// Zones a run would register, without touching the document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ZonePlan {
    pub zones: Vec<SensitiveZone>,
    pub unmatched: Vec<String>,
}

/// A validated zone list, reusable across documents.
#[derive(Debug, Clone)]
pub struct Obfuscator {
    configs: Vec<ZoneConfig>,
}

impl Obfuscator {
    pub fn new(configs: Vec<ZoneConfig>) -> Result<Self> {
        validate_all(&configs)?;
        Ok(Self { configs })
    }

    pub fn configs(&self) -> &[ZoneConfig] {
        &self.configs
    }

    /// Ghost zones, in config order.
    pub fn ghost_zones(&self) -> ZoneSet {
        let mut zones = ZoneSet::new();
        for cfg in &self.configs {
            if let Ok(ZoneRule::Ghost(original)) = cfg.rule() {
                zones.register(SensitiveZone::ghost(cfg, original));
            }
        }
        zones
    }

    pub fn plan(&self, doc: &RouteDocument) -> Result<ZonePlan> {
        validate_document(doc)?;
        let mut zones = self.ghost_zones();
        let mut waypoints = doc.waypoints.clone();
        let outcome = relocate_waypoints(&mut waypoints, &named_lookup(&self.configs), &mut zones);
        Ok(ZonePlan { zones: zones.into_vec(), unmatched: self.unmatched(&outcome.matched) })
    }

    /// Ghost zones, then waypoint relocation, then track scrubbing against
    /// the full zone set. The document is only touched once it validates.
    pub fn run(&self, doc: &mut RouteDocument) -> Result<ObfuscationReport> {
        validate_document(doc)?;

        let mut zones = self.ghost_zones();
        let outcome = relocate_waypoints(&mut doc.waypoints, &named_lookup(&self.configs), &mut zones);
        let unmatched = self.unmatched(&outcome.matched);
        for name in &unmatched {
            warn!("obfuscate: zone '{}' matched no waypoint; skipped", name);
        }

        let stats = scrub_tracks(&mut doc.tracks, &zones);
        info!("obfuscate: {} zones, {} waypoints moved, {} track points moved, {} deleted",
              zones.len(), outcome.moved, stats.moved, stats.deleted);

        Ok(ObfuscationReport {
            zones: zones.into_vec(),
            waypoints_moved: outcome.moved,
            track_points_moved: stats.moved,
            track_points_deleted: stats.deleted,
            unmatched,
        })
    }

    fn unmatched(&self, matched: &std::collections::BTreeSet<String>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for cfg in self.configs.iter().filter(|c| !c.is_ghost()) {
            if !matched.contains(&cfg.name) && !out.contains(&cfg.name) {
                out.push(cfg.name.clone());
            }
        }
        out
    }
}

/// Validates `configs`, then obfuscates `doc` in place.
pub fn obfuscate(doc: &mut RouteDocument, configs: &[ZoneConfig]) -> Result<ObfuscationReport> {
    Obfuscator::new(configs.to_vec())?.run(doc)
}

/// Every coordinate must be finite and inside the degree ranges.
pub fn validate_document(doc: &RouteDocument) -> Result<()> {
    for (i, w) in doc.waypoints.iter().enumerate() {
        check_point(w.position(), || format!("waypoint #{} ({})", i, w.name.as_deref().unwrap_or("unnamed")))?;
    }
    for (t, track) in doc.tracks.iter().enumerate() {
        for (s, seg) in track.segments.iter().enumerate() {
            for (i, p) in seg.points.iter().enumerate() {
                check_point(p.position(), || format!("track {} segment {} point {}", t, s, i))?;
            }
        }
    }
    Ok(())
}

fn check_point(p: GeoPoint, what: impl FnOnce() -> String) -> Result<()> {
    if p.is_valid() {
        Ok(())
    } else {
        Err(ObfuscateError::Parse(format!("{} has invalid coordinate {}", what(), p)))
    }
}
