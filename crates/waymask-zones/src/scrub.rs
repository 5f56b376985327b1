use waymask_geo::{distance_km, GeoPoint};
use waymask_proto::{PathSegment, Track};

use crate::zone::ZoneSet;

/// Sub-meter tolerance identifying the recorded visit to a zone's original.
pub const EXACT_MATCH_KM: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Keep,
    Relocate(GeoPoint),
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrubStats {
    pub moved: usize,
    pub deleted: usize,
}

impl std::ops::AddAssign for ScrubStats {
    fn add_assign(&mut self, rhs: Self) {
        self.moved += rhs.moved;
        self.deleted += rhs.deleted;
    }
}

/// Scans every zone in registration order. The first exact match wins and
/// stops the scan; a point inside any radius is dropped unless a later zone
/// matches it exactly.
pub fn classify(zones: &ZoneSet, p: GeoPoint) -> Verdict {
    let mut delete_candidate = false;
    for zone in zones {
        let d = distance_km(p, zone.original());
        if d < EXACT_MATCH_KM {
            return Verdict::Relocate(zone.decoy());
        }
        if d <= zone.radius_km() {
            delete_candidate = true;
        }
    }
    if delete_candidate { Verdict::Drop } else { Verdict::Keep }
}

/// Rebuilds the segment from kept points in their original order. An emptied
/// segment stays in place.
pub fn scrub_segment(seg: &mut PathSegment, zones: &ZoneSet) -> ScrubStats {
    let mut stats = ScrubStats::default();
    if zones.is_empty() { return stats; }

    let points = std::mem::take(&mut seg.points);
    seg.points = points.into_iter()
        .filter_map(|mut pt| match classify(zones, pt.position()) {
            Verdict::Keep => Some(pt),
            Verdict::Relocate(decoy) => {
                pt.set_position(decoy);
                stats.moved += 1;
                Some(pt)
            }
            Verdict::Drop => {
                stats.deleted += 1;
                None
            }
        })
        .collect();
    stats
}

pub fn scrub_tracks(tracks: &mut [Track], zones: &ZoneSet) -> ScrubStats {
    let mut total = ScrubStats::default();
    for seg in tracks.iter_mut().flat_map(|t| t.segments.iter_mut()) {
        total += scrub_segment(seg, zones);
    }
    total
}
