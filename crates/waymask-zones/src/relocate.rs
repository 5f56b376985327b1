use std::collections::{BTreeSet, HashMap};

use tracing::debug;
use waymask_proto::NamedPoint;

use crate::config::ZoneConfig;
use crate::zone::{SensitiveZone, ZoneSet};

#[derive(Debug, Clone, Default)]
pub struct RelocationOutcome {
    pub moved: usize,
    /// Config names that matched at least one waypoint.
    pub matched: BTreeSet<String>,
}

/// Name lookup over the named (non-ghost) configs. A later entry with the
/// same name replaces an earlier one.
pub fn named_lookup(configs: &[ZoneConfig]) -> HashMap<&str, &ZoneConfig> {
    configs.iter()
        .filter(|c| !c.is_ghost())
        .map(|c| (c.name.as_str(), c))
        .collect()
}

/// Walks waypoints in document order, moving every match onto its decoy and
/// registering the zone under the waypoint's original coordinate.
///
/// The zone is built at the moment its waypoint is visited; repeated names
/// get one zone per occurrence.
pub fn relocate_waypoints(
    waypoints: &mut [NamedPoint],
    lookup: &HashMap<&str, &ZoneConfig>,
    zones: &mut ZoneSet,
) -> RelocationOutcome {
    let mut out = RelocationOutcome::default();

    for wpt in waypoints.iter_mut() {
        let Some(name) = wpt.name.as_deref() else { continue; };
        let Some(cfg) = lookup.get(name) else { continue; };

        let original = wpt.position();
        let zone = SensitiveZone::named(cfg, original);
        debug!("relocate: '{}' {} -> {}", name, original, zone.decoy());
        wpt.set_position(zone.decoy());

        out.matched.insert(cfg.name.clone());
        out.moved += 1;
        zones.register(zone);
    }

    out
}
