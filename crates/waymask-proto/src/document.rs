use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use waymask_geo::GeoPoint;

/// In-memory route document: named waypoints plus recorded tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDocument {
    #[serde(default)]
    pub waypoints: Vec<NamedPoint>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    // Unknown keys are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Index of this point in the decoded source, for encoders that carry
    /// format-specific elements through.
    #[serde(skip)]
    pub source_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Index within the source segment.
    #[serde(skip)]
    pub source_index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    #[serde(default)]
    pub points: Vec<PathPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub segments: Vec<PathSegment>,
}

impl NamedPoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: Some(name.into()),
            lat, lon,
            time: None, elevation: None, comment: None, description: None, symbol: None,
            extra: Map::new(),
            source_index: None,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint { lat: self.lat, lon: self.lon }
    }

    pub fn set_position(&mut self, p: GeoPoint) {
        self.lat = p.lat;
        self.lon = p.lon;
    }
}

impl PathPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, time: None, elevation: None, name: None, extra: Map::new(), source_index: None }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint { lat: self.lat, lon: self.lon }
    }

    pub fn set_position(&mut self, p: GeoPoint) {
        self.lat = p.lat;
        self.lon = p.lon;
    }
}

impl PathSegment {
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self { points }
    }
}

impl RouteDocument {
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.tracks.iter().flat_map(|t| t.segments.iter())
    }

    pub fn track_point_count(&self) -> usize {
        self.segments().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_unknown_keys() {
        let raw = r#"{
            "waypoints": [{"name": "Camp", "lat": 45.0, "lon": -122.0, "link": "https://example.org"}],
            "tracks": [{"segments": [{"points": [{"lat": 45.1, "lon": -122.1, "time": "2024-06-01T10:00:00Z", "hr": 131}]}]}]
        }"#;
        let doc: RouteDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.waypoints[0].extra["link"], "https://example.org");
        let pt = &doc.tracks[0].segments[0].points[0];
        assert_eq!(pt.extra["hr"], 131);
        assert_eq!(pt.time.as_deref(), Some("2024-06-01T10:00:00Z"));

        let back: RouteDocument = serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: RouteDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.waypoints.is_empty());
        assert_eq!(doc.track_point_count(), 0);
    }
}
