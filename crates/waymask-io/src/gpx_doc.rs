use geo_types::Point;
use gpx::{Gpx, GpxVersion, Time, TrackSegment, Waypoint};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::warn;
use waymask_proto::{NamedPoint, PathPoint, PathSegment, RouteDocument, Track};
use waymask_zones::{ObfuscateError, Result};

// The model maps name, time, elevation and the text fields. Every other
// per-point element (links, type, fix, sat, dop) is copied from the source
// point named by `source_index`.

pub fn from_gpx(g: &Gpx) -> Result<RouteDocument> {
    let waypoints = g.waypoints.iter().enumerate()
        .map(|(i, w)| {
            let p = w.point();
            Ok(NamedPoint {
                name: w.name.clone(),
                lat: p.y(),
                lon: p.x(),
                time: time_to_string(w.time.as_ref())?,
                elevation: w.elevation,
                comment: w.comment.clone(),
                description: w.description.clone(),
                symbol: w.symbol.clone(),
                extra: Default::default(),
                source_index: Some(i),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tracks = Vec::with_capacity(g.tracks.len());
    for t in &g.tracks {
        let mut segments = Vec::with_capacity(t.segments.len());
        for s in &t.segments {
            let points = s.points.iter().enumerate()
                .map(|(i, w)| {
                    let p = w.point();
                    Ok(PathPoint {
                        lat: p.y(),
                        lon: p.x(),
                        time: time_to_string(w.time.as_ref())?,
                        elevation: w.elevation,
                        name: w.name.clone(),
                        extra: Default::default(),
                        source_index: Some(i),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            segments.push(PathSegment { points });
        }
        tracks.push(Track { name: t.name.clone(), segments });
    }

    if !g.routes.is_empty() {
        warn!("gpx: {} route(s) are carried through unchanged; route points are not scrubbed", g.routes.len());
    }

    Ok(RouteDocument { waypoints, tracks })
}

/// Rebuilds waypoints and track segments from `doc` inside a copy of the
/// source GPX, keeping its metadata, routes and track attributes.
pub fn to_gpx(doc: &RouteDocument, envelope: &Gpx) -> Result<Gpx> {
    let mut out = envelope.clone();
    out.version = GpxVersion::Gpx11;
    if out.creator.is_none() {
        out.creator = Some("waymask".into());
    }

    out.waypoints = doc.waypoints.iter()
        .map(|n| {
            let src = n.source_index.and_then(|i| envelope.waypoints.get(i));
            let mut w = carry_over(src, n.lon, n.lat);
            w.name = n.name.clone();
            w.time = string_to_time(n.time.as_deref())?;
            w.elevation = n.elevation;
            w.comment = n.comment.clone();
            w.description = n.description.clone();
            w.symbol = n.symbol.clone();
            Ok(w)
        })
        .collect::<Result<Vec<_>>>()?;

    out.tracks = doc.tracks.iter().enumerate()
        .map(|(i, t)| {
            let src_trk = envelope.tracks.get(i);
            let mut trk = src_trk.cloned().unwrap_or_default();
            trk.name = t.name.clone();
            trk.segments = t.segments.iter().enumerate()
                .map(|(j, s)| {
                    let src_seg = src_trk.and_then(|st| st.segments.get(j));
                    let mut seg = TrackSegment::new();
                    seg.points = s.points.iter()
                        .map(|p| {
                            let src = p.source_index.zip(src_seg).and_then(|(k, ss)| ss.points.get(k));
                            let mut w = carry_over(src, p.lon, p.lat);
                            w.time = string_to_time(p.time.as_deref())?;
                            w.elevation = p.elevation;
                            w.name = p.name.clone();
                            Ok(w)
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(seg)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(trk)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(out)
}

/// Builds a point at `lon`/`lat` carrying every element of `src`.
/// `gpx::Waypoint` has no position setter, so the fields are copied one by one.
fn carry_over(src: Option<&Waypoint>, lon: f64, lat: f64) -> Waypoint {
    let mut w = Waypoint::new(Point::new(lon, lat));
    let Some(src) = src else { return w; };
    w.elevation = src.elevation;
    w.speed = src.speed;
    w.time = src.time;
    w.geoidheight = src.geoidheight;
    w.name = src.name.clone();
    w.comment = src.comment.clone();
    w.description = src.description.clone();
    w.source = src.source.clone();
    w.links = src.links.clone();
    w.symbol = src.symbol.clone();
    w.type_ = src.type_.clone();
    w.fix = src.fix.clone();
    w.sat = src.sat;
    w.hdop = src.hdop;
    w.vdop = src.vdop;
    w.pdop = src.pdop;
    w.dgps_age = src.dgps_age;
    w.dgpsid = src.dgpsid;
    w
}

fn time_to_string(t: Option<&Time>) -> Result<Option<String>> {
    t.map(|t| t.format().map_err(|e| ObfuscateError::Parse(format!("gpx time: {}", e))))
        .transpose()
}

fn string_to_time(s: Option<&str>) -> Result<Option<Time>> {
    s.map(|s| {
        OffsetDateTime::parse(s, &Rfc3339)
            .map(Time::from)
            .map_err(|e| ObfuscateError::Parse(format!("timestamp '{}': {}", s, e)))
    })
    .transpose()
}
