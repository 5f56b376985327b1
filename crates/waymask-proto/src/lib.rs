pub mod document;

pub use document::{NamedPoint, PathPoint, PathSegment, RouteDocument, Track};
