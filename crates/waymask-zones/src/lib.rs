pub mod config;
pub mod doctor;
pub mod error;
pub mod pipeline;
pub mod relocate;
pub mod rng;
pub mod scrub;
pub mod zone;

pub use config::{ZoneConfig, ZoneRule};
pub use error::{ObfuscateError, Result};
pub use pipeline::{obfuscate, validate_document, ObfuscationReport, Obfuscator, ZonePlan};
pub use rng::DecoyRng;
pub use scrub::{classify, ScrubStats, Verdict, EXACT_MATCH_KM};
pub use zone::{SensitiveZone, ZoneKind, ZoneSet};
