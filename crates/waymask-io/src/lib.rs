pub mod gpx_doc;
pub mod store;
pub mod zones_file;

use std::path::Path;

use tracing::debug;
use waymask_proto::RouteDocument;
use waymask_zones::{ObfuscateError, Result};

pub use store::{default_output_path, deploy_copy, digest_hex, write_atomic};
pub use zones_file::load_zone_list;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Gpx,
    Json,
}

impl DocFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("gpx") => Ok(Self::Gpx),
            Some("json") => Ok(Self::Json),
            _ => Err(ObfuscateError::Parse(format!(
                "unsupported document format: {} (expected .gpx or .json)", path.display()
            ))),
        }
    }
}

/// A parsed document plus whatever the source format needs to write it back.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub doc: RouteDocument,
    envelope: Envelope,
}

#[derive(Debug, Clone)]
enum Envelope {
    Gpx(Box<gpx::Gpx>),
    Json,
}

impl LoadedDocument {
    pub fn decode(bytes: &[u8], format: DocFormat) -> Result<Self> {
        match format {
            DocFormat::Gpx => {
                let raw = gpx::read(bytes).map_err(|e| ObfuscateError::Parse(format!("gpx: {}", e)))?;
                let doc = gpx_doc::from_gpx(&raw)?;
                Ok(Self { doc, envelope: Envelope::Gpx(Box::new(raw)) })
            }
            DocFormat::Json => {
                let doc = serde_json::from_slice(bytes).map_err(|e| ObfuscateError::Parse(format!("json: {}", e)))?;
                Ok(Self { doc, envelope: Envelope::Json })
            }
        }
    }

    pub fn format(&self) -> DocFormat {
        match self.envelope {
            Envelope::Gpx(_) => DocFormat::Gpx,
            Envelope::Json => DocFormat::Json,
        }
    }

    /// Serializes the (possibly mutated) document in its source format.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match &self.envelope {
            Envelope::Gpx(env) => {
                let out = gpx_doc::to_gpx(&self.doc, env)?;
                let mut buf = Vec::new();
                gpx::write(&out, &mut buf).map_err(|e| ObfuscateError::Parse(format!("gpx encode: {}", e)))?;
                Ok(buf)
            }
            Envelope::Json => {
                let mut buf = serde_json::to_vec_pretty(&self.doc)
                    .map_err(|e| ObfuscateError::Parse(format!("json encode: {}", e)))?;
                buf.push(b'\n');
                Ok(buf)
            }
        }
    }
}

pub async fn load_document(path: &Path) -> Result<LoadedDocument> {
    let format = DocFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await?;
    debug!("io: read {} bytes from {}", bytes.len(), path.display());
    LoadedDocument::decode(&bytes, format)
}
