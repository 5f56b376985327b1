use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, warn};
use waymask_zones::{ObfuscateError, Result};

/// `<stem><suffix>.<ext>` next to `input`.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(name)
}

/// blake3 of the output bytes, hex encoded.
pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Writes through a temp sibling and renames into place. On any failure the
/// temp file is removed and `path` is left as it was.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_sibling(path);
    let res = async {
        let mut f = fs::File::create(&tmp).await?;
        f.write_all(bytes).await?;
        f.sync_all().await?;
        drop(f);
        fs::rename(&tmp, path).await?;
        Ok::<(), std::io::Error>(())
    }.await;

    if let Err(e) = res {
        if let Err(rm) = fs::remove_file(&tmp).await {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!("store: could not remove temp file {}: {}", tmp.display(), rm);
            }
        }
        return Err(ObfuscateError::Write { path: path.display().to_string(), reason: e.to_string() });
    }
    info!("store: wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Copies `src` into the existing directory `dir`, keeping its file name.
pub async fn deploy_copy(src: &Path, dir: &Path) -> Result<PathBuf> {
    let meta = fs::metadata(dir).await
        .map_err(|e| ObfuscateError::Write { path: dir.display().to_string(), reason: format!("deploy dir: {}", e) })?;
    if !meta.is_dir() {
        return Err(ObfuscateError::Write { path: dir.display().to_string(), reason: "deploy path is not a directory".into() });
    }
    let name = src.file_name()
        .ok_or_else(|| ObfuscateError::Write { path: src.display().to_string(), reason: "no file name".into() })?;
    let dest = dir.join(name);
    fs::copy(src, &dest).await
        .map_err(|e| ObfuscateError::Write { path: dest.display().to_string(), reason: e.to_string() })?;
    info!("store: deployed {} -> {}", src.display(), dest.display());
    Ok(dest)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_keeps_extension() {
        let p = default_output_path(Path::new("data/trip.gpx"), "_obfuscated");
        assert_eq!(p, PathBuf::from("data/trip_obfuscated.gpx"));
        let p = default_output_path(Path::new("trip"), "_safe");
        assert_eq!(p, PathBuf::from("trip_safe"));
    }

    #[test]
    fn digest_is_stable() {
        assert_eq!(digest_hex(b"abc"), digest_hex(b"abc"));
        assert_ne!(digest_hex(b"abc"), digest_hex(b"abd"));
        assert_eq!(digest_hex(b"").len(), 64);
    }
}
