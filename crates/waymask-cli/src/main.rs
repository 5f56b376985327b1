use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use waymask_geo::{distance_km, initial_bearing_deg};
use waymask_io::{default_output_path, deploy_copy, digest_hex, load_document, load_zone_list, write_atomic};
use waymask_zones::{doctor as zones_doctor, Obfuscator, SensitiveZone, ZoneConfig};

const DEFAULT_ZONES_PATH: &str = "personal_data/sensitive_waypoints.json";
const DEFAULT_SUFFIX: &str = "_obfuscated";

#[derive(Debug, Parser)]
#[command(name = "waymask", version, about = "waymask - move sensitive GPX locations to seeded decoys before publishing")]
struct Cli {
    /// Optional settings file (TOML).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate settings and the zone list.
    Doctor {
        #[arg(short = 'j', long = "json")]
        zones: Option<String>,
    },
    /// Obfuscate a GPX or JSON route document.
    Run {
        input: String,
        /// Output path. Default: <input stem><suffix>.<ext>
        #[arg(short, long)]
        output: Option<String>,
        /// Zone list (.json array or .toml with [[zones]]).
        #[arg(short = 'j', long = "json")]
        zones: Option<String>,
        /// Existing directory to copy the output into.
        #[arg(long)]
        deploy_dir: Option<String>,
    },
    /// Print the zones a run would register.
    Zones {
        #[arg(short = 'j', long = "json")]
        zones: Option<String>,
        /// Resolve named zones against this document's waypoints.
        #[arg(long)]
        input: Option<String>,
    },
}

#[derive(Debug, Default, serde::Deserialize)]
struct Config {
    #[serde(default)]
    zones: ZonesCfg,
    #[serde(default)]
    output: OutputCfg,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ZonesCfg {
    path: Option<String>,
    /// Appended after the entries loaded from `path`.
    #[serde(default)]
    list: Vec<ZoneConfig>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct OutputCfg {
    suffix: Option<String>,
    deploy_dir: Option<String>,
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let Some(path) = path else { return Ok(Config::default()); };
    let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
    toml::from_str(&s).context("parse config toml")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Doctor { zones } => doctor(&cfg, zones.as_deref()).await?,
        Command::Run { input, output, zones, deploy_dir } => {
            run(&cfg, &input, output.as_deref(), zones.as_deref(), deploy_dir.as_deref()).await?
        }
        Command::Zones { zones, input } => zones_cmd(&cfg, zones.as_deref(), input.as_deref()).await?,
    }
    Ok(())
}

async fn resolve_zones(cfg: &Config, flag: Option<&str>) -> Result<Vec<ZoneConfig>> {
    let path = flag.or(cfg.zones.path.as_deref());
    let mut zones = match path {
        Some(p) => load_zone_list(Path::new(p)).await?,
        // Inline-only settings need no zone file.
        None if !cfg.zones.list.is_empty() => Vec::new(),
        None => load_zone_list(Path::new(DEFAULT_ZONES_PATH)).await
            .with_context(|| format!("no zone list given and default {} unusable", DEFAULT_ZONES_PATH))?,
    };
    zones.extend(cfg.zones.list.iter().cloned());
    Ok(zones)
}

fn check_deploy_dir(dir: &str) -> Result<()> {
    let p = Path::new(dir);
    anyhow::ensure!(p.is_dir(), "deploy path not found or not a directory: {}", dir);
    Ok(())
}

/// The output path never names the input file, whether given explicitly or
/// derived from the suffix.
fn resolve_output_path(cfg: &Config, input: &Path, output: Option<&str>) -> Result<PathBuf> {
    let out = match output {
        Some(o) => PathBuf::from(o),
        None => {
            let suffix = cfg.output.suffix.as_deref().unwrap_or(DEFAULT_SUFFIX);
            anyhow::ensure!(!suffix.is_empty(), "output.suffix must not be empty (would overwrite the input)");
            default_output_path(input, suffix)
        }
    };
    anyhow::ensure!(
        !same_location(input, &out),
        "output {} is the input file; refusing to overwrite it", out.display()
    );
    Ok(out)
}

fn same_location(a: &Path, b: &Path) -> bool {
    // The output may not exist yet, so resolve its directory instead.
    let resolve = |p: &Path| {
        std::fs::canonicalize(p).ok().or_else(|| {
            let dir = match p.parent() {
                Some(d) if !d.as_os_str().is_empty() => d,
                _ => Path::new("."),
            };
            Some(std::fs::canonicalize(dir).ok()?.join(p.file_name()?))
        })
    };
    match (resolve(a), resolve(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

async fn doctor(cfg: &Config, zones_flag: Option<&str>) -> Result<()> {
    info!("doctor: starting");

    let zones = resolve_zones(cfg, zones_flag).await?;
    zones_doctor::check_zone_list(&zones)?;
    info!("doctor: {} zones ({} ghost)", zones.len(), zones.iter().filter(|z| z.is_ghost()).count());

    if let Some(suffix) = &cfg.output.suffix {
        anyhow::ensure!(!suffix.is_empty(), "output.suffix must not be empty (would overwrite the input)");
    }
    if let Some(dir) = &cfg.output.deploy_dir {
        check_deploy_dir(dir)?;
    }

    info!("doctor: OK");
    Ok(())
}

async fn run(
    cfg: &Config,
    input: &str,
    output: Option<&str>,
    zones_flag: Option<&str>,
    deploy_flag: Option<&str>,
) -> Result<()> {
    info!("run: reading {}", input);

    let zones = resolve_zones(cfg, zones_flag).await?;
    let obfuscator = Obfuscator::new(zones).context("zone list")?;

    let deploy_dir = deploy_flag.or(cfg.output.deploy_dir.as_deref());
    if let Some(dir) = deploy_dir {
        check_deploy_dir(dir)?;
    }

    let input_path = PathBuf::from(input);
    let output_path = resolve_output_path(cfg, &input_path, output)?;

    let mut loaded = load_document(&input_path).await.with_context(|| format!("load {}", input))?;
    let report = obfuscator.run(&mut loaded.doc)?;
    let bytes = loaded.encode()?;
    write_atomic(&output_path, &bytes).await?;

    info!("run: complete");
    info!("run:   waypoints moved: {}", report.waypoints_moved);
    info!("run:   track points moved: {}", report.track_points_moved);
    info!("run:   track points deleted: {}", report.track_points_deleted);
    info!("run:   saved to {} (blake3 {})", output_path.display(), digest_hex(&bytes));

    if let Some(dir) = deploy_dir {
        if let Err(e) = deploy_copy(&output_path, Path::new(dir)).await {
            error!("run: deploy copy failed: {:#}", e);
            return Err(e.into());
        }
    }
    Ok(())
}

async fn zones_cmd(cfg: &Config, zones_flag: Option<&str>, input: Option<&str>) -> Result<()> {
    let zones = resolve_zones(cfg, zones_flag).await?;
    let obfuscator = Obfuscator::new(zones).context("zone list")?;

    match input {
        Some(path) => {
            let loaded = load_document(Path::new(path)).await.with_context(|| format!("load {}", path))?;
            let plan = obfuscator.plan(&loaded.doc)?;
            for z in &plan.zones {
                print_zone(z);
            }
            for name in plan.unmatched {
                println!("unmatched name={}", name);
            }
        }
        None => {
            for z in obfuscator.ghost_zones().iter() {
                print_zone(z);
            }
            for c in obfuscator.configs().iter().filter(|c| !c.is_ghost()) {
                println!("named name={} seed={} radius_km={} (resolved against waypoints at run time)", c.name, c.seed, c.radius_km);
            }
        }
    }
    Ok(())
}

fn print_zone(z: &SensitiveZone) {
    println!("{}", zone_line(z));
}

/// Distance and bearing are measured from original to decoy.
fn zone_line(z: &SensitiveZone) -> String {
    format!(
        "{:?} name={} original={} decoy={} radius_km={} moved_km={:.3} bearing={:.1}",
        z.kind(), z.name(), z.original(), z.decoy(), z.radius_km(),
        distance_km(z.original(), z.decoy()), initial_bearing_deg(z.original(), z.decoy()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_with_inline_zones() {
        let cfg: Config = toml::from_str(r#"
            [zones]
            path = "personal_data/sensitive_waypoints.json"

            [[zones.list]]
            name = "Lookout"
            seed = 5
            radius = 1.5
            lat = 45.2
            lon = -121.7

            [output]
            suffix = "_public"
        "#).unwrap();
        assert_eq!(cfg.zones.list.len(), 1);
        assert!(cfg.zones.list[0].is_ghost());
        assert_eq!(cfg.output.suffix.as_deref(), Some("_public"));
        assert!(cfg.output.deploy_dir.is_none());
    }

    #[test]
    fn empty_settings_are_valid() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.zones.path.is_none());
        assert!(cfg.zones.list.is_empty());
    }

    #[tokio::test]
    async fn inline_zones_need_no_file() {
        let cfg = Config {
            zones: ZonesCfg { path: None, list: vec![ZoneConfig::named("Home", 103, 8.0)] },
            output: OutputCfg::default(),
        };
        let zones = resolve_zones(&cfg, None).await.unwrap();
        assert_eq!(zones, vec![ZoneConfig::named("Home", 103, 8.0)]);
    }

    #[test]
    fn zone_line_reports_measured_displacement() {
        let ob = Obfuscator::new(vec![ZoneConfig::ghost("Lookout", 5, 1.5, 45.2, -121.7)]).unwrap();
        let zones = ob.ghost_zones();
        let z = zones.iter().next().unwrap();
        let line = zone_line(z);
        assert!(line.starts_with("Ghost name=Lookout "));
        let bearing = initial_bearing_deg(z.original(), z.decoy());
        assert!(line.ends_with(&format!("bearing={:.1}", bearing)));
        assert!(line.contains(&format!("moved_km={:.3}", distance_km(z.original(), z.decoy()))));
    }

    fn with_suffix(suffix: &str) -> Config {
        Config {
            output: OutputCfg { suffix: Some(suffix.into()), deploy_dir: None },
            ..Config::default()
        }
    }

    #[test]
    fn output_defaults_to_suffixed_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trip.gpx");
        std::fs::write(&input, "<gpx/>").unwrap();
        let out = resolve_output_path(&Config::default(), &input, None).unwrap();
        assert_eq!(out, dir.path().join("trip_obfuscated.gpx"));
    }

    #[test]
    fn empty_suffix_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trip.gpx");
        std::fs::write(&input, "<gpx/>").unwrap();
        assert!(resolve_output_path(&with_suffix(""), &input, None).is_err());
        assert_eq!(std::fs::read_to_string(&input).unwrap(), "<gpx/>");
    }

    #[test]
    fn explicit_output_equal_to_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trip.gpx");
        std::fs::write(&input, "<gpx/>").unwrap();
        let same = input.to_string_lossy().into_owned();
        assert!(resolve_output_path(&Config::default(), &input, Some(&same)).is_err());

        // Same file reached through a different spelling.
        let dotted = dir.path().join(".").join("trip.gpx").to_string_lossy().into_owned();
        assert!(resolve_output_path(&Config::default(), &input, Some(&dotted)).is_err());

        let other = dir.path().join("public.gpx").to_string_lossy().into_owned();
        assert_eq!(resolve_output_path(&Config::default(), &input, Some(&other)).unwrap(), dir.path().join("public.gpx"));
    }
}
