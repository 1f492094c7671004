use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use vm_contour::{ApproxMode, Contour, RetrievalMode};
use vm_core::{Image, Point2d};
use vm_pheno_cli::{
    PhenoConfig, Rotation, ensure_file_exists, load_config, load_mask, mask_properties, run_batch,
    subject,
};
use vm_shape::{
    CenterRule, Outline, ProfileDistance, PropertySelection, RadialConfig, RadialProfile,
    RadialStats, RegionProperties, compare_profiles, orientation_normalized_profile, outline,
    radial_profile_with,
};

#[derive(Parser, Debug)]
#[command(name = "vm_pheno")]
#[command(about = "Extract shape descriptors from silhouette mask images")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Region properties of the largest contour
    #[command(name = "props")]
    Props(PropsArgs),
    /// Widths along and across the dominant axis
    #[command(name = "outline")]
    Outline(OutlineArgs),
    /// Per-degree radial statistics
    #[command(name = "radial")]
    Radial(RadialArgs),
    /// Radial comparison of each input against a reference silhouette
    #[command(name = "compare")]
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Mask images; gray values above the threshold are foreground
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// JSON file with default settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    threshold: Option<u8>,
    #[arg(long, value_enum)]
    retrieval: Option<RetrievalArg>,
    #[arg(long, value_enum)]
    approx: Option<ApproxArg>,
    /// Skip images whose width or height is smaller
    #[arg(long)]
    min_dim: Option<u32>,
    /// Downscale images whose longer side exceeds this
    #[arg(long)]
    max_dim: Option<u32>,
    /// Output JSON path (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct PropsArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Comma-separated property names, or `all`
    #[arg(long)]
    properties: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct OutlineArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    k: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct RadialArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    rays: RayArgs,
}

#[derive(Args, Debug, Clone)]
struct CompareArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    rays: RayArgs,
    #[arg(long, required = true)]
    reference: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct RayArgs {
    #[arg(long, value_enum)]
    center: Option<CenterArg>,
    /// `auto` for the contour's own orientation, or a fixed offset in degrees
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<Rotation>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum RetrievalArg {
    External,
    All,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ApproxArg {
    Full,
    Simple,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum CenterArg {
    Centroid,
    Bbox,
}

#[derive(Debug, Clone, Serialize)]
struct PropsResult {
    properties: RegionProperties,
}

#[derive(Debug, Clone, Serialize)]
struct OutlineResult {
    outline: Outline,
}

#[derive(Debug, Clone, Serialize)]
struct RadialResult {
    center: Point2d,
    rotation_deg: f64,
    stats: RadialStats,
}

#[derive(Debug, Clone, Serialize)]
struct CompareResult {
    reference: String,
    distance: ProfileDistance,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Props(args) => run_props(args),
        Command::Outline(args) => run_outline(args),
        Command::Radial(args) => run_radial(args),
        Command::Compare(args) => run_compare(args),
    }
}

fn run_props(args: PropsArgs) -> Result<()> {
    let mut cfg = resolve_config(&args.common)?;
    if let Some(p) = args.properties {
        cfg.properties = p;
    }
    let selection: PropertySelection = cfg
        .properties
        .parse()
        .with_context(|| format!("parsing property list `{}`", cfg.properties))?;

    batch(&args.common, &cfg, |mask, contour| {
        let properties = mask_properties(mask, contour, &selection)?;
        Ok(PropsResult { properties })
    })
}

fn run_outline(args: OutlineArgs) -> Result<()> {
    let mut cfg = resolve_config(&args.common)?;
    if let Some(k) = args.k {
        cfg.k = k;
    }
    if cfg.k == 0 {
        bail!("k must be at least 1");
    }

    batch(&args.common, &cfg, |_, contour| {
        let outline = outline(contour, cfg.k).context("sampling outline")?;
        Ok(OutlineResult { outline })
    })
}

fn run_radial(args: RadialArgs) -> Result<()> {
    let mut cfg = resolve_config(&args.common)?;
    apply_ray_args(&mut cfg, &args.rays);

    batch(&args.common, &cfg, |_, contour| {
        let profile = profile_of(contour, &cfg)?;
        Ok(RadialResult {
            center: profile.center,
            rotation_deg: profile.rotation_deg,
            stats: RadialStats::from_profile(&profile),
        })
    })
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let mut cfg = resolve_config(&args.common)?;
    apply_ray_args(&mut cfg, &args.rays);

    let reference_name = args.reference.display().to_string();
    ensure_file_exists(&args.reference, "reference")?;
    let Some(mask) = load_mask(&args.reference, &cfg)? else {
        bail!("reference {reference_name} is below min_dim {}", cfg.min_dim);
    };
    let contour = subject(&mask, &cfg)
        .with_context(|| format!("tracing reference {reference_name}"))?;
    let reference = profile_of(&contour, &cfg)
        .with_context(|| format!("profiling reference {reference_name}"))?;
    info!(
        "reference {reference_name}: {} contour points, rotation {:.2} deg",
        contour.len(),
        reference.rotation_deg
    );

    batch(&args.common, &cfg, |_, contour| {
        let profile = profile_of(contour, &cfg)?;
        let distance = compare_profiles(&profile, &reference)?;
        Ok(CompareResult {
            reference: reference_name.clone(),
            distance,
        })
    })
}

/// Runs the batch over the inputs and writes the report to `--out` or stdout.
fn batch<T, F>(common: &CommonArgs, cfg: &PhenoConfig, f: F) -> Result<()>
where
    T: Serialize + Send,
    F: Fn(&Image<u8>, &Contour) -> Result<T> + Sync,
{
    let report = run_batch(&common.inputs, cfg, f);
    match &common.out {
        Some(path) => write_json(path, &report),
        None => {
            let json = serde_json::to_string_pretty(&report).context("serializing json")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn profile_of(contour: &Contour, cfg: &PhenoConfig) -> Result<RadialProfile> {
    let rays = RadialConfig { center: cfg.center };
    let profile = match cfg.rotation {
        Rotation::Auto => orientation_normalized_profile(contour, &rays),
        Rotation::Degrees(deg) => radial_profile_with(contour, deg, &rays),
    };
    profile.context("building radial profile")
}

fn resolve_config(common: &CommonArgs) -> Result<PhenoConfig> {
    let mut cfg = match &common.config {
        Some(path) => load_config(path)?,
        None => PhenoConfig::default(),
    };

    if let Some(t) = common.threshold {
        cfg.threshold = t;
    }
    if let Some(r) = common.retrieval {
        cfg.retrieval = match r {
            RetrievalArg::External => RetrievalMode::External,
            RetrievalArg::All => RetrievalMode::All,
        };
    }
    if let Some(a) = common.approx {
        cfg.approx = match a {
            ApproxArg::Full => ApproxMode::Full,
            ApproxArg::Simple => ApproxMode::Simple,
        };
    }
    if let Some(d) = common.min_dim {
        cfg.min_dim = d;
    }
    if common.max_dim.is_some() {
        cfg.max_dim = common.max_dim;
    }

    Ok(cfg)
}

fn apply_ray_args(cfg: &mut PhenoConfig, rays: &RayArgs) {
    if let Some(c) = rays.center {
        cfg.center = match c {
            CenterArg::Centroid => CenterRule::Centroid,
            CenterArg::Bbox => CenterRule::BoundingBoxCenter,
        };
    }
    if let Some(r) = rays.rotation {
        cfg.rotation = r;
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}
