//! Example: shape descriptors of one silhouette image.
//!
//! Loads an image, thresholds it into a foreground mask, picks the largest
//! outer contour and reports its region properties, a width/height outline
//! and the per-degree radial statistics. With `--reference`, a second
//! silhouette is profiled the same way and the two are compared.
//!
//! Results are written to a JSON file next to the input image.
//!
//! Run from the workspace root:
//!   cargo run -p vision-pheno --example silhouette -- --help
//!   cargo run -p vision-pheno --example silhouette -- --input data/leaf.png

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use vision_pheno::{
    ApproxMode, Contour, Image, Outline, ProfileDistance, PropertySelection, RadialConfig,
    RadialStats, RegionProperties, RegionPropertyCalculator, RetrievalMode, compare_profiles,
    largest_in_mask, orientation_normalized_profile, outline,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Compute shape descriptors of the largest silhouette in an image")]
struct Args {
    /// Input image; pixels brighter than the threshold are foreground
    #[arg(long)]
    input: String,

    /// Optional second silhouette to compare against
    #[arg(long)]
    reference: Option<String>,

    #[arg(long, default_value_t = 127)]
    threshold: u8,

    /// Number of outline samples
    #[arg(long, default_value_t = 20)]
    k: usize,

    /// Output JSON path (default: <input stem>_shape.json next to input)
    #[arg(long)]
    out: Option<String>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report {
    contour_points: usize,
    properties: RegionProperties,
    outline: Outline,
    rotation_deg: f64,
    radial: RadialStats,
    comparison: Option<ProfileDistance>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_mask(path: &str, threshold: u8) -> Result<Image<u8>> {
    let gray = image::open(path)
        .with_context(|| format!("opening {path}"))?
        .into_luma8();
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let data = gray
        .into_raw()
        .into_iter()
        .map(|v| if v > threshold { 255 } else { 0 })
        .collect();
    Image::from_vec(w, h, data).context("building mask Image")
}

fn subject(mask: &Image<u8>) -> Result<Contour> {
    largest_in_mask(&mask.as_view(), RetrievalMode::External, ApproxMode::Full)
        .context("no foreground region in mask")
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let out_path = args.out.clone().unwrap_or_else(|| {
        let p = std::path::Path::new(&args.input);
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        let dir = p.parent().unwrap_or(std::path::Path::new("."));
        dir.join(format!("{stem}_shape.json"))
            .to_string_lossy()
            .into_owned()
    });

    let mask = load_mask(&args.input, args.threshold)?;
    let contour = subject(&mask)?;

    let properties = RegionPropertyCalculator::with_mask(mask.as_view())
        .compute_defined(&contour, &PropertySelection::All)
        .context("computing region properties")?;
    let outline = outline(&contour, args.k).context("sampling outline")?;

    let cfg = RadialConfig::default();
    let profile = orientation_normalized_profile(&contour, &cfg).context("radial profile")?;

    let comparison = match &args.reference {
        Some(path) => {
            let other = subject(&load_mask(path, args.threshold)?)?;
            let other = orientation_normalized_profile(&other, &cfg)
                .context("radial profile of reference")?;
            Some(compare_profiles(&profile, &other)?)
        }
        None => None,
    };

    let report = Report {
        contour_points: contour.len(),
        properties,
        outline,
        rotation_deg: profile.rotation_deg,
        radial: RadialStats::from_profile(&profile),
        comparison,
    };

    let json = serde_json::to_string_pretty(&report).context("serialising results")?;
    std::fs::write(&out_path, &json).with_context(|| format!("writing {out_path}"))?;

    println!(
        "{} contour points, rotation {:.2} deg",
        report.contour_points, report.rotation_deg
    );
    if let Some(d) = report.comparison {
        println!(
            "means mse {:.4}, std devs mse {:.4}",
            d.means_mse, d.std_devs_mse
        );
    }
    println!("Results written to {out_path}");

    Ok(())
}
