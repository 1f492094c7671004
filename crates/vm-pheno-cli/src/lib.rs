//! Configuration, mask loading and the batch runner behind the `vm_pheno`
//! binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::GrayImage;
use image::imageops::{self, FilterType};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use vm_contour::{ApproxMode, Contour, RetrievalMode, largest_in_mask};
use vm_core::Image;
use vm_shape::{CenterRule, PropertySelection, RegionProperties, RegionPropertyCalculator};

/// Ray rotation for radial profiles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// The contour's own major-axis orientation.
    #[default]
    Auto,
    Degrees(f64),
}

impl std::str::FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<f64>()
            .map(Self::Degrees)
            .map_err(|_| format!("expected `auto` or degrees, got `{s}`"))
    }
}

/// Settings read from `--config`; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhenoConfig {
    /// Gray values strictly above this are foreground.
    pub threshold: u8,
    pub retrieval: RetrievalMode,
    pub approx: ApproxMode,
    /// Images with a smaller width or height are skipped.
    pub min_dim: u32,
    /// Larger images are downscaled so the longer side equals this.
    pub max_dim: Option<u32>,
    pub k: usize,
    /// Comma-separated property names, or `all`.
    pub properties: String,
    pub center: CenterRule,
    pub rotation: Rotation,
}

impl Default for PhenoConfig {
    fn default() -> Self {
        Self {
            threshold: 127,
            retrieval: RetrievalMode::External,
            approx: ApproxMode::Full,
            min_dim: 0,
            max_dim: None,
            k: 20,
            properties: "all".to_owned(),
            center: CenterRule::Centroid,
            rotation: Rotation::Auto,
        }
    }
}

pub fn load_config(path: &Path) -> Result<PhenoConfig> {
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing config {}", path.display()))
}

/// Loads `path` as 8-bit gray and converts it with [`mask_from_gray`].
pub fn load_mask(path: &Path, cfg: &PhenoConfig) -> Result<Option<Image<u8>>> {
    let gray = image::open(path)
        .with_context(|| format!("opening input image {}", path.display()))?
        .to_luma8();
    mask_from_gray(gray, cfg)
        .with_context(|| format!("constructing mask from {}", path.display()))
}

/// Thresholds a gray image into a {0, 255} mask after the optional
/// nearest-neighbour downscale. `None` when the image is below `min_dim`.
pub fn mask_from_gray(gray: GrayImage, cfg: &PhenoConfig) -> Result<Option<Image<u8>>> {
    let (w, h) = gray.dimensions();
    if w < cfg.min_dim || h < cfg.min_dim {
        debug!("{w}x{h} image below min_dim {}", cfg.min_dim);
        return Ok(None);
    }

    let gray = match cfg.max_dim {
        Some(max_dim) if max_dim > 0 && w.max(h) > max_dim => {
            let scale = max_dim as f64 / w.max(h) as f64;
            let nw = ((w as f64 * scale).round() as u32).max(1);
            let nh = ((h as f64 * scale).round() as u32).max(1);
            debug!("downscaling {w}x{h} -> {nw}x{nh}");
            imageops::resize(&gray, nw, nh, FilterType::Nearest)
        }
        _ => gray,
    };

    let (w, h) = gray.dimensions();
    let data = gray
        .into_raw()
        .into_iter()
        .map(|v| if v > cfg.threshold { 255 } else { 0 })
        .collect();
    Ok(Some(Image::from_vec(w as usize, h as usize, data)?))
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport<T> {
    pub path: String,
    pub width: usize,
    pub height: usize,
    pub contour_points: usize,
    #[serde(flatten)]
    pub result: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<T> {
    pub processed: usize,
    pub skipped: usize,
    pub results: Vec<FileReport<T>>,
}

/// Traces every input in parallel and runs `f` on its largest contour.
/// Per-file failures and `min_dim` skips are logged and counted, and the
/// remaining reports keep input order.
pub fn run_batch<T, F>(inputs: &[PathBuf], cfg: &PhenoConfig, f: F) -> BatchReport<T>
where
    T: Send,
    F: Fn(&Image<u8>, &Contour) -> Result<T> + Sync,
{
    let outcomes: Vec<(&PathBuf, Result<Option<FileReport<T>>>)> = inputs
        .par_iter()
        .map(|path| (path, process_file(path, cfg, &f)))
        .collect();

    let mut results = Vec::with_capacity(outcomes.len());
    let mut skipped = 0;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(Some(report)) => results.push(report),
            Ok(None) => {
                info!("skipping {}: below min_dim {}", path.display(), cfg.min_dim);
                skipped += 1;
            }
            Err(err) => {
                warn!("skipping {}: {err:#}", path.display());
                skipped += 1;
            }
        }
    }
    info!("processed {} file(s), skipped {skipped}", results.len());

    BatchReport {
        processed: results.len(),
        skipped,
        results,
    }
}

fn process_file<T, F>(path: &Path, cfg: &PhenoConfig, f: &F) -> Result<Option<FileReport<T>>>
where
    F: Fn(&Image<u8>, &Contour) -> Result<T>,
{
    ensure_file_exists(path, "input")?;
    let Some(mask) = load_mask(path, cfg)? else {
        return Ok(None);
    };
    let contour = subject(&mask, cfg)?;
    let result = f(&mask, &contour)?;

    Ok(Some(FileReport {
        path: path.display().to_string(),
        width: mask.width(),
        height: mask.height(),
        contour_points: contour.len(),
        result,
    }))
}

/// The largest eligible contour of `mask`.
pub fn subject(mask: &Image<u8>, cfg: &PhenoConfig) -> Result<Contour> {
    largest_in_mask(&mask.as_view(), cfg.retrieval, cfg.approx)
        .context("selecting largest contour")
}

/// Region properties cross-checked against `mask`. A flat contour keeps the
/// always-defined part of `selection` rather than failing the file.
pub fn mask_properties(
    mask: &Image<u8>,
    contour: &Contour,
    selection: &PropertySelection,
) -> Result<RegionProperties> {
    RegionPropertyCalculator::with_mask(mask.as_view())
        .compute_defined(contour, selection)
        .context("computing region properties")
}

pub fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use image::{GrayImage, Luma};
    use vm_contour::RetrievalMode;
    use vm_shape::{PropertyKind, PropertySelection};

    use super::{PhenoConfig, Rotation, mask_from_gray, mask_properties, run_batch};

    fn save_mask(path: &Path, w: u32, h: u32, f: impl Fn(u32, u32) -> bool) {
        GrayImage::from_fn(w, h, |x, y| Luma([if f(x, y) { 255 } else { 0 }]))
            .save(path)
            .expect("writable temp dir");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: PhenoConfig =
            serde_json::from_str(r#"{"threshold": 10, "retrieval": "all", "rotation": {"degrees": 15.0}}"#)
                .expect("valid json");
        assert_eq!(cfg.threshold, 10);
        assert_eq!(cfg.retrieval, RetrievalMode::All);
        assert_eq!(cfg.rotation, Rotation::Degrees(15.0));
        assert_eq!(cfg.k, 20);
        assert_eq!(cfg.properties, "all");
    }

    #[test]
    fn rotation_parses_auto_and_degrees() {
        assert_eq!("auto".parse::<Rotation>(), Ok(Rotation::Auto));
        assert_eq!("-12.5".parse::<Rotation>(), Ok(Rotation::Degrees(-12.5)));
        assert!("sideways".parse::<Rotation>().is_err());
    }

    #[test]
    fn threshold_is_strict() {
        let gray = GrayImage::from_fn(4, 2, |x, _| Luma([if x < 2 { 127 } else { 128 }]));
        let mask = mask_from_gray(gray, &PhenoConfig::default())
            .expect("valid image")
            .expect("large enough");
        assert_eq!(mask.data(), [0_u8, 0, 255, 255, 0, 0, 255, 255].as_slice());
    }

    #[test]
    fn size_limits() {
        let gray = GrayImage::from_pixel(400, 200, Luma([255]));
        let cfg = PhenoConfig {
            max_dim: Some(100),
            ..PhenoConfig::default()
        };
        let mask = mask_from_gray(gray.clone(), &cfg)
            .expect("valid image")
            .expect("large enough");
        assert_eq!((mask.width(), mask.height()), (100, 50));
        assert_eq!(mask.as_view().count_foreground(), 5000);

        let cfg = PhenoConfig {
            min_dim: 300,
            ..PhenoConfig::default()
        };
        assert!(mask_from_gray(gray, &cfg).expect("valid image").is_none());
    }

    #[test]
    fn batch_skips_and_counts_bad_inputs() {
        let dir = tempfile::tempdir().expect("temp dir");
        let good = dir.path().join("good.png");
        let broken = dir.path().join("broken.png");
        let small = dir.path().join("small.png");
        let missing = dir.path().join("missing.png");

        save_mask(&good, 64, 48, |x, y| (10..40).contains(&x) && (5..25).contains(&y));
        fs::write(&broken, b"not an image").expect("writable temp dir");
        save_mask(&small, 8, 8, |_, _| true);

        let cfg = PhenoConfig {
            min_dim: 16,
            ..PhenoConfig::default()
        };
        let inputs = vec![broken, good.clone(), small, missing];
        let report = run_batch(&inputs, &cfg, |mask, contour| {
            Ok((mask.width(), contour.area()))
        });

        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped, 3);
        let only = &report.results[0];
        assert_eq!(only.path, good.display().to_string());
        assert_eq!((only.width, only.height), (64, 48));
        assert!((only.result.1 - 29.0 * 19.0).abs() < 1e-9);
    }

    #[test]
    fn flat_silhouette_keeps_defined_properties() {
        let dir = tempfile::tempdir().expect("temp dir");
        let line = dir.path().join("line.png");
        save_mask(&line, 32, 16, |x, y| (4..=20).contains(&x) && y == 7);

        let report = run_batch(&[line], &PhenoConfig::default(), |mask, contour| {
            mask_properties(mask, contour, &PropertySelection::All)
        });

        assert_eq!(report.processed, 1);
        let props = &report.results[0].result;
        assert_eq!(props.len(), PropertyKind::ALWAYS_DEFINED.len());
        assert_eq!(props.scalar(PropertyKind::Area), Some(17.0));
        assert!(props.centroid().is_none());
    }
}
