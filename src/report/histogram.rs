//! Probability-distribution histograms of per-trial outcomes
//!
//! Each distribution is rendered to a PNG bar chart of density per bin, with
//! the bins themselves written alongside as CSV.

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::simulation::{OpponentStrategy, TrialResults};

/// Bins used for continuous metrics (terminal wealth, Sharpe)
pub const CONTINUOUS_BINS: usize = 100;

/// Rendered chart size in pixels
const CHART_SIZE: (u32, u32) = (1024, 768);

/// One histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: usize,
    /// Count normalized so the histogram integrates to 1
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    /// Samples left out (non-finite or outside the range)
    pub dropped: usize,
}

impl Histogram {
    /// Equal-width bins spanning the observed range of the samples
    ///
    /// A degenerate range (all samples equal) becomes a single zero-width
    /// bin whose density is plain probability mass. Returns `None` when no
    /// finite sample is left.
    pub fn from_samples(samples: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = samples.iter().copied().filter(|s| s.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bins = if lo == hi { 1 } else { bins };
        Self::with_range(samples, lo, hi, bins)
    }

    /// Equal-width bins over [lo, hi]; the last bin includes `hi`
    ///
    /// Samples outside the range are dropped along with non-finite ones.
    pub fn with_range(samples: &[f64], lo: f64, hi: f64, bins: usize) -> Option<Self> {
        if bins == 0 || !(lo <= hi) {
            return None;
        }
        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        let mut dropped = 0;

        for &sample in samples {
            if !sample.is_finite() || sample < lo || sample > hi {
                dropped += 1;
                continue;
            }
            let idx = if width > 0.0 {
                (((sample - lo) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        let kept = samples.len() - dropped;
        if kept == 0 {
            return None;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let mass = count as f64 / kept as f64;
                Bin {
                    bin_start: lo + width * i as f64,
                    bin_end: lo + width * (i + 1) as f64,
                    count,
                    density: if width > 0.0 { mass / width } else { mass },
                }
            })
            .collect();

        Some(Self { bins, dropped })
    }

    /// One unit-width bin per rank 1..=num_teams, density = probability
    pub fn for_ranks(ranks: &[usize], num_teams: usize) -> Option<Self> {
        let samples: Vec<f64> = ranks.iter().map(|&r| r as f64).collect();
        Self::with_range(&samples, 0.5, num_teams as f64 + 0.5, num_teams)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create histogram file {:?}", path))?;
        for bin in &self.bins {
            writer.serialize(bin)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Horizontal extent of the chart; a zero-width range is padded by half a unit
    fn x_range(&self) -> (f64, f64) {
        let lo = self.bins.first().map_or(0.0, |b| b.bin_start);
        let hi = self.bins.last().map_or(1.0, |b| b.bin_end);
        if hi > lo {
            (lo, hi)
        } else {
            (lo - 0.5, hi + 0.5)
        }
    }

    /// Draw the bins as density bars into a PNG at `path`
    pub fn render_png(&self, path: &Path, title: &str) -> Result<()> {
        let (x_lo, x_hi) = self.x_range();
        let peak = self.bins.iter().map(|b| b.density).fold(0.0, f64::max);
        let y_hi = if peak > 0.0 { peak * 1.1 } else { 1.0 };

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("Failed to draw {:?}: {}", path, e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)
            .map_err(|e| anyhow!("Failed to lay out {:?}: {}", path, e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Density")
            .draw()
            .map_err(|e| anyhow!("Failed to draw axes for {:?}: {}", path, e))?;

        chart
            .draw_series(self.bins.iter().map(|bin| {
                let (start, end) = if bin.bin_end > bin.bin_start {
                    (bin.bin_start, bin.bin_end)
                } else {
                    (x_lo, x_hi)
                };
                Rectangle::new([(start, 0.0), (end, bin.density)], BLUE.mix(0.6).filled())
            }))
            .map_err(|e| anyhow!("Failed to draw bars for {:?}: {}", path, e))?;

        root.present().map_err(|e| anyhow!("Failed to write {:?}: {}", path, e))?;
        Ok(())
    }
}

/// Render the four outcome distributions of a run into `dir`
///
/// Each distribution becomes `<label>_<strategy>_<stamp>.png` plus a CSV of
/// its bins under the same name. Returns the image paths; a distribution
/// with no finite samples is skipped.
pub fn write_histograms(
    dir: &Path,
    strategy: OpponentStrategy,
    stamp: &str,
    results: &TrialResults,
    num_teams: usize,
) -> Result<Vec<PathBuf>> {
    let plots = [
        (
            "Focal_Ranking_Total_Assets_Under_Management",
            Histogram::for_ranks(&results.ranks_by_wealth, num_teams),
        ),
        (
            "Focal_Total_Percent_Return_On_Assets",
            Histogram::from_samples(&results.terminal_wealth, CONTINUOUS_BINS),
        ),
        (
            "Focal_Ranking_By_Sharpe_Ratio",
            Histogram::for_ranks(&results.ranks_by_sharpe, num_teams),
        ),
        (
            "Focal_Sharpe_Ratio_Competition_End",
            Histogram::from_samples(&results.terminal_sharpe, CONTINUOUS_BINS),
        ),
    ];

    let mut written = Vec::new();
    for (label, histogram) in plots {
        let Some(histogram) = histogram else {
            warn!("No finite samples for {}, skipping histogram", label);
            continue;
        };
        if histogram.dropped > 0 {
            warn!("{}: dropped {} non-finite samples", label, histogram.dropped);
        }
        let stem = format!("{}_{}_{}", label, strategy, stamp);
        let image = dir.join(format!("{}.png", stem));
        histogram.render_png(&image, &label.replace('_', " "))?;
        histogram.write_csv(&dir.join(format!("{}.csv", stem)))?;
        info!("Wrote histogram to {:?}", image);
        written.push(image);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_histogram_is_probability() {
        let ranks = [1, 1, 2, 4, 4, 4, 4, 5];
        let hist = Histogram::for_ranks(&ranks, 5).unwrap();

        assert_eq!(hist.bins.len(), 5);
        let counts: Vec<usize> = hist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 0, 4, 1]);
        assert!((hist.bins[3].density - 0.5).abs() < 1e-12);
        assert!((hist.bins[0].bin_start - 0.5).abs() < 1e-12);
        assert!((hist.bins[4].bin_end - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let samples: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.37).sin() * 2.0 + 1.0).collect();
        let hist = Histogram::from_samples(&samples, 20).unwrap();

        let total: f64 = hist.bins.iter().map(|b| b.density * (b.bin_end - b.bin_start)).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 1000);
    }

    #[test]
    fn test_max_sample_lands_in_last_bin() {
        let hist = Histogram::from_samples(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_eq!(hist.bins[3].count, 2);
    }

    #[test]
    fn test_degenerate_and_non_finite() {
        let hist = Histogram::from_samples(&[1.5, 1.5, f64::NEG_INFINITY], 100).unwrap();
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 2);
        assert_eq!(hist.bins[0].density, 1.0);
        assert_eq!(hist.dropped, 1);

        assert!(Histogram::from_samples(&[f64::NAN], 10).is_none());
        assert!(Histogram::from_samples(&[], 10).is_none());
    }

    #[test]
    fn test_write_histograms() {
        let dir = tempfile::tempdir().unwrap();
        let results = TrialResults {
            ranks_by_wealth: vec![1, 3, 2],
            ranks_by_sharpe: vec![2, 2, 3],
            terminal_wealth: vec![1.1, 0.9, 1.3],
            terminal_sharpe: vec![0.5, -0.2, 1.4],
        };

        let paths = write_histograms(dir.path(), OpponentStrategy::Mixed, "01_02_2026_10_00_00", &results, 3).unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths[0].ends_with("Focal_Ranking_Total_Assets_Under_Management_mixed_01_02_2026_10_00_00.png"));
        for path in &paths {
            let bytes = std::fs::read(path).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"), "{:?}", path);
            assert!(path.with_extension("csv").exists());
        }

        let contents = std::fs::read_to_string(paths[0].with_extension("csv")).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("bin_start,bin_end,count,density"));
        assert_eq!(contents.lines().count(), 4);
    }

    #[test]
    fn test_render_degenerate_histogram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");

        let hist = Histogram::from_samples(&[2.0, 2.0, 2.0], CONTINUOUS_BINS).unwrap();
        hist.render_png(&path, "flat").unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
