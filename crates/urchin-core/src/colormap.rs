//! Volume colormaps and quantile compression of float volumes to uint8.
//!
//! Volume voxels index into a 256-entry colormap. Indexes up to 253 carry
//! the gradient (minus any reserved colors, which sit right after it) and
//! 255 is transparent in the renderer.

use std::str::FromStr;

use crate::color::Color;

/// Voxel value the renderer draws as transparent.
pub const TRANSPARENT_INDEX: u8 = 255;

/// Gradient plus reserved slots.
pub const COLORMAP_SLOTS: usize = 254;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColormapError {
    #[error("{0} is not a valid colormap option")]
    UnknownColormap(String),
    #[error("{0} reserved colors leave no room for a gradient")]
    TooManyReserved(usize),
    #[error("need {needed} datapoints, got {got}")]
    TooFewDatapoints { needed: usize, got: usize },
    #[error("datapoints have no spread")]
    FlatDatapoints,
}

/// Single-channel gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gradient {
    Reds,
    Greens,
    Blues,
}

impl FromStr for Gradient {
    type Err = ColormapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reds" => Ok(Gradient::Reds),
            "greens" => Ok(Gradient::Greens),
            "blues" => Ok(Gradient::Blues),
            other => Err(ColormapError::UnknownColormap(other.to_string())),
        }
    }
}

impl Gradient {
    fn color(self, v: u8) -> Color {
        let rgba = match self {
            Gradient::Reds => [v, 0, 0, 255],
            Gradient::Greens => [0, v, 0, 255],
            Gradient::Blues => [0, 0, v, 255],
        };
        Color::from_channels(&rgba)
    }
}

/// Build a colormap: the gradient over the unreserved slots, then
/// `reserved` in order.
///
/// With `datapoints`, slot `i` takes its intensity from the min-max
/// normalized `datapoints[i]` instead of a linear ramp.
pub fn colormap(
    gradient: Gradient,
    reserved: &[Color],
    datapoints: Option<&[f64]>,
) -> Result<Vec<Color>, ColormapError> {
    if reserved.len() >= COLORMAP_SLOTS {
        return Err(ColormapError::TooManyReserved(reserved.len()));
    }
    let n_unreserved = COLORMAP_SLOTS - reserved.len();

    let normalized = match datapoints {
        Some(points) => {
            if points.len() < n_unreserved {
                return Err(ColormapError::TooFewDatapoints {
                    needed: n_unreserved,
                    got: points.len(),
                });
            }
            let (min, max) = points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
            if max <= min {
                return Err(ColormapError::FlatDatapoints);
            }
            Some(points.iter().map(|x| (x - min) / (max - min)).collect::<Vec<_>>())
        }
        None => None,
    };

    let mut out = Vec::with_capacity(COLORMAP_SLOTS);
    for i in 0..n_unreserved {
        let t = match &normalized {
            Some(points) => points[i],
            None => i as f64 / n_unreserved as f64,
        };
        out.push(gradient.color((t * 255.0).round_ties_even() as u8));
    }
    out.extend_from_slice(reserved);
    Ok(out)
}

/// Digitize float voxels into `n_colors` quantile bins.
///
/// Returns the uint8 volume and the bin edges. NaN and infinite voxels map
/// to [`TRANSPARENT_INDEX`]. Quantiles use linear interpolation over the
/// finite values; a voxel gets the number of edges strictly below it.
pub fn compress_volume(values: &[f64], n_colors: usize) -> (Vec<u8>, Vec<f64>) {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(f64::total_cmp);

    let edges: Vec<f64> = if finite.is_empty() || n_colors == 0 {
        Vec::new()
    } else {
        (0..n_colors)
            .map(|k| {
                let q = if n_colors == 1 {
                    0.0
                } else {
                    k as f64 / (n_colors - 1) as f64
                };
                quantile_sorted(&finite, q)
            })
            .collect()
    };

    let out = values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                TRANSPARENT_INDEX
            } else {
                edges.partition_point(|&e| e < v).min(TRANSPARENT_INDEX as usize - 1) as u8
            }
        })
        .collect();
    (out, edges)
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
