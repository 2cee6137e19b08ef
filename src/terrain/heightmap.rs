//! Height maps: dense 2D grids of elevation samples.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Row-major height grid; texel `(i, j)` lives at `j * width + i`.
///
/// Invariant: `width >= 2`, `depth >= 2`, `data.len() == width * depth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMap {
    width: usize,
    depth: usize,
    data: Vec<f32>,
}

impl HeightMap {
    pub fn new(width: usize, depth: usize, data: Vec<f32>) -> Result<Self> {
        if width < 2 || depth < 2 {
            return Err(Error::InvalidParameter(format!(
                "height map needs at least 2x2 texels, got {width}x{depth}"
            )));
        }
        if data.len() != width * depth {
            return Err(Error::InvalidParameter(format!(
                "height map {width}x{depth} expects {} samples, got {}",
                width * depth,
                data.len()
            )));
        }
        Ok(Self { width, depth, data })
    }

    /// Flat zero map. Dimensions below 2 are raised to 2.
    pub fn zeros(width: usize, depth: usize) -> Self {
        let (width, depth) = (width.max(2), depth.max(2));
        Self { width, depth, data: vec![0.0; width * depth] }
    }

    pub fn constant(width: usize, depth: usize, h: f32) -> Result<Self> {
        Self::new(width, depth, vec![h; width * depth])
    }

    pub fn from_fn(width: usize, depth: usize, f: impl Fn(usize, usize) -> f32) -> Result<Self> {
        let mut data = Vec::with_capacity(width * depth);
        for j in 0..depth {
            for i in 0..width {
                data.push(f(i, j));
            }
        }
        Self::new(width, depth, data)
    }

    pub fn width(&self) -> usize { self.width }
    pub fn depth(&self) -> usize { self.depth }
    pub fn data(&self) -> &[f32] { &self.data }

    /// Texel at `(i, j)` with indices clamped into the grid.
    pub fn get(&self, i: i64, j: i64) -> f32 {
        let i = i.clamp(0, self.width as i64 - 1) as usize;
        let j = j.clamp(0, self.depth as i64 - 1) as usize;
        self.data[j * self.width + i]
    }

    /// Overwrite a texel. Out-of-range writes are ignored.
    pub fn set(&mut self, i: usize, j: usize, h: f32) {
        if i < self.width && j < self.depth {
            self.data[j * self.width + i] = h;
        }
    }

    /// `(min, max)` over all samples.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Decode a raster file. Grey images use their luminance; colour images
    /// use `channel` (0 = red .. 3 = alpha). Values are normalised to `[0, 1]`.
    #[cfg(feature = "raster")]
    pub fn load(path: impl AsRef<std::path::Path>, channel: usize) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), channel, "loading height map");
        let img = image::open(path)?;
        let grey = img.color().channel_count() <= 2;
        let rgba = img.to_rgba32f();
        let (w, h) = rgba.dimensions();
        let channel = if grey { 0 } else { channel.min(3) };
        let data = rgba.pixels().map(|p| p.0[channel]).collect();
        Self::new(w as usize, h as usize, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(HeightMap::new(1, 5, vec![0.0; 5]).is_err());
        assert!(HeightMap::new(3, 3, vec![0.0; 8]).is_err());
        assert!(HeightMap::constant(2, 2, 1.0).is_ok());
    }

    #[test]
    fn test_indexing_is_row_major_and_clamped() {
        let m = HeightMap::from_fn(3, 2, |i, j| (10 * j + i) as f32).unwrap();
        assert_eq!(m.get(2, 1), 12.0);
        assert_eq!(m.get(-4, 0), 0.0);
        assert_eq!(m.get(9, 9), 12.0);
        assert_eq!(m.data()[1 * 3 + 2], 12.0);
    }

    #[test]
    fn test_min_max_and_set() {
        let mut m = HeightMap::constant(4, 4, 2.0).unwrap();
        m.set(1, 2, -3.0);
        m.set(10, 10, 99.0);
        assert_eq!(m.min_max(), (-3.0, 2.0));
    }
}
