//! # Boundary
//!
//! Classifies pixels of the track image into drivable and non-drivable
//! terrain. The classification comes from a mask image which has already been
//! eroded so that the path keeps a margin from the track edges; producing that
//! mask is done offline and is not part of this crate.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use image::{GrayImage, Luma};
use log::debug;

use crate::points::RawPoint;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Class of the terrain under a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Track,
    OffTrack,
}

#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error("Could not load the mask image: {0}")]
    LoadError(#[from] image::ImageError),

    #[error("The mask image is empty")]
    Empty,

    #[error("Mask threshold must be within [0, 1], found {0}")]
    InvalidThreshold(f64),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Read-only terrain classification over pixel coordinates.
pub trait BoundaryOracle {
    /// Get the terrain class of the given pixel, or `None` if the pixel is
    /// outside of the classified area.
    fn terrain_at(&self, point: &RawPoint) -> Option<Terrain>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A boolean drivable mask loaded from an image.
#[derive(Debug, Clone)]
pub struct TerrainMask {
    width: u32,
    height: u32,
    drivable: Vec<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<F> BoundaryOracle for F
where
    F: Fn(i32, i32) -> bool,
{
    fn terrain_at(&self, point: &RawPoint) -> Option<Terrain> {
        match self(point.x, point.y) {
            true => Some(Terrain::Track),
            false => Some(Terrain::OffTrack),
        }
    }
}

impl TerrainMask {
    /// Load a mask from an image file.
    ///
    /// See [`TerrainMask::from_image`] for how pixels are classified.
    pub fn load<P: AsRef<Path>>(path: P, threshold: f64) -> Result<Self, MaskError> {
        let img = image::open(path)?.to_luma8();
        Self::from_image(&img, threshold)
    }

    /// Build a mask from a greyscale image.
    ///
    /// Pixels at or above `threshold` (a fraction of full scale) are drivable.
    /// Images whose brightest pixel is 1 are label images, written as 0/1
    /// values rather than 0/255, and are thresholded on that scale instead.
    pub fn from_image(img: &GrayImage, threshold: f64) -> Result<Self, MaskError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MaskError::InvalidThreshold(threshold));
        }
        if img.width() == 0 || img.height() == 0 {
            return Err(MaskError::Empty);
        }

        let max = img.pixels().map(|Luma([v])| *v).max().unwrap_or(0);
        let full_scale = if max == 1 { 1.0 } else { std::u8::MAX as f64 };

        let drivable: Vec<bool> = img
            .pixels()
            .map(|Luma([v])| *v as f64 / full_scale >= threshold)
            .collect();

        debug!(
            "Loaded {}x{} terrain mask, {} drivable pixels",
            img.width(),
            img.height(),
            drivable.iter().filter(|d| **d).count()
        );

        Ok(Self {
            width: img.width(),
            height: img.height(),
            drivable,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl BoundaryOracle for TerrainMask {
    fn terrain_at(&self, point: &RawPoint) -> Option<Terrain> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }

        match self.drivable[(y * self.width + x) as usize] {
            true => Some(Terrain::Track),
            false => Some(Terrain::OffTrack),
        }
    }
}
