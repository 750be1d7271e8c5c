//! RGBA transcoding optimizers.
//!
//! These keep an sRGB-encoded byte image in sync with the canvas as pixels
//! land, so an exporter never has to walk the float canvas. State is one
//! atomic per channel, satisfying the lock-free observer discipline.

use crate::canvas::CanvasOptimizer;
use crate::core::colour::Colour;
use std::sync::atomic::{AtomicU16, AtomicU8, Ordering};

fn transcode(colour: Colour) -> Colour {
    colour.remove_filter().to_srgb().saturated()
}

/// Maintains an 8-bit-per-channel RGBA copy of the canvas.
///
/// The alpha channel carries the remaining transmittance.
pub struct Rgba8Optimizer {
    width: usize,
    data: Vec<AtomicU8>,
}

impl Rgba8Optimizer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            data: (0..4 * width * height).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// A snapshot of the RGBA byte image, in row-major order
    pub fn data(&self) -> Vec<u8> {
        self.data.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let base = 4 * (y * self.width + x);
        [0, 1, 2, 3].map(|i| self.data[base + i].load(Ordering::Relaxed))
    }
}

impl CanvasOptimizer for Rgba8Optimizer {
    fn pixel_written(&self, x: usize, y: usize, colour: Colour) {
        let c = transcode(colour);
        let base = 4 * (y * self.width + x);
        let quantize = |v: f64| (v * f64::from(u8::MAX)).round() as u8;
        self.data[base].store(quantize(c.r), Ordering::Relaxed);
        self.data[base + 1].store(quantize(c.g), Ordering::Relaxed);
        self.data[base + 2].store(quantize(c.b), Ordering::Relaxed);
        self.data[base + 3].store(quantize(c.transmit), Ordering::Relaxed);
    }
}

/// Maintains a 16-bit-per-channel RGBA copy of the canvas
pub struct Rgba16Optimizer {
    width: usize,
    data: Vec<AtomicU16>,
}

impl Rgba16Optimizer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            data: (0..4 * width * height).map(|_| AtomicU16::new(0)).collect(),
        }
    }

    /// A snapshot of the RGBA image, in row-major order
    pub fn data(&self) -> Vec<u16> {
        self.data.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u16; 4] {
        let base = 4 * (y * self.width + x);
        [0, 1, 2, 3].map(|i| self.data[base + i].load(Ordering::Relaxed))
    }
}

impl CanvasOptimizer for Rgba16Optimizer {
    fn pixel_written(&self, x: usize, y: usize, colour: Colour) {
        let c = transcode(colour);
        let base = 4 * (y * self.width + x);
        let quantize = |v: f64| (v * f64::from(u16::MAX)).round() as u16;
        self.data[base].store(quantize(c.r), Ordering::Relaxed);
        self.data[base + 1].store(quantize(c.g), Ordering::Relaxed);
        self.data[base + 2].store(quantize(c.b), Ordering::Relaxed);
        self.data[base + 3].store(quantize(c.transmit), Ordering::Relaxed);
    }
}
