//! Cumulative pixel surface the roots are traced onto

use crate::colors::{Rgb, BACKGROUND};
use image::{ImageResult, RgbImage};
use std::path::Path;

/// A 2D point in canvas pixels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One stroke emitted by a growing branch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub width: f32,
    pub color: Rgb,
    pub alpha: f32,
}

/// Anything segments can be drawn onto
pub trait Surface {
    fn stroke(&mut self, segment: &Segment);
}

/// Recording surface, handy for inspecting what a frame drew
impl Surface for Vec<Segment> {
    fn stroke(&mut self, segment: &Segment) {
        self.push(*segment);
    }
}

pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(BACKGROUND);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.pixels[y as usize * self.width + x as usize].to_bytes())
        })
    }

    pub fn save_png(&self, path: &Path) -> ImageResult<()> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)
    }
}

impl Surface for Canvas {
    /// Thick line with round caps: every pixel whose center lies within
    /// half the stroke width of the segment gets blended once.
    fn stroke(&mut self, segment: &Segment) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let radius = (segment.width * 0.5).max(0.5);
        let (a, b) = (segment.from, segment.to);

        let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as usize;
        let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as usize;
        let max_x = (a.x.max(b.x) + radius).ceil();
        let max_y = (a.y.max(b.y) + radius).ceil();
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let max_x = (max_x as usize).min(self.width - 1);
        let max_y = (max_y as usize).min(self.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(p, a, b) <= radius {
                    let idx = y * self.width + x;
                    self.pixels[idx] = self.pixels[idx].blend(segment.color, segment.alpha);
                }
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > f32::EPSILON {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
