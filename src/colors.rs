use crate::domain::Domain;

/// Fixed alpha every branch segment is blended with
pub const SEGMENT_ALPHA: f32 = 0.7;

/// Background the canvas starts from
pub const BACKGROUND: Rgb = Rgb { r: 0.035, g: 0.03, b: 0.06 };

/// Linear RGB color with channels in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn to_bytes(self) -> [u8; 3] {
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }

    /// Blend `other` over `self` with the given opacity
    pub fn blend(self, other: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        Rgb {
            r: (self.r + (other.r - self.r) * a).clamp(0.0, 1.0),
            g: (self.g + (other.g - self.g) * a).clamp(0.0, 1.0),
            b: (self.b + (other.b - self.b) * a).clamp(0.0, 1.0),
        }
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// HSB (hue in degrees, saturation and brightness in percent) to RGB.
/// Each input is wrapped or clamped into its range first.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let h = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
    let s = clamp_percent(saturation);
    let v = clamp_percent(brightness);

    let c = v * s;
    let sector = h / 60.0;
    let x = c * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb { r: r + m, g: g + m, b: b + m }
}

fn clamp_percent(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 100.0) / 100.0
    } else {
        0.0
    }
}

/// Color of a segment drawn by a branch this frame
pub fn branch_color(base_hue: f32, domain: Option<Domain>, age: u32, generation: f32) -> Rgb {
    let hue = match domain {
        // Domain branches stay near their own hue, drifting a little with age
        Some(d) => d.hue() + (base_hue - 200.0) * 0.1 + age as f32 * 0.15,
        None => base_hue + age as f32 * 0.3,
    };
    let saturation = match domain {
        Some(_) => 55.0 + generation * 8.0,
        None => 25.0 + generation * 5.0,
    };
    let brightness = 95.0 - generation * 9.0 - age as f32 * 0.05;
    hsb_to_rgb(hue, saturation, brightness)
}
