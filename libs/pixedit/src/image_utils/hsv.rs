/// Colour in HSV space. Hue is in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(|c| c as f32 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let h = if chroma == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / chroma + 2.0)
    } else {
        60.0 * ((r - g) / chroma + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { chroma / max };

    Hsv { h, s, v: max }
}

pub fn hsv_to_rgb(hsv: Hsv) -> [u8; 3] {
    let chroma = hsv.v * hsv.s;
    let sector = (hsv.h / 60.0).rem_euclid(6.0);
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = hsv.v - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    [r, g, b].map(|c| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Adds `delta` to the value channel of an RGB pixel, saturating at 0 and 255.
/// Hue and saturation are left as they are.
pub fn shift_value(rgb: [u8; 3], delta: i16) -> [u8; 3] {
    let mut hsv = rgb_to_hsv(rgb);
    let value = (hsv.v * 255.0).round() as i16;
    hsv.v = (value + delta).clamp(0, 255) as f32 / 255.0;
    hsv_to_rgb(hsv)
}
