use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::filter::separable_filter_equal;

use super::hsv::shift_value;
use crate::operation::{FlipAxis, Rotation};
use crate::process::ProcessError;

/// Side length of the square Gaussian kernel used by [`gaussian_blur`].
pub const BLUR_KERNEL_SIZE: u32 = 11;

/// Largest buffer a resize may allocate. Matches the decoder's default
/// allocation limit.
const MAX_RESIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Bytes per pixel of the f32 RGBA buffer the filtered resize works through.
const RESIZE_SCRATCH_BYTES_PER_PIXEL: u64 = 16;

/// BT.601 luma weights.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Single-channel 8-bit luma using BT.601 weights. Alpha is dropped.
pub fn to_grayscale(image: &DynamicImage) -> DynamicImage {
    if let DynamicImage::ImageLuma8(buf) = image {
        return DynamicImage::ImageLuma8(buf.clone());
    }

    let rgb = image.to_rgb8();
    let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = LUMA_WEIGHTS[0] * r as f32
            + LUMA_WEIGHTS[1] * g as f32
            + LUMA_WEIGHTS[2] * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    });
    DynamicImage::ImageLuma8(gray)
}

pub fn rotate(image: &DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::Cw90 => image.rotate90(),
        Rotation::Cw180 => image.rotate180(),
        Rotation::Cw270 => image.rotate270(),
    }
}

pub fn flip(image: &DynamicImage, axis: FlipAxis) -> DynamicImage {
    match axis {
        FlipAxis::Horizontal => image.fliph(),
        FlipAxis::Vertical => image.flipv(),
    }
}

/// Both dimensions scaled by `percent / 100`, rounded down.
pub fn scaled_dimensions(width: u32, height: u32, percent: u32) -> (u64, u64) {
    (
        width as u64 * percent as u64 / 100,
        height as u64 * percent as u64 / 100,
    )
}

/// Peak allocation of a filtered resize from `src_width` columns to
/// `width`x`height`: the larger of the f32 scratch buffer and the output.
/// `None` on overflow.
pub fn resize_buffer_bytes(
    src_width: u32,
    width: u64,
    height: u64,
    bytes_per_pixel: u8,
) -> Option<u64> {
    let scratch = (src_width as u64)
        .checked_mul(height)?
        .checked_mul(RESIZE_SCRATCH_BYTES_PER_PIXEL)?;
    let output = width.checked_mul(height)?.checked_mul(bytes_per_pixel as u64)?;
    Some(scratch.max(output))
}

/// Scales an image by a whole percentage.
///
/// The triangle filter widens its support with the downscale factor, so each
/// output pixel averages the source area it covers.
pub fn resize_percent(image: &DynamicImage, percent: u32) -> Result<DynamicImage, ProcessError> {
    let (src_width, src_height) = image.dimensions();
    let (width, height) = scaled_dimensions(src_width, src_height, percent);

    if width == 0 || height == 0 {
        return Err(ProcessError::InvalidParameter(format!(
            "resize to {}% of {}x{} gives an empty image",
            percent, src_width, src_height
        )));
    }
    let too_large = || {
        ProcessError::InvalidParameter(format!(
            "resize to {}% of {}x{} needs more than {} bytes",
            percent, src_width, src_height, MAX_RESIZE_BYTES
        ))
    };

    let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(too_large()),
    };

    // Fast path: if dimensions match, just clone
    if (width, height) == (src_width, src_height) {
        return Ok(image.clone());
    }

    let bytes_per_pixel = image.color().bytes_per_pixel();
    match resize_buffer_bytes(src_width, width as u64, height as u64, bytes_per_pixel) {
        Some(bytes) if bytes <= MAX_RESIZE_BYTES => {}
        _ => return Err(too_large()),
    }

    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

/// Standard deviation OpenCV derives for a Gaussian kernel of the given size
/// when none is specified.
pub fn blur_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian of `size` taps centred on the middle tap.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - radius;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Separable Gaussian blur with a [`BLUR_KERNEL_SIZE`] square kernel.
pub fn gaussian_blur(image: &DynamicImage) -> DynamicImage {
    let kernel = gaussian_kernel(BLUR_KERNEL_SIZE, blur_sigma(BLUR_KERNEL_SIZE));
    match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(separable_filter_equal(buf, &kernel))
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(separable_filter_equal(buf, &kernel))
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(separable_filter_equal(buf, &kernel))
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(separable_filter_equal(buf, &kernel))
        }
        other if other.color().has_alpha() => {
            DynamicImage::ImageRgba8(separable_filter_equal(&other.to_rgba8(), &kernel))
        }
        other => DynamicImage::ImageRgb8(separable_filter_equal(&other.to_rgb8(), &kernel)),
    }
}

fn shift_channel(value: u8, delta: i16) -> u8 {
    (value as i16 + delta).clamp(0, 255) as u8
}

/// Shifts the HSV value channel of every pixel by `delta`, saturating.
///
/// For grey images the value channel is the luma itself. Alpha is untouched.
pub fn adjust_brightness(image: &DynamicImage, delta: i16) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => {
            let mut out = buf.clone();
            for pixel in out.pixels_mut() {
                pixel[0] = shift_channel(pixel[0], delta);
            }
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageLumaA8(buf) => {
            let mut out = buf.clone();
            for pixel in out.pixels_mut() {
                pixel[0] = shift_channel(pixel[0], delta);
            }
            DynamicImage::ImageLumaA8(out)
        }
        DynamicImage::ImageRgb8(buf) => {
            let mut out = buf.clone();
            for pixel in out.pixels_mut() {
                pixel.0 = shift_value(pixel.0, delta);
            }
            DynamicImage::ImageRgb8(out)
        }
        DynamicImage::ImageRgba8(buf) => {
            let mut out = buf.clone();
            for pixel in out.pixels_mut() {
                let [r, g, b, a] = pixel.0;
                let [r, g, b] = shift_value([r, g, b], delta);
                pixel.0 = [r, g, b, a];
            }
            DynamicImage::ImageRgba8(out)
        }
        other if other.color().has_alpha() => {
            adjust_brightness(&DynamicImage::ImageRgba8(other.to_rgba8()), delta)
        }
        other => adjust_brightness(&DynamicImage::ImageRgb8(other.to_rgb8()), delta),
    }
}
