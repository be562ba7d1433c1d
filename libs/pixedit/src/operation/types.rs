use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount added to or removed from the HSV value channel by the brightness operations.
pub const BRIGHTNESS_DELTA: i16 = 30;

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Cw90,
    Cw180,
    Cw270,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Encoder used to write a processed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Webp => ImageFormat::WebP,
        }
    }
}

/// A single transformation the dispatcher can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Grayscale,
    Convert(OutputFormat),
    Rotate(Rotation),
    Flip(FlipAxis),
    Resize { percent: u32 },
    Blur,
    Brightness { delta: i16 },
    Passthrough,
}

impl Operation {
    /// Identifier as accepted by [`parse_operation`](super::parse_operation).
    pub fn identifier(&self) -> String {
        match self {
            Operation::Grayscale => "cgray".to_string(),
            Operation::Convert(OutputFormat::Webp) => "cwebp".to_string(),
            Operation::Convert(OutputFormat::Jpeg) => "cjpg".to_string(),
            Operation::Convert(OutputFormat::Png) => "cpng".to_string(),
            Operation::Rotate(Rotation::Cw90) => "rotate_90".to_string(),
            Operation::Rotate(Rotation::Cw180) => "rotate_180".to_string(),
            Operation::Rotate(Rotation::Cw270) => "rotate_270".to_string(),
            Operation::Flip(FlipAxis::Horizontal) => "flip_h".to_string(),
            Operation::Flip(FlipAxis::Vertical) => "flip_v".to_string(),
            Operation::Resize { percent } => format!("resize_{}", percent),
            Operation::Blur => "blur".to_string(),
            Operation::Brightness { delta } if *delta >= 0 => "bright_inc".to_string(),
            Operation::Brightness { .. } => "bright_dec".to_string(),
            Operation::Passthrough => "copy".to_string(),
        }
    }

    /// Tag embedded in the output filename.
    pub fn suffix(&self) -> String {
        match self {
            Operation::Grayscale => "gray".to_string(),
            Operation::Convert(format) => format!("to_{}", format.extension()),
            Operation::Rotate(Rotation::Cw90) => "rot90".to_string(),
            Operation::Rotate(Rotation::Cw180) => "rot180".to_string(),
            Operation::Rotate(Rotation::Cw270) => "rot270".to_string(),
            Operation::Flip(FlipAxis::Horizontal) => "fliph".to_string(),
            Operation::Flip(FlipAxis::Vertical) => "flipv".to_string(),
            Operation::Resize { percent } => format!("resize{}", percent),
            Operation::Blur => "blur".to_string(),
            Operation::Brightness { delta } if *delta >= 0 => "bright_inc".to_string(),
            Operation::Brightness { .. } => "bright_dec".to_string(),
            Operation::Passthrough => "copy".to_string(),
        }
    }

    /// Only the explicit conversions pick their own encoder; everything else is PNG.
    pub fn output_format(&self) -> OutputFormat {
        match self {
            Operation::Convert(format) => *format,
            _ => OutputFormat::Png,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}
