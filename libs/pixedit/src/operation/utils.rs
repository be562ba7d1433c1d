use super::types::{FlipAxis, Operation, OutputFormat, Rotation, BRIGHTNESS_DELTA};
use crate::process::ProcessError;

const RESIZE_PREFIX: &str = "resize_";

/// Parses an operation identifier.
///
/// Unrecognised identifiers become [`Operation::Passthrough`] unless `strict`
/// is set, in which case they are rejected. `resize_<percent>` takes the
/// digits up to the next `_`.
pub fn parse_operation(identifier: &str, strict: bool) -> Result<Operation, ProcessError> {
    let operation = match identifier {
        "cgray" => Operation::Grayscale,
        "cwebp" => Operation::Convert(OutputFormat::Webp),
        "cjpg" => Operation::Convert(OutputFormat::Jpeg),
        "cpng" => Operation::Convert(OutputFormat::Png),
        "rotate_90" => Operation::Rotate(Rotation::Cw90),
        "rotate_180" => Operation::Rotate(Rotation::Cw180),
        "rotate_270" => Operation::Rotate(Rotation::Cw270),
        "flip_h" => Operation::Flip(FlipAxis::Horizontal),
        "flip_v" => Operation::Flip(FlipAxis::Vertical),
        "blur" => Operation::Blur,
        "bright_inc" => Operation::Brightness {
            delta: BRIGHTNESS_DELTA,
        },
        "bright_dec" => Operation::Brightness {
            delta: -BRIGHTNESS_DELTA,
        },
        "copy" => Operation::Passthrough,
        id if id.starts_with(RESIZE_PREFIX) => parse_resize(&id[RESIZE_PREFIX.len()..])?,
        id if strict => return Err(ProcessError::UnknownOperation(id.to_string())),
        id => {
            log::warn!("Unknown operation {:?}, copying image unchanged", id);
            Operation::Passthrough
        }
    };
    Ok(operation)
}

fn parse_resize(parameter: &str) -> Result<Operation, ProcessError> {
    let digits = parameter.split('_').next().unwrap_or_default();
    let percent = digits.parse::<u32>().map_err(|e| {
        ProcessError::InvalidParameter(format!("resize percent {:?}: {}", digits, e))
    })?;
    Ok(Operation::Resize { percent })
}
