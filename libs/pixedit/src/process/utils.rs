use image::{DynamicImage, GenericImageView};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::types::ProcessError;
use crate::common::{output_file_name, StorageConfig};
use crate::image_utils::{adjust_brightness, flip, gaussian_blur, resize_percent, rotate, to_grayscale};
use crate::operation::{parse_operation, Operation, OutputFormat};

/// Reads and decodes an image, whatever its extension claims.
pub fn load_image(path: &Path) -> Result<DynamicImage, ProcessError> {
    let bytes = std::fs::read(path).map_err(|source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    image::load_from_memory(&bytes).map_err(ProcessError::Decode)
}

pub fn apply_operation(
    image: &DynamicImage,
    operation: &Operation,
) -> Result<DynamicImage, ProcessError> {
    let processed = match operation {
        Operation::Grayscale => to_grayscale(image),
        Operation::Convert(_) | Operation::Passthrough => image.clone(),
        Operation::Rotate(rotation) => rotate(image, *rotation),
        Operation::Flip(axis) => flip(image, *axis),
        Operation::Resize { percent } => resize_percent(image, *percent)?,
        Operation::Blur => gaussian_blur(image),
        Operation::Brightness { delta } => adjust_brightness(image, *delta),
    };
    Ok(processed)
}

/// Narrows the pixel layout to one the encoder for `format` accepts.
fn prepare_for_format(image: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    let is_8bit = color.bytes_per_pixel() == color.channel_count();
    match format {
        OutputFormat::Png if is_8bit => Cow::Borrowed(image),
        OutputFormat::Png => match image {
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_) => Cow::Borrowed(image),
            other if color.has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8())),
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        },
        OutputFormat::Jpeg => match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
            other if !color.has_color() => Cow::Owned(DynamicImage::ImageLuma8(other.to_luma8())),
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        },
        OutputFormat::Webp => match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
            other if color.has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8())),
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        },
    }
}

/// Encodes fully into memory so a failed encode never leaves a partial file.
pub fn encode_image(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, ProcessError> {
    let prepared = prepare_for_format(image, format);
    let mut cursor = Cursor::new(Vec::new());
    prepared
        .write_to(&mut cursor, format.image_format())
        .map_err(ProcessError::Encode)?;
    Ok(cursor.into_inner())
}

/// Turns stored uploads into processed images inside the configured output directory.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: StorageConfig,
}

impl Dispatcher {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Parses an identifier using this dispatcher's strictness. A missing
    /// identifier is a passthrough.
    pub fn parse_operation(&self, identifier: Option<&str>) -> Result<Operation, ProcessError> {
        match identifier {
            Some(id) => parse_operation(id, self.config.strict_operations),
            None => Ok(Operation::Passthrough),
        }
    }

    /// Decodes `input`, applies `operation` and writes the result under a
    /// fresh name. Returns the path of the written file, rooted at the
    /// configured output directory.
    pub fn process(&self, input: &Path, operation: &Operation) -> Result<PathBuf, ProcessError> {
        let image = load_image(input)?;
        let (width, height) = image.dimensions();
        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            input.display(),
            width,
            height,
            image.color()
        );

        let processed = apply_operation(&image, operation)?;

        let format = operation.output_format();
        let bytes = encode_image(&processed, format)?;

        let file_name = output_file_name(input, &operation.suffix(), format.extension());
        let output_path = self.config.processed_dir.join(file_name);
        std::fs::write(&output_path, bytes).map_err(|source| ProcessError::Io {
            path: output_path.clone(),
            source,
        })?;

        log::info!(
            "Applied {} to {}, wrote {}",
            operation,
            input.display(),
            output_path.display()
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{FlipAxis, Rotation, BRIGHTNESS_DELTA};
    use image::{ColorType, ImageBuffer, ImageFormat, Rgb, Rgb32FImage, RgbImage, Rgba, RgbaImage};
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, Dispatcher) {
        let temp_dir = tempdir().unwrap();
        let config = StorageConfig::new(
            temp_dir.path().join("uploads"),
            temp_dir.path().join("processed"),
            8 * 1024 * 1024,
            false,
        );
        config.ensure_dirs().unwrap();
        (temp_dir, Dispatcher::new(config))
    }

    fn write_test_png(dispatcher: &Dispatcher, name: &str, width: u32, height: u32) -> PathBuf {
        let buf = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let path = dispatcher.config().upload_dir.join(name);
        buf.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    fn processed_files(dispatcher: &Dispatcher) -> Vec<String> {
        std::fs::read_dir(&dispatcher.config().processed_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect()
    }

    fn all_operations() -> Vec<Operation> {
        vec![
            Operation::Grayscale,
            Operation::Convert(OutputFormat::Webp),
            Operation::Convert(OutputFormat::Jpeg),
            Operation::Convert(OutputFormat::Png),
            Operation::Rotate(Rotation::Cw90),
            Operation::Rotate(Rotation::Cw180),
            Operation::Rotate(Rotation::Cw270),
            Operation::Flip(FlipAxis::Horizontal),
            Operation::Flip(FlipAxis::Vertical),
            Operation::Resize { percent: 50 },
            Operation::Blur,
            Operation::Brightness { delta: BRIGHTNESS_DELTA },
            Operation::Brightness { delta: -BRIGHTNESS_DELTA },
            Operation::Passthrough,
        ]
    }

    #[test]
    fn test_each_operation_writes_one_file() {
        for operation in all_operations() {
            let (_temp_dir, dispatcher) = setup();
            let input = write_test_png(&dispatcher, "sample.png", 32, 24);

            let output = dispatcher.process(&input, &operation).unwrap();

            let files = processed_files(&dispatcher);
            assert_eq!(files.len(), 1, "{} should write exactly one file", operation);
            let name = &files[0];
            assert!(
                name.starts_with(&format!("sample_{}_", operation.suffix())),
                "{} produced {}",
                operation,
                name
            );
            assert!(name.ends_with(&format!(".{}", operation.output_format().extension())));
            assert_eq!(output, dispatcher.config().processed_dir.join(name));
            assert!(input.exists(), "input must not be cleaned up");
        }
    }

    #[test]
    fn test_output_is_decodable_in_its_format() {
        let (_temp_dir, dispatcher) = setup();
        let input = write_test_png(&dispatcher, "sample.png", 16, 16);

        for (operation, expected) in [
            (Operation::Convert(OutputFormat::Jpeg), ImageFormat::Jpeg),
            (Operation::Convert(OutputFormat::Webp), ImageFormat::WebP),
            (Operation::Convert(OutputFormat::Png), ImageFormat::Png),
            (Operation::Blur, ImageFormat::Png),
        ] {
            let output = dispatcher.process(&input, &operation).unwrap();
            let bytes = std::fs::read(&output).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected);
        }
    }

    #[test]
    fn test_grayscale_output_has_one_channel() {
        let (_temp_dir, dispatcher) = setup();
        let input = write_test_png(&dispatcher, "sample.png", 10, 10);

        let output = dispatcher.process(&input, &Operation::Grayscale).unwrap();
        let decoded = image::open(&output).unwrap();
        assert_eq!(decoded.color().channel_count(), 1);

        let rotated = dispatcher.process(&input, &Operation::Rotate(Rotation::Cw90)).unwrap();
        assert_eq!(image::open(&rotated).unwrap().color().channel_count(), 3);
    }

    #[test]
    fn test_resize_output_dimensions() {
        let (_temp_dir, dispatcher) = setup();
        let input = write_test_png(&dispatcher, "sample.png", 200, 100);

        for (percent, expected) in [
            (1, (2, 1)),
            (50, (100, 50)),
            (100, (200, 100)),
            (150, (300, 150)),
            (400, (800, 400)),
        ] {
            let output = dispatcher.process(&input, &Operation::Resize { percent }).unwrap();
            let decoded = image::open(&output).unwrap();
            assert_eq!(decoded.dimensions(), expected, "resize_{}", percent);
        }
    }

    #[test]
    fn test_passthrough_preserves_pixels() {
        let (_temp_dir, dispatcher) = setup();
        let input = write_test_png(&dispatcher, "sample.png", 20, 12);

        let operation = dispatcher.parse_operation(Some("not_a_real_op")).unwrap();
        assert_eq!(operation, Operation::Passthrough);

        let output = dispatcher.process(&input, &operation).unwrap();
        assert!(output.to_string_lossy().contains("_copy_"));

        let original = load_image(&input).unwrap();
        let copied = load_image(&output).unwrap();
        assert_eq!(copied.color(), original.color());
        assert_eq!(copied.as_bytes(), original.as_bytes());
    }

    #[test]
    fn test_missing_operation_is_passthrough() {
        let (_temp_dir, dispatcher) = setup();
        assert_eq!(dispatcher.parse_operation(None).unwrap(), Operation::Passthrough);
    }

    #[test]
    fn test_strict_dispatcher_rejects_unknown_operation() {
        let (temp_dir, _) = setup();
        let config = StorageConfig::new(
            temp_dir.path().join("uploads"),
            temp_dir.path().join("processed"),
            1024,
            true,
        );
        let dispatcher = Dispatcher::new(config);

        assert!(matches!(
            dispatcher.parse_operation(Some("sepia")),
            Err(ProcessError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_corrupt_input_is_a_decode_error() {
        let (_temp_dir, dispatcher) = setup();
        let input = dispatcher.config().upload_dir.join("broken.png");
        std::fs::write(&input, b"definitely not a png").unwrap();

        let result = dispatcher.process(&input, &Operation::Blur);
        assert!(matches!(result, Err(ProcessError::Decode(_))));
        assert!(processed_files(&dispatcher).is_empty());
    }

    #[test]
    fn test_missing_input_is_an_io_error() {
        let (_temp_dir, dispatcher) = setup();
        let input = dispatcher.config().upload_dir.join("nope.png");

        let result = dispatcher.process(&input, &Operation::Blur);
        assert!(matches!(result, Err(ProcessError::Io { .. })));
    }

    #[test]
    fn test_bad_resize_leaves_no_output() {
        let (_temp_dir, dispatcher) = setup();
        let input = write_test_png(&dispatcher, "tiny.png", 10, 10);

        let result = dispatcher.process(&input, &Operation::Resize { percent: 1 });
        assert!(matches!(result, Err(ProcessError::InvalidParameter(_))));
        assert!(processed_files(&dispatcher).is_empty());
    }

    #[test]
    fn test_jpeg_conversion_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128])));
        let bytes = encode_image(&rgba, OutputFormat::Jpeg).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_webp_conversion_is_lossless() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_fn(6, 6, |x, y| {
            Rgba([(x * 40) as u8, (y * 40) as u8, 7, 200])
        }));
        let bytes = encode_image(&rgba, OutputFormat::Webp).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8().as_raw(), rgba.to_rgba8().as_raw());
    }

    #[test]
    fn test_wide_inputs_are_narrowed_per_format() {
        let (_temp_dir, dispatcher) = setup();
        let wide = ImageBuffer::<Rgba<u16>, Vec<u16>>::from_fn(5, 3, |x, y| {
            Rgba([(x * 10_000) as u16, (y * 20_000) as u16, 4096, 40_000])
        });
        let input = dispatcher.config().upload_dir.join("wide.png");
        DynamicImage::ImageRgba16(wide)
            .save_with_format(&input, ImageFormat::Png)
            .unwrap();

        let jpg = dispatcher
            .process(&input, &Operation::Convert(OutputFormat::Jpeg))
            .unwrap();
        let decoded = image::open(&jpg).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!(decoded.dimensions(), (5, 3));

        let webp = dispatcher
            .process(&input, &Operation::Convert(OutputFormat::Webp))
            .unwrap();
        assert_eq!(image::open(&webp).unwrap().color(), ColorType::Rgba8);

        let png = dispatcher.process(&input, &Operation::Passthrough).unwrap();
        assert_eq!(image::open(&png).unwrap().color(), ColorType::Rgba16);

        let float = DynamicImage::ImageRgb32F(Rgb32FImage::from_pixel(2, 2, Rgb([0.5, 0.25, 1.0])));
        for format in [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Webp] {
            let bytes = encode_image(&float, format).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert!(!decoded.color().has_alpha(), "{:?}", format);
            assert_eq!(decoded.dimensions(), (2, 2));
        }
    }

    #[test]
    fn test_apply_operation_dispatches() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 4));
        let rotated = apply_operation(&img, &Operation::Rotate(Rotation::Cw90)).unwrap();
        assert_eq!(rotated.dimensions(), (4, 8));

        let gray = apply_operation(&img, &Operation::Grayscale).unwrap();
        assert_eq!(gray.color().channel_count(), 1);

        let resized = apply_operation(&img, &Operation::Resize { percent: 50 }).unwrap();
        assert_eq!(resized.dimensions(), (4, 2));
    }
}
