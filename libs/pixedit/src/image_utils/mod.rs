mod hsv;
mod utils;

pub use hsv::hsv_to_rgb;
pub use hsv::rgb_to_hsv;
pub use hsv::shift_value;
pub use hsv::Hsv;
pub use utils::adjust_brightness;
pub use utils::blur_sigma;
pub use utils::flip;
pub use utils::gaussian_blur;
pub use utils::gaussian_kernel;
pub use utils::resize_buffer_bytes;
pub use utils::resize_percent;
pub use utils::rotate;
pub use utils::scaled_dimensions;
pub use utils::to_grayscale;
pub use utils::BLUR_KERNEL_SIZE;
