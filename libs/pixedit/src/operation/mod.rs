mod types;
mod utils;

pub use types::FlipAxis;
pub use types::Operation;
pub use types::OutputFormat;
pub use types::Rotation;
pub use types::BRIGHTNESS_DELTA;
pub use utils::parse_operation;
