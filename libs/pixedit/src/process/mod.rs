mod types;
mod utils;

pub use types::ProcessError;
pub use utils::apply_operation;
pub use utils::encode_image;
pub use utils::load_image;
pub use utils::Dispatcher;
