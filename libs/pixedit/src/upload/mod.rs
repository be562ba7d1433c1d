mod types;
mod utils;

pub use types::IntakeError;
pub use utils::file_extension;
pub use utils::Intake;
