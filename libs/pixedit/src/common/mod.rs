mod types;
mod utils;

pub use types::RetentionConfig;
pub use types::StorageConfig;
pub use types::DEFAULT_ALLOWED_EXTENSIONS;
pub use utils::current_timestamp_millis;
pub use utils::output_file_name;
pub use utils::secure_filename;
