mod utils;

pub use utils::file_age;
pub use utils::spawn_retention_task;
pub use utils::sweep_directory;
