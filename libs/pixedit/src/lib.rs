pub mod cleanup;
pub mod common;
pub mod image_utils;
pub mod logger;
pub mod operation;
pub mod process;
pub mod upload;
