pub mod atomic;

pub use atomic::{staging_path, write_gz_atomic};
