pub mod validate;

pub use validate::{run_validate_command, validate_file, FileReport};
