pub mod args;
pub mod commands;
pub mod root;

pub use args::{validate_validate_args, Args, Commands, ValidateArgs};
pub use root::RootCommand;
