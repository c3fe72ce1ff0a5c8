//! Command handlers, one module per subcommand.

pub mod render;
pub mod show;
pub mod validate;
pub mod version;
