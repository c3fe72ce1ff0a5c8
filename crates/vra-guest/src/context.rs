//! Runtime context for command execution.

use vra_config::Loader;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,

    /// Prefix of override environment variables, when overrides are enabled.
    pub env_prefix: Option<String>,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
            env_prefix: global.env_overrides.then(|| global.env_prefix.clone()),
        }
    }

    /// Returns a document loader configured from the global flags.
    pub fn loader(&self) -> Loader {
        match &self.env_prefix {
            Some(prefix) => Loader::new().with_env_overrides(prefix.clone()),
            None => Loader::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(env_overrides: bool) -> GlobalArgs {
        GlobalArgs {
            json: true,
            verbose: false,
            quiet: false,
            env_overrides,
            env_prefix: "TEST_".to_string(),
        }
    }

    #[test]
    fn env_prefix_only_when_enabled() {
        assert_eq!(RuntimeContext::from_global_args(&global(false)).env_prefix, None);
        assert_eq!(
            RuntimeContext::from_global_args(&global(true)).env_prefix.as_deref(),
            Some("TEST_")
        );
    }

    #[test]
    fn loader_reflects_overrides() {
        let ctx = RuntimeContext::from_global_args(&global(true));
        assert!(format!("{:?}", ctx.loader()).contains("TEST_"));
    }
}
