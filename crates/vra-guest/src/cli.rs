//! Clap CLI definitions for the `vra-guest` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vra_config::overrides::DEFAULT_ENV_PREFIX;

/// vra-guest -- check vRA guest parameter documents before provisioning.
#[derive(Parser, Debug)]
#[command(
    name = "vra-guest",
    about = "Validate and inspect vRA guest parameter documents",
    long_about = "Loads a module argument document describing a guest to provision from a vRA \
                  blueprint, validates every parameter, and renders the customized request body \
                  offline. Nothing is sent to the automation host.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Overlay <PREFIX><PARAM> environment variables onto the document's
    /// parameters (e.g. VRA_GUEST_VRA_PASSWORD).
    #[arg(long, global = true, env = "VRA_GUEST_ENV_OVERRIDES")]
    pub env_overrides: bool,

    /// Prefix of override environment variables.
    #[arg(long, global = true, value_name = "PREFIX", default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a parameter document and report every problem.
    #[command(alias = "check")]
    Validate(ValidateArgs),

    /// Show the validated parameters with the password masked.
    Show(ShowArgs),

    /// Render the customized blueprint request body as JSON.
    Render(RenderArgs),

    /// Print version information.
    Version,
}

/// Arguments for `vra-guest validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the parameter document.
    pub file: PathBuf,
}

/// Arguments for `vra-guest show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the parameter document.
    pub file: PathBuf,
}

/// Arguments for `vra-guest render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the parameter document.
    pub file: PathBuf,

    /// Request template fetched from the catalog item.
    #[arg(short = 't', long, value_name = "TEMPLATE")]
    pub template: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_with_global_flags() {
        let cli = Cli::try_parse_from([
            "vra-guest",
            "render",
            "args.json",
            "--template",
            "tpl.json",
            "--json",
        ])
        .unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.env_prefix, DEFAULT_ENV_PREFIX);
        match cli.command {
            Some(Commands::Render(args)) => {
                assert_eq!(args.file, PathBuf::from("args.json"));
                assert_eq!(args.template, PathBuf::from("tpl.json"));
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn check_is_an_alias_for_validate() {
        let cli = Cli::try_parse_from(["vra-guest", "check", "args.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Validate(_))));
    }
}
