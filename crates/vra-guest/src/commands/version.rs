//! `vra-guest version` -- what this build accepts.
//!
//! Besides the package version, reports the parameter names a document may
//! carry and the defaults applied to optional ones, so a playbook author can
//! check a document against the installed tool.

use anyhow::Result;
use serde::Serialize;
use vra_core::guest::{DEFAULT_WAIT_TIMEOUT, EXTRA_DISKS, PARAM_NAMES, WAIT_TIMEOUT};
use vra_config::overrides::DEFAULT_ENV_PREFIX;

use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    /// Release tag baked in through `VRA_GUEST_BUILD`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<&'static str>,
    parameters: &'static [&'static str],
    optional: Vec<&'static str>,
    default_wait_timeout: u64,
    env_prefix: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build: option_env!("VRA_GUEST_BUILD"),
            parameters: PARAM_NAMES,
            optional: vec![EXTRA_DISKS, WAIT_TIMEOUT],
            default_wait_timeout: DEFAULT_WAIT_TIMEOUT,
            env_prefix: DEFAULT_ENV_PREFIX,
        }
    }

    fn headline(&self) -> String {
        match self.build {
            Some(build) => format!("vra-guest {} ({build})", self.version),
            None => format!("vra-guest {}", self.version),
        }
    }
}

/// Execute the `vra-guest version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let info = VersionInfo::current();

    if ctx.json {
        output_json(&info);
        return Ok(());
    }

    println!("{}", info.headline());
    if !ctx.quiet {
        println!("parameters: {}", info.parameters.join(", "));
        println!(
            "defaults: {EXTRA_DISKS}=[], {WAIT_TIMEOUT}={}s",
            info.default_wait_timeout
        );
        println!("env overrides: {}<PARAM>", info.env_prefix);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_accepted_parameters() {
        let json = serde_json::to_value(VersionInfo::current()).unwrap();
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["parameters"].as_array().unwrap().len(), 12);
        assert!(json["parameters"].as_array().unwrap().contains(&"vra_password".into()));
        assert_eq!(json["optional"], serde_json::json!(["extra_disks", "wait_timeout"]));
        assert_eq!(json["default_wait_timeout"], 600);
        assert_eq!(json["env_prefix"], "VRA_GUEST_");
    }

    #[test]
    fn headline_includes_build_when_set() {
        let mut info = VersionInfo::current();
        info.build = None;
        assert_eq!(info.headline(), format!("vra-guest {}", env!("CARGO_PKG_VERSION")));
        info.build = Some("r42");
        assert!(info.headline().ends_with("(r42)"));
    }
}
