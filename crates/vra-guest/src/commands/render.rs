//! `vra-guest render` -- fill the parameters into a blueprint request template.
//!
//! The template is the body the catalog item hands out for new requests.
//! The customized body is printed as JSON; it is never submitted.

use anyhow::{Context, Result};
use tracing::debug;
use vra_core::template::customize_request;

use crate::cli::RenderArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `vra-guest render` command.
pub fn run(ctx: &RuntimeContext, args: &RenderArgs) -> Result<()> {
    let config = ctx
        .loader()
        .load_file(&args.file)
        .with_context(|| format!("cannot load {}", args.file.display()))?;

    let raw = std::fs::read_to_string(&args.template)
        .with_context(|| format!("failed to read template {}", args.template.display()))?;
    let template: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("template {} is not valid JSON", args.template.display()))?;
    debug!(template = %args.template.display(), "loaded request template");

    let request = customize_request(&template, &config)
        .with_context(|| format!("cannot customize template {}", args.template.display()))?;

    output_json(&request);
    Ok(())
}
