//! `vra-guest validate` -- check a parameter document and report every problem.

use anyhow::{Context, Result, bail};
use vra_config::LoadError;

use crate::cli::ValidateArgs;
use crate::context::RuntimeContext;
use crate::output::{FieldErrorView, output_json};
use crate::styles::{render_bold, render_fail_icon, render_pass_icon};

/// Execute the `vra-guest validate` command.
///
/// Schema problems are printed one per line (or as a JSON report) before the
/// command fails. Parse and read failures propagate as plain errors.
pub fn run(ctx: &RuntimeContext, args: &ValidateArgs) -> Result<()> {
    let file = args.file.display().to_string();

    match ctx.loader().load_file(&args.file) {
        Ok(config) => {
            if ctx.json {
                output_json(&serde_json::json!({
                    "file": file,
                    "valid": true,
                    "hostname": config.hostname(),
                    "errors": [],
                }));
            } else if !ctx.quiet {
                println!(
                    "{} {}: parameters valid for {}",
                    render_pass_icon(),
                    file,
                    render_bold(config.hostname())
                );
            }
            Ok(())
        }
        Err(LoadError::Validation(err)) => {
            if ctx.json {
                let errors: Vec<FieldErrorView<'_>> =
                    err.errors().iter().map(FieldErrorView::from_error).collect();
                output_json(&serde_json::json!({
                    "file": file,
                    "valid": false,
                    "errors": errors,
                }));
            } else {
                for error in err.errors() {
                    println!("{} {}: {}", render_fail_icon(), error.field(), error.problem());
                }
            }
            bail!("{}: {} problem(s) found", file, err.len())
        }
        Err(e) => Err(e).with_context(|| format!("cannot validate {}", file)),
    }
}
