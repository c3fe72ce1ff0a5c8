//! `vra-guest show` -- print the validated parameters, password masked.

use anyhow::{Context, Result};

use crate::cli::ShowArgs;
use crate::context::RuntimeContext;
use crate::output::{GuestView, format_guest_detail, output_json};

/// Execute the `vra-guest show` command.
pub fn run(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let config = ctx
        .loader()
        .load_file(&args.file)
        .with_context(|| format!("cannot load {}", args.file.display()))?;

    if ctx.json {
        output_json(&GuestView::from_config(&config));
    } else {
        println!("{}", format_guest_detail(&config));
    }

    Ok(())
}
