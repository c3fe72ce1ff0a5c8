//! Output formatting helpers for the `vra-guest` CLI.
//!
//! Provides JSON output and the human-readable guest summary. The vRA
//! password is replaced by [`PASSWORD_MASK`] in every view.

use std::io::{self, Write};

use serde::Serialize;
use vra_core::{ExtraDisk, FieldError, GuestConfig};

use crate::styles::{render_bold, render_muted};

/// Placeholder printed in place of the vRA password.
pub const PASSWORD_MASK: &str = "********";

/// A serializable view of a [`GuestConfig`] with the password masked.
#[derive(Serialize)]
pub struct GuestView<'a> {
    pub blueprint_instance_id: &'a str,
    pub blueprint_name: &'a str,
    pub cpu: u32,
    pub memory: u64,
    pub extra_disks: &'a [ExtraDisk],
    pub hostname: &'a str,
    pub network_adapter: &'a str,
    pub vra_hostname: &'a str,
    pub vra_password: &'static str,
    pub vra_tenant: &'a str,
    pub vra_username: &'a str,
    pub wait_timeout: u64,
}

impl<'a> GuestView<'a> {
    pub fn from_config(config: &'a GuestConfig) -> Self {
        Self {
            blueprint_instance_id: config.blueprint_instance_id(),
            blueprint_name: config.blueprint_name(),
            cpu: config.cpu(),
            memory: config.memory(),
            extra_disks: config.extra_disks(),
            hostname: config.hostname(),
            network_adapter: config.network_adapter(),
            vra_hostname: config.vra_hostname(),
            vra_password: PASSWORD_MASK,
            vra_tenant: config.vra_tenant(),
            vra_username: config.vra_username(),
            wait_timeout: config.wait_timeout(),
        }
    }
}

/// One validation problem in JSON output.
#[derive(Serialize)]
pub struct FieldErrorView<'a> {
    pub field: &'a str,
    pub message: String,
}

impl<'a> FieldErrorView<'a> {
    pub fn from_error(error: &'a FieldError) -> Self {
        Self {
            field: error.field(),
            message: error.problem().to_string(),
        }
    }
}

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a guest in detailed multi-line view.
pub fn format_guest_detail(config: &GuestConfig) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} [{} / {}]",
        render_bold(config.hostname()),
        config.blueprint_name(),
        config.blueprint_instance_id()
    ));
    lines.push(format!("CPU: {}", config.cpu()));
    lines.push(format!("Memory: {} MB", config.memory()));
    lines.push(format!("Network: {}", config.network_adapter()));

    let disks = config.extra_disks();
    if disks.is_empty() {
        lines.push(format!("Extra disks: {}", render_muted("none")));
    } else {
        lines.push(format!(
            "Extra disks: {} ({} GB)",
            disks.len(),
            config.extra_disk_total_gb()
        ));
        let width = disks.iter().map(|d| d.mount_point.len()).max().unwrap_or(0);
        for disk in disks {
            lines.push(format!(
                "  {:<width$}  {} GB",
                disk.mount_point,
                disk.size_gb,
                width = width
            ));
        }
    }

    lines.push(format!(
        "vRA: {}@{} (tenant {})",
        config.vra_username(),
        config.vra_hostname(),
        config.vra_tenant()
    ));
    lines.push(format!("Password: {}", PASSWORD_MASK));
    lines.push(format!("Wait timeout: {}s", config.wait_timeout()));

    lines.join("\n")
}
