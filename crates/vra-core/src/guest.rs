//! The validated guest parameter record.
//!
//! A [`GuestConfig`] can only be obtained through
//! [`validate_params`](crate::validation::validate_params), so holding one
//! means every constraint on the parameter bag has been checked. The record
//! is immutable: fields are exposed through accessors only.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parameter names
// ---------------------------------------------------------------------------

pub const BLUEPRINT_INSTANCE_ID: &str = "blueprint_instance_id";
pub const BLUEPRINT_NAME: &str = "blueprint_name";
pub const CPU: &str = "cpu";
pub const EXTRA_DISKS: &str = "extra_disks";
pub const HOSTNAME: &str = "hostname";
pub const MEMORY: &str = "memory";
pub const NETWORK_ADAPTER: &str = "network_adapter";
pub const VRA_HOSTNAME: &str = "vra_hostname";
pub const VRA_PASSWORD: &str = "vra_password";
pub const VRA_TENANT: &str = "vra_tenant";
pub const VRA_USERNAME: &str = "vra_username";
pub const WAIT_TIMEOUT: &str = "wait_timeout";

/// Sub-field names of an `extra_disks` entry.
pub const SIZE_GB: &str = "size_gb";
pub const MOUNT_POINT: &str = "mount_point";

/// Every accepted parameter name, in the order problems are reported.
pub const PARAM_NAMES: &[&str] = &[
    BLUEPRINT_INSTANCE_ID,
    BLUEPRINT_NAME,
    CPU,
    EXTRA_DISKS,
    HOSTNAME,
    MEMORY,
    NETWORK_ADAPTER,
    VRA_HOSTNAME,
    VRA_PASSWORD,
    VRA_TENANT,
    VRA_USERNAME,
    WAIT_TIMEOUT,
];

/// Parameters whose values are integers.
pub const INTEGER_PARAMS: &[&str] = &[CPU, MEMORY, WAIT_TIMEOUT];

/// Seconds to wait for a freshly provisioned guest when `wait_timeout` is unset.
pub const DEFAULT_WAIT_TIMEOUT: u64 = 600;

// ---------------------------------------------------------------------------
// Extra disk
// ---------------------------------------------------------------------------

/// An additional virtual disk, beyond the guest's base disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDisk {
    /// Disk size in gigabytes.
    pub size_gb: u64,
    /// Mount point (Linux) or drive letter (Windows) inside the guest.
    pub mount_point: String,
}

impl ExtraDisk {
    pub fn new(size_gb: u64, mount_point: impl Into<String>) -> Self {
        Self {
            size_gb,
            mount_point: mount_point.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Guest config
// ---------------------------------------------------------------------------

/// Validated parameters for provisioning one guest from a blueprint.
///
/// `Debug` output never contains the vRA password.
#[derive(Debug, Clone)]
pub struct GuestConfig {
    pub(crate) blueprint_instance_id: String,
    pub(crate) blueprint_name: String,
    pub(crate) cpu: u32,
    pub(crate) memory: u64,
    pub(crate) extra_disks: Vec<ExtraDisk>,
    pub(crate) hostname: String,
    pub(crate) network_adapter: String,
    pub(crate) vra_hostname: String,
    pub(crate) vra_password: SecretString,
    pub(crate) vra_tenant: String,
    pub(crate) vra_username: String,
    pub(crate) wait_timeout: u64,
}

impl GuestConfig {
    /// ID of the machine component within the blueprint.
    pub fn blueprint_instance_id(&self) -> &str {
        &self.blueprint_instance_id
    }

    pub fn blueprint_name(&self) -> &str {
        &self.blueprint_name
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }

    /// Memory in megabytes.
    pub fn memory(&self) -> u64 {
        self.memory
    }

    pub fn extra_disks(&self) -> &[ExtraDisk] {
        &self.extra_disks
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn network_adapter(&self) -> &str {
        &self.network_adapter
    }

    pub fn vra_hostname(&self) -> &str {
        &self.vra_hostname
    }

    /// The API password, still wrapped. Call
    /// [`expose_secret`](secrecy::ExposeSecret::expose_secret) only at the
    /// point of use.
    pub fn vra_password(&self) -> &SecretString {
        &self.vra_password
    }

    pub fn vra_tenant(&self) -> &str {
        &self.vra_tenant
    }

    pub fn vra_username(&self) -> &str {
        &self.vra_username
    }

    /// Seconds to wait for the guest to finish building.
    pub fn wait_timeout(&self) -> u64 {
        self.wait_timeout
    }

    /// Total size of all extra disks in gigabytes.
    ///
    /// Each size fits `u64`, the sum may not.
    pub fn extra_disk_total_gb(&self) -> u128 {
        self.extra_disks.iter().map(|d| u128::from(d.size_gb)).sum()
    }
}
