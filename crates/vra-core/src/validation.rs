//! Guest parameter validation.
//!
//! [`validate_params`] walks a raw parameter object once and records every
//! problem it finds, so a single [`ValidationError`] lists all missing or
//! malformed fields instead of stopping at the first one.
//!
//! Messages name fields and JSON types but never repeat string values from
//! the document. That keeps `vra_password` out of every diagnostic.

use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;
use serde_json::{Map, Value};
use tracing::debug;

use crate::guest::{
    BLUEPRINT_INSTANCE_ID, BLUEPRINT_NAME, CPU, DEFAULT_WAIT_TIMEOUT, EXTRA_DISKS, ExtraDisk,
    GuestConfig, HOSTNAME, MEMORY, MOUNT_POINT, NETWORK_ADAPTER, PARAM_NAMES, SIZE_GB,
    VRA_HOSTNAME, VRA_PASSWORD, VRA_TENANT, VRA_USERNAME, WAIT_TIMEOUT,
};

/// 2^64 and -2^63 as floats: the bounds of integers serde_json keeps exact.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
const I64_LIMIT: f64 = -9_223_372_036_854_775_808.0;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// What is wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required field is absent or `null`.
    Missing,
    /// The value has the wrong JSON type.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    /// A string field is empty or only whitespace.
    Empty,
    /// An integer field is zero or negative.
    NotPositive { value: i64 },
    /// An integer field is below the smallest representable integer.
    Negative,
    /// An integer field does not fit its target type.
    OutOfRange,
    /// An extra disk reuses the mount point of an earlier entry.
    DuplicateMountPoint { first_index: usize },
    /// The document does not wrap exactly one parameter object.
    Envelope { keys: usize },
    /// The key is not a recognised parameter.
    Unsupported,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing required field"),
            Self::WrongType { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::Empty => write!(f, "must not be empty"),
            Self::NotPositive { value } => {
                write!(f, "must be a positive integer (got {value})")
            }
            Self::Negative => write!(f, "must be a positive integer"),
            Self::OutOfRange => write!(f, "integer is too large"),
            Self::DuplicateMountPoint { first_index } => {
                write!(f, "mount point already used by {EXTRA_DISKS}[{first_index}]")
            }
            Self::Envelope { keys } => write!(
                f,
                "expected exactly one top-level key wrapping the parameters, found {keys}"
            ),
            Self::Unsupported => write!(f, "unsupported parameter"),
        }
    }
}

/// A problem attached to a field path such as `extra_disks[1].mount_point`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    field: String,
    problem: Problem,
}

impl FieldError {
    pub fn new(field: impl Into<String>, problem: Problem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Every schema violation found in a parameter document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid guest parameters: {}", join_errors(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates an error with a single field problem.
    pub fn single(field: impl Into<String>, problem: Problem) -> Self {
        Self::new(vec![FieldError::new(field, problem)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Field paths in the order they were reported.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(FieldError::field)
    }

    /// Returns `true` if any reported problem is attached to `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Short name of a JSON value's type, for diagnostics.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Accumulates field problems while values are extracted.
///
/// Every extractor that returns `None` has pushed at least one problem.
#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, field: impl Into<String>, problem: Problem) {
        self.errors.push(FieldError::new(field, problem));
    }

    fn required_string(&mut self, params: &Map<String, Value>, name: &str) -> Option<String> {
        match present(params, name) {
            Some(value) => self.string_value(name, value),
            None => {
                self.push(name, Problem::Missing);
                None
            }
        }
    }

    fn string_value(&mut self, field: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) if s.trim().is_empty() => {
                self.push(field, Problem::Empty);
                None
            }
            Value::String(s) => Some(s.clone()),
            other => {
                self.push(
                    field,
                    Problem::WrongType {
                        expected: "string",
                        found: json_kind(other),
                    },
                );
                None
            }
        }
    }

    fn required_integer<T: TryFrom<u64>>(
        &mut self,
        params: &Map<String, Value>,
        name: &str,
    ) -> Option<T> {
        match present(params, name) {
            Some(value) => self.integer_value(name, value),
            None => {
                self.push(name, Problem::Missing);
                None
            }
        }
    }

    fn integer_value<T: TryFrom<u64>>(&mut self, field: &str, value: &Value) -> Option<T> {
        let Value::Number(n) = value else {
            self.push(
                field,
                Problem::WrongType {
                    expected: "integer",
                    found: json_kind(value),
                },
            );
            return None;
        };

        if let Some(v) = n.as_u64() {
            if v == 0 {
                self.push(field, Problem::NotPositive { value: 0 });
                return None;
            }
            return match T::try_from(v) {
                Ok(v) => Some(v),
                Err(_) => {
                    self.push(field, Problem::OutOfRange);
                    None
                }
            };
        }

        if let Some(v) = n.as_i64() {
            self.push(field, Problem::NotPositive { value: v });
            return None;
        }

        // Integer literals beyond 64 bits arrive as floats.
        let problem = match n.as_f64() {
            Some(f) if f >= U64_LIMIT => Problem::OutOfRange,
            Some(f) if f <= I64_LIMIT => Problem::Negative,
            _ => Problem::WrongType {
                expected: "integer",
                found: "float",
            },
        };
        self.push(field, problem);
        None
    }

    fn extra_disks(&mut self, params: &Map<String, Value>) -> Vec<ExtraDisk> {
        let Some(value) = present(params, EXTRA_DISKS) else {
            return Vec::new();
        };
        let Value::Array(entries) = value else {
            self.push(
                EXTRA_DISKS,
                Problem::WrongType {
                    expected: "array",
                    found: json_kind(value),
                },
            );
            return Vec::new();
        };

        let mut disks = Vec::with_capacity(entries.len());
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            let path = format!("{EXTRA_DISKS}[{index}]");
            let Value::Object(fields) = entry else {
                self.push(
                    path,
                    Problem::WrongType {
                        expected: "object",
                        found: json_kind(entry),
                    },
                );
                continue;
            };

            let size_path = format!("{path}.{SIZE_GB}");
            let size_gb = match present(fields, SIZE_GB) {
                Some(v) => self.integer_value::<u64>(&size_path, v),
                None => {
                    self.push(size_path, Problem::Missing);
                    None
                }
            };

            let mount_path = format!("{path}.{MOUNT_POINT}");
            let mount_point = match present(fields, MOUNT_POINT) {
                Some(v) => self.string_value(&mount_path, v),
                None => {
                    self.push(mount_path.clone(), Problem::Missing);
                    None
                }
            };

            // Uniqueness is checked on the raw document string so the map can
            // borrow from `params`.
            let mut duplicate = false;
            if mount_point.is_some() {
                if let Some(raw) = fields.get(MOUNT_POINT).and_then(Value::as_str) {
                    match seen.get(raw) {
                        Some(&first_index) => {
                            self.push(mount_path, Problem::DuplicateMountPoint { first_index });
                            duplicate = true;
                        }
                        None => {
                            seen.insert(raw, index);
                        }
                    }
                }
            }

            for key in fields.keys() {
                if key != SIZE_GB && key != MOUNT_POINT {
                    self.push(format!("{path}.{key}"), Problem::Unsupported);
                }
            }

            if let (Some(size_gb), Some(mount_point), false) = (size_gb, mount_point, duplicate) {
                disks.push(ExtraDisk {
                    size_gb,
                    mount_point,
                });
            }
        }

        disks
    }
}

/// Looks up a field, treating `null` the same as an absent key.
fn present<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validates a raw parameter object and builds the typed record.
///
/// `extra_disks` defaults to an empty list and `wait_timeout` to
/// [`DEFAULT_WAIT_TIMEOUT`]; every other parameter is required. Keys that
/// are not parameters are rejected.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every problem found. Validation is
/// all-or-nothing: no partial record is ever produced.
pub fn validate_params(params: &Map<String, Value>) -> Result<GuestConfig, ValidationError> {
    let mut c = Collector::default();

    let blueprint_instance_id = c.required_string(params, BLUEPRINT_INSTANCE_ID);
    let blueprint_name = c.required_string(params, BLUEPRINT_NAME);
    let cpu = c.required_integer::<u32>(params, CPU);
    let extra_disks = c.extra_disks(params);
    let hostname = c.required_string(params, HOSTNAME);
    let memory = c.required_integer::<u64>(params, MEMORY);
    let network_adapter = c.required_string(params, NETWORK_ADAPTER);
    let vra_hostname = c.required_string(params, VRA_HOSTNAME);
    let vra_password = c.required_string(params, VRA_PASSWORD).map(SecretString::new);
    let vra_tenant = c.required_string(params, VRA_TENANT);
    let vra_username = c.required_string(params, VRA_USERNAME);
    let wait_timeout = match present(params, WAIT_TIMEOUT) {
        Some(value) => c.integer_value::<u64>(WAIT_TIMEOUT, value),
        None => Some(DEFAULT_WAIT_TIMEOUT),
    };

    for key in params.keys() {
        if !PARAM_NAMES.contains(&key.as_str()) {
            c.push(key.clone(), Problem::Unsupported);
        }
    }

    let (
        Some(blueprint_instance_id),
        Some(blueprint_name),
        Some(cpu),
        Some(hostname),
        Some(memory),
        Some(network_adapter),
        Some(vra_hostname),
        Some(vra_password),
        Some(vra_tenant),
        Some(vra_username),
        Some(wait_timeout),
    ) = (
        blueprint_instance_id,
        blueprint_name,
        cpu,
        hostname,
        memory,
        network_adapter,
        vra_hostname,
        vra_password,
        vra_tenant,
        vra_username,
        wait_timeout,
    )
    else {
        debug!(problems = c.errors.len(), "guest parameters rejected");
        return Err(ValidationError::new(c.errors));
    };

    if !c.errors.is_empty() {
        debug!(problems = c.errors.len(), "guest parameters rejected");
        return Err(ValidationError::new(c.errors));
    }

    debug!(
        %hostname,
        %blueprint_name,
        cpu,
        memory,
        extra_disks = extra_disks.len(),
        "guest parameters validated"
    );

    Ok(GuestConfig {
        blueprint_instance_id,
        blueprint_name,
        cpu,
        memory,
        extra_disks,
        hostname,
        network_adapter,
        vra_hostname,
        vra_password,
        vra_tenant,
        vra_username,
        wait_timeout,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
