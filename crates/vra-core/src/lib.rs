//! Core types for vra-guest.
//!
//! This crate holds the validated guest parameter record, the validator that
//! builds it from a raw JSON parameter object, and the offline customization
//! of blueprint request templates.

pub mod guest;
pub mod template;
pub mod validation;

pub use guest::{ExtraDisk, GuestConfig};
pub use validation::{FieldError, Problem, ValidationError, validate_params};
