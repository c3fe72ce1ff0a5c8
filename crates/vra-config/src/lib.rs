//! Loading of vra-guest parameter documents.
//!
//! A parameter document is a JSON object with a single top-level key (by
//! convention `ANSIBLE_MODULE_ARGS`) wrapping the parameter bag. This crate
//! parses such documents, optionally overlays environment overrides, and
//! hands the parameters to [`vra_core::validate_params`].

pub mod loader;
pub mod overrides;

pub use loader::{LoadError, Loader, ParseError, load_file, load_from_slice, load_from_str};
