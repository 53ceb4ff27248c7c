//! Configuration: defaults, resolution and the per-target record.
//!
//! The resolver always yields an ordered, non-empty sequence of immutable
//! [`Target`]s; everything downstream (registry predicates, runner fan-out,
//! watch bindings) only ever reads them.
//!
//! ## Contents
//! - [`resolve`] — load + merge + `{placeholder}` expansion + multi-target
//! - [`Target`], [`TranslateOptions`], [`ZipEntry`], [`LiveReloadOptions`]

mod defaults;
mod resolve;
mod target;

pub use resolve::resolve;
pub use target::{LiveReloadOptions, Target, TranslateOptions, ZipEntry};

/// Default config path looked up next to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "wpeg.config.json";
