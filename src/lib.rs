#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod converter;
pub mod error;
pub mod fallback;
pub mod glob;
pub mod rules;
pub mod scanner;
pub mod template;
pub mod versions;

pub use converter::{Converter, make_converter};
pub use error::{ConfigurationError, ConvertError, PackageResolutionError, TemplateRenderError};
pub use rules::{Rule, RuleSet};
pub use versions::{ComponentsDirectory, PackageVersions, StaticVersions, VersionTriple};
