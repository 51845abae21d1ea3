//! Core parameter model and classification for tool-wrapper generation.
//!
//! This crate defines the foundational types for turning extracted
//! argument-parser descriptions into Galaxy wrapper building blocks:
//!
//! - [`ArgumentSpec`] — one CLI argument's declared metadata (flags,
//!   metavar, type, default, multiplicity).
//! - [`GroupNode`] — the structural tree of arguments, groups,
//!   mutually-exclusive groups, and nested subparsers.
//! - [`Parameter`] / [`ParamKind`] — the classified behavior object that
//!   renders UI descriptors, output descriptors, and command fragments.
//! - [`ClassifierTables`] — the name/metavar lookup tables and resolution
//!   order that map specs to parameters.
//! - [`cheetah`] — the command-fragment AST and its serialized wire format.
//!
//! # Example
//!
//! ```
//! use toolgen_core::{ArgumentSpec, ClassifierTables};
//! use toolgen_core::cheetah::{render_all, VarPath};
//!
//! let tables = ClassifierTables::builtin();
//! let spec = ArgumentSpec::new("min-coverage")
//!     .with_long("--min-coverage")
//!     .with_metavar("INT");
//! let param = tables.classify(&spec).unwrap();
//!
//! assert!(param.is_input());
//! let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
//! assert!(cmd.contains("--min-coverage '${min_coverage}'"));
//! ```

pub mod cheetah;
mod classify;
mod param;
mod spec;
mod tree;
pub mod xml;

pub use classify::{ClassifierTables, ClassifyError};
pub use param::{
    name_is_output, spec_is_multiple, BundleLayout, DataParam, DataRole, ParamKind, Parameter,
    ScalarKind, SpecOverrides,
};
pub use spec::{normalize_name, ArgumentSpec, Nargs, ValueKind};
pub use tree::{GroupNode, SubparserVariant};
