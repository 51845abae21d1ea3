//! Wrapper assembly and rendering.
//!
//! This crate turns one extracted parser description (JSON) into one Galaxy
//! tool-wrapper document. The pipeline has three stages:
//!
//! - [`extract`] — deserialize the description and normalize it into the
//!   structural tree.
//! - [`assemble`] — walk the tree once, producing paired UI descriptors and
//!   command fragments with consistent addressing.
//! - [`render`] — drop the fragments into the fixed document template and
//!   emit the suite manifest.
//!
//! # Example
//!
//! ```
//! use toolgen_assembly::generate_tool;
//! use toolgen_core::ClassifierTables;
//!
//! let json = r#"{
//!     "prog": "anvi-script",
//!     "description": "Does things",
//!     "arguments": [{"name": "title", "long_flag": "--title"}]
//! }"#;
//!
//! let tables = ClassifierTables::builtin();
//! let xml = generate_tool(json, &tables).unwrap();
//! assert!(xml.contains(r#"<tool id="anvi_script""#));
//! assert!(xml.contains("--title '${title}'"));
//! ```

pub mod assemble;
pub mod extract;
pub mod render;

use thiserror::Error;

use toolgen_core::ClassifierTables;

pub use assemble::{assemble, Assembled, AssembleError};
pub use extract::{ExtractError, ParserDescription, Requirement};
pub use render::{
    render_tool, AutoToolRepositories, RenderError, ShedConfig, SuiteRepository, ToolMetadata,
};

/// Failure anywhere in the generation pipeline.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The description did not parse.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// The tree could not be assembled.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    /// The document template failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Generates one complete wrapper document from a description's JSON text.
pub fn generate_tool(json: &str, tables: &ClassifierTables) -> Result<String, GenerateError> {
    let desc = ParserDescription::from_json(json)?;
    generate_tool_from_description(&desc, tables)
}

/// Generates one complete wrapper document from a parsed description.
pub fn generate_tool_from_description(
    desc: &ParserDescription,
    tables: &ClassifierTables,
) -> Result<String, GenerateError> {
    let tree = desc.to_tree();
    let assembled = assemble(&desc.prog, &tree, tables)?;
    let meta = ToolMetadata::from_description(desc);
    Ok(render_tool(&meta, &assembled)?)
}
