//! Parser-description ingestion.
//!
//! The extraction collaborator runs the wrapped script's own argument parser
//! inside its native runtime and serializes what it saw as JSON. This module
//! owns that contract ([`ParserDescription`]) and normalizes it into the
//! immutable [`GroupNode`] tree the assembler walks.
//!
//! Normalization rules:
//! - positional-only groups and flagless arguments are dropped (they have no
//!   flag to emit),
//! - members of mutually-exclusive groups never appear in plain listings,
//! - declaration order is preserved everywhere, including subparser variant
//!   order.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use toolgen_core::{ArgumentSpec, GroupNode};

/// Ingestion failure.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The description JSON did not parse. Nothing is emitted for this tool.
    #[error("malformed parser description: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A `(name, version)` dependency declared by the wrapped script.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Requirement {
    /// Package name.
    pub name: String,
    /// Pinned version string.
    pub version: String,
}

/// A named argument group.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentGroup {
    /// Group title as declared.
    #[serde(default)]
    pub title: String,
    /// Marks a positional-arguments group, which is dropped entirely.
    #[serde(default)]
    pub positional: bool,
    /// Member arguments in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

/// A mutually-exclusive argument group.
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusiveGroup {
    /// Whether the parser requires one member to be chosen.
    #[serde(default)]
    pub required: bool,
    /// Member arguments in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

/// The set of subparsers attached to one parser.
#[derive(Debug, Clone, Deserialize)]
pub struct SubparserSet {
    /// The `dest` keyword of the subparser declaration, if any.
    #[serde(default)]
    pub dest: Option<String>,
    /// Named variants in declaration order.
    #[serde(default)]
    pub variants: Vec<SubparserEntry>,
}

/// One named subparser variant.
#[derive(Debug, Clone, Deserialize)]
pub struct SubparserEntry {
    /// The subcommand token.
    pub name: String,
    /// The variant's own parser description; nesting is unbounded.
    pub parser: ParserDescription,
}

/// One parser as reported by the extraction step.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserDescription {
    /// Program name.
    pub prog: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Full formatted help text.
    #[serde(default)]
    pub help: String,
    /// Declared version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Package requirements.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Capability declarations (drives interactive-tool detection).
    #[serde(default)]
    pub provides: Vec<String>,
    /// Ungrouped arguments in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    /// Named groups in declaration order.
    #[serde(default)]
    pub groups: Vec<ArgumentGroup>,
    /// Mutually-exclusive groups in declaration order.
    #[serde(default)]
    pub mutually_exclusive: Vec<ExclusiveGroup>,
    /// Nested subparsers, if any.
    #[serde(default)]
    pub subparsers: Option<SubparserSet>,
}

impl ParserDescription {
    /// Parses a description from its JSON serialization.
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the structural tree for this parser.
    pub fn to_tree(&self) -> GroupNode {
        build_tree(self)
    }
}

fn build_tree(desc: &ParserDescription) -> GroupNode {
    // Mutex members own their conditional; they must not double as plain
    // leaves.
    let exclusive_members: HashSet<String> = desc
        .mutually_exclusive
        .iter()
        .flat_map(|group| group.arguments.iter())
        .map(|spec| spec.normalized_name())
        .collect();

    let keep = |spec: &ArgumentSpec| -> bool {
        if spec.is_positional() {
            debug!(name = %spec.name, "dropping flagless argument");
            return false;
        }
        !exclusive_members.contains(&spec.normalized_name())
    };

    let mut children: Vec<GroupNode> = Vec::new();

    for spec in &desc.arguments {
        if keep(spec) {
            children.push(GroupNode::Leaf(spec.clone()));
        }
    }

    for group in &desc.groups {
        if group.positional {
            debug!(title = %group.title, "dropping positional group");
            continue;
        }
        let members: Vec<GroupNode> = group
            .arguments
            .iter()
            .filter(|spec| keep(spec))
            .cloned()
            .map(GroupNode::Leaf)
            .collect();
        if !members.is_empty() {
            children.push(GroupNode::group(&group.title, members));
        }
    }

    for (i, group) in desc.mutually_exclusive.iter().enumerate() {
        let members: Vec<ArgumentSpec> = group
            .arguments
            .iter()
            .filter(|spec| !spec.is_positional())
            .cloned()
            .collect();
        if !members.is_empty() {
            children.push(GroupNode::exclusive(
                &format!("group_{i}"),
                group.required,
                members,
            ));
        }
    }

    if let Some(subparsers) = &desc.subparsers {
        let id = subparsers.dest.as_deref().unwrap_or("subparser");
        let variants: Vec<(String, GroupNode)> = subparsers
            .variants
            .iter()
            .map(|entry| (entry.name.clone(), build_tree(&entry.parser)))
            .collect();
        if !variants.is_empty() {
            children.push(GroupNode::subparser(id, variants));
        }
    }

    GroupNode::group("", children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(prog: &str) -> String {
        format!(r#"{{"prog": "{prog}"}}"#)
    }

    #[test]
    fn test_minimal_description_parses() {
        let desc = ParserDescription::from_json(&minimal("anvi-interactive")).unwrap();
        assert_eq!(desc.prog, "anvi-interactive");
        assert!(desc.arguments.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = ParserDescription::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn test_positional_groups_and_flagless_arguments_are_dropped() {
        let json = r#"{
            "prog": "tool",
            "arguments": [
                {"name": "input", "metavar": "FILE"},
                {"name": "verbose", "long_flag": "--verbose"}
            ],
            "groups": [
                {"title": "positional arguments", "positional": true,
                 "arguments": [{"name": "target"}]}
            ]
        }"#;
        let tree = ParserDescription::from_json(json).unwrap().to_tree();
        let names: Vec<&str> = tree.leaves().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["verbose"]);
    }

    #[test]
    fn test_exclusive_members_are_removed_from_plain_listings() {
        let json = r#"{
            "prog": "tool",
            "arguments": [
                {"name": "gene-caller-ids", "long_flag": "--gene-caller-ids"},
                {"name": "verbose", "long_flag": "--verbose"}
            ],
            "mutually_exclusive": [
                {"arguments": [
                    {"name": "gene-caller-ids", "long_flag": "--gene-caller-ids"},
                    {"name": "genes-of-interest", "long_flag": "--genes-of-interest"}
                ]}
            ]
        }"#;
        let tree = ParserDescription::from_json(json).unwrap().to_tree();
        let GroupNode::Group { children, .. } = &tree else {
            panic!("root must be a group");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], GroupNode::Leaf(spec) if spec.name == "verbose"));
        match &children[1] {
            GroupNode::Exclusive {
                id,
                required,
                members,
            } => {
                assert_eq!(id, "group_0");
                assert!(!*required);
                assert_eq!(members.len(), 2);
            }
            other => panic!("expected exclusive group, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_subparsers_preserve_declaration_order() {
        let json = r#"{
            "prog": "tool",
            "subparsers": {
                "dest": "mode",
                "variants": [
                    {"name": "quick", "parser": {"prog": "tool quick",
                        "arguments": [{"name": "fast", "long_flag": "--fast"}]}},
                    {"name": "deep", "parser": {"prog": "tool deep",
                        "subparsers": {"variants": [
                            {"name": "scan", "parser": {"prog": "tool deep scan"}}
                        ]}}}
                ]
            }
        }"#;
        let tree = ParserDescription::from_json(json).unwrap().to_tree();
        let GroupNode::Group { children, .. } = &tree else {
            panic!("root must be a group");
        };
        match &children[0] {
            GroupNode::Subparser { id, variants } => {
                assert_eq!(id, "mode");
                assert_eq!(variants[0].name, "quick");
                assert_eq!(variants[1].name, "deep");
                // Inner subparser without a dest falls back to the fixed id.
                let GroupNode::Group { children: inner, .. } = &variants[1].node else {
                    panic!("variant body must be a group");
                };
                assert!(
                    matches!(&inner[0], GroupNode::Subparser { id, .. } if id == "subparser")
                );
            }
            other => panic!("expected subparser node, got {other:?}"),
        }
    }
}
