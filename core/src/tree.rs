//! Structural argument tree.
//!
//! The extraction step normalizes a (possibly nested) argument-parser
//! description into this immutable [`GroupNode`] tree. The assembler walks
//! the tree exactly once; nothing mutates it afterward. Every node has a
//! unique path from the root, which doubles as its UI addressing key and its
//! command-template reference key.

use crate::ArgumentSpec;

/// A node in the structural argument tree.
///
/// # Examples
///
/// ```
/// use toolgen_core::{ArgumentSpec, GroupNode};
///
/// let tree = GroupNode::group(
///     "",
///     vec![
///         GroupNode::Leaf(ArgumentSpec::new("verbose").with_long("--verbose")),
///         GroupNode::subparser(
///             "mode",
///             vec![(
///                 "quick".to_string(),
///                 GroupNode::group("", vec![]),
///             )],
///         ),
///     ],
/// );
/// assert_eq!(tree.leaves().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum GroupNode {
    /// One argument.
    Leaf(ArgumentSpec),
    /// A named collection; structurally transparent in the UI.
    Group {
        /// Group title from the source parser (may be empty for the root).
        title: String,
        /// Children in declaration order.
        children: Vec<GroupNode>,
    },
    /// At most one member is selected at runtime.
    Exclusive {
        /// Scope-unique identifier, used as the conditional's UI name.
        id: String,
        /// Whether the source parser requires one member to be chosen.
        /// Optional groups gain a no-selection branch.
        required: bool,
        /// Member arguments in declaration order.
        members: Vec<ArgumentSpec>,
    },
    /// Exactly one named variant is active at runtime.
    Subparser {
        /// Scope-unique identifier, used as the conditional's UI name.
        id: String,
        /// Variants in discovery order; never reordered.
        variants: Vec<SubparserVariant>,
    },
}

/// One named variant of a [`GroupNode::Subparser`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubparserVariant {
    /// Variant name as declared (the subcommand token).
    pub name: String,
    /// Subtree for this variant.
    pub node: GroupNode,
}

impl GroupNode {
    /// Creates a plain group node.
    pub fn group(title: &str, children: Vec<GroupNode>) -> Self {
        GroupNode::Group {
            title: title.to_string(),
            children,
        }
    }

    /// Creates a mutually-exclusive group node.
    pub fn exclusive(id: &str, required: bool, members: Vec<ArgumentSpec>) -> Self {
        GroupNode::Exclusive {
            id: id.to_string(),
            required,
            members,
        }
    }

    /// Creates a subparser node from `(variant name, subtree)` pairs.
    pub fn subparser(id: &str, variants: Vec<(String, GroupNode)>) -> Self {
        GroupNode::Subparser {
            id: id.to_string(),
            variants: variants
                .into_iter()
                .map(|(name, node)| SubparserVariant { name, node })
                .collect(),
        }
    }

    /// Collects every [`ArgumentSpec`] in the tree, depth-first, in
    /// declaration order. Exclusive members and subparser descendants are
    /// included.
    pub fn leaves(&self) -> Vec<&ArgumentSpec> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ArgumentSpec>) {
        match self {
            GroupNode::Leaf(spec) => out.push(spec),
            GroupNode::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            GroupNode::Exclusive { members, .. } => out.extend(members.iter()),
            GroupNode::Subparser { variants, .. } => {
                for variant in variants {
                    variant.node.collect_leaves(out);
                }
            }
        }
    }
}
