//! Structural assembly.
//!
//! One depth-first walk over the [`GroupNode`] tree produces the three
//! paired faces of a wrapper document: UI input descriptors, output
//! descriptors, and the command template. Both sides of every pairing are
//! derived from the same `VarPath` value at the same tree position, so a UI
//! element and its command reference cannot drift apart.
//!
//! Selector conditionals (subparsers and mutually-exclusive groups) nest the
//! UI inside `<conditional>`/`<when>` elements and the command inside
//! `#if`/`#elif` chains keyed on `$str( $<path>.selector ) == '<variant>'`,
//! one indentation level per nesting depth.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use toolgen_core::cheetah::{render_all, Cond, Fragment, VarPath};
use toolgen_core::xml::quote_attr;
use toolgen_core::{
    ArgumentSpec, ClassifierTables, ClassifyError, GroupNode, Parameter,
};

/// Output descriptor for the captured tool log.
const LOG_OUTPUT_XML: &str =
    r#"<data name="GALAXY_TOOL_LOG" format="txt" label="${tool.name} on ${on_string}: Log"/>"#;

/// Assembly failure.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Two surviving arguments normalize to the same addressing name within
    /// one conditional scope. Rendering would silently alias them, so this
    /// stops the run before any output.
    #[error("duplicate parameter name '{name}' after normalization")]
    DuplicateName {
        /// The colliding normalized name.
        name: String,
    },
    /// A leaf failed classification.
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// The assembled faces of one wrapper document.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    /// UI input descriptors, one (possibly multiline) element per entry.
    pub inputs: Vec<String>,
    /// Output descriptors; the log dataset is always last.
    pub outputs: Vec<String>,
    /// The complete command template.
    pub command: String,
}

#[derive(Default)]
struct Walk {
    inputs: Vec<String>,
    outputs: Vec<String>,
    cmd: Vec<Fragment>,
    pre: Vec<Fragment>,
    post: Vec<Fragment>,
}

impl Walk {
    fn absorb(&mut self, other: Walk) {
        self.inputs.extend(other.inputs);
        self.outputs.extend(other.outputs);
        self.cmd.extend(other.cmd);
        self.pre.extend(other.pre);
        self.post.extend(other.post);
    }
}

/// Assembles the wrapper faces for one tool.
///
/// `prog` is the invocation token emitted as the first command line. The
/// walk is pure; identical inputs produce byte-identical output.
pub fn assemble(
    prog: &str,
    tree: &GroupNode,
    tables: &ClassifierTables,
) -> Result<Assembled, AssembleError> {
    let mut seen = HashSet::new();
    check_unique(tree, tables, &mut seen)?;

    let walk = walk_node(tree, &VarPath::root(), tables)?;
    debug!(
        prog,
        inputs = walk.inputs.len(),
        outputs = walk.outputs.len(),
        "assembled tool faces"
    );

    let mut outputs = walk.outputs;
    outputs.push(LOG_OUTPUT_XML.to_string());

    Ok(Assembled {
        inputs: walk.inputs,
        outputs,
        command: join_command(prog, &walk.cmd, &walk.pre, &walk.post),
    })
}

/// Enforces normalized-name uniqueness per conditional scope. Subparser
/// variants open fresh scopes; everything else shares its parent's.
fn check_unique(
    node: &GroupNode,
    tables: &ClassifierTables,
    seen: &mut HashSet<String>,
) -> Result<(), AssembleError> {
    let mut check = |spec: &ArgumentSpec| -> Result<(), AssembleError> {
        if tables.is_skipped(spec) {
            return Ok(());
        }
        let name = spec.normalized_name();
        if !seen.insert(name.clone()) {
            return Err(AssembleError::DuplicateName { name });
        }
        Ok(())
    };

    match node {
        GroupNode::Leaf(spec) => check(spec)?,
        GroupNode::Group { children, .. } => {
            for child in children {
                check_unique(child, tables, seen)?;
            }
        }
        GroupNode::Exclusive { members, .. } => {
            for member in members {
                check(member)?;
            }
        }
        GroupNode::Subparser { variants, .. } => {
            for variant in variants {
                let mut scope = HashSet::new();
                check_unique(&variant.node, tables, &mut scope)?;
            }
        }
    }
    Ok(())
}

fn walk_node(
    node: &GroupNode,
    path: &VarPath,
    tables: &ClassifierTables,
) -> Result<Walk, AssembleError> {
    let mut walk = Walk::default();

    match node {
        GroupNode::Leaf(spec) => {
            if tables.is_skipped(spec) {
                return Ok(walk);
            }
            absorb_parameter(&mut walk, &tables.classify(spec)?, path);
        }
        GroupNode::Group { children, .. } => {
            for child in children {
                walk.absorb(walk_node(child, path, tables)?);
            }
        }
        GroupNode::Exclusive {
            id,
            required,
            members,
        } => {
            let inner = path.child(id);
            let selector = inner.child("selector");

            // Skip-listed members vanish from every face, including the
            // selector options.
            let mut member_walks = Vec::with_capacity(members.len() + 1);
            if !*required {
                member_walks.push(("none".to_string(), Walk::default()));
            }
            for member in members {
                if tables.is_skipped(member) {
                    continue;
                }
                let mut member_walk = Walk::default();
                absorb_parameter(&mut member_walk, &tables.classify(member)?, &inner);
                member_walks.push((member.normalized_name(), member_walk));
            }

            // All members skip-listed: nothing left to choose between.
            if member_walks.iter().all(|(_, w)| w.inputs.is_empty() && w.cmd.is_empty()) {
                return Ok(walk);
            }

            walk.inputs.push(selector_conditional(
                id,
                &format!("Choose {id}"),
                &member_walks,
            ));
            absorb_branches(&mut walk, &selector, member_walks, None);
        }
        GroupNode::Subparser { id, variants } => {
            let inner = path.child(id);
            let selector = inner.child("selector");

            let mut variant_walks = Vec::with_capacity(variants.len());
            for variant in variants {
                let sub = walk_node(&variant.node, &inner, tables)?;
                variant_walks.push((variant.name.clone(), sub));
            }

            walk.inputs.push(selector_conditional(
                id,
                &format!("Select {id}"),
                &variant_walks,
            ));
            absorb_branches(&mut walk, &selector, variant_walks, Some(()));
        }
    }

    Ok(walk)
}

fn absorb_parameter(walk: &mut Walk, param: &Parameter, path: &VarPath) {
    if param.is_input() {
        let xml = param.to_xml_param();
        if !xml.is_empty() {
            walk.inputs.push(xml);
        }
    }
    if param.is_output() {
        walk.outputs.push(param.to_xml_output());
    }
    walk.cmd.extend(param.to_cmd_line(path));
    walk.pre.extend(param.pre_cmd_line(path));
    walk.post.extend(param.post_cmd_line(path));
}

/// Builds the `<conditional>` element for a selector node. Each branch's
/// input descriptors nest inside its `<when>` element, one level deeper.
fn selector_conditional(id: &str, label: &str, branches: &[(String, Walk)]) -> String {
    let mut xml = String::new();
    xml.push_str(&format!("<conditional name={}>\n", quote_attr(id)));
    xml.push_str(&format!(
        "    <param name=\"selector\" type=\"select\" label={}>\n",
        quote_attr(label)
    ));
    for (value, _) in branches {
        xml.push_str(&format!(
            "        <option value={}>{}</option>\n",
            quote_attr(value),
            toolgen_core::xml::escape_text(value)
        ));
    }
    xml.push_str("    </param>\n");
    for (value, branch) in branches {
        xml.push_str(&format!("    <when value={}>\n", quote_attr(value)));
        for input in &branch.inputs {
            xml.push_str(&indent_block(input, 2));
            xml.push('\n');
        }
        xml.push_str("    </when>\n");
    }
    xml.push_str("</conditional>");
    xml
}

/// Folds branch walks into the parent: the command side becomes an
/// `#if`/`#elif` chain on the selector, outputs stay flat, and staging
/// fragments are guarded so the surrounding `&&` chain never goes empty.
/// `emit_token` adds the branch name as the first command line (subcommand
/// dispatch).
fn absorb_branches(
    walk: &mut Walk,
    selector: &VarPath,
    branches: Vec<(String, Walk)>,
    emit_token: Option<()>,
) {
    let mut cmd_arms = Vec::new();
    let mut pre_arms = Vec::new();
    let mut post_arms = Vec::new();

    for (value, branch) in branches {
        let cond = Cond::str_eq(selector.clone(), &value);

        let mut body = Vec::new();
        if emit_token.is_some() {
            body.push(Fragment::line(value.clone()));
        }
        body.extend(branch.cmd);
        if !body.is_empty() {
            cmd_arms.push((cond.clone(), body));
        }
        if !branch.pre.is_empty() {
            pre_arms.push(Fragment::guard_else(
                cond.clone(),
                branch.pre,
                vec![Fragment::line("echo ''")],
            ));
        }
        if !branch.post.is_empty() {
            post_arms.push(Fragment::guard_else(
                cond,
                branch.post,
                vec![Fragment::line("echo ''")],
            ));
        }
        walk.outputs.extend(branch.outputs);
    }

    if !cmd_arms.is_empty() {
        walk.cmd.push(Fragment::chain(cmd_arms));
    }
    walk.pre.extend(pre_arms);
    walk.post.extend(post_arms);
}

fn indent_block(text: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins the command faces: pre-staging, invocation, log redirect,
/// post-staging, with `&&` separators between stages.
fn join_command(prog: &str, cmd: &[Fragment], pre: &[Fragment], post: &[Fragment]) -> String {
    let join_stage = |fragments: &[Fragment]| -> String {
        fragments
            .iter()
            .map(|f| f.render(0).trim_end_matches('\n').to_string())
            .collect::<Vec<_>>()
            .join("\n && \n")
    };

    let mut command = String::new();
    if !pre.is_empty() {
        command.push_str(&join_stage(pre));
        command.push_str("\n &&\n ");
    }
    command.push_str(prog);
    command.push('\n');
    command.push_str(&render_all(cmd, 0));
    command.push_str("&> '${GALAXY_TOOL_LOG}'\n");
    if !post.is_empty() {
        command.push_str(" &&\n ");
        command.push_str(&join_stage(post));
        command.push('\n');
    }
    command
}
