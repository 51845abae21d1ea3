//! Cheetah command-fragment mini-language.
//!
//! Galaxy command blocks are Cheetah templates. Their conditional surface —
//! `#if` / `#elif` / `#else` / `#end if` and `${variable.path}` substitution
//! — is a fixed wire format consumed by the downstream renderer, so fragments
//! are built here as a small AST and serialized only at the boundary. This
//! removes the quoting and indentation bugs that ad-hoc string concatenation
//! invites, and it lets the assembler feed one [`VarPath`] value into both
//! the UI descriptor and the command template so the two can never diverge.
//!
//! # Examples
//!
//! ```
//! use toolgen_core::cheetah::{Cond, Fragment, VarPath};
//!
//! let path = VarPath::root().child("settings").child("threshold");
//! let frag = Fragment::guard(
//!     Cond::non_empty_str(path.clone()),
//!     vec![Fragment::line(format!("--threshold '{}'", path.subst()))],
//! );
//!
//! assert_eq!(
//!     frag.render(0),
//!     "#if $str($settings.threshold):\n    --threshold '${settings.threshold}'\n#end if\n"
//! );
//! ```

use std::fmt;

/// Indentation unit used when serializing nested fragments.
const INDENT: &str = "    ";

/// Dotted addressing path shared between UI descriptors and command
/// templates.
///
/// A `VarPath` names one node's position in the structural tree. The
/// assembler derives both the conditional nesting of the UI fragment and
/// every `${...}` reference in the command fragment from the same `VarPath`
/// values, which is what keeps the two representations in lock-step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VarPath(Vec<String>);

impl VarPath {
    /// The empty root path.
    pub fn root() -> Self {
        VarPath(Vec::new())
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        VarPath(segments)
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders as a bare `$path` reference (guard position).
    pub fn var(&self) -> String {
        format!("${self}")
    }

    /// Renders as a `${path}` substitution (argument position).
    pub fn subst(&self) -> String {
        format!("${{{self}}}")
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// A guard condition in the mini-language.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// `$path` — dataset-style truthiness.
    Truthy(VarPath),
    /// `$str($path)` — non-empty string test for scalar values.
    NonEmptyStr(VarPath),
    /// `$str($path) == 'value'` — selector equality.
    StrEq(VarPath, String),
    /// Verbatim condition text (loop-index tests and similar).
    Raw(String),
}

impl Cond {
    /// Truthiness guard.
    pub fn truthy(path: VarPath) -> Self {
        Cond::Truthy(path)
    }

    /// Non-empty-string guard.
    pub fn non_empty_str(path: VarPath) -> Self {
        Cond::NonEmptyStr(path)
    }

    /// Selector-equality guard.
    pub fn str_eq(path: VarPath, value: &str) -> Self {
        Cond::StrEq(path, value.to_string())
    }

    /// Verbatim condition text.
    pub fn raw(text: &str) -> Self {
        Cond::Raw(text.to_string())
    }

    fn render(&self) -> String {
        match self {
            Cond::Truthy(path) => path.var(),
            Cond::NonEmptyStr(path) => format!("$str({})", path.var()),
            Cond::StrEq(path, value) => format!("$str({}) == '{}'", path.var(), value),
            Cond::Raw(text) => text.clone(),
        }
    }
}

/// One node of a command fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A literal line, emitted at the current indentation depth.
    Line(String),
    /// An `#if`/`#elif`/`#else` chain.
    If {
        /// `(condition, body)` arms; the first is `#if`, the rest `#elif`.
        arms: Vec<(Cond, Vec<Fragment>)>,
        /// Optional `#else` body.
        otherwise: Option<Vec<Fragment>>,
    },
    /// A `#for $var in $expr:` loop.
    For {
        /// Loop variable name, without the leading `$`.
        var: String,
        /// Iterated expression, without the leading `$`.
        expr: String,
        /// Loop body.
        body: Vec<Fragment>,
    },
}

impl Fragment {
    /// A literal line.
    pub fn line(text: impl Into<String>) -> Self {
        Fragment::Line(text.into())
    }

    /// A single-arm `#if` block.
    pub fn guard(cond: Cond, body: Vec<Fragment>) -> Self {
        Fragment::If {
            arms: vec![(cond, body)],
            otherwise: None,
        }
    }

    /// A single-arm `#if` block with an `#else` body.
    pub fn guard_else(cond: Cond, body: Vec<Fragment>, otherwise: Vec<Fragment>) -> Self {
        Fragment::If {
            arms: vec![(cond, body)],
            otherwise: Some(otherwise),
        }
    }

    /// A multi-arm selector chain (`#if`/`#elif`...).
    pub fn chain(arms: Vec<(Cond, Vec<Fragment>)>) -> Self {
        Fragment::If {
            arms,
            otherwise: None,
        }
    }

    /// Serializes this fragment at the given nesting depth.
    pub fn render(&self, depth: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, depth);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        match self {
            Fragment::Line(text) => {
                out.push_str(&pad);
                out.push_str(text);
                out.push('\n');
            }
            Fragment::If { arms, otherwise } => {
                for (i, (cond, body)) in arms.iter().enumerate() {
                    let keyword = if i == 0 { "#if" } else { "#elif" };
                    out.push_str(&pad);
                    out.push_str(keyword);
                    out.push(' ');
                    out.push_str(&cond.render());
                    out.push_str(":\n");
                    render_all_into(body, out, depth + 1);
                }
                if let Some(body) = otherwise {
                    out.push_str(&pad);
                    out.push_str("#else\n");
                    render_all_into(body, out, depth + 1);
                }
                out.push_str(&pad);
                out.push_str("#end if\n");
            }
            Fragment::For { var, expr, body } => {
                out.push_str(&pad);
                out.push_str(&format!("#for ${var} in ${expr}:\n"));
                render_all_into(body, out, depth + 1);
                out.push_str(&pad);
                out.push_str("#end for\n");
            }
        }
    }
}

/// Serializes a fragment sequence at the given nesting depth.
pub fn render_all(fragments: &[Fragment], depth: usize) -> String {
    let mut out = String::new();
    render_all_into(fragments, &mut out, depth);
    out
}

fn render_all_into(fragments: &[Fragment], out: &mut String, depth: usize) {
    for fragment in fragments {
        fragment.render_into(out, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_path_rendering() {
        let path = VarPath::root().child("mode").child("selector");
        assert_eq!(path.to_string(), "mode.selector");
        assert_eq!(path.var(), "$mode.selector");
        assert_eq!(path.subst(), "${mode.selector}");
        assert!(VarPath::root().is_root());
    }

    #[test]
    fn test_guard_renders_if_block() {
        let path = VarPath::root().child("min_coverage");
        let frag = Fragment::guard(
            Cond::non_empty_str(path.clone()),
            vec![Fragment::line(format!("--min-coverage '{}'", path.subst()))],
        );
        assert_eq!(
            frag.render(0),
            "#if $str($min_coverage):\n    --min-coverage '${min_coverage}'\n#end if\n"
        );
    }

    #[test]
    fn test_chain_renders_elif_arms() {
        let selector = VarPath::root().child("mode").child("selector");
        let frag = Fragment::chain(vec![
            (
                Cond::str_eq(selector.clone(), "fast"),
                vec![Fragment::line("fast")],
            ),
            (
                Cond::str_eq(selector.clone(), "slow"),
                vec![Fragment::line("slow")],
            ),
        ]);
        let text = frag.render(0);
        assert!(text.starts_with("#if $str($mode.selector) == 'fast':\n"));
        assert!(text.contains("#elif $str($mode.selector) == 'slow':\n"));
        assert!(text.ends_with("#end if\n"));
    }

    #[test]
    fn test_nested_blocks_indent_by_depth() {
        let inner = Fragment::guard(
            Cond::truthy(VarPath::root().child("x")),
            vec![Fragment::line("--x")],
        );
        let outer = Fragment::guard(
            Cond::truthy(VarPath::root().child("y")),
            vec![inner],
        );
        assert_eq!(
            outer.render(0),
            "#if $y:\n    #if $x:\n        --x\n    #end if\n#end if\n"
        );
    }

    #[test]
    fn test_for_loop_rendering() {
        let frag = Fragment::For {
            var: "gxy_item".to_string(),
            expr: "inputs".to_string(),
            body: vec![Fragment::line("--input '${gxy_item}'")],
        };
        assert_eq!(
            frag.render(0),
            "#for $gxy_item in $inputs:\n    --input '${gxy_item}'\n#end for\n"
        );
    }
}
