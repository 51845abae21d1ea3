//! Argument specification types.
//!
//! This module defines [`ArgumentSpec`], the immutable record describing one
//! CLI argument as declared by the wrapped script's argument parser. Specs
//! are produced by the out-of-process extraction step (serialized as JSON)
//! and are read-only afterward; every downstream decision — classification,
//! rendering, command emission — is a pure function of this record.

use serde::{Deserialize, Serialize};

/// Declared value type of an argument.
///
/// Mirrors the `type=` keyword of the source argument parser. Arguments with
/// no declared type default to [`ValueKind::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free-text value (the default).
    #[default]
    Text,
    /// Integer value.
    Int,
    /// Floating-point value.
    Float,
    /// Presence-only flag.
    Flag,
}

/// Declared multiplicity of an argument.
///
/// Mirrors the `nargs=` keyword. Only the shapes that affect rendering are
/// modeled; an absent `nargs` means a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nargs {
    /// Exactly one value.
    #[serde(rename = "1")]
    Single,
    /// Zero or more values (`*`).
    #[serde(rename = "*")]
    ZeroOrMore,
    /// One or more values (`+`).
    #[serde(rename = "+")]
    OneOrMore,
}

/// One CLI argument's declared metadata.
///
/// Created once by the extraction collaborator and never mutated. The
/// builder methods exist for tests and bootstrap specs; deserialization from
/// the extraction JSON is the production path.
///
/// # Examples
///
/// ```
/// use toolgen_core::{ArgumentSpec, ValueKind};
///
/// let spec = ArgumentSpec::new("num-threads")
///     .with_long("--num-threads")
///     .with_kind(ValueKind::Int)
///     .with_metavar("NUM_THREADS")
///     .with_default("4");
///
/// assert_eq!(spec.normalized_name(), "num_threads");
/// assert_eq!(spec.arg_text(), "--num-threads");
/// assert_eq!(spec.label(), "Num Threads");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name as declared (usually the long flag without dashes).
    pub name: String,
    /// Short flag including the leading dash (e.g., `-T`).
    #[serde(default)]
    pub short_flag: Option<String>,
    /// Long flag including the leading dashes (e.g., `--num-threads`).
    #[serde(default)]
    pub long_flag: Option<String>,
    /// Declared metavar, the primary classification key (e.g., `FASTA`).
    #[serde(default)]
    pub metavar: Option<String>,
    /// Declared value type.
    #[serde(default, rename = "type")]
    pub kind: ValueKind,
    /// Declared default value; heterogeneous in the wild, kept as JSON.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Whether the argument is required.
    #[serde(default)]
    pub required: bool,
    /// Declared multiplicity.
    #[serde(default)]
    pub nargs: Option<Nargs>,
    /// Declared choices, in declaration order.
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    /// Free-text help from the source parser.
    #[serde(default)]
    pub help: String,
    /// Parser action keyword (e.g., `store_true`), if any.
    #[serde(default)]
    pub action: Option<String>,
}

impl ArgumentSpec {
    /// Creates a minimal spec with the given declared name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            short_flag: None,
            long_flag: None,
            metavar: None,
            kind: ValueKind::Text,
            default: None,
            required: false,
            nargs: None,
            choices: None,
            help: String::new(),
            action: None,
        }
    }

    /// Sets the short flag.
    pub fn with_short(mut self, flag: &str) -> Self {
        self.short_flag = Some(flag.to_string());
        self
    }

    /// Sets the long flag.
    pub fn with_long(mut self, flag: &str) -> Self {
        self.long_flag = Some(flag.to_string());
        self
    }

    /// Sets the metavar.
    pub fn with_metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    /// Sets the declared value type.
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets a string default value.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(serde_json::Value::String(default.to_string()));
        self
    }

    /// Marks the argument required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the multiplicity.
    pub fn with_nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    /// Sets the choices list.
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Sets the parser action keyword.
    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// Returns the name mapped to the template-safe character set.
    ///
    /// Dashes and any other non-alphanumeric characters become underscores;
    /// this is the addressing name used in both UI descriptors and command
    /// templates, so it must be deterministic.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Returns the flag text to emit on the command line.
    ///
    /// Long form preferred, falls back to short, then empty (positional).
    pub fn arg_text(&self) -> &str {
        self.long_flag
            .as_deref()
            .or(self.short_flag.as_deref())
            .unwrap_or("")
    }

    /// Returns `true` when neither a short nor a long flag was declared.
    pub fn is_positional(&self) -> bool {
        self.short_flag.is_none() && self.long_flag.is_none()
    }

    /// Returns the default rendered as a plain string (empty when absent).
    pub fn default_text(&self) -> String {
        match &self.default {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Coerces the default to a boolean by case-insensitive comparison
    /// against the literal `"true"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolgen_core::ArgumentSpec;
    ///
    /// assert!(ArgumentSpec::new("x").with_default("True").default_is_true());
    /// assert!(!ArgumentSpec::new("x").with_default("False").default_is_true());
    /// assert!(!ArgumentSpec::new("x").default_is_true());
    /// ```
    pub fn default_is_true(&self) -> bool {
        match &self.default {
            Some(serde_json::Value::Bool(b)) => *b,
            _ => self.default_text().eq_ignore_ascii_case("true"),
        }
    }

    /// Returns a display label derived from the normalized name.
    pub fn label(&self) -> String {
        self.normalized_name()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns the help text with newlines, tabs, and duplicate spaces
    /// collapsed to single spaces.
    pub fn cleaned_help(&self) -> String {
        let mut help = self
            .help
            .replace(['\n', '\r', '\t'], " ")
            .trim()
            .to_string();
        while help.contains("  ") {
            help = help.replace("  ", " ");
        }
        help
    }
}

/// Maps a declared argument name onto the template-safe character set.
///
/// # Examples
///
/// ```
/// use toolgen_core::normalize_name;
///
/// assert_eq!(normalize_name("contigs-db"), "contigs_db");
/// assert_eq!(normalize_name("e-value"), "e_value");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
