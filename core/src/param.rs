//! The Parameter model.
//!
//! A [`Parameter`] is the classified, renderable behavior object derived from
//! one [`ArgumentSpec`]. Rendering policy lives in data — the [`ParamKind`]
//! sum type and its [`BundleLayout`] / [`DataRole`] axes — and is dispatched
//! by pattern match. Each parameter knows how to render itself as a UI input
//! element, an output descriptor, a command-line fragment, and pre/post
//! file-staging fragments.
//!
//! Parameters are immutable after construction;
//! [`with_overrides`](Parameter::with_overrides) produces a new instance
//! rather than mutating in place.
//!
//! # Examples
//!
//! ```
//! use toolgen_core::{ArgumentSpec, Parameter, ParamKind, ScalarKind};
//! use toolgen_core::cheetah::{render_all, VarPath};
//!
//! let spec = ArgumentSpec::new("min-coverage").with_long("--min-coverage");
//! let param = Parameter::new(spec, ParamKind::Scalar(ScalarKind::Integer));
//!
//! let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
//! assert_eq!(
//!     cmd,
//!     "#if $str($min_coverage):\n    --min-coverage '${min_coverage}'\n#end if\n"
//! );
//! ```

use crate::cheetah::{Cond, Fragment, VarPath};
use crate::xml::quote_attr;
use crate::{ArgumentSpec, Nargs};

/// Help-text note appended to collection inputs.
const COLLECTION_NOTE_USER: &str = "**NB: This requires a collection of type list for input. See https://galaxyproject.org/tutorials/collections/#a-simple-collection-example for more information.**";

/// Comment emitted next to collection inputs.
const COLLECTION_NOTE: &str = "<!-- Unfortunately, we are forced to use an explicit collection input here, see e.g.: https://github.com/galaxyproject/galaxy/issues/7392 -->";

/// Name prefixes that mark an argument as producing output.
const OUTPUT_NAME_PREFIXES: [&str; 2] = ["output", "export"];

/// Scalar UI input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Free-text input.
    Text,
    /// Integer input.
    Integer,
    /// Floating-point input.
    Float,
}

impl ScalarKind {
    fn ui_type(self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
        }
    }
}

/// Direction of a file-backed parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRole {
    /// Read-only input dataset.
    Input,
    /// Pure output dataset.
    Output,
    /// Dataset that is read and modified in place; renders a paired
    /// `input_<name>` UI field and `output_<name>` output descriptor with a
    /// copy pre-stage between their staging areas.
    InOut,
}

/// Physical on-disk shape of a file-backed parameter.
///
/// The platform represents composite, directory-shaped artifacts as opaque
/// handles with an associated staging area (`extra_files_path`); these
/// layouts describe where the wrapped tool's actual file lives relative to
/// that handle and which staging commands are needed around the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleLayout {
    /// The dataset file itself is the artifact.
    PlainFile,
    /// The artifact is the whole staging directory.
    ExtraFiles,
    /// A fixed-name file inside the staging directory (e.g. `PROFILE.db`).
    ExtraFilesNamed(String),
    /// A file inside the staging directory whose name is carried in dataset
    /// metadata.
    ExtraFilesBasename,
    /// A BAM file that must be symlinked next to its `.bai` index under a
    /// predictable local name.
    BamWithIndex,
    /// A literal filename prefix; outputs are gathered into the staging
    /// directory after the run.
    PrefixScatter,
}

/// Behavior data for file-backed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataParam {
    /// Platform datatype (comma-separated list accepted on inputs).
    pub format: String,
    /// Direction.
    pub role: DataRole,
    /// On-disk shape.
    pub layout: BundleLayout,
    /// Whether multiple datasets may be supplied.
    pub multiple: bool,
}

/// The closed set of parameter behavior variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Direct value substitution, typed input.
    Scalar(ScalarKind),
    /// Checkbox; emits the flag literally when checked.
    Boolean,
    /// No UI; the flag is always emitted.
    AlwaysTrue,
    /// No UI; a fixed literal value is always emitted.
    AlwaysValue(String),
    /// No UI, no command-line emission.
    Discard,
    /// No UI; resolved from the runtime slot count, never from user input.
    Slots,
    /// File-backed input/output dataset.
    Data(DataParam),
    /// Toggle between a literal delimited list and a file reference.
    ListOrFile {
        /// Datatype of the file branch.
        format: String,
    },
}

/// Overrides applied by [`Parameter::with_overrides`].
#[derive(Debug, Clone, Default)]
pub struct SpecOverrides {
    /// Replacement declared name.
    pub name: Option<String>,
    /// Replacement short flag.
    pub short_flag: Option<String>,
    /// Replacement long flag.
    pub long_flag: Option<String>,
    /// Replacement required-ness.
    pub required: Option<bool>,
    /// Replacement help text.
    pub help: Option<String>,
}

/// The classified, renderable behavior object for one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The originating argument specification.
    pub spec: ArgumentSpec,
    /// The classified behavior variant.
    pub kind: ParamKind,
}

impl Parameter {
    /// Creates a parameter from a spec and a classified kind.
    pub fn new(spec: ArgumentSpec, kind: ParamKind) -> Self {
        Parameter { spec, kind }
    }

    /// Returns a new parameter with the given overrides merged in.
    ///
    /// The original is never mutated.
    pub fn with_overrides(&self, overrides: SpecOverrides) -> Self {
        let mut spec = self.spec.clone();
        if let Some(name) = overrides.name {
            spec.name = name;
        }
        if let Some(short) = overrides.short_flag {
            spec.short_flag = Some(short);
        }
        if let Some(long) = overrides.long_flag {
            spec.long_flag = Some(long);
        }
        if let Some(required) = overrides.required {
            spec.required = required;
        }
        if let Some(help) = overrides.help {
            spec.help = help;
        }
        Parameter {
            spec,
            kind: self.kind.clone(),
        }
    }

    /// The canonical (normalized) parameter name.
    pub fn name(&self) -> String {
        self.spec.normalized_name()
    }

    /// Whether the argument must be supplied.
    pub fn required(&self) -> bool {
        self.spec.required
    }

    /// Whether this parameter renders a UI input element.
    pub fn is_input(&self) -> bool {
        match &self.kind {
            ParamKind::Scalar(_) | ParamKind::Boolean | ParamKind::ListOrFile { .. } => true,
            ParamKind::Data(data) => matches!(data.role, DataRole::Input | DataRole::InOut),
            _ => false,
        }
    }

    /// Whether this parameter contributes an output descriptor.
    pub fn is_output(&self) -> bool {
        match &self.kind {
            ParamKind::Data(data) => matches!(data.role, DataRole::Output | DataRole::InOut),
            _ => false,
        }
    }

    /// UI-side name: `input_<name>` for in/out datasets, otherwise the name.
    pub fn input_name(&self) -> String {
        match &self.kind {
            ParamKind::Data(data) if data.role == DataRole::InOut => {
                format!("input_{}", self.name())
            }
            _ => self.name(),
        }
    }

    /// Output-side name: `output_<name>` for in/out datasets, otherwise the
    /// name.
    pub fn output_name(&self) -> String {
        match &self.kind {
            ParamKind::Data(data) if data.role == DataRole::InOut => {
                format!("output_{}", self.name())
            }
            _ => self.name(),
        }
    }

    fn optional_attr(&self) -> &'static str {
        if self.spec.required { "False" } else { "True" }
    }

    fn argument_attr(&self) -> String {
        quote_attr(self.spec.long_flag.as_deref().unwrap_or(""))
    }

    fn label_attr(&self) -> String {
        quote_attr(&self.spec.label())
    }

    fn help_attr(&self) -> String {
        quote_attr(&self.spec.cleaned_help())
    }

    fn output_label_attr(&self) -> String {
        quote_attr(&format!(
            "${{tool.name}} on ${{on_string}}: {}",
            self.spec.label()
        ))
    }

    /// Renders the UI input descriptor. Empty when no UI element is needed.
    pub fn to_xml_param(&self) -> String {
        match &self.kind {
            ParamKind::AlwaysTrue
            | ParamKind::AlwaysValue(_)
            | ParamKind::Discard
            | ParamKind::Slots => String::new(),
            ParamKind::Scalar(kind) => self.scalar_xml(*kind),
            ParamKind::Boolean => self.boolean_xml(),
            ParamKind::Data(data) => self.data_input_xml(data),
            ParamKind::ListOrFile { format } => self.list_or_file_xml(format),
        }
    }

    fn scalar_xml(&self, kind: ScalarKind) -> String {
        if let Some(choices) = &self.spec.choices {
            let default = self.spec.default_text();
            let options: Vec<String> = choices
                .iter()
                .map(|choice| {
                    let selected = if *choice == default {
                        " selected=\"True\""
                    } else {
                        ""
                    };
                    format!(
                        "    <option value={}{selected}>{}</option>",
                        quote_attr(choice),
                        crate::xml::escape_text(choice)
                    )
                })
                .collect();
            return format!(
                "<param name={} type=\"select\" label={} optional=\"{}\" argument={} help={}>\n{}\n</param>",
                quote_attr(&self.name()),
                self.label_attr(),
                self.optional_attr(),
                self.argument_attr(),
                self.help_attr(),
                options.join("\n"),
            );
        }

        format!(
            "<param name={} type=\"{}\" label={} value={} optional=\"{}\" argument={} help={}/>",
            quote_attr(&self.name()),
            kind.ui_type(),
            self.label_attr(),
            quote_attr(&self.spec.default_text()),
            self.optional_attr(),
            self.argument_attr(),
            self.help_attr(),
        )
    }

    fn boolean_xml(&self) -> String {
        let checked = if self.spec.default_is_true() {
            "true"
        } else {
            "false"
        };
        format!(
            "<param name={} type=\"boolean\" label={} truevalue=\"{}\" falsevalue=\"\" checked=\"{}\" optional=\"{}\" argument={} help={}/>",
            quote_attr(&self.name()),
            self.label_attr(),
            self.spec.arg_text(),
            checked,
            self.optional_attr(),
            self.argument_attr(),
            self.help_attr(),
        )
    }

    fn data_input_xml(&self, data: &DataParam) -> String {
        if data.role == DataRole::Output {
            return String::new();
        }

        if data.role == DataRole::InOut && data.multiple {
            // Galaxy cannot infer a list structure for paired in/out
            // datasets, so an explicit collection input is required.
            let mut help = self.spec.cleaned_help();
            if !help.is_empty() {
                help.push(' ');
            }
            help.push_str(COLLECTION_NOTE_USER);
            return format!(
                "<param name={} type=\"data_collection\" collection_type=\"list\" label={} format=\"{}\" optional=\"{}\" argument={} help={}/>{}",
                quote_attr(&self.input_name()),
                self.label_attr(),
                data.format,
                self.optional_attr(),
                self.argument_attr(),
                quote_attr(&help),
                COLLECTION_NOTE,
            );
        }

        format!(
            "<param name={} type=\"data\" label={} format=\"{}\" optional=\"{}\" multiple=\"{}\" argument={} help={}/>",
            quote_attr(&self.input_name()),
            self.label_attr(),
            data.format,
            self.optional_attr(),
            if data.multiple { "True" } else { "False" },
            self.argument_attr(),
            self.help_attr(),
        )
    }

    fn list_or_file_xml(&self, format: &str) -> String {
        let name = self.name();
        let cond_name = format!("{name}_source");
        let selector_name = format!("{name}_source_selector");
        format!(
            "<conditional name={}>\n    <param name={} type=\"select\" label=\"Use a file or list\">\n        <option value=\"file\" selected=\"True\">Values from File</option>\n        <option value=\"list\">Values from List</option>\n    </param>\n    <when value=\"file\">\n        <param name={} type=\"data\" label={} format=\"{}\" optional=\"{}\" argument={} help={}/>\n    </when>\n    <when value=\"list\">\n        <param name={} type=\"text\" label={} value={} optional=\"{}\" argument={} help={}/>\n    </when>\n</conditional>",
            quote_attr(&cond_name),
            quote_attr(&selector_name),
            quote_attr(&name),
            self.label_attr(),
            format,
            self.optional_attr(),
            self.argument_attr(),
            self.help_attr(),
            quote_attr(&name),
            self.label_attr(),
            quote_attr(&self.spec.default_text()),
            self.optional_attr(),
            self.argument_attr(),
            self.help_attr(),
        )
    }

    /// Renders the output descriptor. Empty for non-output parameters.
    pub fn to_xml_output(&self) -> String {
        let ParamKind::Data(data) = &self.kind else {
            return String::new();
        };
        if !self.is_output() {
            return String::new();
        }

        // Only the first format is meaningful on an output descriptor.
        let format = data.format.split(',').next().unwrap_or("data");
        let sources = if data.role == DataRole::InOut {
            format!(
                " format_source={} metadata_source={}",
                quote_attr(&self.input_name()),
                quote_attr(&self.input_name())
            )
        } else {
            String::new()
        };

        if data.role == DataRole::InOut && data.multiple {
            return format!(
                "<collection name={} type=\"list\" format=\"{}\"{} structured_like={} inherit_format=\"True\" label={}/>",
                quote_attr(&self.output_name()),
                format,
                sources,
                quote_attr(&self.input_name()),
                self.output_label_attr(),
            );
        }

        format!(
            "<data name={} format=\"{}\"{} label={}/>",
            quote_attr(&self.output_name()),
            format,
            sources,
            self.output_label_attr(),
        )
    }

    /// Emits the command-line fragment, addressed under `prefix`.
    pub fn to_cmd_line(&self, prefix: &VarPath) -> Vec<Fragment> {
        let arg = self.spec.arg_text().to_string();
        match &self.kind {
            ParamKind::Discard => Vec::new(),
            ParamKind::AlwaysTrue => vec![Fragment::line(arg)],
            ParamKind::AlwaysValue(value) => vec![Fragment::line(format!("{arg} '{value}'"))],
            ParamKind::Slots => {
                vec![Fragment::line(format!(
                    "{arg} \"\\${{GALAXY_SLOTS:-1}}\""
                ))]
            }
            ParamKind::Boolean => {
                let path = prefix.child(&self.name());
                vec![Fragment::line(path.subst())]
            }
            ParamKind::Scalar(_) => {
                let path = prefix.child(&self.name());
                let line = Fragment::line(format!("{arg} '{}'", path.subst()));
                if self.spec.required {
                    vec![line]
                } else {
                    vec![Fragment::guard(Cond::non_empty_str(path), vec![line])]
                }
            }
            ParamKind::ListOrFile { .. } => self.list_or_file_cmd(prefix, &arg),
            ParamKind::Data(data) => self.data_cmd(prefix, data, &arg),
        }
    }

    fn list_or_file_cmd(&self, prefix: &VarPath, arg: &str) -> Vec<Fragment> {
        let name = self.name();
        let cond = prefix.child(&format!("{name}_source"));
        let selector = cond.child(&format!("{name}_source_selector"));
        let value = cond.child(&name);
        let line = Fragment::line(format!("{arg} '{}'", value.subst()));
        vec![Fragment::guard_else(
            Cond::str_eq(selector, "file"),
            vec![Fragment::guard(Cond::truthy(value.clone()), vec![line.clone()])],
            vec![Fragment::guard(Cond::non_empty_str(value), vec![line])],
        )]
    }

    fn data_cmd(&self, prefix: &VarPath, data: &DataParam, arg: &str) -> Vec<Fragment> {
        let name = self.name();
        let in_path = prefix.child(&self.input_name());
        let out_path = prefix.child(&self.output_name());

        match &data.layout {
            BundleLayout::PlainFile => {
                if data.role == DataRole::InOut {
                    // The tool reads and writes the output dataset in place;
                    // the pre-stage copies the input dataset over it first.
                    return vec![Fragment::line(format!("{arg} '{}'", out_path.subst()))];
                }
                let path = if self.is_output() { out_path } else { in_path };
                let line = Fragment::line(format!("{arg} '{}'", path.subst()));
                if self.spec.required {
                    vec![line]
                } else {
                    vec![Fragment::guard(Cond::truthy(path), vec![line])]
                }
            }
            BundleLayout::ExtraFiles => {
                if data.role == DataRole::InOut {
                    return vec![Fragment::line(format!(
                        "{arg} '{}'",
                        out_path.child("extra_files_path").subst()
                    ))];
                }
                let path = if self.is_output() { out_path } else { in_path };
                self.staged_path_cmd(arg, &path, None, data.multiple)
            }
            BundleLayout::ExtraFilesNamed(file) => {
                if data.role == DataRole::InOut || data.role == DataRole::Output {
                    return vec![Fragment::line(format!(
                        "{arg} '{}/{file}'",
                        out_path.child("extra_files_path").subst()
                    ))];
                }
                self.staged_path_cmd(arg, &in_path, Some(file), data.multiple)
            }
            BundleLayout::ExtraFilesBasename => {
                let loop_var = format!("gxy_{name}");
                if data.multiple {
                    return vec![Fragment::For {
                        var: loop_var.clone(),
                        expr: out_path.to_string(),
                        body: vec![Fragment::line(format!(
                            "{arg} \"${{{loop_var}.extra_files_path}}/${{{loop_var}.metadata.anvio_basename}}\""
                        ))],
                    }];
                }
                vec![Fragment::guard(
                    Cond::truthy(out_path.clone()),
                    vec![Fragment::line(format!(
                        "{arg} '{}/{}'",
                        out_path.child("extra_files_path").subst(),
                        out_path.child("metadata").child("anvio_basename").subst()
                    ))],
                )]
            }
            BundleLayout::BamWithIndex => {
                if data.multiple {
                    return vec![Fragment::For {
                        var: "gxy_i, $gxy_bam".to_string(),
                        expr: format!("enumerate({})", in_path.var()),
                        body: vec![Fragment::line(format!("{arg} '${{gxy_i}}_{name}.bam'"))],
                    }];
                }
                let line = Fragment::line(format!("{arg} '{name}.bam'"));
                if self.spec.required {
                    vec![line]
                } else {
                    vec![Fragment::guard(Cond::truthy(in_path), vec![line])]
                }
            }
            BundleLayout::PrefixScatter => {
                let line = Fragment::line(format!("{arg} '{name}'"));
                if self.spec.required {
                    vec![line]
                } else {
                    vec![Fragment::guard(
                        Cond::non_empty_str(prefix.child(&name)),
                        vec![line],
                    )]
                }
            }
        }
    }

    fn staged_path_cmd(
        &self,
        arg: &str,
        path: &VarPath,
        file: Option<&str>,
        multiple: bool,
    ) -> Vec<Fragment> {
        let name = self.name();
        let suffix = file.map(|f| format!("/{f}")).unwrap_or_default();
        if multiple {
            let loop_var = format!("gxy_{name}");
            return vec![Fragment::For {
                var: loop_var.clone(),
                expr: path.to_string(),
                body: vec![Fragment::line(format!(
                    "{arg} '${{{loop_var}.extra_files_path}}{suffix}'"
                ))],
            }];
        }
        let line = Fragment::line(format!(
            "{arg} '{}{suffix}'",
            path.child("extra_files_path").subst()
        ));
        vec![Fragment::guard(Cond::truthy(path.clone()), vec![line])]
    }

    /// Emits staging fragments that must run before the main invocation.
    pub fn pre_cmd_line(&self, prefix: &VarPath) -> Vec<Fragment> {
        let ParamKind::Data(data) = &self.kind else {
            return Vec::new();
        };
        let name = self.name();
        let in_path = prefix.child(&self.input_name());
        let out_path = prefix.child(&self.output_name());

        match &data.layout {
            BundleLayout::PlainFile if data.role == DataRole::InOut => {
                self.guarded_stage(
                    &in_path,
                    Fragment::line(format!(
                        "cp '{}' '{}'",
                        in_path.subst(),
                        out_path.subst()
                    )),
                )
            }
            BundleLayout::ExtraFiles | BundleLayout::ExtraFilesNamed(_)
                if data.role == DataRole::InOut =>
            {
                self.guarded_stage(
                    &in_path,
                    Fragment::line(format!(
                        "cp -R '{}' '{}'",
                        in_path.child("extra_files_path").subst(),
                        out_path.child("extra_files_path").subst()
                    )),
                )
            }
            BundleLayout::ExtraFilesNamed(_) if data.role == DataRole::Output => {
                vec![Fragment::line(format!(
                    "mkdir '{}'",
                    out_path.child("extra_files_path").subst()
                ))]
            }
            BundleLayout::ExtraFilesBasename => match data.role {
                DataRole::InOut if data.multiple => {
                    let body = vec![
                        Fragment::guard(
                            Cond::raw("$gxy_i != 0"),
                            vec![Fragment::line("&&")],
                        ),
                        Fragment::line(
                            "cp -R '${gxy_in.extra_files_path}' '${gxy_out.extra_files_path}'",
                        ),
                    ];
                    let stage = Fragment::For {
                        var: "gxy_i, ($gxy_in, $gxy_out)".to_string(),
                        expr: format!(
                            "enumerate($zip({}, {}))",
                            in_path.var(),
                            out_path.var()
                        ),
                        body,
                    };
                    self.guarded_stage(&in_path, stage)
                }
                DataRole::InOut => self.guarded_stage(
                    &in_path,
                    Fragment::line(format!(
                        "cp -R '{}' '{}'",
                        in_path.child("extra_files_path").subst(),
                        out_path.child("extra_files_path").subst()
                    )),
                ),
                DataRole::Output => vec![Fragment::line(format!(
                    "mkdir '{}'",
                    out_path.child("extra_files_path").subst()
                ))],
                DataRole::Input => Vec::new(),
            },
            BundleLayout::BamWithIndex => {
                if data.multiple {
                    let body = vec![
                        Fragment::guard(
                            Cond::raw("$gxy_i != 0"),
                            vec![Fragment::line("&&")],
                        ),
                        Fragment::line(format!(
                            "ln -s '${{gxy_bam}}' '${{gxy_i}}_{name}.bam' && ln -s '${{gxy_bam.metadata.bam_index}}' '${{gxy_i}}_{name}.bam.bai'"
                        )),
                    ];
                    let stage = Fragment::For {
                        var: "gxy_i, $gxy_bam".to_string(),
                        expr: format!("enumerate({})", in_path.var()),
                        body,
                    };
                    return self.guarded_stage(&in_path, stage);
                }
                self.guarded_stage(
                    &in_path,
                    Fragment::line(format!(
                        "ln -s '{}' '{name}.bam' && ln -s '{}' '{name}.bam.bai'",
                        in_path.subst(),
                        in_path.child("metadata").child("bam_index").subst()
                    )),
                )
            }
            BundleLayout::PrefixScatter => {
                vec![Fragment::line(format!(
                    "mkdir '{}'",
                    prefix.child(&name).child("extra_files_path").subst()
                ))]
            }
            _ => Vec::new(),
        }
    }

    /// Emits staging fragments that must run after the main invocation.
    pub fn post_cmd_line(&self, prefix: &VarPath) -> Vec<Fragment> {
        let ParamKind::Data(data) = &self.kind else {
            return Vec::new();
        };
        match &data.layout {
            BundleLayout::PrefixScatter => {
                let name = self.name();
                let staging = prefix.child(&name).child("extra_files_path").subst();
                vec![Fragment::line(format!(
                    "( cp {name}* '{staging}/' || echo '' )"
                ))]
            }
            _ => Vec::new(),
        }
    }

    /// Wraps a staging fragment in an optionality guard with an `echo ''`
    /// else-branch, so the surrounding `&&` chain never sees an empty
    /// segment.
    fn guarded_stage(&self, guard_path: &VarPath, stage: Fragment) -> Vec<Fragment> {
        if self.spec.required {
            vec![stage]
        } else {
            vec![Fragment::guard_else(
                Cond::truthy(guard_path.clone()),
                vec![stage],
                vec![Fragment::line("echo ''")],
            )]
        }
    }
}

/// Returns `true` when a normalized name marks its argument as output.
pub fn name_is_output(normalized: &str) -> bool {
    let lower = normalized.to_ascii_lowercase();
    OUTPUT_NAME_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Returns `true` when the spec declares one-or-more multiplicity.
pub fn spec_is_multiple(spec: &ArgumentSpec) -> bool {
    matches!(spec.nargs, Some(Nargs::OneOrMore | Nargs::ZeroOrMore))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cheetah::render_all;
    use crate::ValueKind;

    fn scalar(name: &str) -> Parameter {
        Parameter::new(
            ArgumentSpec::new(name).with_long(&format!("--{name}")),
            ParamKind::Scalar(ScalarKind::Text),
        )
    }

    #[test]
    fn test_scalar_optional_is_guarded() {
        let cmd = render_all(&scalar("title").to_cmd_line(&VarPath::root()), 0);
        assert_eq!(
            cmd,
            "#if $str($title):\n    --title '${title}'\n#end if\n"
        );
    }

    #[test]
    fn test_scalar_required_is_unconditional() {
        let param = Parameter::new(
            ArgumentSpec::new("title").with_long("--title").required(),
            ParamKind::Scalar(ScalarKind::Text),
        );
        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert_eq!(cmd, "--title '${title}'\n");
    }

    #[test]
    fn test_scalar_prefix_threads_through_references() {
        let prefix = VarPath::root().child("mode");
        let cmd = render_all(&scalar("title").to_cmd_line(&prefix), 0);
        assert!(cmd.contains("$str($mode.title)"));
        assert!(cmd.contains("--title '${mode.title}'"));
    }

    #[test]
    fn test_boolean_checkbox_truevalue_is_long_flag() {
        let param = Parameter::new(
            ArgumentSpec::new("verbose")
                .with_long("--verbose")
                .with_action("store_true"),
            ParamKind::Boolean,
        );
        let xml = param.to_xml_param();
        assert!(xml.contains("truevalue=\"--verbose\""));
        assert!(xml.contains("falsevalue=\"\""));
        assert!(xml.contains("checked=\"false\""));

        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert_eq!(cmd, "${verbose}\n");
    }

    #[test]
    fn test_slots_parameter_has_no_ui_and_uses_slot_count() {
        let param = Parameter::new(
            ArgumentSpec::new("num-threads")
                .with_long("--num-threads")
                .with_kind(ValueKind::Int)
                .with_default("4"),
            ParamKind::Slots,
        );
        assert_eq!(param.to_xml_param(), "");
        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert_eq!(cmd, "--num-threads \"\\${GALAXY_SLOTS:-1}\"\n");
        assert!(!cmd.contains('4'));
    }

    #[test]
    fn test_discard_emits_nothing() {
        let param = Parameter::new(
            ArgumentSpec::new("browser-path").with_long("--browser-path"),
            ParamKind::Discard,
        );
        assert_eq!(param.to_xml_param(), "");
        assert!(param.to_cmd_line(&VarPath::root()).is_empty());
    }

    #[test]
    fn test_inout_database_pairs_input_and_output() {
        let param = Parameter::new(
            ArgumentSpec::new("contigs-db").with_long("--contigs-db"),
            ParamKind::Data(DataParam {
                format: "anvio_contigs_db".to_string(),
                role: DataRole::InOut,
                layout: BundleLayout::ExtraFilesNamed("CONTIGS.db".to_string()),
                multiple: false,
            }),
        );

        assert_eq!(param.input_name(), "input_contigs_db");
        assert_eq!(param.output_name(), "output_contigs_db");
        assert!(param.is_input());
        assert!(param.is_output());

        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert_eq!(
            cmd,
            "--contigs-db '${output_contigs_db.extra_files_path}/CONTIGS.db'\n"
        );

        let pre = render_all(&param.pre_cmd_line(&VarPath::root()), 0);
        assert!(pre.contains(
            "cp -R '${input_contigs_db.extra_files_path}' '${output_contigs_db.extra_files_path}'"
        ));
        assert!(pre.contains("#else\n    echo ''\n#end if"));

        let output = param.to_xml_output();
        assert!(output.contains("name=\"output_contigs_db\""));
        assert!(output.contains("format_source=\"input_contigs_db\""));
    }

    #[test]
    fn test_output_report_renders_output_only() {
        let param = Parameter::new(
            ArgumentSpec::new("output-file").with_long("--output-file"),
            ParamKind::Data(DataParam {
                format: "txt".to_string(),
                role: DataRole::Output,
                layout: BundleLayout::PlainFile,
                multiple: false,
            }),
        );
        assert_eq!(param.to_xml_param(), "");
        assert!(!param.is_input());
        let output = param.to_xml_output();
        assert!(output.contains("name=\"output_file\""));
        assert!(!output.contains("format_source"));
    }

    #[test]
    fn test_bam_input_stages_index_symlinks() {
        let param = Parameter::new(
            ArgumentSpec::new("bam-file").with_long("--bam-file").required(),
            ParamKind::Data(DataParam {
                format: "bam".to_string(),
                role: DataRole::Input,
                layout: BundleLayout::BamWithIndex,
                multiple: false,
            }),
        );
        let pre = render_all(&param.pre_cmd_line(&VarPath::root()), 0);
        assert_eq!(
            pre,
            "ln -s '${bam_file}' 'bam_file.bam' && ln -s '${bam_file.metadata.bam_index}' 'bam_file.bam.bai'\n"
        );
        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert_eq!(cmd, "--bam-file 'bam_file.bam'\n");
    }

    #[test]
    fn test_multiple_profile_inputs_loop_over_datasets() {
        let param = Parameter::new(
            ArgumentSpec::new("profiles")
                .with_long("--profiles")
                .with_nargs(Nargs::OneOrMore),
            ParamKind::Data(DataParam {
                format: "anvio_profile_db".to_string(),
                role: DataRole::Input,
                layout: BundleLayout::ExtraFilesNamed("PROFILE.db".to_string()),
                multiple: true,
            }),
        );
        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert_eq!(
            cmd,
            "#for $gxy_profiles in $profiles:\n    --profiles '${gxy_profiles.extra_files_path}/PROFILE.db'\n#end for\n"
        );
    }

    #[test]
    fn test_list_or_file_branches_on_selector() {
        let param = Parameter::new(
            ArgumentSpec::new("genome-names").with_long("--genome-names"),
            ParamKind::ListOrFile {
                format: "txt".to_string(),
            },
        );
        let xml = param.to_xml_param();
        assert!(xml.contains("conditional name=\"genome_names_source\""));
        assert!(xml.contains("name=\"genome_names_source_selector\""));

        let cmd = render_all(&param.to_cmd_line(&VarPath::root()), 0);
        assert!(cmd.contains("#if $str($genome_names_source.genome_names_source_selector) == 'file':"));
        assert!(cmd.contains("--genome-names '${genome_names_source.genome_names}'"));
        assert!(cmd.contains("#else"));
    }

    #[test]
    fn test_with_overrides_returns_new_instance() {
        let original = scalar("title");
        let renamed = original.with_overrides(SpecOverrides {
            name: Some("subtitle".to_string()),
            required: Some(true),
            ..Default::default()
        });
        assert_eq!(original.name(), "title");
        assert_eq!(renamed.name(), "subtitle");
        assert!(renamed.required());
        assert!(!original.required());
    }

    #[test]
    fn test_choices_render_select_with_default_selected() {
        let param = Parameter::new(
            ArgumentSpec::new("mode")
                .with_long("--mode")
                .with_choices(&["normal", "uniform"])
                .with_default("normal"),
            ParamKind::Scalar(ScalarKind::Text),
        );
        let xml = param.to_xml_param();
        assert!(xml.contains("type=\"select\""));
        assert!(xml.contains("<option value=\"normal\" selected=\"True\">normal</option>"));
        assert!(xml.contains("<option value=\"uniform\">uniform</option>"));
    }

    #[test]
    fn test_name_is_output_prefixes() {
        assert!(name_is_output("output_file"));
        assert!(name_is_output("export_svg"));
        assert!(!name_is_output("input_file"));
    }
}
