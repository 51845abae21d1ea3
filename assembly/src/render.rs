//! Document rendering.
//!
//! The boundary between assembled fragments and finished artifacts. A fixed
//! liquid template holds the wrapper document skeleton; the assembler's
//! fragments drop into it verbatim. The suite manifest (`.shed.yml`) is a
//! serde structure serialized with `serde_yaml`.

use serde::Serialize;
use thiserror::Error;

use toolgen_core::xml::escape_text;

use crate::assemble::Assembled;
use crate::extract::ParserDescription;

/// Suite version used when the description does not declare one.
const DEFAULT_VERSION: &str = "8";

/// Container image for interactive tools.
const DEFAULT_CONTAINER: &str =
    r#"<container type="docker">quay.io/biocontainers/anvio:7--0</container>"#;

/// Port announced by interactive tools.
const INTERACTIVE_PORT: u16 = 8080;

/// Minimum profile version that understands entry points.
const INTERACTIVE_PROFILE: &str = "19.09";

/// Capability string that marks a script as an interactive tool.
const INTERACTIVE_PROVIDES: &str = "interactive";

const SUITE_DOI: &str = "10.7717/peerj.1319";

const SUITE_CITATION: &str = r#"@ARTICLE{Blankenberg21-anvio,
   author = {Daniel Blankenberg Lab, et al},
   title = {In preparation..},
   }"#;

const TOOL_TEMPLATE: &str = r#"<tool id="{{ id }}" name="{{ name }}" version="{{ version }}"{{ tool_type }}{{ profile }}>
{%- if description != "" %}
    <description>{{ description }}</description>
{%- endif %}
    <requirements>
{%- for requirement in requirements %}
        {{ requirement }}
{%- endfor %}
{%- for container in containers %}
        {{ container }}
{%- endfor %}
    </requirements>
{%- if has_entry_points %}
    <entry_points>
{%- for ep in entry_points %}
        <entry_point name="{{ ep.name }}" requires_domain="true">
            <port>{{ ep.port }}</port>
        </entry_point>
{%- endfor %}
    </entry_points>
{%- endif %}
    <stdio>
        <exit_code range="1:" />
    </stdio>
{%- if version_command != "" %}
    <version_command>{{ version_command }}</version_command>
{%- endif %}
    <command><![CDATA[
{{ command }}    ]]></command>
    <inputs>
{%- for input in inputs %}
        {{ input }}
{%- endfor %}
    </inputs>
    <outputs>
{%- for output in outputs %}
        {{ output }}
{%- endfor %}
    </outputs>
    <help><![CDATA[
{{ help }}    ]]></help>
{%- if has_citations %}
    <citations>
{%- for citation in citations %}
        {{ citation }}
{%- endfor %}
    </citations>
{%- endif %}
</tool>
"#;

/// Rendering failure.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The liquid template failed to parse or render. The template is fixed
    /// at compile time, so this surfaces a programming error.
    #[error("template rendering failed: {0}")]
    Template(#[from] liquid::Error),
}

/// One interactive-tool entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Display name.
    pub name: String,
    /// TCP port inside the container.
    pub port: u16,
}

/// Document-level metadata for one tool.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    /// Tool id (dashes become underscores).
    pub id: String,
    /// Display name, the invocation token.
    pub name: String,
    /// Suite version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// `tool_type` attribute value, if any.
    pub tool_type: Option<String>,
    /// `profile` attribute value, if any.
    pub profile: Option<String>,
    /// Version-command line.
    pub version_command: String,
    /// Requirement rows, already rendered.
    pub requirements: Vec<String>,
    /// Container rows, already rendered.
    pub containers: Vec<String>,
    /// Interactive entry points.
    pub entry_points: Vec<EntryPoint>,
    /// Whole-tool help, already formatted.
    pub help: String,
    /// Citation rows, already rendered.
    pub citations: Vec<String>,
}

impl ToolMetadata {
    /// Derives document metadata from a parser description.
    ///
    /// A `provides` entry of `interactive` switches the tool into
    /// interactive mode: docker container, entry point, and the profile
    /// attribute entry points require.
    pub fn from_description(desc: &ParserDescription) -> Self {
        let version = desc
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let mut requirements: Vec<String> = desc
            .requirements
            .iter()
            .map(|req| {
                format!(
                    r#"<requirement type="package" version="{}">{}</requirement>"#,
                    escape_text(&req.version),
                    escape_text(&req.name)
                )
            })
            .collect();
        if requirements.is_empty() {
            requirements.push(format!(
                r#"<requirement type="package" version="{version}">anvio</requirement>"#
            ));
        }

        let interactive = desc.provides.iter().any(|p| p == INTERACTIVE_PROVIDES);
        let (tool_type, profile, containers, entry_points) = if interactive {
            (
                Some(INTERACTIVE_PROVIDES.to_string()),
                Some(INTERACTIVE_PROFILE.to_string()),
                vec![DEFAULT_CONTAINER.to_string()],
                vec![EntryPoint {
                    name: format!("{} server", desc.prog),
                    port: INTERACTIVE_PORT,
                }],
            )
        } else {
            (None, None, Vec::new(), Vec::new())
        };

        ToolMetadata {
            id: desc.prog.replace('-', "_"),
            name: desc.prog.clone(),
            version,
            description: desc.description.clone(),
            tool_type,
            profile,
            version_command: format!("{} --version", desc.prog),
            requirements,
            containers,
            entry_points,
            help: format_help(&desc.help),
            citations: vec![
                format!(r#"<citation type="doi">{SUITE_DOI}</citation>"#),
                format!("<citation type=\"bibtex\">{SUITE_CITATION}</citation>"),
            ],
        }
    }
}

/// Renders the whole-tool help as an RST literal block.
pub fn format_help(help_text: &str) -> String {
    let mut out = String::from("::\n");
    for line in help_text.split('\n') {
        out.push_str("\n  ");
        out.push_str(line.trim_end());
    }
    out.push_str("\n\n");
    out
}

/// Renders the complete wrapper document.
pub fn render_tool(meta: &ToolMetadata, assembled: &Assembled) -> Result<String, RenderError> {
    let template = liquid::ParserBuilder::with_stdlib()
        .build()?
        .parse(TOOL_TEMPLATE)?;

    let attr = |name: &str, value: &Option<String>| -> String {
        value
            .as_ref()
            .map(|v| format!(r#" {name}="{v}""#))
            .unwrap_or_default()
    };

    use liquid::model::{Object, Value};

    let scalar = |s: String| Value::scalar(s);
    let list = |items: &[String]| {
        Value::Array(items.iter().cloned().map(Value::scalar).collect())
    };

    let entry_points = Value::Array(
        meta.entry_points
            .iter()
            .map(|ep| {
                let mut obj = Object::new();
                obj.insert("name".into(), Value::scalar(ep.name.clone()));
                obj.insert("port".into(), Value::scalar(ep.port as i64));
                Value::Object(obj)
            })
            .collect(),
    );

    let mut globals = Object::new();
    globals.insert("id".into(), scalar(meta.id.clone()));
    globals.insert("name".into(), scalar(meta.name.clone()));
    globals.insert("version".into(), scalar(meta.version.clone()));
    globals.insert("tool_type".into(), scalar(attr("tool_type", &meta.tool_type)));
    globals.insert("profile".into(), scalar(attr("profile", &meta.profile)));
    globals.insert("description".into(), scalar(escape_text(&meta.description)));
    globals.insert(
        "version_command".into(),
        scalar(escape_text(&meta.version_command)),
    );
    globals.insert("requirements".into(), list(&meta.requirements));
    globals.insert("containers".into(), list(&meta.containers));
    globals.insert(
        "has_entry_points".into(),
        Value::scalar(!meta.entry_points.is_empty()),
    );
    globals.insert("entry_points".into(), entry_points);
    globals.insert(
        "has_citations".into(),
        Value::scalar(!meta.citations.is_empty()),
    );
    globals.insert("command".into(), scalar(assembled.command.clone()));
    globals.insert("inputs".into(), list(&assembled.inputs));
    globals.insert("outputs".into(), list(&assembled.outputs));
    globals.insert("help".into(), scalar(meta.help.clone()));
    globals.insert("citations".into(), list(&meta.citations));

    Ok(template.render(&globals)?)
}

/// The `.shed.yml` suite manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ShedConfig {
    /// Repository name.
    pub name: String,
    /// Owner account.
    pub owner: String,
    /// One-line description.
    pub description: String,
    /// Project homepage.
    pub homepage_url: String,
    /// Long-form description.
    pub long_description: String,
    /// Source repository.
    pub remote_repository_url: String,
    /// Repository type.
    #[serde(rename = "type")]
    pub repository_type: String,
    /// Category labels.
    pub categories: Vec<String>,
    /// Per-tool repository templates.
    pub auto_tool_repositories: AutoToolRepositories,
    /// The suite repository that aggregates the per-tool repositories.
    pub suite: SuiteRepository,
}

/// Naming templates for per-tool repositories.
#[derive(Debug, Clone, Serialize)]
pub struct AutoToolRepositories {
    /// Repository-name template.
    pub name_template: String,
    /// Repository-description template.
    pub description_template: String,
}

/// The aggregating suite repository.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteRepository {
    /// Suite repository name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Long-form description.
    pub long_description: String,
}

impl ShedConfig {
    /// The manifest for the wrapped tool suite.
    pub fn suite() -> Self {
        let description =
            "Anvi'o: an advanced analysis and visualization platform for 'omics data".to_string();
        let long_description = "Anvi'o is an analysis and visualization platform for 'omics data. \
            It brings together many aspects of today's cutting-edge genomic, metagenomic, \
            and metatranscriptomic analysis practices to address a wide array of needs."
            .to_string();
        ShedConfig {
            name: "anvio".to_string(),
            owner: "blankenberglab".to_string(),
            description: description.clone(),
            homepage_url: "https://github.com/merenlab/anvio".to_string(),
            long_description: long_description.clone(),
            remote_repository_url: "https://github.com/blankenberglab/galaxy-toolgen".to_string(),
            repository_type: "unrestricted".to_string(),
            categories: vec!["Metagenomics".to_string()],
            auto_tool_repositories: AutoToolRepositories {
                name_template: "{{ tool_id }}".to_string(),
                description_template: "Wrapper for the Anvi'o tool suite: {{ tool_name }}"
                    .to_string(),
            },
            suite: SuiteRepository {
                name: "suite_anvio".to_string(),
                description,
                long_description,
            },
        }
    }

    /// Serializes the manifest as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
