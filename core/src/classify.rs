//! Parameter classification.
//!
//! Classification maps one [`ArgumentSpec`] to one [`Parameter`] through a
//! fixed resolution order: declared-name table first, then the parser action
//! keyword, then the metavar table, then a generic scalar fallback. Lookup
//! tables are data; the only fatal condition is an action keyword the
//! classifier does not model, which indicates a malformed extraction rather
//! than a gap in the tables.
//!
//! # Examples
//!
//! ```
//! use toolgen_core::{ArgumentSpec, ClassifierTables, ParamKind};
//!
//! let tables = ClassifierTables::builtin();
//! let spec = ArgumentSpec::new("num-threads")
//!     .with_long("--num-threads")
//!     .with_metavar("NUM_THREADS");
//! let param = tables.classify(&spec).unwrap();
//! assert_eq!(param.kind, ParamKind::Slots);
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use crate::param::{
    name_is_output, spec_is_multiple, BundleLayout, DataParam, DataRole, ParamKind, Parameter,
    ScalarKind,
};
use crate::{ArgumentSpec, ValueKind};

/// Classification failure.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The parser action keyword is outside the modeled set. Every other
    /// gap degrades to the generic fallback; this one is a malformed
    /// extraction and must stop the run.
    #[error("argument '{name}' has unsupported parser action '{action}'")]
    UnknownAction {
        /// Declared argument name.
        name: String,
        /// Offending action keyword.
        action: String,
    },
}

/// Direction rule applied at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleRule {
    /// Always a read-only input.
    Input,
    /// Always a pure output.
    Output,
    /// Always a paired in/out dataset.
    InOut,
    /// Input normally, pure output when the name carries an output prefix.
    ByPrefix,
    /// Paired in/out normally, pure output when the name carries an output
    /// prefix.
    ByPrefixInOut,
}

impl RoleRule {
    fn resolve(self, normalized: &str) -> DataRole {
        match self {
            RoleRule::Input => DataRole::Input,
            RoleRule::Output => DataRole::Output,
            RoleRule::InOut => DataRole::InOut,
            RoleRule::ByPrefix => {
                if name_is_output(normalized) {
                    DataRole::Output
                } else {
                    DataRole::Input
                }
            }
            RoleRule::ByPrefixInOut => {
                if name_is_output(normalized) {
                    DataRole::Output
                } else {
                    DataRole::InOut
                }
            }
        }
    }
}

/// Layout rule applied at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutRule {
    PlainFile,
    ExtraFiles,
    ExtraFilesNamed(&'static str),
    ExtraFilesBasename,
    /// `CONTIGS.db` normally, `SAMPLES.db` when the declared default says so.
    DbFixedBase,
    BamWithIndex,
    PrefixScatter,
}

/// One table entry for a file-backed parameter.
#[derive(Debug, Clone, Copy)]
struct DataRule {
    format: &'static str,
    role: RoleRule,
    layout: LayoutRule,
    force_multiple: bool,
}

impl DataRule {
    const fn new(format: &'static str, role: RoleRule, layout: LayoutRule) -> Self {
        DataRule {
            format,
            role,
            layout,
            force_multiple: false,
        }
    }

    const fn multiple(mut self) -> Self {
        self.force_multiple = true;
        self
    }
}

/// One classification table entry.
#[derive(Debug, Clone, Copy)]
enum Rule {
    Scalar(ScalarKind),
    AlwaysTrue,
    AlwaysValue(&'static str),
    Discard,
    Slots,
    ListOrFile(&'static str),
    Data(DataRule),
}

impl Rule {
    fn to_kind(self, spec: &ArgumentSpec) -> ParamKind {
        match self {
            Rule::Scalar(kind) => ParamKind::Scalar(kind),
            Rule::AlwaysTrue => ParamKind::AlwaysTrue,
            Rule::AlwaysValue(value) => ParamKind::AlwaysValue(value.to_string()),
            Rule::Discard => ParamKind::Discard,
            Rule::Slots => ParamKind::Slots,
            Rule::ListOrFile(format) => ParamKind::ListOrFile {
                format: format.to_string(),
            },
            Rule::Data(rule) => {
                let normalized = spec.normalized_name();
                let (format, layout) = match rule.layout {
                    LayoutRule::PlainFile => (rule.format.to_string(), BundleLayout::PlainFile),
                    LayoutRule::ExtraFiles => (rule.format.to_string(), BundleLayout::ExtraFiles),
                    LayoutRule::ExtraFilesNamed(file) => (
                        rule.format.to_string(),
                        BundleLayout::ExtraFilesNamed(file.to_string()),
                    ),
                    LayoutRule::ExtraFilesBasename => {
                        (rule.format.to_string(), BundleLayout::ExtraFilesBasename)
                    }
                    LayoutRule::DbFixedBase => {
                        if spec.default_text() == "SAMPLES.db" {
                            (
                                "anvio_samples_db".to_string(),
                                BundleLayout::ExtraFilesNamed("SAMPLES.db".to_string()),
                            )
                        } else {
                            (
                                "anvio_contigs_db".to_string(),
                                BundleLayout::ExtraFilesNamed("CONTIGS.db".to_string()),
                            )
                        }
                    }
                    LayoutRule::BamWithIndex => {
                        (rule.format.to_string(), BundleLayout::BamWithIndex)
                    }
                    LayoutRule::PrefixScatter => {
                        (rule.format.to_string(), BundleLayout::PrefixScatter)
                    }
                };
                ParamKind::Data(DataParam {
                    format,
                    role: rule.role.resolve(&normalized),
                    layout,
                    multiple: rule.force_multiple || spec_is_multiple(spec),
                })
            }
        }
    }
}

/// The classification lookup tables.
///
/// Resolution order: declared-name table, parser action, metavar table,
/// generic scalar fallback. The skip list is consulted by the assembler, not
/// here, so every argument still classifies deterministically.
pub struct ClassifierTables {
    by_name: HashMap<&'static str, Rule>,
    by_metavar: HashMap<&'static str, Rule>,
    skip: HashSet<&'static str>,
}

impl ClassifierTables {
    /// The built-in tables covering the wrapped tool suite.
    pub fn builtin() -> Self {
        use LayoutRule as L;
        use RoleRule as R;
        use Rule::*;
        use ScalarKind as S;

        let int = Scalar(S::Integer);
        let float = Scalar(S::Float);
        let txt = Data(DataRule::new("txt", R::ByPrefix, L::PlainFile));
        let fasta = Data(DataRule::new("fasta", R::ByPrefix, L::PlainFile));
        let tabular = Data(DataRule::new("tabular", R::ByPrefix, L::PlainFile));
        let anvio_db = Data(DataRule::new("anvio_db", R::ByPrefixInOut, L::ExtraFilesBasename));
        let fixed_db = Data(DataRule::new("", R::ByPrefixInOut, L::DbFixedBase));
        let profile = Data(DataRule::new(
            "anvio_profile_db",
            R::ByPrefix,
            L::ExtraFilesNamed("PROFILE.db"),
        ));
        let bam = Data(DataRule::new("bam", R::Input, L::BamWithIndex));
        let bams = Data(DataRule::new("bam", R::Input, L::BamWithIndex).multiple());
        let report = Data(DataRule::new("txt", R::Output, L::PlainFile));
        let variability = Data(DataRule::new("anvio_variability", R::ByPrefix, L::PlainFile));
        let state = Data(DataRule::new("anvio_state", R::ByPrefix, L::PlainFile));

        let by_metavar: HashMap<&'static str, Rule> = HashMap::from([
            (
                "PROFILE_DB",
                Data(DataRule::new(
                    "anvio_profile_db",
                    R::ByPrefixInOut,
                    L::ExtraFilesNamed("PROFILE.db"),
                )),
            ),
            (
                "PAN_DB",
                Data(DataRule::new("anvio_pan_db", R::ByPrefixInOut, L::ExtraFilesBasename)),
            ),
            (
                "PAN_OR_PROFILE_DB",
                Data(DataRule::new(
                    "anvio_profile_db,anvio_pan_db",
                    R::ByPrefixInOut,
                    L::ExtraFilesBasename,
                )),
            ),
            ("DB", anvio_db),
            ("DATABASE", anvio_db),
            ("DB PATH", anvio_db),
            ("DATABASE_PATH", anvio_db),
            ("INT", int),
            ("INTEGER", int),
            ("LEEWAY_NTs", int),
            ("WRAP", int),
            ("NUM_SAMPLES", int),
            ("GENE_CALLER_ID", int),
            ("NUM_POSITIONS", int),
            ("FLOAT", float),
            ("PERCENT_IDENTITY", float),
            ("E-VALUE", float),
            ("RATIO", float),
            ("FILE_PATH", txt),
            ("FILE", txt),
            ("FILE_NAME", txt),
            ("SMTP_CONFIG_INI", txt),
            ("RUNINFO_PATH", txt),
            ("PATH", txt),
            ("FLAT_FILE", txt),
            ("LINKMER_REPORT", txt),
            ("GENBANK_METADATA", txt),
            ("OUTPUT_FASTA_TXT", txt),
            ("EMAPPER_ANNOTATION_FILE", txt),
            ("OUTPUT_FILE", txt),
            ("CHECKM TREE", txt),
            ("CONFIG_FILE", txt),
            ("REPORT_FILE_PATH", report),
            ("REPORT FILE", report),
            ("FASTA", fasta),
            ("FASTA FILE", fasta),
            ("FASTA_FILE", fasta),
            (
                "FASTQ_FILES",
                Data(DataRule::new("fastq", R::ByPrefix, L::PlainFile)),
            ),
            (
                "GENBANK",
                Data(DataRule::new("genbank", R::ByPrefix, L::PlainFile)),
            ),
            (
                "NEWICK",
                Data(DataRule::new("newick", R::ByPrefix, L::PlainFile)),
            ),
            ("SAMPLES-ORDER", tabular),
            ("SAMPLES-INFO", tabular),
            ("ADDITIONAL_LAYERS", tabular),
            ("VIEW_DATA", tabular),
            ("BINS_INFO", tabular),
            ("CONTIGS_AND_POS", tabular),
            ("GENE-CALLS", tabular),
            ("ADDITIONAL_VIEW", tabular),
            ("TAB DELIMITED FILE", tabular),
            ("TEXT_FILE", tabular),
            ("BINS_DATA", tabular),
            ("MATRIX_FILE", tabular),
            ("SAAV_FILE", tabular),
            ("SCV_FILE", tabular),
            ("VARIABILITY_TABLE", variability),
            ("VARIABILITY_PROFILE", variability),
            (
                "CLASSIFIER_FILE",
                Data(DataRule::new("anvio_classifier", R::ByPrefix, L::PlainFile)),
            ),
            ("STATE_FILE", state),
            ("STATE", state),
            (
                "FILE(S)",
                Data(DataRule::new("data", R::ByPrefix, L::PlainFile)),
            ),
            (
                "GENOMES_STORAGE",
                Data(DataRule::new(
                    "anvio_genomes_db",
                    R::ByPrefixInOut,
                    L::ExtraFilesBasename,
                )),
            ),
            (
                "STRUCTURE_DB",
                Data(DataRule::new(
                    "anvio_structure_db",
                    R::ByPrefixInOut,
                    L::ExtraFilesBasename,
                )),
            ),
            (
                "SUMMARY_DICT",
                Data(DataRule::new(
                    "anvio_db",
                    R::ByPrefixInOut,
                    L::ExtraFilesNamed("RUNINFO.cp"),
                )),
            ),
            ("CONTIGS_DB", fixed_db),
            ("DB_FILE_PATH", fixed_db),
            ("SAMPLES_DB", fixed_db),
            ("CONTIG DATABASE(S)", fixed_db),
            (
                "PAN_DB_DIR",
                Data(DataRule::new("anvio_pan_db", R::ByPrefixInOut, L::ExtraFiles)),
            ),
            ("PROFILE", profile),
            ("SINGLE_PROFILE(S)", profile),
            (
                "DIR_PATH",
                Data(DataRule::new("anvio_profile_db", R::ByPrefix, L::ExtraFiles)),
            ),
            (
                "USERS_DATA_DIR",
                Data(DataRule::new("anvio_composite", R::ByPrefix, L::ExtraFiles)),
            ),
            (
                "DIRECTORY",
                Data(DataRule::new("anvio_composite", R::ByPrefix, L::ExtraFiles)),
            ),
            (
                "HMM PROFILE PATH",
                Data(DataRule::new("anvio_hmm_profile", R::ByPrefix, L::ExtraFiles)),
            ),
            (
                "RUNINFO_FILE",
                Data(DataRule::new(
                    "anvio_composite",
                    R::ByPrefix,
                    L::ExtraFilesNamed("RUNINFO.cp"),
                )),
            ),
            ("NUM_CPUS", Slots),
            ("NUM_THREADS", Slots),
            (
                "FILENAME_PREFIX",
                Data(DataRule::new("anvio_composite", R::ByPrefix, L::PrefixScatter)),
            ),
            ("INPUT_BAM", bam),
            ("BAM_FILE", bam),
            ("INPUT_BAM(S)", bams),
            ("BAM FILE[S]", bams),
            ("GENOME_NAMES", ListOrFile("txt")),
            ("IP_ADDR", Discard),
        ]);

        let by_name: HashMap<&'static str, Rule> = HashMap::from([
            (
                "cog_data_dir",
                Data(DataRule::new("anvio_cog_profile", R::InOut, L::ExtraFiles)),
            ),
            (
                "pfam_data_dir",
                Data(DataRule::new("anvio_pfam_profile", R::InOut, L::ExtraFiles)),
            ),
            ("just_do_it", AlwaysTrue),
            ("server_only", AlwaysTrue),
            ("user_server_shutdown", AlwaysTrue),
            ("temporary_dir_path", Discard),
            ("browser_path", Discard),
            ("password_protected", Discard),
            ("dry_run", Discard),
            ("export_svg", Discard),
            (
                "dump_dir",
                Data(DataRule::new("anvio_composite", R::Output, L::ExtraFiles)),
            ),
            (
                "full_report",
                Data(DataRule::new("txt", R::Output, L::PlainFile)),
            ),
            ("port_number", AlwaysValue("8080")),
            (
                "genes_to_add_file",
                Data(DataRule::new("txt", R::Input, L::PlainFile)),
            ),
            (
                "genes_to_remove_file",
                Data(DataRule::new("txt", R::Input, L::PlainFile)),
            ),
        ]);

        let skip = HashSet::from([
            "help",
            "temporary_dir_path",
            "modeller_executable",
            "program",
            "log_file",
            "gzip_output",
        ]);

        ClassifierTables {
            by_name,
            by_metavar,
            skip,
        }
    }

    /// Whether the argument must be omitted from generated documents
    /// entirely.
    pub fn is_skipped(&self, spec: &ArgumentSpec) -> bool {
        self.skip.contains(spec.normalized_name().as_str())
    }

    /// Classifies one argument.
    pub fn classify(&self, spec: &ArgumentSpec) -> Result<Parameter, ClassifyError> {
        let normalized = spec.normalized_name();

        if let Some(rule) = self.by_name.get(normalized.as_str()) {
            return Ok(Parameter::new(spec.clone(), rule.to_kind(spec)));
        }

        if let Some(action) = spec.action.as_deref() {
            match action {
                "help" | "store" => {}
                "store_true" => {
                    return Ok(Parameter::new(spec.clone(), ParamKind::Boolean));
                }
                other => {
                    return Err(ClassifyError::UnknownAction {
                        name: spec.name.clone(),
                        action: other.to_string(),
                    });
                }
            }
        }

        if let Some(metavar) = spec.metavar.as_deref() {
            if let Some(rule) = self.by_metavar.get(metavar) {
                return Ok(Parameter::new(spec.clone(), rule.to_kind(spec)));
            }
            debug!(name = %spec.name, metavar, "metavar not in tables, using generic fallback");
        }

        let kind = match spec.kind {
            ValueKind::Flag => ParamKind::Boolean,
            ValueKind::Int => ParamKind::Scalar(ScalarKind::Integer),
            ValueKind::Float => ParamKind::Scalar(ScalarKind::Float),
            ValueKind::Text => ParamKind::Scalar(ScalarKind::Text),
        };
        Ok(Parameter::new(spec.clone(), kind))
    }
}

impl Default for ClassifierTables {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Nargs;

    fn tables() -> ClassifierTables {
        ClassifierTables::builtin()
    }

    #[test]
    fn test_name_table_wins_over_metavar() {
        // dump-dir carries a FILE_PATH-style metavar but the name rule
        // decides.
        let spec = ArgumentSpec::new("dump-dir")
            .with_long("--dump-dir")
            .with_metavar("FILE_PATH");
        let param = tables().classify(&spec).unwrap();
        match param.kind {
            ParamKind::Data(data) => {
                assert_eq!(data.role, DataRole::Output);
                assert_eq!(data.layout, BundleLayout::ExtraFiles);
                assert_eq!(data.format, "anvio_composite");
            }
            other => panic!("expected data kind, got {other:?}"),
        }
    }

    #[test]
    fn test_store_true_becomes_boolean() {
        let spec = ArgumentSpec::new("debug")
            .with_long("--debug")
            .with_action("store_true");
        let param = tables().classify(&spec).unwrap();
        assert_eq!(param.kind, ParamKind::Boolean);
    }

    #[test]
    fn test_unknown_action_is_fatal() {
        let spec = ArgumentSpec::new("items")
            .with_long("--items")
            .with_action("append");
        let err = tables().classify(&spec).unwrap_err();
        assert!(matches!(err, ClassifyError::UnknownAction { .. }));
        assert!(err.to_string().contains("append"));
    }

    #[test]
    fn test_store_action_falls_through_to_metavar() {
        let spec = ArgumentSpec::new("num-threads")
            .with_long("--num-threads")
            .with_action("store")
            .with_metavar("NUM_THREADS");
        let param = tables().classify(&spec).unwrap();
        assert_eq!(param.kind, ParamKind::Slots);
    }

    #[test]
    fn test_unknown_metavar_degrades_to_text_scalar() {
        let spec = ArgumentSpec::new("mystery")
            .with_long("--mystery")
            .with_metavar("NO_SUCH_METAVAR");
        let param = tables().classify(&spec).unwrap();
        assert_eq!(param.kind, ParamKind::Scalar(ScalarKind::Text));
    }

    #[test]
    fn test_flag_kind_fallback_is_boolean() {
        let spec = ArgumentSpec::new("quiet")
            .with_long("--quiet")
            .with_kind(ValueKind::Flag);
        let param = tables().classify(&spec).unwrap();
        assert_eq!(param.kind, ParamKind::Boolean);
    }

    #[test]
    fn test_contigs_db_basename_switches_on_default() {
        let contigs = tables()
            .classify(
                &ArgumentSpec::new("contigs-db")
                    .with_long("--contigs-db")
                    .with_metavar("CONTIGS_DB"),
            )
            .unwrap();
        match contigs.kind {
            ParamKind::Data(data) => {
                assert_eq!(data.format, "anvio_contigs_db");
                assert_eq!(
                    data.layout,
                    BundleLayout::ExtraFilesNamed("CONTIGS.db".to_string())
                );
                assert_eq!(data.role, DataRole::InOut);
            }
            other => panic!("expected data kind, got {other:?}"),
        }

        let samples = tables()
            .classify(
                &ArgumentSpec::new("samples-db")
                    .with_long("--samples-db")
                    .with_metavar("SAMPLES_DB")
                    .with_default("SAMPLES.db"),
            )
            .unwrap();
        match samples.kind {
            ParamKind::Data(data) => {
                assert_eq!(data.format, "anvio_samples_db");
                assert_eq!(
                    data.layout,
                    BundleLayout::ExtraFilesNamed("SAMPLES.db".to_string())
                );
            }
            other => panic!("expected data kind, got {other:?}"),
        }
    }

    #[test]
    fn test_report_file_metavars_are_output_datasets() {
        for metavar in ["REPORT_FILE_PATH", "REPORT FILE"] {
            let spec = ArgumentSpec::new("report-file")
                .with_long("--report-file")
                .with_metavar(metavar);
            let param = tables().classify(&spec).unwrap();
            match param.kind {
                ParamKind::Data(data) => {
                    assert_eq!(data.role, DataRole::Output);
                    assert_eq!(data.layout, BundleLayout::PlainFile);
                    assert_eq!(data.format, "txt");
                }
                other => panic!("expected data kind, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_output_prefix_flips_role_to_pure_output() {
        let spec = ArgumentSpec::new("output-db")
            .with_long("--output-db")
            .with_metavar("DB");
        let param = tables().classify(&spec).unwrap();
        match param.kind {
            ParamKind::Data(data) => assert_eq!(data.role, DataRole::Output),
            other => panic!("expected data kind, got {other:?}"),
        }
    }

    #[test]
    fn test_plural_bam_metavar_forces_multiple() {
        let spec = ArgumentSpec::new("input-bams")
            .with_long("--input-bams")
            .with_metavar("INPUT_BAM(S)");
        let param = tables().classify(&spec).unwrap();
        match param.kind {
            ParamKind::Data(data) => {
                assert!(data.multiple);
                assert_eq!(data.layout, BundleLayout::BamWithIndex);
            }
            other => panic!("expected data kind, got {other:?}"),
        }
    }

    #[test]
    fn test_nargs_plus_marks_multiple() {
        let spec = ArgumentSpec::new("profiles")
            .with_long("--profiles")
            .with_metavar("SINGLE_PROFILE(S)")
            .with_nargs(Nargs::OneOrMore);
        let param = tables().classify(&spec).unwrap();
        match param.kind {
            ParamKind::Data(data) => assert!(data.multiple),
            other => panic!("expected data kind, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_list_uses_normalized_names() {
        let tables = tables();
        assert!(tables.is_skipped(&ArgumentSpec::new("log-file")));
        assert!(tables.is_skipped(&ArgumentSpec::new("help")));
        assert!(!tables.is_skipped(&ArgumentSpec::new("verbose")));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let spec = ArgumentSpec::new("profile-db")
            .with_long("--profile-db")
            .with_metavar("PROFILE_DB");
        let first = tables().classify(&spec).unwrap();
        let second = tables().classify(&spec).unwrap();
        assert_eq!(first, second);
    }
}
