use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;

use toolgen_assembly::{
    assemble, generate_tool_from_description, ParserDescription, ShedConfig,
};
use toolgen_core::ClassifierTables;

/// Tools that must never get a wrapper.
const TOOLS_TO_SKIP: [&str; 3] = ["anvi-upgrade", "anvi-init-bam", "anvi-gen-variability-matrix"];

#[derive(Debug, Parser)]
#[command(name = "toolgen")]
#[command(about = "Generate Galaxy tool wrappers from extracted parser descriptions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one wrapper document from a parser description JSON file.
    Generate(GenerateArgs),
    /// Generate wrappers for every description in a directory.
    Batch(BatchArgs),
    /// Validate description files without writing any documents.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Parser description JSON file.
    input: PathBuf,
    /// Output XML path (stdout when omitted).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Directory containing parser description JSON files.
    #[arg(long)]
    input: PathBuf,
    /// Output directory for wrapper XML files and the suite manifest.
    #[arg(long)]
    output: PathBuf,
    /// Comma-separated extra tool names to skip.
    #[arg(long)]
    skip: Option<String>,
    /// Number of parallel generation jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Do not write the .shed.yml suite manifest.
    #[arg(long)]
    no_shed: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Description files to validate.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Emit the report as JSON instead of human-readable lines.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    path: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    inputs: usize,
    outputs: usize,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Batch(args) => run_batch(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn read_description(path: &Path) -> Result<ParserDescription, String> {
    let json = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    ParserDescription::from_json(&json).map_err(|err| format!("{}: {err}", path.display()))
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let tables = ClassifierTables::builtin();
    let desc = read_description(&args.input)?;
    let xml = generate_tool_from_description(&desc, &tables)
        .map_err(|err| format!("{}: {err}", args.input.display()))?;

    match &args.output {
        Some(path) => fs::write(path, xml)
            .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?,
        None => print!("{xml}"),
    }
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    let extra_skips: Vec<String> = args
        .skip
        .as_deref()
        .map(|csv| {
            csv.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    fs::create_dir_all(&args.output).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            args.output.display()
        )
    })?;

    let mut paths: Vec<PathBuf> = fs::read_dir(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|err| format!("Failed to configure thread pool: {err}"))?;
    }

    let tables = ClassifierTables::builtin();

    let outcomes: Vec<Result<Option<String>, String>> = paths
        .par_iter()
        .map(|path| {
            let desc = read_description(path)?;
            if TOOLS_TO_SKIP.contains(&desc.prog.as_str())
                || extra_skips.iter().any(|skip| *skip == desc.prog)
            {
                return Ok(None);
            }
            let xml = generate_tool_from_description(&desc, &tables)
                .map_err(|err| format!("{}: {err}", path.display()))?;
            let out_path = args.output.join(format!("{}.xml", desc.prog));
            fs::write(&out_path, xml)
                .map_err(|err| format!("Failed to write '{}': {err}", out_path.display()))?;
            Ok(Some(desc.prog))
        })
        .collect();

    let mut written = 0usize;
    let mut skipped = 0usize;
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(Some(_)) => written += 1,
            Ok(None) => skipped += 1,
            Err(err) => failures.push(err),
        }
    }

    if !args.no_shed {
        let manifest = ShedConfig::suite()
            .to_yaml()
            .map_err(|err| format!("Failed to serialize suite manifest: {err}"))?;
        let shed_path = args.output.join(".shed.yml");
        fs::write(&shed_path, manifest)
            .map_err(|err| format!("Failed to write '{}': {err}", shed_path.display()))?;
    }

    println!("Created {written} Galaxy tools ({skipped} skipped).");
    if !failures.is_empty() {
        eprintln!("\nFailures:");
        for failure in &failures {
            eprintln!("  {failure}");
        }
        return Err(format!("{} tool(s) failed", failures.len()));
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let tables = ClassifierTables::builtin();

    let reports: Vec<CheckReport> = args
        .inputs
        .iter()
        .map(|path| {
            let display = path.display().to_string();
            match read_description(path).and_then(|desc| {
                assemble(&desc.prog, &desc.to_tree(), &tables).map_err(|err| err.to_string())
            }) {
                Ok(assembled) => CheckReport {
                    path: display,
                    ok: true,
                    error: None,
                    inputs: assembled.inputs.len(),
                    outputs: assembled.outputs.len(),
                },
                Err(err) => CheckReport {
                    path: display,
                    ok: false,
                    error: Some(err),
                    inputs: 0,
                    outputs: 0,
                },
            }
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|err| format!("Failed to serialize report: {err}"))?;
        println!("{json}");
    } else {
        for report in &reports {
            if report.ok {
                println!(
                    "ok   {} ({} inputs, {} outputs)",
                    report.path, report.inputs, report.outputs
                );
            } else {
                println!(
                    "FAIL {}: {}",
                    report.path,
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.ok).count();
    if failed > 0 {
        return Err(format!("{failed} description(s) failed validation"));
    }
    Ok(())
}
