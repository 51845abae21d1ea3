use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("toolgen_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn write_description(dir: &TempDir, prog: &str) -> PathBuf {
    let json = serde_json::json!({
        "prog": prog,
        "description": format!("Test tool {prog}"),
        "help": format!("usage: {prog} [options]"),
        "arguments": [
            {"name": "title", "long_flag": "--title"},
            {"name": "num-threads", "long_flag": "--num-threads", "metavar": "NUM_THREADS"},
            {"name": "overwrite", "long_flag": "--overwrite", "action": "store_true"}
        ]
    });
    let path = dir.join(&format!("{prog}.json"));
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap())
        .expect("failed to write description");
    path
}

fn toolgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_toolgen"))
}

#[test]
fn generate_writes_wrapper_to_stdout() {
    let dir = TempDir::new("generate_stdout");
    let input = write_description(&dir, "anvi-script-a");

    let output = toolgen()
        .args(["generate", input.to_str().unwrap()])
        .output()
        .expect("failed to run toolgen");

    assert!(output.status.success());
    let xml = String::from_utf8_lossy(&output.stdout);
    assert!(xml.contains(r#"<tool id="anvi_script_a" name="anvi-script-a""#));
    assert!(xml.contains("--title '${title}'"));
    assert!(xml.contains(r#"--num-threads "\${GALAXY_SLOTS:-1}""#));
}

#[test]
fn generate_writes_wrapper_to_file() {
    let dir = TempDir::new("generate_file");
    let input = write_description(&dir, "anvi-script-b");
    let out_path = dir.join("anvi-script-b.xml");

    let status = toolgen()
        .args([
            "generate",
            input.to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run toolgen");

    assert!(status.success());
    let xml = fs::read_to_string(&out_path).expect("output file missing");
    assert!(xml.contains("</tool>"));
}

#[test]
fn generate_fails_on_malformed_description() {
    let dir = TempDir::new("generate_bad");
    let path = dir.join("bad.json");
    fs::write(&path, "{ not json").unwrap();

    let output = toolgen()
        .args(["generate", path.to_str().unwrap()])
        .output()
        .expect("failed to run toolgen");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed parser description"));
}

#[test]
fn batch_generates_all_tools_and_manifest() {
    let dir = TempDir::new("batch_in");
    let out = TempDir::new("batch_out");
    write_description(&dir, "anvi-script-c");
    write_description(&dir, "anvi-script-d");
    // This one is on the built-in skip list.
    write_description(&dir, "anvi-upgrade");

    let output = toolgen()
        .args([
            "batch",
            "--input",
            dir.path.to_str().unwrap(),
            "--output",
            out.path.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run toolgen");

    assert!(output.status.success());
    assert!(out.join("anvi-script-c.xml").exists());
    assert!(out.join("anvi-script-d.xml").exists());
    assert!(!out.join("anvi-upgrade.xml").exists());

    let manifest = fs::read_to_string(out.join(".shed.yml")).expect("manifest missing");
    assert!(manifest.contains("name: anvio"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created 2 Galaxy tools (1 skipped)."));
}

#[test]
fn check_reports_failures_with_nonzero_exit() {
    let dir = TempDir::new("check_mixed");
    let good = write_description(&dir, "anvi-script-e");
    let bad = dir.join("dup.json");
    fs::write(
        &bad,
        serde_json::json!({
            "prog": "anvi-dup",
            "arguments": [
                {"name": "e-value", "long_flag": "--e-value"},
                {"name": "e_value", "long_flag": "--e_value"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let output = toolgen()
        .args(["check", good.to_str().unwrap(), bad.to_str().unwrap()])
        .output()
        .expect("failed to run toolgen");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok   "));
    assert!(stdout.contains("FAIL "));
    assert!(stdout.contains("duplicate parameter name 'e_value'"));
}

#[test]
fn check_json_report_is_machine_readable() {
    let dir = TempDir::new("check_json");
    let good = write_description(&dir, "anvi-script-f");

    let output = toolgen()
        .args(["check", "--json", good.to_str().unwrap()])
        .output()
        .expect("failed to run toolgen");

    assert!(output.status.success());
    let reports: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout must be JSON");
    let report = &reports[0];
    assert_eq!(report["ok"], true);
    // title + overwrite render inputs; num-threads has no UI element.
    assert_eq!(report["inputs"], 2);
    // The log dataset is always an output.
    assert_eq!(report["outputs"], 1);
}
