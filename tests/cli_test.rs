//! CLI integration tests
//!
//! Every test runs the real binary against files in a temp directory. HOME
//! is pointed into the temp tree so config discovery never picks up a real
//! user profile.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Write a minimal TcPOU file with the given code blocks, returning its path.
fn write_pou(
    dir: &std::path::Path,
    file_name: &str,
    declaration: &str,
    implementation: &str,
) -> std::path::PathBuf {
    let mut text = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    text.push_str("<TcPlcObject Version=\"1.1.0.1\">\n");
    text.push_str("  <POU Name=\"MAIN\" Id=\"{d43436a1-9713-4c9e-9524-93b0a4b0b715}\">\n");
    text.push_str(&format!(
        "    <Declaration><![CDATA[{declaration}]]></Declaration>\n"
    ));
    text.push_str("    <Implementation>\n");
    text.push_str(&format!("      <ST><![CDATA[{implementation}]]></ST>\n"));
    text.push_str("    </Implementation>\n");
    text.push_str("  </POU>\n");
    text.push_str("</TcPlcObject>\n");
    let path = dir.join(file_name);
    std::fs::write(&path, text).unwrap();
    path
}

/// Declaration block with trailing whitespace on its second line.
const DIRTY_DECL: &str = "FUNCTION_BLOCK MAIN\nVAR   \nEND_VAR\n";
const CLEAN_DECL: &str = "FUNCTION_BLOCK MAIN\nVAR\nEND_VAR\n";

// Basic invocation

#[test]
fn test_version() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg("--version")
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tcfmt"));
}

#[test]
fn test_help_lists_options() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg("--help")
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--check"))
        .stdout(predicate::str::contains("--dry"))
        .stdout(predicate::str::contains("--recursive"));
}

#[test]
fn test_no_targets_is_an_error() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_missing_target_is_reported_and_skipped() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(dir.path().join("does_not_exist.TcPOU"))
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("could not find path or folder"))
        .stderr(predicate::str::contains("No TwinCAT files found to format."))
        .stderr(predicate::str::contains("1 error(s) occurred"));
}

// Write, check and dry modes

#[test]
fn test_format_writes_file() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["--trim-trailing-whitespace", path.to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"))
        .stderr(predicate::str::contains("Re-saved 1 file(s)"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("VAR   "));
    assert!(content.contains("VAR\nEND_VAR"));
}

#[test]
fn test_second_run_changes_nothing() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    for _ in 0..2 {
        Command::cargo_bin("tcfmt")
            .unwrap()
            .args(["--trim-trailing-whitespace", path.to_str().unwrap()])
            .env("HOME", dir.path())
            .current_dir(dir.path())
            .assert()
            .success();
    }
    let settled = std::fs::read_to_string(&path).unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["--trim-trailing-whitespace", path.to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Re-saved 0 file(s)"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), settled);
}

#[test]
fn test_check_dirty_fails_without_writing() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");
    let before = std::fs::read_to_string(&path).unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--check",
            "--trim-trailing-whitespace",
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("1 file(s) should be altered"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_check_clean_succeeds() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--check",
            "--trim-trailing-whitespace",
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "No changes to be made in checked files!",
        ));
}

#[test]
fn test_dry_prints_corrections_without_writing() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");
    let before = std::fs::read_to_string(&path).unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--dry",
            "--trim-trailing-whitespace",
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[declaration:MAIN]:2\tLine contains trailing whitespace",
        ))
        .stderr(predicate::str::contains("1 file(s) would be re-saved"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_debug_prints_corrections_to_stderr() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--debug",
            "--check",
            "--trim-trailing-whitespace",
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("[DEBUG] Processing"))
        .stderr(predicate::str::contains(
            "Line contains trailing whitespace",
        ));
}

// File collection

#[test]
fn test_directory_target_picks_up_project_files() {
    let dir = tempdir().unwrap();
    write_pou(dir.path(), "a.TcPOU", CLEAN_DECL, "x := 1;\n");
    write_pou(dir.path(), "b.TcGVL", CLEAN_DECL, "x := 1;\n");
    write_pou(dir.path(), "c.TcDUT", CLEAN_DECL, "x := 1;\n");
    std::fs::write(dir.path().join("notes.txt"), "not a project file\n").unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(dir.path())
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 3 file(s)"));
}

#[test]
fn test_recursive_descends_subdirectories() {
    let dir = tempdir().unwrap();
    let plc = dir.path().join("plc");
    std::fs::create_dir_all(plc.join("sub")).unwrap();
    write_pou(&plc, "top.TcPOU", CLEAN_DECL, "x := 1;\n");
    write_pou(&plc.join("sub"), "nested.TcPOU", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(&plc)
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"));

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["-r", plc.to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 2 file(s)"));
}

#[test]
fn test_filter_overrides_defaults() {
    let dir = tempdir().unwrap();
    write_pou(dir.path(), "a.TcPOU", CLEAN_DECL, "x := 1;\n");
    write_pou(dir.path(), "b.TcGVL", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["--filter", "*.TcGVL", dir.path().to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"));
}

#[test]
fn test_invalid_filter_pattern_is_reported() {
    let dir = tempdir().unwrap();
    write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["--check", "--filter", "[Tc", dir.path().to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid filter pattern `[Tc`"))
        .stderr(predicate::str::contains("No TwinCAT files found to format."))
        .stderr(predicate::str::contains("1 error(s) occurred"));
}

#[test]
fn test_exclude_drops_matching_files() {
    let dir = tempdir().unwrap();
    write_pou(dir.path(), "main.TcPOU", CLEAN_DECL, "x := 1;\n");
    write_pou(dir.path(), "skip.TcPOU", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["-e", "skip*", dir.path().to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"));
}

#[test]
fn test_exclude_matches_directory_components() {
    let dir = tempdir().unwrap();
    let plc = dir.path().join("plc");
    std::fs::create_dir_all(plc.join("_Backup")).unwrap();
    write_pou(&plc, "main.TcPOU", CLEAN_DECL, "x := 1;\n");
    write_pou(&plc.join("_Backup"), "old.TcPOU", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["-r", "-e", "_Backup", plc.to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"));
}

#[test]
fn test_explicit_file_bypasses_filters() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "notes.txt", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(&path)
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"));
}

#[test]
fn test_repeated_target_checked_once() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([path.to_str().unwrap(), path.to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 1 file(s)"));
}

#[test]
fn test_parallel_jobs_process_all_files() {
    let dir = tempdir().unwrap();
    write_pou(dir.path(), "a.TcPOU", DIRTY_DECL, "x := 1;\n");
    write_pou(dir.path(), "b.TcPOU", DIRTY_DECL, "x := 1;\n");
    write_pou(dir.path(), "c.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "-j",
            "2",
            "--trim-trailing-whitespace",
            dir.path().to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 3 file(s)"))
        .stderr(predicate::str::contains("Re-saved 3 file(s)"));
}

// Configuration

#[test]
fn test_config_file_discovered_next_to_target() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("tcfmt.toml"),
        "trim_trailing_whitespace = true\n",
    )
    .unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(&path)
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Re-saved 1 file(s)"));

    assert!(!std::fs::read_to_string(&path).unwrap().contains("VAR   "));
}

#[test]
fn test_home_config_applies() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    std::fs::write(
        home.path().join("tcfmt.toml"),
        "trim_trailing_whitespace = true\n",
    )
    .unwrap();
    let path = write_pou(project.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(&path)
        .env("HOME", home.path())
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Re-saved 1 file(s)"));

    assert!(!std::fs::read_to_string(&path).unwrap().contains("VAR   "));
}

#[test]
fn test_project_config_overrides_home_config() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    std::fs::write(home.path().join("tcfmt.toml"), "end_of_line = \"crlf\"\n").unwrap();
    std::fs::write(project.path().join("tcfmt.toml"), "end_of_line = \"lf\"\n").unwrap();
    let path = write_pou(
        project.path(),
        "main.TcPOU",
        "FUNCTION_BLOCK MAIN\r\nVAR\r\nEND_VAR\r\n",
        "x := 1;\n",
    );

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(&path)
        .env("HOME", home.path())
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Re-saved 1 file(s)"));

    assert!(!std::fs::read_to_string(&path).unwrap().contains('\r'));
}

#[test]
fn test_cli_overrides_config_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("tcfmt.toml"), "end_of_line = \"crlf\"\n").unwrap();
    let path = write_pou(
        dir.path(),
        "main.TcPOU",
        "FUNCTION_BLOCK MAIN\r\nVAR\r\nEND_VAR\r\n",
        "x := 1;\n",
    );

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args(["--end-of-line", "lf", path.to_str().unwrap()])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(!std::fs::read_to_string(&path).unwrap().contains('\r'));
}

#[test]
fn test_explicit_config_replaces_discovery() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("tcfmt.toml"),
        "trim_trailing_whitespace = true\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("other.toml"),
        "insert_final_newline = true\n",
    )
    .unwrap();
    // Trailing whitespace in the declaration, no final newline in either block
    let path = write_pou(dir.path(), "main.TcPOU", "VAR   \nEND_VAR", "x := 1;");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--config",
            dir.path().join("other.toml").to_str().unwrap(),
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    // The discovered trim option was replaced, the explicit newline option applied
    assert!(content.contains("VAR   \n"));
    assert!(content.contains("END_VAR\n]]></Declaration>"));
    assert!(content.contains("x := 1;\n]]></ST>"));
}

#[test]
fn test_explicit_config_missing_is_fatal() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", CLEAN_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--config",
            dir.path().join("missing.toml").to_str().unwrap(),
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_end_of_line_in_config_aborts() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("tcfmt.toml"),
        "end_of_line = \"mac\"\ntrim_trailing_whitespace = true\n",
    )
    .unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");
    let before = std::fs::read_to_string(&path).unwrap();

    Command::cargo_bin("tcfmt")
        .unwrap()
        .arg(&path)
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("end_of_line"));

    // Nothing was touched, even though the trim option alone would apply
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

// Output control

#[test]
fn test_silent_suppresses_summary() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--silent",
            "--check",
            "--trim-trailing-whitespace",
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_silent_wins_over_debug() {
    let dir = tempdir().unwrap();
    let path = write_pou(dir.path(), "main.TcPOU", DIRTY_DECL, "x := 1;\n");

    Command::cargo_bin("tcfmt")
        .unwrap()
        .args([
            "--silent",
            "--debug",
            "--check",
            "--trim-trailing-whitespace",
            path.to_str().unwrap(),
        ])
        .env("HOME", dir.path())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}
