//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn titlematch() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("titlematch").unwrap()
}

#[test]
fn judge_accepts_number_words() {
    titlematch()
        .args(["judge", "--answer", "Area 51", "--guess", "Area Fifty One"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACCEPTED"))
        .stdout(predicate::str::contains("phase: alias"));
}

#[test]
fn judge_rejects_wrong_monarch() {
    titlematch()
        .args(["judge", "--answer", "Henry VI", "--guess", "Henry VIII"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REJECTED"))
        .stdout(predicate::str::contains("Monarch numeral mismatch"));
}

#[test]
fn judge_uses_aliases() {
    titlematch()
        .args([
            "judge",
            "--answer",
            "Louis XIV",
            "--guess",
            "Sun King",
            "--alias",
            "Louis the Fourteenth",
            "--alias",
            "Sun King",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACCEPTED"));
}

#[test]
fn judge_json_with_debug() {
    let output = titlematch()
        .args([
            "judge",
            "--answer",
            "Battle of Hastings",
            "--guess",
            "Battle of Hastigns",
            "--format",
            "json",
            "--debug",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["decision"]["accepted"], true);
    assert_eq!(value["decision"]["details"]["phase"], "fuzzy");
    assert_eq!(
        value["decision"]["details"]["applied_rule"],
        "long-title rule"
    );
    assert_eq!(
        value["normalized_guess"]["normalized"],
        "battle of hastigns"
    );
}

#[test]
fn judge_unknown_format() {
    titlematch()
        .args(["judge", "--answer", "a", "--guess", "b", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn normalize_text_output() {
    titlematch()
        .args(["normalize", "The Battle of Hastings, Part Two"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("battle of hastings part num_2\n"));
}

#[test]
fn normalize_keep_articles() {
    titlematch()
        .args(["normalize", "--keep-articles", "The Beatles"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("the beatles\n"));
}

#[test]
fn validate_judge_set_file() {
    titlematch()
        .arg("validate")
        .arg("--judge-set")
        .arg("../../judge-sets/monarchs.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 cases, 19 guesses"))
        .stdout(predicate::str::contains("All judge sets valid"));
}

#[test]
fn validate_directory() {
    titlematch()
        .arg("validate")
        .arg("--judge-set")
        .arg("../../judge-sets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Monarchs"))
        .stdout(predicate::str::contains("Numbers"))
        .stdout(predicate::str::contains("General"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[judge_set]
id = "bad"
name = "Bad"

[[cases]]
id = "mars"
answer = "Mars"
accept = ["Mars"]
reject = ["Mars"]
"#,
    )
    .unwrap();

    titlematch()
        .arg("validate")
        .arg("--judge-set")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[mars] WARNING"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    titlematch()
        .arg("validate")
        .arg("--judge-set")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_fixtures_without_mismatches() {
    let out = TempDir::new().unwrap();

    titlematch()
        .arg("grade")
        .arg("--judge-set")
        .arg("../../judge-sets")
        .arg("--output")
        .arg(out.path())
        .arg("--fail-on-mismatch")
        .assert()
        .success()
        .stdout(predicate::str::contains("100.0%"))
        .stderr(predicate::str::contains("0 mismatch(es)"));

    let reports = std::fs::read_dir(out.path()).unwrap().count();
    assert_eq!(reports, 3);
}

#[test]
fn grade_with_filter_and_json() {
    let out = TempDir::new().unwrap();

    let output = titlematch()
        .arg("grade")
        .arg("--judge-set")
        .arg("../../judge-sets/numbers.toml")
        .arg("--output")
        .arg(out.path())
        .arg("--filter")
        .arg("years")
        .arg("--format")
        .arg("json")
        .arg("--parallelism")
        .arg("1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["judge_set"]["case_count"], 1);
    assert_eq!(report["aggregate"]["total"], 4);
    assert_eq!(report["results"][0]["case_id"], "moscow-1980");
}

#[test]
fn grade_fails_on_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wrong.toml");
    std::fs::write(
        &path,
        r#"
[judge_set]
id = "wrong"
name = "Wrong"

[[cases]]
id = "apollo"
answer = "Apollo 13"
accept = ["April 13"]
"#,
    )
    .unwrap();

    titlematch()
        .arg("grade")
        .arg("--judge-set")
        .arg(&path)
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--fail-on-mismatch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MISMATCH"))
        .stderr(predicate::str::contains("1 judgement(s) did not match"));
}

#[test]
fn grade_rejects_zero_parallelism() {
    let out = TempDir::new().unwrap();
    titlematch()
        .arg("grade")
        .arg("--judge-set")
        .arg("../../judge-sets/general.toml")
        .arg("--output")
        .arg(out.path())
        .arg("--parallelism")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parallelism must be at least 1"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    titlematch()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created titlematch.toml"))
        .stdout(predicate::str::contains("Created judge-sets/example.toml"));

    assert!(dir.path().join("titlematch.toml").exists());
    assert!(dir.path().join("judge-sets/example.toml").exists());

    // The generated example grades cleanly.
    titlematch()
        .current_dir(dir.path())
        .args(["grade", "--judge-set", "judge-sets/example.toml", "--fail-on-mismatch"])
        .assert()
        .success();
    assert!(dir.path().join("titlematch-results").is_dir());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    titlematch()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    titlematch()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn compare_nonexistent_report() {
    titlematch()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    titlematch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("answer judging"));
}

#[test]
fn version_output() {
    titlematch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("titlematch"));
}
