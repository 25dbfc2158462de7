use assert_cmd::prelude::*;
use predicates::prelude::*;
use assert_cmd::Command;
use std::{env, fs, path::PathBuf};

/// Writes a script into the temp directory so the run's artifact files land
/// there too.
fn write_script(name: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("cythonic-{}-{}.cytho", std::process::id(), name));
    fs::write(&path, contents).expect("failed to write test script");
    path
}

#[test]
fn prints_values() -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script(
        "prints",
        "print(1 + 2 * 3);\nprint(\"hello\");\nprint(true && false);\n",
    );

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("7\nhello\nfalse\n"));

    Ok(())
}

#[test]
fn while_loop_prints_once_per_iteration() -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script(
        "while",
        "let i = 0;\nwhile (i < 3) {\n  print(i);\n  i = i + 1;\n}\nprint(i);\n",
    );

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0\n1\n2\n3\n"));

    Ok(())
}

#[test]
fn input_reads_an_integer_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script("input", "let x = 0;\ninput(x);\nprint(x + 1);\n");

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.write_stdin("41\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Enter value for x: "))
        .stdout(predicate::str::contains("42"));

    Ok(())
}

#[test]
fn const_write_is_reported_and_the_run_completes() -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script(
        "const",
        "const limit = 10;\nlimit = 20;\nprint(limit);\n",
    );

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("10"))
        .stderr(predicate::str::contains("assignment to constant 'limit' was rejected"));

    Ok(())
}

#[test]
fn division_by_zero_does_not_fail_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script("divzero", "print(5 / 0);\nprint(\"done\");\n");

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0\ndone\n"));

    Ok(())
}

#[test]
fn syntax_error_is_reported_and_later_statements_still_run(
) -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script("recover", "let = 5;\nprint(7);\n");

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Syntax Analysis Complete: Errors found."))
        .stdout(predicate::str::contains("7"))
        .stderr(predicate::str::contains("[line 1:5] Error at '='"));

    Ok(())
}

#[test]
fn writes_symbol_table_and_parse_trace_artifacts() -> Result<(), Box<dyn std::error::Error>> {
    let script = write_script("artifacts", "let x = 1;\nprint(x);\n");

    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg(&script);
    cmd.assert().success();

    let table = fs::read_to_string(format!("{}.symboltable.txt", script.display()))?;
    assert!(table.starts_with("CYTHONIC LEXICAL ANALYZER - SYMBOL TABLE"));
    assert!(table.contains("END OF SYMBOL TABLE"));

    let trace = fs::read_to_string(format!("{}.parsetree.txt", script.display()))?;
    assert!(trace.starts_with("Enter <Program>"));
    assert!(trace.contains("Enter <OutputStatement>"));

    Ok(())
}

#[test]
fn rejects_a_non_cytho_extension() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg("script.txt");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Expected '.cytho' extension"));

    Ok(())
}

#[test]
fn reports_an_unreadable_source_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("cythonic")?;
    cmd.arg("no-such-file.cytho");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open file"));

    Ok(())
}
