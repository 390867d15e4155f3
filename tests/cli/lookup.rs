use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::release::APP_DE;
use crate::{CliTest, stderr, stdout};

fn released() -> Result<CliTest> {
    let test = CliTest::with_file("app_de.ts", APP_DE)?;
    let output = test.run(&["release", "app_de.ts", "--silent"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    Ok(test)
}

#[test]
fn test_lookup_by_context_and_source() -> Result<()> {
    let test = released()?;

    let output = test.run(&["lookup", "app_de.qm", "--context", "Dialog", "--source", "Save"])?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Speichern\n");

    // Unfinished translations are released too.
    let output = test.run(&["lookup", "app_de.qm", "--context", "Dialog", "--source", "Open"])?;
    assert_eq!(stdout(&output), "Öffnen\n");
    Ok(())
}

#[test]
fn test_lookup_plural_forms() -> Result<()> {
    let test = released()?;

    let one = test.run(&[
        "lookup", "app_de.qm", "--context", "Dialog", "--source", "%n file(s)", "-n", "1",
    ])?;
    assert_eq!(stdout(&one), "%n Datei\n");

    let many = test.run(&[
        "lookup", "app_de.qm", "--context", "Dialog", "--source", "%n file(s)", "-n", "5",
    ])?;
    assert_eq!(stdout(&many), "%n Dateien\n");
    Ok(())
}

#[test]
fn test_lookup_by_id() -> Result<()> {
    let test = released()?;

    let output = test.run(&["lookup", "app_de.qm", "--id", "app.quit"])?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Beenden\n");
    Ok(())
}

#[test]
fn test_lookup_miss() -> Result<()> {
    let test = released()?;

    // Untranslated messages are not released.
    let output = test.run(&["lookup", "app_de.qm", "--context", "Dialog", "--source", "Close"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("error: message not found"));

    let output = test.run(&["lookup", "app_de.qm", "--context", "Other", "--source", "Save"])?;
    assert_eq!(output.status.code(), Some(1));

    assert_cmd_snapshot!(test.command().args(["lookup", "app_de.qm", "--id", "app.missing"]), @r"
    success: false
    exit_code: 1
    ----- stdout -----
    error: message not found: app.missing

    ----- stderr -----
    ");
    Ok(())
}

#[test]
fn test_lookup_key_arguments() -> Result<()> {
    let test = released()?;

    let output = test.run(&["lookup", "app_de.qm"])?;
    assert_eq!(output.status.code(), Some(2));

    let output = test.run(&["lookup", "app_de.qm", "--id", "x", "--source", "Save"])?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}

#[test]
fn test_lookup_malformed_artifact() -> Result<()> {
    let test = CliTest::with_file("garbage.qm", "this is not an artifact")?;

    let output = test.run(&["lookup", "garbage.qm", "--id", "app.quit"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("garbage.qm"));

    let output = test.run(&["lookup", "missing.qm", "--id", "app.quit"])?;
    assert_eq!(output.status.code(), Some(3));
    Ok(())
}
