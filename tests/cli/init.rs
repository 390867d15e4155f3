use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, DIALOG_ES, stdout};

#[test]
fn test_init_writes_default_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("✓ Created .tsctlrc.json"));

    let content = test.read_file(".tsctlrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["catalogs"], serde_json::json!(["translations"]));
    assert_eq!(parsed["sortContexts"], Value::Bool(true));
    assert_eq!(parsed["similarityThreshold"], serde_json::json!(0.85));
    assert!(parsed["release"].is_object());
    assert!(parsed["validators"].is_object());
    assert!(content.contains("\n  \"catalogs\""), "Config should use 2-space indentation");
    Ok(())
}

#[test]
fn test_init_config_is_usable() -> Result<()> {
    let test = CliTest::with_file("translations/dialog_es.ts", DIALOG_ES)?;
    test.run(&["init"])?;

    let output = test.run(&["check"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Checked 1 catalog - no issues found"));
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
    let test = CliTest::with_file(".tsctlrc.json", "{}")?;

    let output = test.run(&["init"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("error: .tsctlrc.json already exists"));
    assert_eq!(test.read_file(".tsctlrc.json")?, "{}");
    Ok(())
}
