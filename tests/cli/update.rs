use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::{CliTest, DIALOG_ES, DIALOG_MESSAGES, stderr, stdout};

const DIALOG_WITH_OPEN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="es" sourcelanguage="en">
<context>
    <name>Dialog</name>
    <message>
        <location filename="dialog.cpp" line="40"/>
        <source>Save</source>
        <translation>Guardar</translation>
    </message>
    <message>
        <location filename="dialog.cpp" line="48"/>
        <source>Open</source>
        <translation>Abrir</translation>
    </message>
</context>
</TS>
"#;

const SAVE_ONLY: &str = r#"[
    { "context": "Dialog", "source": "Save", "locations": [{ "file": "dialog.cpp", "line": 42 }] }
]"#;

#[test]
fn test_update_dialog_scenario() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_ES)?;
    test.write_file("messages.json", DIALOG_MESSAGES)?;

    assert_cmd_snapshot!(test.command().args(["update", "-m", "messages.json", "app_es.ts"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Updating 'app_es.ts'...
    ✓ Updated 'app_es.ts': 2 messages (1 new, 1 existing, 0 changed)

    ----- stderr -----
    ");

    let catalog = test.read_file("app_es.ts")?;
    assert!(catalog.contains("<location filename=\"dialog.cpp\" line=\"42\"/>"));
    assert!(catalog.contains("<translation>Guardar</translation>"));
    assert!(catalog.contains("<message numerus=\"yes\">"));
    assert!(catalog.contains(
        "<translation type=\"unfinished\">\n            <numerusform></numerusform>\n            <numerusform></numerusform>\n        </translation>"
    ));
    Ok(())
}

#[test]
fn test_update_is_idempotent() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_ES)?;
    test.write_file("messages.json", DIALOG_MESSAGES)?;

    test.run(&["update", "-m", "messages.json", "app_es.ts"])?;
    let first = test.read_file("app_es.ts")?;
    let output = test.run(&["update", "-m", "messages.json", "app_es.ts"])?;
    assert!(output.status.success());
    assert_eq!(test.read_file("app_es.ts")?, first);
    assert!(stdout(&output).contains("(0 new, 2 existing, 0 changed)"));
    Ok(())
}

#[test]
fn test_update_obsolete_lifecycle() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_WITH_OPEN)?;
    test.write_file("messages.json", SAVE_ONLY)?;
    let args = ["update", "-m", "messages.json", "app_es.ts"];

    test.run(&args)?;
    let catalog = test.read_file("app_es.ts")?;
    assert!(catalog.contains("<translation type=\"obsolete\">Abrir</translation>"));

    assert_cmd_snapshot!(test.command().args(args), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Updating 'app_es.ts'...
    ✓ Updated 'app_es.ts': 1 message (0 new, 1 existing, 0 changed)
      - vanished: 1

    ----- stderr -----
    ");
    let catalog = test.read_file("app_es.ts")?;
    assert!(catalog.contains("<translation type=\"vanished\">Abrir</translation>"));

    test.run(&args)?;
    let catalog = test.read_file("app_es.ts")?;
    assert!(!catalog.contains("Open"));
    assert!(catalog.contains("<translation>Guardar</translation>"));
    Ok(())
}

#[test]
fn test_update_keep_obsolete() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_WITH_OPEN)?;
    test.write_file("messages.json", SAVE_ONLY)?;
    let args = ["update", "-m", "messages.json", "app_es.ts", "--keep-obsolete"];

    test.run(&args)?;
    test.run(&args)?;
    let catalog = test.read_file("app_es.ts")?;
    assert!(catalog.contains("<translation type=\"obsolete\">Abrir</translation>"));
    Ok(())
}

#[test]
fn test_update_no_obsolete() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_WITH_OPEN)?;
    test.write_file("messages.json", SAVE_ONLY)?;

    let output = test.run(&["update", "-m", "messages.json", "app_es.ts", "--no-obsolete"])?;
    assert!(output.status.success());
    let catalog = test.read_file("app_es.ts")?;
    assert!(!catalog.contains("Abrir"));
    Ok(())
}

#[test]
fn test_update_creates_catalog_and_guesses_language() -> Result<()> {
    let test = CliTest::with_file("messages.json", DIALOG_MESSAGES)?;

    let output = test.run(&["update", "-m", "messages.json", "i18n/app_ru.ts"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("info: \"target language 'ru' guessed from file name\""));
    assert!(out.contains("Created 'i18n/app_ru.ts'"));

    let catalog = test.read_file("i18n/app_ru.ts")?;
    assert!(catalog.contains("<TS version=\"2.1\" language=\"ru\">"));
    assert_eq!(catalog.matches("<numerusform></numerusform>").count(), 3);
    Ok(())
}

#[test]
fn test_update_uses_config_catalogs() -> Result<()> {
    let test = CliTest::with_file("translations/app_es.ts", DIALOG_ES)?;
    test.write_file("messages.json", DIALOG_MESSAGES)?;
    test.write_file(".tsctlrc.json", r#"{ "locations": "none" }"#)?;

    let output = test.run(&["update", "-m", "messages.json", "--silent"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    // The file's own absolute locations win over the configured default.
    let catalog = test.read_file("translations/app_es.ts")?;
    assert!(catalog.contains("line=\"42\""));
    Ok(())
}

#[test]
fn test_update_missing_messages_file() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_ES)?;

    let output = test.run(&["update", "-m", "missing.json", "app_es.ts"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("cannot read"));
    assert_eq!(test.read_file("app_es.ts")?, DIALOG_ES);
    Ok(())
}

#[test]
fn test_update_malformed_catalog_is_read_failure() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", "<TS version=\"2.1\">\n<context>\n</TS>\n")?;
    test.write_file("messages.json", DIALOG_MESSAGES)?;

    let output = test.run(&["update", "-m", "messages.json", "app_es.ts"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("app_es.ts:"));
    Ok(())
}

#[test]
fn test_update_malformed_messages_reports_position() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_ES)?;
    test.write_file("messages.json", "[\n  { \"context\": \"Dialog\" \n]")?;

    let output = test.run(&["update", "-m", "messages.json", "app_es.ts"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("messages.json:"));
    Ok(())
}

#[test]
fn test_update_writes_into_project_root() -> Result<()> {
    let test = CliTest::with_file("app_es.ts", DIALOG_ES)?;
    test.write_file("messages.json", DIALOG_MESSAGES)?;

    test.run(&["update", "-m", "messages.json", "app_es.ts"])?;
    let leftovers: Vec<_> = std::fs::read_dir(test.root())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    let mut leftovers = leftovers;
    leftovers.sort();
    assert_eq!(leftovers, vec!["app_es.ts", "messages.json"]);
    Ok(())
}
