use anyhow::Result;

use crate::{CliTest, stderr, stdout};

const APP_FR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="fr" sourcelanguage="en">
<context>
    <name>Dialog</name>
    <message>
        <source>Save</source>
        <translation>Enregistrer</translation>
    </message>
    <message>
        <source>Open</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <source>Close</source>
        <translation type="unfinished"></translation>
    </message>
</context>
<context>
    <name>Toolbar</name>
    <message>
        <source>Save</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

const COMMON_QPH: &str = r#"<!DOCTYPE QPH>
<QPH language="fr" sourcelanguage="en">
<phrase>
    <source>Open</source>
    <target>Ouvrir</target>
</phrase>
</QPH>
"#;

#[test]
fn test_translate_from_phrase_book_and_history() -> Result<()> {
    let test = CliTest::with_file("app_fr.ts", APP_FR)?;
    test.write_file("common.qph", COMMON_QPH)?;

    let output = test.run(&["translate", "app_fr.ts", "--phrase-book", "common.qph", "-v"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Translating 'app_fr.ts'..."));
    assert!(out.contains("Translated 2 of 4 messages in 'app_fr.ts'"));
    assert!(out.contains("  - phrase book 'common': 1"));
    assert!(out.contains("  - earlier translations: 1"));

    let content = test.read_file("app_fr.ts")?;
    assert!(content.contains("<translation type=\"unfinished\">Ouvrir</translation>"));
    assert_eq!(content.matches("Enregistrer").count(), 2);
    // Close has no match anywhere.
    assert_eq!(content.matches("type=\"unfinished\"></translation>").count(), 1);
    Ok(())
}

#[test]
fn test_translate_mark_finished() -> Result<()> {
    let test = CliTest::with_file("app_fr.ts", APP_FR)?;
    test.write_file("common.qph", COMMON_QPH)?;

    let output = test.run(&[
        "translate",
        "app_fr.ts",
        "--phrase-book",
        "common.qph",
        "--mark-finished",
        "--no-history",
    ])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Translated 1 of 4 messages"));

    let content = test.read_file("app_fr.ts")?;
    assert!(content.contains("<translation>Ouvrir</translation>"));
    assert_eq!(content.matches("Enregistrer").count(), 1);
    Ok(())
}

#[test]
fn test_translate_phrase_books_from_config() -> Result<()> {
    let test = CliTest::with_file("app_fr.ts", APP_FR)?;
    test.write_file("books/common.qph", COMMON_QPH)?;
    test.write_file(".tsctlrc.json", r#"{ "phraseBooks": ["books/*.qph"] }"#)?;

    let output = test.run(&["translate", "app_fr.ts", "--no-history"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.read_file("app_fr.ts")?.contains("Ouvrir"));
    Ok(())
}

#[test]
fn test_translate_nothing_leaves_file_untouched() -> Result<()> {
    let test = CliTest::with_file("app_fr.ts", APP_FR)?;

    let output = test.run(&["translate", "app_fr.ts", "--no-history"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("No messages to translate in 'app_fr.ts'"));
    assert_eq!(test.read_file("app_fr.ts")?, APP_FR);
    Ok(())
}

#[test]
fn test_translate_missing_phrase_book() -> Result<()> {
    let test = CliTest::with_file("app_fr.ts", APP_FR)?;

    let output = test.run(&["translate", "app_fr.ts", "--phrase-book", "nope.qph"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("nope.qph"));
    Ok(())
}
