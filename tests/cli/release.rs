use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::{CliTest, stderr, stdout};

pub const APP_DE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de" sourcelanguage="en">
<context>
    <name>Dialog</name>
    <message>
        <source>Save</source>
        <translation>Speichern</translation>
    </message>
    <message>
        <source>Open</source>
        <translation type="unfinished">Öffnen</translation>
    </message>
    <message>
        <source>Close</source>
        <translation type="unfinished"></translation>
    </message>
    <message numerus="yes">
        <source>%n file(s)</source>
        <translation>
            <numerusform>%n Datei</numerusform>
            <numerusform>%n Dateien</numerusform>
        </translation>
    </message>
    <message id="app.quit">
        <source>Quit</source>
        <translation>Beenden</translation>
    </message>
</context>
</TS>
"#;

fn catalog(language: &str, context: &str, messages: &[(&str, &str)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"{}\">\n<context>\n    <name>{}</name>\n",
        language, context
    );
    for (source, translation) in messages {
        xml.push_str(&format!(
            "    <message>\n        <source>{}</source>\n        <translation>{}</translation>\n    </message>\n",
            source, translation
        ));
    }
    xml.push_str("</context>\n</TS>\n");
    xml
}

#[test]
fn test_release_next_to_catalog() -> Result<()> {
    let test = CliTest::with_file("i18n/app_de.ts", APP_DE)?;

    assert_cmd_snapshot!(test.command().args(["release", "i18n/app_de.ts"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Releasing 'i18n/app_de.ts'...
    ✓ Generated 'i18n/app_de.qm': 4 translations (3 finished, 1 unfinished)
      - ignored 1 untranslated message

    ----- stderr -----
    ");

    let bytes = std::fs::read(test.root().join("i18n/app_de.qm"))?;
    assert_eq!(&bytes[..4], b"TSQM");
    Ok(())
}

#[test]
fn test_release_is_deterministic() -> Result<()> {
    let test = CliTest::with_file("app_de.ts", APP_DE)?;

    test.run(&["release", "app_de.ts"])?;
    let first = std::fs::read(test.root().join("app_de.qm"))?;
    test.run(&["release", "app_de.ts", "-o", "again.qm"])?;
    let second = std::fs::read(test.root().join("again.qm"))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_release_directory_argument() -> Result<()> {
    let test = CliTest::with_file("i18n/app_de.ts", APP_DE)?;
    test.write_file("i18n/nested/tools_de.ts", &catalog("de", "Tools", &[("Run", "Starten")]))?;

    let output = test.run(&["release", "i18n"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("i18n/app_de.qm").exists());
    assert!(test.root().join("i18n/nested/tools_de.qm").exists());
    Ok(())
}

#[test]
fn test_release_combined_output() -> Result<()> {
    let test = CliTest::with_file("app_de.ts", APP_DE)?;
    test.write_file("tools_de.ts", &catalog("de", "Tools", &[("Run", "Starten")]))?;

    let output = test.run(&["release", "app_de.ts", "tools_de.ts", "-o", "all.qm"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Generated 'all.qm': 5 translations"));

    let run = test.run(&["lookup", "all.qm", "--context", "Tools", "--source", "Run"])?;
    assert_eq!(stdout(&run), "Starten\n");
    Ok(())
}

#[test]
fn test_release_key_collision() -> Result<()> {
    let test = CliTest::with_file("app_de.ts", &catalog("de", "Main", &[("ab", "x"), ("`r", "y")]))?;

    let output = test.run(&["release", "app_de.ts"])?;
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("key collision"));
    assert!(!test.root().join("app_de.qm").exists());
    Ok(())
}

#[test]
fn test_release_language_mismatch_in_combined_output() -> Result<()> {
    let test = CliTest::with_file("app_de.ts", APP_DE)?;
    test.write_file("app_fr.ts", &catalog("fr", "Dialog", &[("Save", "Enregistrer")]))?;

    let output = test.run(&["release", "app_de.ts", "app_fr.ts", "-o", "all.qm"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("targets 'fr'"));
    Ok(())
}

#[test]
fn test_release_idbased() -> Result<()> {
    let test = CliTest::with_file("app_de.ts", APP_DE)?;

    let output = test.run(&["release", "app_de.ts", "--idbased"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("1 translation (1 finished, 0 unfinished)"));
    assert!(out.contains("  - dropped without id: 4"));

    let run = test.run(&["lookup", "app_de.qm", "--id", "app.quit"])?;
    assert_eq!(stdout(&run), "Beenden\n");
    Ok(())
}

#[test]
fn test_release_mark_untranslated_and_drop_unfinished() -> Result<()> {
    let test = CliTest::with_file("app_de.ts", APP_DE)?;

    let output = test.run(&["release", "app_de.ts", "--markuntranslated", "!!"])?;
    assert!(output.status.success());
    let run = test.run(&["lookup", "app_de.qm", "--context", "Dialog", "--source", "Close"])?;
    assert_eq!(stdout(&run), "!!Close\n");

    let output = test.run(&["release", "app_de.ts", "--nounfinished"])?;
    assert!(stdout(&output).contains("  - dropped unfinished: 2"));
    let run = test.run(&["lookup", "app_de.qm", "--context", "Dialog", "--source", "Open"])?;
    assert_eq!(run.status.code(), Some(1));
    Ok(())
}

#[test]
fn test_release_missing_catalog() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["release", "nope_de.ts"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("nope_de.ts"));
    Ok(())
}
