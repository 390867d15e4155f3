use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::{CliTest, DIALOG_ES, stderr, stdout};

const MENU_DE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de" sourcelanguage="en">
<context>
    <name>Menu</name>
    <message>
        <location filename="menu.cpp" line="12"/>
        <source>&amp;Save</source>
        <translation>Speichern</translation>
    </message>
    <message>
        <location filename="menu.cpp" line="20"/>
        <source>Quit?</source>
        <translation>Beenden</translation>
    </message>
    <message>
        <location filename="menu.cpp" line="31"/>
        <source>Page %1 of %2</source>
        <translation>Seite %1</translation>
    </message>
</context>
</TS>
"#;

#[test]
fn test_check_reports_warnings() -> Result<()> {
    let test = CliTest::with_file("menu_de.ts", MENU_DE)?;

    // Validation findings are advisory.
    assert_cmd_snapshot!(test.command().args(["check", "menu_de.ts"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    warning: "accelerator possibly missing"  missing-accelerator
      --> menu.cpp:12
       = note: Menu: "&Save"

    warning: "terminal punctuation differs"  punctuation
      --> menu.cpp:20
       = note: Menu: "Quit?"

    warning: "place markers differ"  place-markers
      --> menu.cpp:31
       = note: Menu: "Page %1 of %2" (missing %2)

    ✘ 3 problems (0 errors, 3 warnings)

    ----- stderr -----
    "#);
    Ok(())
}

#[test]
fn test_check_clean_catalog() -> Result<()> {
    let test = CliTest::with_file("dialog_es.ts", DIALOG_ES)?;

    let output = test.run(&["check", "dialog_es.ts"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("✓ Checked 1 catalog - no issues found"));
    Ok(())
}

#[test]
fn test_check_validators_from_config() -> Result<()> {
    let test = CliTest::with_file("i18n/menu_de.ts", MENU_DE)?;
    test.write_file(
        ".tsctlrc.json",
        r#"{
  "catalogs": ["i18n"],
  "validators": { "accelerators": false, "placeMarkers": false }
}"#,
    )?;

    let output = test.run(&["check"])?;
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(!out.contains("accelerator"));
    assert!(!out.contains("place markers"));
    assert!(out.contains("✘ 1 problem (0 errors, 1 warning)"));
    Ok(())
}

#[test]
fn test_check_phrase_book_suggestion() -> Result<()> {
    let test = CliTest::with_file(
        "app_fr.ts",
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="fr" sourcelanguage="en">
<context>
    <name>Dialog</name>
    <message>
        <source>Open</source>
        <translation type="unfinished">Lancer</translation>
    </message>
</context>
</TS>
"#,
    )?;
    test.write_file(
        "glossary.qph",
        r#"<!DOCTYPE QPH>
<QPH language="fr">
<phrase>
    <source>Open</source>
    <target>Ouvrir</target>
</phrase>
</QPH>
"#,
    )?;

    let output = test.run(&["check", "app_fr.ts", "--phrase-book", "glossary.qph"])?;
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("info: \"phrase book suggestion ignored\""));
    assert!(out.contains("phrase book 'glossary' suggests \"Ouvrir\""));
    // Info findings do not count as problems.
    assert!(!out.contains("problem"));
    Ok(())
}

#[test]
fn test_check_missing_catalog() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["check", "missing_de.ts"])?;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("missing_de.ts"));
    Ok(())
}

#[test]
fn test_check_malformed_catalog() -> Result<()> {
    let test = CliTest::with_file(
        "broken_de.ts",
        "<?xml version=\"1.0\"?>\n<TS version=\"2.1\">\n<context>\n<name>A</nam>\n</TS>\n",
    )?;

    let output = test.run(&["check", "broken_de.ts"])?;
    assert_eq!(output.status.code(), Some(3));
    Ok(())
}
