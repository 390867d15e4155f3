use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod check;
mod init;
mod lookup;
mod release;
mod translate;
mod update;

const BIN_NAME: &str = "tsctl";

/// Extracted messages for the `Dialog` sample catalog.
pub const DIALOG_MESSAGES: &str = r#"[
    {
        "context": "Dialog",
        "source": "Save",
        "locations": [{ "file": "dialog.cpp", "line": 42 }]
    },
    {
        "context": "Dialog",
        "source": "Save %n file(s)",
        "pluralSource": "Save %n file(s)",
        "locations": [{ "file": "dialog.cpp", "line": 57 }]
    }
]"#;

/// Spanish catalog holding a finished `Dialog`/`Save` message.
pub const DIALOG_ES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="es" sourcelanguage="en">
<context>
    <name>Dialog</name>
    <message>
        <location filename="dialog.cpp" line="40"/>
        <source>Save</source>
        <translation>Guardar</translation>
    </message>
</context>
</TS>
"#;

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        // Stop the config lookup at the project root.
        fs::create_dir(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn with_file(path: &str, content: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(path, content)?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Result<Output> {
        let output = self.command().args(args).output()?;
        Ok(output)
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.run(&["--help"])?;

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["update", "release", "translate", "check", "lookup", "init"] {
        assert!(text.contains(command), "missing {} in help:\n{}", command, text);
    }
    Ok(())
}

#[test]
fn test_unknown_flag_is_usage_error() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.run(&["release", "--frobnicate"])?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
