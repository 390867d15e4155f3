//! Report formatting and printing utilities.
//!
//! This module displays issues in cargo-style format and prints the
//! per-command summaries. Separate from core logic to allow tsctl to be used
//! as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, InitSummary, LookupSummary, ReleaseSummary, TranslateSummary,
    UpdateSummary,
};
use super::commands::helper::display_path;
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity};
use crate::utils::plural;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
///
/// Issues are sorted and displayed with severity, location, source context,
/// and details, followed by a problem count.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
///
/// Useful for testing or redirecting output.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    // Calculate max line number width for alignment
    let max_line_width = calculate_max_line_width(&sorted);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no issues are found.
pub fn print_success_to<W: Write>(catalogs: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} - no issues found",
            plural(catalogs, "catalog", "catalogs")
        )
        .green()
    );
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            plural(count, "file", "files"),
            "-v".cyan()
        );
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().cyan(),
    }
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let (file_path, line, col, source_line) = extract_location_info(&loc);
    let severity = issue.report_severity();

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_label(severity),
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    // Clickable location; line 0 means the whole file
    let position = match (line, col) {
        (0, _) => file_path.to_string(),
        (line, 0) => format!("{}:{}", file_path, line),
        (line, col) => format!("{}:{}:{}", file_path, line, col),
    };
    let _ = writeln!(writer, "  {} {}", "-->".blue(), position);

    if let Some(source_line) = source_line {
        let caret_char = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
            Severity::Info => "^".cyan(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // Caret pointing to the column (col is 1-based)
        let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer); // Empty line between issues
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} ({} {}, {} {})",
            FAILURE_MARK.red(),
            plural(total_problems, "problem", "problems"),
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}

fn extract_location_info<'a>(
    loc: &'a ReportLocation<'a>,
) -> (&'a str, usize, usize, Option<&'a str>) {
    match loc {
        ReportLocation::Message(message) => (message.file_path(), message.line(), 0, None),
        ReportLocation::File {
            path,
            line,
            col,
            source_line,
        } => (*path, *line, *col, *source_line),
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .map(|i| {
            let loc = i.location();
            let (_, line, _, _) = extract_location_info(&loc);
            line
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

// ============================================================
// Command Output
// ============================================================

pub fn print(result: &CommandResult, verbose: bool, silent: bool) {
    let mut stdout = io::stdout().lock();
    print_to(result, verbose, silent, &mut stdout);
    print_parse_warning_to(result.parse_error_count, verbose, &mut io::stderr().lock());
}

/// Print diagnostics and the command summary to a custom writer.
pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, silent: bool, writer: &mut W) {
    report_to(&result.issues, writer);

    if silent {
        // Lookup results are the command's output, not a summary.
        if let CommandSummary::Lookup(summary) = &result.summary {
            print_lookup(summary, writer);
        }
        return;
    }

    match &result.summary {
        CommandSummary::Update(summary) => print_update(summary, verbose, writer),
        CommandSummary::Release(summary) => print_release(summary, verbose, writer),
        CommandSummary::Translate(summary) => print_translate(summary, verbose, writer),
        CommandSummary::Check => {
            if result.issues.is_empty() {
                print_success_to(result.catalogs_checked, writer);
            }
        }
        CommandSummary::Lookup(summary) => print_lookup(summary, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

fn print_update<W: Write>(summary: &UpdateSummary, verbose: bool, writer: &mut W) {
    for updated in &summary.catalogs {
        let report = &updated.report;
        let verb = if updated.created { "Created" } else { "Updated" };
        let _ = writeln!(
            writer,
            "{} {} '{}': {} ({} new, {} existing, {} changed)",
            SUCCESS_MARK.green(),
            verb.green().bold(),
            display_path(&updated.path),
            plural(report.found, "message", "messages"),
            report.new,
            report.existing,
            report.source_changed
        );

        let retired = [
            ("revived", report.revived),
            ("obsoleted", report.obsoleted),
            ("vanished", report.vanished),
            ("removed", report.removed),
            ("kept obsolete", report.kept_obsolete),
            ("duplicates", report.duplicates),
            ("plural forms resized", report.resized),
        ];
        for (label, count) in retired {
            if count > 0 {
                let _ = writeln!(writer, "  - {}: {}", label, count);
            }
        }

        if report.hint_count() > 0 {
            if verbose {
                for (kind, count) in &report.hints {
                    let _ = writeln!(
                        writer,
                        "  - {} heuristic: {}",
                        kind,
                        plural(*count, "translation", "translations")
                    );
                }
            } else {
                let _ = writeln!(
                    writer,
                    "  - heuristic hints: {}",
                    report.hint_count()
                );
            }
        }

        if verbose {
            let stats = &updated.stats;
            let _ = writeln!(
                writer,
                "  - catalog: {} finished, {} unfinished, {} obsolete, {} vanished",
                stats.finished, stats.unfinished, stats.obsolete, stats.vanished
            );
        }
    }
}

fn print_release<W: Write>(summary: &ReleaseSummary, verbose: bool, writer: &mut W) {
    for artifact in &summary.artifacts {
        let report = &artifact.report;
        let _ = writeln!(
            writer,
            "{} {} '{}': {} ({} finished, {} unfinished)",
            SUCCESS_MARK.green(),
            "Generated".green().bold(),
            display_path(&artifact.path),
            plural(report.generated(), "translation", "translations"),
            report.finished,
            report.unfinished
        );
        if report.untranslated_ignored > 0 {
            let _ = writeln!(
                writer,
                "  - ignored {}",
                plural(
                    report.untranslated_ignored,
                    "untranslated message",
                    "untranslated messages"
                )
            );
        }

        let dropped = [
            ("without id", report.dropped_missing_id),
            ("identical to source", report.dropped_identical),
            ("unfinished", report.dropped_unfinished),
            ("obsolete", report.dropped_obsolete),
        ];
        for (label, count) in dropped {
            if count > 0 && (verbose || label != "obsolete") {
                let _ = writeln!(writer, "  - dropped {}: {}", label, count);
            }
        }

        if verbose {
            if report.plural_normalized > 0 {
                let _ = writeln!(
                    writer,
                    "  - plural forms fixed up: {}",
                    report.plural_normalized
                );
            }
            if artifact.sources.len() > 1 {
                let sources: Vec<String> =
                    artifact.sources.iter().map(|p| display_path(p)).collect();
                let _ = writeln!(writer, "  - from: {}", sources.join(", "));
            }
        }
    }
}

fn print_translate<W: Write>(summary: &TranslateSummary, verbose: bool, writer: &mut W) {
    let report = &summary.report;
    if report.touched == 0 {
        let _ = writeln!(
            writer,
            "{} No messages to translate in '{}'",
            SUCCESS_MARK.green(),
            display_path(&summary.path)
        );
        return;
    }

    let _ = writeln!(
        writer,
        "{} {} {} of {} in '{}'",
        SUCCESS_MARK.green(),
        "Translated".green().bold(),
        report.touched,
        plural(summary.unit_count, "message", "messages"),
        display_path(&summary.path)
    );
    if verbose {
        for (book, count) in &report.from_books {
            let _ = writeln!(writer, "  - phrase book '{}': {}", book, count);
        }
        if report.from_history > 0 {
            let _ = writeln!(
                writer,
                "  - earlier translations: {}",
                report.from_history
            );
        }
    }
}

fn print_lookup<W: Write>(summary: &LookupSummary, writer: &mut W) {
    match &summary.translation {
        Some(translation) => {
            let _ = writeln!(writer, "{}", translation);
        }
        None => {
            let _ = writeln!(
                writer,
                "{} message not found: {}",
                "error:".bold().red(),
                summary.key
            );
        }
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else if let Some(error) = &summary.error {
        let _ = writeln!(writer, "{} {}", "error:".bold().red(), error);
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::commands::helper::finish;
    use crate::core::catalog::Location;
    use crate::core::heuristics::BatchReport;
    use crate::issues::{
        MessageRef, ParseErrorIssue, UnknownPluralRulesIssue, ValidationIssue, ValidationKind,
    };

    fn strip_ansi(s: &str) -> String {
        // Simple ANSI escape code stripper for testing
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip until 'm'
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn render(issues: &[Issue]) -> String {
        let mut output = Vec::new();
        report_to(issues, &mut output);
        strip_ansi(&String::from_utf8(output).unwrap())
    }

    fn validation(line: u32, kind: ValidationKind) -> Issue {
        Issue::Validation(ValidationIssue {
            message: MessageRef {
                catalog: "i18n/app_de.ts".to_string(),
                context: "Dialog".to_string(),
                source: "&Save".to_string(),
                location: Some(Location::new("dialog.cpp", Some(line))),
            },
            kind,
            detail: None,
        })
    }

    #[test]
    fn test_report_empty() {
        let mut output = Vec::new();
        report_to(&[], &mut output);
        assert!(output.is_empty());
    }

    #[test]
    fn test_report_validation_issue() {
        let stripped = render(&[validation(42, ValidationKind::MissingAccelerator)]);

        assert!(stripped.contains("warning: \"accelerator possibly missing\""));
        assert!(stripped.contains("missing-accelerator"));
        assert!(stripped.contains("--> dialog.cpp:42"));
        assert!(stripped.contains("= note: Dialog: \"&Save\""));
        assert!(stripped.contains("1 problem (0 errors, 1 warning)"));
    }

    #[test]
    fn test_report_parse_error_with_caret() {
        let issue = Issue::ParseError(ParseErrorIssue {
            file_path: "i18n/app_de.ts".to_string(),
            line: 3,
            col: 5,
            error: "mismatched end tag".to_string(),
            source_line: Some("    </context>".to_string()),
        });
        let stripped = render(&[issue]);

        assert!(stripped.contains("error: \"mismatched end tag\""));
        assert!(stripped.contains("--> i18n/app_de.ts:3:5"));
        assert!(stripped.contains("3 |     </context>"));
        assert!(stripped.contains("  |     ^"));
    }

    #[test]
    fn test_report_file_level_issue_has_no_line() {
        let issue = Issue::UnknownPluralRules(UnknownPluralRulesIssue {
            file_path: "app.ts".to_string(),
            language: "tlh".to_string(),
        });
        let stripped = render(&[issue]);
        assert!(stripped.contains("--> app.ts\n"));
    }

    #[test]
    fn test_report_sorting_by_line() {
        let stripped = render(&[
            validation(20, ValidationKind::PunctuationDiffers),
            validation(5, ValidationKind::MissingAccelerator),
        ]);
        let first = stripped.find("dialog.cpp:5").unwrap();
        let second = stripped.find("dialog.cpp:20").unwrap();
        assert!(first < second);
        assert!(stripped.contains("2 problems (0 errors, 2 warnings)"));
    }

    #[test]
    fn test_check_success_message() {
        let result = finish(CommandSummary::Check, Vec::new(), 2, true);
        let mut output = Vec::new();
        print_to(&result, false, false, &mut output);
        let stripped = strip_ansi(&String::from_utf8(output).unwrap());
        assert_eq!(stripped, "\u{2713} Checked 2 catalogs - no issues found\n");
    }

    #[test]
    fn test_translate_summary_verbose() {
        let mut report = BatchReport {
            touched: 3,
            from_history: 1,
            ..Default::default()
        };
        report.from_books.insert("common".to_string(), 2);
        let result = finish(
            CommandSummary::Translate(TranslateSummary {
                path: PathBuf::from("app_de.ts"),
                report,
                unit_count: 10,
            }),
            Vec::new(),
            1,
            true,
        );

        let mut output = Vec::new();
        print_to(&result, true, false, &mut output);
        let stripped = strip_ansi(&String::from_utf8(output).unwrap());
        assert!(stripped.contains("Translated 3 of 10 messages in 'app_de.ts'"));
        assert!(stripped.contains("  - phrase book 'common': 2"));
        assert!(stripped.contains("  - earlier translations: 1"));
    }

    #[test]
    fn test_silent_still_prints_lookup() {
        let result = finish(
            CommandSummary::Lookup(LookupSummary {
                key: "quit".to_string(),
                translation: Some("Beenden".to_string()),
            }),
            Vec::new(),
            0,
            true,
        );
        let mut output = Vec::new();
        print_to(&result, false, true, &mut output);
        assert_eq!(String::from_utf8(output).unwrap(), "Beenden\n");
    }
}
