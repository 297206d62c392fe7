//! Integration tests for the bundled sniff set
//!
//! Runs the full builtin registry end to end over realistic sources,
//! covering mixed diagnostics, fixing to convergence, unfixable
//! leftovers, and batch runs over a directory of files in varying
//! states of disrepair.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use rsniff_core::{CancelToken, FileReport, FixOutcome, Runner, SeverityConfig};
use rsniff_sniffs::builtin_registry;

fn analyze(source: &str) -> FileReport {
    let runner = Runner::new(builtin_registry(), SeverityConfig::default());
    runner.analyze_source(Path::new("test.php"), source)
}

fn fix(source: &str) -> FileReport {
    let runner = Runner::new(builtin_registry(), SeverityConfig::default());
    runner.fix_source(Path::new("test.php"), source)
}

#[test]
fn test_clean_file_passes_every_sniff() {
    let source = r#"<?php

class UserRepository extends BaseRepository
{
    private $cache = [];

    public function find($id, $withDeleted = false)
    {
        if (isset($this->cache[$id])) {
            return $this->cache[$id];
        }

        $row = parent::find($id, $withDeleted);
        $this->cache[$id] = $row;
        return $row;
    }
}
"#;
    let report = analyze(source);
    assert!(
        report.is_clean(),
        "expected no diagnostics, got: {:?}",
        report.diagnostics
    );
}

#[test]
fn test_messy_file_reports_across_sniffs() {
    // Escaped segments keep the trailing blanks inside the string visible.
    let source = concat!(
        "<?php\n",
        "$total = array_sum([1,2, 3]);\n",
        "while($pair = each($data)){\n",
        "    $out[] = $pair;\n",
        "}\n",
        "$s = \"line with trailing  \nend\";\n",
        "class Foo {\n",
        "    public function bar() {\n",
        "        return parent::bar();\n",
        "    }\n",
        "}\n",
    );
    let report = analyze(source);
    let codes: HashSet<&str> = report.diagnostics.iter().map(|d| d.code.as_str()).collect();

    assert!(codes.contains("Rsniff.WhiteSpace.SpaceAfterComma.NoSpace"));
    assert!(codes.contains("Rsniff.WhiteSpace.KeywordSpacing.SpaceAfterKeyword"));
    assert!(codes.contains("Rsniff.WhiteSpace.KeywordSpacing.SpaceBeforeBrace"));
    assert!(codes.contains("Rsniff.Functions.ForbiddenFunctions.Found"));
    assert!(codes.contains("Rsniff.Strings.TrailingWhitespaceInString.Found"));
    assert!(codes.contains("Rsniff.Classes.OrphanedParent.Found"));
}

#[test]
fn test_diagnostics_come_back_position_ordered() {
    let source = "<?php\nwhile($x){\n}\n$a = [1,2];\n";
    let report = analyze(source);
    assert!(report.diagnostics.len() >= 2);
    for window in report.diagnostics.windows(2) {
        assert!(
            (window[0].line, window[0].column) <= (window[1].line, window[1].column),
            "diagnostics out of order: {:?}",
            report.diagnostics
        );
    }
}

#[test]
fn test_fix_repairs_everything_fixable_in_one_pass() {
    let source = "<?php\n$items = [1,2,  3];\nif($items){\n    echo count($items);\n}";
    let report = fix(source);
    assert_eq!(report.fix_outcome, Some(FixOutcome::Fixed { passes: 1 }));
    assert_eq!(
        report.fixed_source.as_deref(),
        Some("<?php\n$items = [1, 2, 3];\nif ($items) {\n    echo count($items);\n}\n")
    );
    assert!(report.is_clean());
}

#[test]
fn test_fix_is_idempotent() {
    let source = "<?php\n$items = [1,2,  3];\nif($items){\n    echo count($items);\n}";
    let first = fix(source);
    let fixed = first.fixed_source.clone().unwrap();
    let second = fix(&fixed);
    assert_eq!(second.fix_outcome, Some(FixOutcome::Clean));
    assert!(second.fixed_source.is_none());
}

#[test]
fn test_unfixable_problems_survive_fixing() {
    let source =
        "<?php\nclass Foo {\n    public function bar() {\n        return parent::baz(1,2);\n    }\n}\n";
    let report = fix(source);
    assert_eq!(report.fix_outcome, Some(FixOutcome::Fixed { passes: 1 }));
    let fixed = report.fixed_source.as_deref().unwrap();
    assert!(fixed.contains("baz(1, 2)"));
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code, "Rsniff.Classes.OrphanedParent.Found");
}

#[test]
fn test_batch_handles_malformed_files_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths: Vec<PathBuf> = Vec::new();
    for i in 0..100 {
        let path = dir.path().join(format!("file_{i:02}.php"));
        let mut file = std::fs::File::create(&path).unwrap();
        if i % 2 == 0 {
            write!(
                file,
                "<?php\nfunction add_{i:02}($a, $b) {{\n    return $a + $b;\n}}\n"
            )
            .unwrap();
        } else {
            // Unterminated string with trailing blanks; the lexer takes
            // the rest of the file as string content.
            write!(file, "<?php echo 'oops  \n").unwrap();
        }
        paths.push(path);
    }

    let runner = Runner::new(builtin_registry(), SeverityConfig::default());
    let result = runner.run_batch(&paths, false, &CancelToken::new());

    assert_eq!(result.files.len(), 100);
    assert!(result.errors.is_empty());
    assert!(!result.interrupted);
    for (i, report) in result.files.iter().enumerate() {
        if i % 2 == 0 {
            assert!(
                report.is_clean(),
                "file {} should be clean, got {:?}",
                i,
                report.diagnostics
            );
        } else {
            // The unterminated string is reported up front, then the
            // sniff still sees the trailing blanks inside it.
            assert_eq!(report.error_count(), 1, "file {}", i);
            assert_eq!(report.warning_count(), 1, "file {}", i);
            assert_eq!(
                report.diagnostics[0].code,
                "Internal.Tokenizer.UnterminatedString"
            );
            assert_eq!(
                report.diagnostics[1].code,
                "Rsniff.Strings.TrailingWhitespaceInString.Found"
            );
        }
    }
}

#[test]
fn test_batch_fix_mode_reports_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let dirty = dir.path().join("dirty.php");
    let clean = dir.path().join("clean.php");
    std::fs::write(&dirty, "<?php\nif($x){\n}\n").unwrap();
    std::fs::write(&clean, "<?php\n$a = 1;\n").unwrap();

    let runner = Runner::new(builtin_registry(), SeverityConfig::default());
    let result = runner.run_batch(
        &[dirty.clone(), clean.clone()],
        true,
        &CancelToken::new(),
    );

    assert_eq!(result.files.len(), 2);
    let clean_report = &result.files[0];
    let dirty_report = &result.files[1];
    assert_eq!(clean_report.path, clean);
    assert_eq!(clean_report.fix_outcome, Some(FixOutcome::Clean));
    assert_eq!(dirty_report.path, dirty);
    assert_eq!(dirty_report.fix_outcome, Some(FixOutcome::Fixed { passes: 1 }));
    assert_eq!(
        dirty_report.fixed_source.as_deref(),
        Some("<?php\nif ($x) {\n}\n")
    );
    // Fixing happens in memory; the file on disk is untouched.
    assert_eq!(
        std::fs::read_to_string(&dirty).unwrap(),
        "<?php\nif($x){\n}\n"
    );
}
