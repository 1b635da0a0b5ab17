//! Command handler functions for the covmarks CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout. The CLI is a minimal host: it builds a
//! session, loads one report, and prints the same projections an editor
//! shell would render.

use std::fmt::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use crate::annotations::Annotation;
use crate::config::Config;
use crate::model::percent_covered;
use crate::ranges::format_line_ranges;
use crate::session::{absolute_key, Session};

fn load_session(report: &Path, root: &Path, config: Config) -> Result<Session> {
    let mut session = Session::new(config);
    session.load_report(report, root, Instant::now())?;
    Ok(session)
}

fn sorted_files(session: &Session) -> Vec<&Path> {
    let mut files: Vec<&Path> = session.files().map(|(path, _)| path).collect();
    files.sort_unstable();
    files
}

pub fn cmd_summary(report: &Path, root: &Path) -> Result<String> {
    let session = load_session(report, root, Config::default())?;

    let mut out = String::new();
    writeln!(out, "{:<60} {:>8} {:>8} {:>6}", "FILE", "LINES", "COVERED", "RATE").unwrap();
    writeln!(out, "{}", "-".repeat(86)).unwrap();

    let mut files: Vec<_> = session.files().collect();
    files.sort_unstable_by_key(|(path, _)| *path);

    let mut total_found = 0u64;
    let mut total_hit = 0u64;
    for (path, record) in files {
        let rate = match record.line_percent() {
            Some(percent) => format!("{percent}%"),
            None => "-".to_string(),
        };
        writeln!(
            out,
            "{:<60} {:>8} {:>8} {:>6}",
            path.display(),
            record.lines.found,
            record.lines.hit,
            rate
        )
        .unwrap();
        total_found += record.lines.found;
        total_hit += record.lines.hit;
    }

    writeln!(out).unwrap();
    writeln!(out, "Files:    {}", session.file_count()).unwrap();
    match percent_covered(total_hit, total_found) {
        Some(percent) => {
            writeln!(out, "Lines:    {total_hit}/{total_found} ({percent}%)").unwrap();
        }
        None => writeln!(out, "Lines:    no line counts in report").unwrap(),
    }
    if let Some(parsed) = session.last_parsed() {
        writeln!(out, "Parsed:   {}", parsed.format("%Y-%m-%d %H:%M:%S UTC")).unwrap();
    }
    Ok(out)
}

pub fn cmd_uncovered(report: &Path, source_file: &str, root: &Path) -> Result<String> {
    let session = load_session(report, root, Config::default())?;
    let key = absolute_key(root, source_file);

    let Some(record) = session.coverage_for(&key) else {
        return Ok(format!("No coverage data for '{source_file}'\n"));
    };

    let uncovered: Vec<u32> = record
        .lines
        .details
        .iter()
        .filter(|line| line.hit == 0)
        .map(|line| line.line)
        .collect();

    if uncovered.is_empty() {
        return Ok(format!(
            "All instrumentable lines are covered in '{source_file}'\n"
        ));
    }

    let mut out = String::new();
    writeln!(out, "Uncovered lines in '{source_file}':").unwrap();
    writeln!(out, "  {}", format_line_ranges(&uncovered)).unwrap();
    writeln!(out, "  ({} lines)", uncovered.len()).unwrap();
    Ok(out)
}

#[derive(Serialize)]
struct FileAnnotations {
    file: String,
    annotations: Vec<Annotation>,
}

pub fn cmd_annotations(report: &Path, root: &Path, json: bool) -> Result<String> {
    let mut session = load_session(report, root, Config::default())?;

    let files: Vec<std::path::PathBuf> = sorted_files(&session)
        .into_iter()
        .map(Path::to_path_buf)
        .collect();

    if json {
        let sets: Vec<FileAnnotations> = files
            .iter()
            .map(|path| FileAnnotations {
                file: path.display().to_string(),
                annotations: session.annotations_for(path),
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&sets)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for path in &files {
        let annotations = session.annotations_for(path);
        if annotations.is_empty() {
            continue;
        }
        writeln!(out, "{}", path.display()).unwrap();
        for annotation in annotations {
            // Ranges are 0-based; print source line numbers.
            let start = annotation.range.start_line + 1;
            let end = annotation.range.end_line + 1;
            if start == end {
                writeln!(out, "  line {start}  {}", annotation.message).unwrap();
            } else {
                writeln!(out, "  lines {start}-{end}  {}", annotation.message).unwrap();
            }
        }
    }
    if out.is_empty() {
        out.push_str("No uncovered lines.\n");
    }
    Ok(out)
}

pub fn cmd_badges(report: &Path, root: &Path, threshold: u8) -> Result<String> {
    let config = Config {
        coverage_threshold: threshold.min(100),
        ..Default::default()
    };
    let session = load_session(report, root, config)?;

    let mut out = String::new();
    for path in sorted_files(&session) {
        if let Some(badge) = session.badge_for(path) {
            writeln!(
                out,
                "{:<60} {:>4} {}",
                path.display(),
                badge.label,
                badge.tooltip
            )
            .unwrap();
        }
    }
    if out.is_empty() {
        out.push_str("No files below the coverage threshold.\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
TN:unit
SF:src/a.rs
FN:1,main
FNDA:5,main
FNF:1
FNH:1
DA:1,5
DA:2,5
DA:3,0
DA:4,0
DA:5,1
LF:5
LH:3
end_of_record
SF:src/b.rs
DA:1,2
DA:2,2
LF:2
LH:2
end_of_record
";

    fn write_report(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("lcov.info");
        std::fs::write(&path, REPORT).unwrap();
        path
    }

    #[test]
    fn test_cmd_summary() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_summary(&report, dir.path()).unwrap();

        assert!(out.contains("src/a.rs"));
        assert!(out.contains("src/b.rs"));
        assert!(out.contains("60%"));
        assert!(out.contains("100%"));
        assert!(out.contains("Files:    2"));
        assert!(out.contains("Lines:    5/7"));
        assert!(out.contains("Parsed:"));
    }

    #[test]
    fn test_cmd_uncovered() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_uncovered(&report, "src/a.rs", dir.path()).unwrap();

        assert!(out.contains("Uncovered lines in 'src/a.rs':"));
        assert!(out.contains("3-4"));
        assert!(out.contains("(2 lines)"));
    }

    #[test]
    fn test_cmd_uncovered_all_covered() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_uncovered(&report, "src/b.rs", dir.path()).unwrap();
        assert!(out.contains("All instrumentable lines are covered"));
    }

    #[test]
    fn test_cmd_uncovered_unknown_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_uncovered(&report, "src/ghost.rs", dir.path()).unwrap();
        assert!(out.contains("No coverage data for 'src/ghost.rs'"));
    }

    #[test]
    fn test_cmd_annotations_text() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_annotations(&report, dir.path(), false).unwrap();

        assert!(out.contains("src/a.rs"));
        assert!(out.contains("lines 3-4"));
        assert!(out.contains("This line is missing code coverage."));
        assert!(!out.contains("src/b.rs"));
    }

    #[test]
    fn test_cmd_annotations_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_annotations(&report, dir.path(), true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        let sets = parsed.as_array().unwrap();
        assert_eq!(sets.len(), 2);
        let a = &sets[0];
        assert!(a["file"].as_str().unwrap().ends_with("src/a.rs"));
        assert_eq!(a["annotations"][0]["range"]["start_line"], 2);
        assert_eq!(a["annotations"][0]["range"]["end_line"], 3);
    }

    #[test]
    fn test_cmd_badges() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(&dir);

        let out = cmd_badges(&report, dir.path(), 80).unwrap();
        assert!(out.contains("src/a.rs"));
        assert!(out.contains("Insufficient Code Coverage: 60% vs. 80%."));
        assert!(!out.contains("src/b.rs"));

        let out = cmd_badges(&report, dir.path(), 50).unwrap();
        assert!(out.contains("No files below the coverage threshold."));
    }

    #[test]
    fn test_missing_report_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.info");

        assert!(cmd_summary(&missing, dir.path()).is_err());
    }
}
