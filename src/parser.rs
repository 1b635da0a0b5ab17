//! Parser for the LCOV `.info` record format.
//!
//! Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
//!
//! Key records:
//!   TN:<test name>
//!   SF:<path to source file>
//!   FN:<line>,<function name>
//!   FNDA:<execution count>,<function name>
//!   FNF:<functions found>
//!   FNH:<functions hit>
//!   DA:<line number>,<execution count>[,<checksum>]
//!   BRDA:<line>,<block>,<branch>,<taken>   ("-" means 0)
//!   BRF:<branches found>
//!   BRH:<branches hit>
//!   LF:<lines found>
//!   LH:<lines hit>
//!   end_of_record
//!
//! The parser is a line-oriented state machine holding one mutable current
//! record. It is deliberately lenient: unrecognized keys are skipped so that
//! vendor extensions never abort a parse, and a line that fails numeric
//! coercion is dropped (with a warning) while parsing continues.

use std::path::Path;

use log::warn;

use crate::error::{CovmarksError, Result};
use crate::model::{BranchHit, CoverageCollection, CoverageRecord, FunctionHit, LineHit};

/// Parse LCOV text into a collection of per-source-file records.
///
/// Never fails: malformed lines are skipped and logged, and a report with no
/// usable content yields an empty collection. A trailing record without a
/// closing `end_of_record` is flushed at end of input.
#[must_use]
pub fn parse(input: &str) -> CoverageCollection {
    let mut collection = CoverageCollection::new();
    let mut current = CoverageRecord::default();

    for raw_line in input.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((key, args)) = line.split_once(':') {
            dispatch(&mut current, &key.to_ascii_uppercase(), args);
        }

        // The sentinel is matched as a substring, mirroring the format's own
        // tolerance for trailing junk on the terminator line.
        if line.contains("end_of_record") {
            let finished = std::mem::take(&mut current);
            if !finished.is_empty() {
                collection.push(finished);
            }
        }
    }

    // A report that ends mid-record still flushes what it accumulated.
    if !current.is_empty() {
        collection.push(current);
    }

    collection
}

/// Read and parse a report file.
///
/// Fails with [`CovmarksError::ReportNotFound`] when the path does not
/// resolve to an existing file; otherwise reads the file and delegates to
/// [`parse`].
pub fn parse_file(path: &Path) -> Result<CoverageCollection> {
    if !path.is_file() {
        return Err(CovmarksError::ReportNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse(&text))
}

/// Apply one `KEY:ARGS` line to the current record. Unknown keys and
/// malformed payloads leave the record untouched.
fn dispatch(record: &mut CoverageRecord, key: &str, args: &str) {
    match key {
        "TN" => record.title = args.trim().to_string(),
        "SF" => record.source_file = args.trim().to_string(),
        "LF" => {
            if let Some(n) = parse_count("LF", args) {
                record.lines.found = n;
            }
        }
        "LH" => {
            if let Some(n) = parse_count("LH", args) {
                record.lines.hit = n;
            }
        }
        "FNF" => {
            if let Some(n) = parse_count("FNF", args) {
                record.functions.found = n;
            }
        }
        "FNH" => {
            if let Some(n) = parse_count("FNH", args) {
                record.functions.hit = n;
            }
        }
        "BRF" => {
            if let Some(n) = parse_count("BRF", args) {
                record.branches.found = n;
            }
        }
        "BRH" => {
            if let Some(n) = parse_count("BRH", args) {
                record.branches.hit = n;
            }
        }
        "DA" => {
            // DA:<line>,<hit>[,<checksum>] — extra fields ignored.
            let mut parts = args.splitn(3, ',');
            let line = parts.next().and_then(|s| s.trim().parse::<u32>().ok());
            let hit = parts.next().and_then(|s| s.trim().parse::<u64>().ok());
            match (line, hit) {
                (Some(line), Some(hit)) => record.lines.details.push(LineHit { line, hit }),
                _ => warn!("skipping malformed DA record: {args:?}"),
            }
        }
        "FN" => {
            // FN:<line>,<name> — the name keeps any further commas.
            let parsed = args
                .split_once(',')
                .and_then(|(l, name)| Some((l.trim().parse::<u32>().ok()?, name)));
            match parsed {
                Some((line, name)) => record.functions.details.push(FunctionHit {
                    line,
                    name: name.to_string(),
                    hit: None,
                }),
                None => warn!("skipping malformed FN record: {args:?}"),
            }
        }
        "FNDA" => {
            // FNDA:<hit>,<name> — fills the first definition with a matching
            // name whose hit is still unset. Duplicate names fill in
            // definition order; LCOV provides no stronger key.
            let parsed = args
                .split_once(',')
                .and_then(|(h, name)| Some((h.trim().parse::<u64>().ok()?, name)));
            match parsed {
                Some((hit, name)) => {
                    if let Some(func) = record
                        .functions
                        .details
                        .iter_mut()
                        .find(|f| f.name == name && f.hit.is_none())
                    {
                        func.hit = Some(hit);
                    }
                }
                None => warn!("skipping malformed FNDA record: {args:?}"),
            }
        }
        "BRDA" => {
            // BRDA:<line>,<block>,<branch>,<taken>; "-" taken means 0.
            let parts: Vec<&str> = args.splitn(4, ',').collect();
            let parsed = (parts.len() == 4)
                .then(|| {
                    Some(BranchHit {
                        line: parts[0].trim().parse().ok()?,
                        block: parts[1].trim().parse().ok()?,
                        branch: parts[2].trim().parse().ok()?,
                        hit: if parts[3].trim() == "-" {
                            0
                        } else {
                            parts[3].trim().parse().ok()?
                        },
                    })
                })
                .flatten();
            match parsed {
                Some(branch) => record.branches.details.push(branch),
                None => warn!("skipping malformed BRDA record: {args:?}"),
            }
        }
        // Anything else is a vendor extension or future record type.
        _ => {}
    }
}

fn parse_count(key: &str, args: &str) -> Option<u64> {
    match args.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("skipping malformed {key} record: {args:?}");
            None
        }
    }
}
