//! Aggregation of sparse line numbers into minimal contiguous ranges.

/// Coalesce line numbers into inclusive `(start, end)` ranges, one per
/// maximal run of consecutive values.
///
/// Input order does not matter and duplicates collapse into the covering
/// range. The result is sorted, non-overlapping, and maximal: no two
/// adjacent ranges could be merged.
#[must_use]
pub fn to_ranges(lines: &[u32]) -> Vec<(u32, u32)> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut sorted = lines.to_vec();
    sorted.sort_unstable();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    let mut start = sorted[0];
    let mut end = sorted[0];

    for &line in &sorted[1..] {
        if line == end || line == end + 1 {
            end = line;
        } else {
            ranges.push((start, end));
            start = line;
            end = line;
        }
    }

    ranges.push((start, end));
    ranges
}

/// Format line numbers into compact range notation, e.g. "1, 3-5, 8".
#[must_use]
pub fn format_line_ranges(lines: &[u32]) -> String {
    to_ranges(lines)
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
