use crate::git::DiffStats;

/// Pull the `a/` path out of a `diff --git a/<path> b/<path>` header
fn header_path(line: &str) -> Option<String> {
    let rest = line.strip_prefix("diff --git ")?;

    // quoted paths: diff --git "a/with space.rs" "b/with space.rs"
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        return quoted[..end].strip_prefix("a/").map(str::to_string);
    }

    // split on " b/" so unquoted paths containing spaces survive
    let a_side = match rest.find(" b/") {
        Some(pos) => &rest[..pos],
        None => rest.split_whitespace().next()?,
    };
    a_side.strip_prefix("a/").map(str::to_string)
}

/// Count changed files, insertions and deletions in a unified diff
pub fn parse_diff_stats(diff: &str) -> DiffStats {
    diff.lines().fold(DiffStats::default(), |mut stats, line| {
        if line.starts_with("diff --git") {
            stats.files_changed.extend(header_path(line));
        } else if line.starts_with('+') && !line.starts_with("+++") {
            stats.insertions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            stats.deletions += 1;
        }
        stats
    })
}
