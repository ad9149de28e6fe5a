// NMT summary parsing (output of `jcmd <pid> VM.native_memory summary`).
//
// Only two line shapes are kept, everything else (malloc/mmap detail, class counts) is ignored:
//   Total: reserved=5813841KB, committed=382817KB
//   -                 Java Heap (reserved=4194304KB, committed=157696KB)

use crate::models::{CategorySample, TOTAL_CATEGORY};

pub fn parse_summary(text: &str) -> Vec<CategorySample> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<CategorySample> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("Total:") {
        let (reserved, committed, _) = parse_counters(skip_whitespace(rest)?)?;
        return Some(CategorySample {
            name: TOTAL_CATEGORY.to_string(),
            reserved,
            committed,
        });
    }

    let rest = line.strip_prefix('-')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    // Name ends at the first "(reserved=" that follows whitespace.
    let open = rest.find("(reserved=")?;
    let (name_part, counters) = rest.split_at(open);
    if !name_part.ends_with(char::is_whitespace) {
        return None;
    }
    let name = name_part.trim();
    if name.is_empty() {
        return None;
    }
    let (reserved, committed, tail) = parse_counters(&counters[1..])?;
    if !tail.contains(')') {
        return None;
    }
    Some(CategorySample {
        name: name.to_string(),
        reserved,
        committed,
    })
}

/// Parses `reserved=<n>KB, committed=<n>KB` and returns the remainder of the line.
fn parse_counters(s: &str) -> Option<(u64, u64, &str)> {
    let s = s.strip_prefix("reserved=")?;
    let (reserved, s) = parse_kb(s)?;
    let s = skip_whitespace(s.strip_prefix(',')?)?;
    let s = s.strip_prefix("committed=")?;
    let (committed, s) = parse_kb(s)?;
    Some((reserved, committed, s))
}

/// Strips leading whitespace, of which there must be at least one character.
fn skip_whitespace(s: &str) -> Option<&str> {
    s.starts_with(char::is_whitespace).then(|| s.trim_start())
}

fn parse_kb(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let value = s[..end].parse().ok()?;
    let rest = s[end..].strip_prefix("KB")?;
    Some((value, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_total_line() {
        let got = parse_summary("Total: reserved=5813841KB, committed=382817KB");
        assert_eq!(
            got,
            vec![CategorySample {
                name: "Total".into(),
                reserved: 5813841,
                committed: 382817,
            }]
        );
    }

    #[test]
    fn parses_category_with_spaces_and_trailing_detail() {
        let got = parse_summary(
            "-    Native Memory Tracking (reserved=2879KB, committed=2879KB, peak=2901KB)",
        );
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "Native Memory Tracking");
        assert_eq!(got[0].reserved, 2879);
        assert_eq!(got[0].committed, 2879);
    }

    #[test]
    fn ignores_detail_lines() {
        let text = "\
53732:

Native Memory Tracking:

       malloc: 40123KB #512345
       mmap:   reserved=5773718KB, committed=342694KB
                            (mmap: reserved=4194304KB, committed=157696KB)
                            (classes #7580)
-                     Class (reserved=1049451KB, committed=5099KB)
";
        let got = parse_summary(text);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "Class");
    }

    #[test]
    fn rejects_category_without_closing_paren() {
        assert!(parse_summary("- GC (reserved=1KB, committed=1KB").is_empty());
    }

    #[test]
    fn requires_whitespace_between_fields() {
        assert!(parse_summary("Total:reserved=1KB, committed=1KB").is_empty());
        assert!(parse_summary("Total: reserved=1KB,committed=1KB").is_empty());
        assert!(parse_summary("- GC (reserved=1KB,committed=1KB)").is_empty());
        assert_eq!(parse_summary("Total:\treserved=1KB,  committed=2KB")[0].committed, 2);
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(parse_summary("Total: reserved=xKB, committed=1KB").is_empty());
        assert!(parse_summary("- GC (reserved=1MB, committed=1KB)").is_empty());
    }
}
