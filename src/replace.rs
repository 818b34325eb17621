//! Bulk substring replacement over flat string sequences.
//!
//! The deferred-unescaping path accumulates pairs verbatim and then deletes
//! the escape character from the whole batch at once, one linear pass per
//! flat sequence. [`bulk_replace_all`] is that pass: a single searcher is
//! built for the pattern and reused across every string, so the per-string
//! cost is a fast byte search rather than per-character branching.

use memchr::memmem;

/// Replaces every occurrence of `pattern` with `replacement` across a batch
/// of strings, in place.
///
/// The search resumes after each replaced occurrence, so occurrences never
/// overlap: with pattern `\` and an empty replacement, `a\\b` becomes `ab`.
/// Strings without a match are left untouched. An empty pattern is a no-op.
///
/// # Examples
///
/// ```rust
/// use kv_extract::bulk_replace_all;
///
/// let mut strings = vec!["a\\:b".to_string(), "plain".to_string()];
/// bulk_replace_all(&mut strings, "\\", "");
/// assert_eq!(strings, vec!["a:b".to_string(), "plain".to_string()]);
/// ```
pub fn bulk_replace_all(strings: &mut [String], pattern: &str, replacement: &str) {
    if pattern.is_empty() {
        return;
    }
    let finder = memmem::Finder::new(pattern.as_bytes());

    for string in strings {
        if finder.find(string.as_bytes()).is_none() {
            continue;
        }

        let mut out = String::with_capacity(string.len());
        let mut rest = string.as_str();
        while let Some(pos) = finder.find(rest.as_bytes()) {
            out.push_str(&rest[..pos]);
            out.push_str(replacement);
            rest = &rest[pos + pattern.len()..];
        }
        out.push_str(rest);
        *string = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[&str], pattern: &str, replacement: &str) -> Vec<String> {
        let mut strings: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        bulk_replace_all(&mut strings, pattern, replacement);
        strings
    }

    #[test]
    fn removes_single_character_pattern() {
        assert_eq!(run(&["a\\b", "c\\d\\e"], "\\", ""), vec!["ab", "cde"]);
    }

    #[test]
    fn adjacent_occurrences_are_both_removed() {
        assert_eq!(run(&["a\\\\b"], "\\", ""), vec!["ab"]);
    }

    #[test]
    fn untouched_strings_stay_identical() {
        assert_eq!(run(&["plain", ""], "\\", ""), vec!["plain", ""]);
    }

    #[test]
    fn multi_character_pattern_and_replacement() {
        assert_eq!(
            run(&["ab-ab-ab"], "ab", "xyz"),
            vec!["xyz-xyz-xyz"]
        );
    }

    #[test]
    fn empty_pattern_is_a_no_op() {
        assert_eq!(run(&["abc"], "", "x"), vec!["abc"]);
    }

    #[test]
    fn non_ascii_content_survives() {
        assert_eq!(run(&["é\\ß"], "\\", ""), vec!["éß"]);
    }
}
