//! DOS-style wildcard matching for directory searches.
//!
//! `*` matches any run of characters, `?` matches exactly one. The legacy
//! all-files spelling `*.*` is folded into `*` before matching.

/// Matches any run of characters.
pub const MULTI_CHAR_WILDCARD: char = '*';
/// Matches exactly one character.
pub const SINGLE_CHAR_WILDCARD: char = '?';

/// A compiled wildcard search pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: Vec<char>,
    match_all: bool,
    case_sensitive: bool,
}

impl WildcardPattern {
    /// Compiles a pattern. `*.*` is treated as the match-all pattern `*`.
    pub fn new(pattern: &str, case_sensitive: bool) -> Self {
        let normalized = if pattern == "*.*" { "*" } else { pattern };
        let match_all = normalized == "*";
        let pattern = if case_sensitive {
            normalized.chars().collect()
        } else {
            normalized.chars().flat_map(|c| c.to_lowercase()).collect()
        };
        WildcardPattern {
            pattern,
            match_all,
            case_sensitive,
        }
    }

    /// Whether this pattern matches every name.
    pub fn is_match_all(&self) -> bool {
        self.match_all
    }

    /// Tests a file name against the pattern.
    pub fn matches(&self, name: &str) -> bool {
        if self.match_all {
            return true;
        }
        let name: Vec<char> = if self.case_sensitive {
            name.chars().collect()
        } else {
            name.chars().flat_map(|c| c.to_lowercase()).collect()
        };
        glob_match(&self.pattern, &name)
    }

    /// Whether a search specification contains any wildcard characters.
    pub fn contains_wildcards(spec: &str) -> bool {
        spec.contains(MULTI_CHAR_WILDCARD) || spec.contains(SINGLE_CHAR_WILDCARD)
    }
}

/// Iterative matcher with single-star backtracking.
fn glob_match(pattern: &[char], name: &[char]) -> bool {
    let mut p = 0;
    let mut n = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while n < name.len() {
        if p < pattern.len()
            && (pattern[p] == SINGLE_CHAR_WILDCARD || pattern[p] == name[n])
        {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == MULTI_CHAR_WILDCARD {
            star = Some(p);
            mark = n;
            p += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            mark += 1;
            n = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == MULTI_CHAR_WILDCARD {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_caseless(pattern: &str, name: &str) -> bool {
        WildcardPattern::new(pattern, false).matches(name)
    }

    #[test]
    fn test_match_all_star() {
        let pat = WildcardPattern::new("*", false);
        assert!(pat.is_match_all());
        assert!(pat.matches("anything.txt"));
        assert!(pat.matches(""));
    }

    #[test]
    fn test_all_files_spelling_folds_to_star() {
        let pat = WildcardPattern::new("*.*", false);
        assert!(pat.is_match_all());
        // A plain `*.*` glob would miss extension-less names; the folded
        // pattern must not.
        assert!(pat.matches("README"));
    }

    #[test]
    fn test_literal_match() {
        assert!(matches_caseless("report.txt", "report.txt"));
        assert!(!matches_caseless("report.txt", "report.doc"));
    }

    #[test]
    fn test_caseless_matching() {
        assert!(matches_caseless("Report.TXT", "report.txt"));
        let sensitive = WildcardPattern::new("Report.TXT", true);
        assert!(!sensitive.matches("report.txt"));
        assert!(sensitive.matches("Report.TXT"));
    }

    #[test]
    fn test_star_prefix_and_suffix() {
        assert!(matches_caseless("*.txt", "notes.txt"));
        assert!(!matches_caseless("*.txt", "notes.doc"));
        assert!(matches_caseless("report*", "report-final.doc"));
        assert!(matches_caseless("report*", "report"));
    }

    #[test]
    fn test_star_in_middle() {
        assert!(matches_caseless("a*z", "abcz"));
        assert!(matches_caseless("a*z", "az"));
        assert!(!matches_caseless("a*z", "abc"));
    }

    #[test]
    fn test_multiple_stars() {
        assert!(matches_caseless("*a*b*", "xxaxxbxx"));
        assert!(!matches_caseless("*a*b*", "bbbaaa"));
    }

    #[test]
    fn test_question_mark_single_char() {
        assert!(matches_caseless("repor?.txt", "report.txt"));
        assert!(!matches_caseless("repor?.txt", "repor.txt"));
        assert!(!matches_caseless("repor??.txt", "report.txt"));
    }

    #[test]
    fn test_mixed_wildcards() {
        assert!(matches_caseless("r?p*.t?t", "report.txt"));
        assert!(!matches_caseless("r?p*.t?t", "report.tt"));
    }

    #[test]
    fn test_star_backtracking() {
        assert!(matches_caseless("*.tar.gz", "backup.tar.gz"));
        assert!(!matches_caseless("*.tar.gz", "backup.tar.bz2"));
        assert!(matches_caseless("*gz", "a.gz.gz"));
    }

    #[test]
    fn test_contains_wildcards() {
        assert!(WildcardPattern::contains_wildcards("*.txt"));
        assert!(WildcardPattern::contains_wildcards("repor?.txt"));
        assert!(!WildcardPattern::contains_wildcards("report.txt"));
        assert!(!WildcardPattern::contains_wildcards(""));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty() {
        assert!(matches_caseless("", ""));
        assert!(!matches_caseless("", "a"));
    }
}
