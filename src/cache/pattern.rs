//! Redis-compatible glob matching for pattern invalidation.
//!
//! Supported syntax: `*`, `?`, `[abc]`, `[^abc]`, `[a-z]` and `\x` escapes.
//! Adapters without a native `SCAN MATCH` use these helpers to select keys.

const METACHARACTERS: [char; 5] = ['*', '?', '[', ']', '\\'];

/// Return true when `candidate` matches the glob `pattern`.
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let (mut pi, mut ci) = (0, 0);
    // Position of the last `*` and the candidate index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while ci < candidate.len() {
        if pi < pattern.len() {
            if pattern[pi] == '*' {
                backtrack = Some((pi, ci));
                pi += 1;
                continue;
            }
            if let Some(next) = match_single(&pattern, pi, candidate[ci]) {
                pi = next;
                ci += 1;
                continue;
            }
        }

        match backtrack {
            Some((star, absorbed)) => {
                pi = star + 1;
                ci = absorbed + 1;
                backtrack = Some((star, absorbed + 1));
            }
            None => return false,
        }
    }

    pattern[pi..].iter().all(|c| *c == '*')
}

/// The leading part of `pattern` that contains no wildcards, with escapes resolved.
pub fn literal_prefix(pattern: &str) -> String {
    let mut prefix = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' | '?' | '[' => break,
            '\\' => match chars.next() {
                Some(escaped) => prefix.push(escaped),
                None => break,
            },
            other => prefix.push(other),
        }
    }
    prefix
}

/// Escape glob metacharacters so `value` only matches itself.
pub fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if METACHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Match one non-star token at `pi`, returning the index after it.
fn match_single(pattern: &[char], pi: usize, c: char) -> Option<usize> {
    match pattern[pi] {
        '?' => Some(pi + 1),
        '[' => match_class(pattern, pi, c),
        '\\' if pi + 1 < pattern.len() => (pattern[pi + 1] == c).then_some(pi + 2),
        literal => (literal == c).then_some(pi + 1),
    }
}

fn match_class(pattern: &[char], start: usize, c: char) -> Option<usize> {
    let mut i = start + 1;
    let negate = pattern.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < pattern.len() && pattern[i] != ']' {
        if pattern[i] == '\\' && i + 1 < pattern.len() {
            matched |= pattern[i + 1] == c;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == '-' && pattern[i + 2] != ']' {
            let (low, high) = if pattern[i] <= pattern[i + 2] {
                (pattern[i], pattern[i + 2])
            } else {
                (pattern[i + 2], pattern[i])
            };
            matched |= (low..=high).contains(&c);
            i += 3;
        } else {
            matched |= pattern[i] == c;
            i += 1;
        }
    }

    // An unterminated class runs to the end of the pattern.
    let next = if i < pattern.len() { i + 1 } else { i };
    (matched != negate).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_suffix() {
        assert!(glob_match("products:*", "products:"));
        assert!(glob_match("products:*", "products:page=2"));
        assert!(!glob_match("products:*", "categories:page=1"));
        assert!(!glob_match("products:*", "products"));
    }

    #[test]
    fn star_backtracks_across_repeated_segments() {
        assert!(glob_match("*:page=*", "catalog:products:page=3"));
        assert!(glob_match("a*b*c", "aXbYbZc"));
        assert!(!glob_match("a*b*c", "aXbYbZ"));
        assert!(glob_match("**", ""));
    }

    #[test]
    fn question_mark_matches_exactly_one_char() {
        assert!(glob_match("h?llo", "hello"));
        assert!(glob_match("h?llo", "hällo"));
        assert!(!glob_match("h?llo", "hllo"));
    }

    #[test]
    fn classes_support_ranges_and_negation() {
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("id=[0-9]", "id=7"));
        assert!(glob_match("id=[9-0]", "id=7"));
        assert!(!glob_match("id=[0-9]", "id=x"));
    }

    #[test]
    fn escapes_match_literal_metacharacters() {
        assert!(glob_match("odd\\*ns:*", "odd*ns:page=1"));
        assert!(!glob_match("odd\\*ns:*", "oddXns:page=1"));
        assert!(glob_match("q\\?", "q?"));
        assert!(glob_match("[\\]]", "]"));
    }

    #[test]
    fn literal_prefix_stops_at_first_wildcard() {
        assert_eq!(literal_prefix("catalog:products:*"), "catalog:products:");
        assert_eq!(literal_prefix("odd\\*ns:*"), "odd*ns:");
        assert_eq!(literal_prefix("a?b"), "a");
        assert_eq!(literal_prefix("[ab]"), "");
    }

    #[test]
    fn escaped_values_only_match_themselves() {
        let raw = "we[ir]d*key?";
        let escaped = escape_glob(raw);
        assert!(glob_match(&escaped, raw));
        assert!(!glob_match(&escaped, "weid*key?"));
        assert_eq!(literal_prefix(&escaped), raw);
    }
}
