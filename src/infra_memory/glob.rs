//! Redis `MATCH`-style glob matching, so the in-memory cache deletes exactly
//! what `SCAN ... MATCH` would.

/// Supports `*`, `?`, `[...]` classes (with `^` negation and `a-z` ranges)
/// and `\` escapes.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    match_bytes(pattern.as_bytes(), key.as_bytes())
}

fn match_bytes(mut p: &[u8], mut s: &[u8]) -> bool {
    while let Some(&c) = p.first() {
        match c {
            b'*' => {
                while p.len() > 1 && p[1] == b'*' {
                    p = &p[1..];
                }
                if p.len() == 1 {
                    return true;
                }
                return (0..=s.len()).any(|i| match_bytes(&p[1..], &s[i..]));
            }
            b'?' => {
                if s.is_empty() {
                    return false;
                }
                p = &p[1..];
                s = &s[1..];
            }
            b'[' => {
                let Some((&ch, rest)) = s.split_first() else {
                    return false;
                };
                let (matched, after) = match_class(&p[1..], ch);
                if !matched {
                    return false;
                }
                p = after;
                s = rest;
            }
            b'\\' if p.len() >= 2 => {
                if s.first() != Some(&p[1]) {
                    return false;
                }
                p = &p[2..];
                s = &s[1..];
            }
            _ => {
                if s.first() != Some(&c) {
                    return false;
                }
                p = &p[1..];
                s = &s[1..];
            }
        }
    }
    s.is_empty()
}

/// `class` starts right after `[`. Returns whether `ch` belongs to the class
/// and the rest of the pattern after the closing `]`. An unterminated class
/// runs to the end of the pattern.
fn match_class(mut class: &[u8], ch: u8) -> (bool, &[u8]) {
    let negate = class.first() == Some(&b'^');
    if negate {
        class = &class[1..];
    }
    let mut matched = false;
    loop {
        match class {
            [] => return (matched != negate, class),
            [b']', rest @ ..] => return (matched != negate, rest),
            [b'\\', esc, rest @ ..] => {
                matched |= *esc == ch;
                class = rest;
            }
            [lo, b'-', hi, rest @ ..] if *hi != b']' => {
                let (lo, hi) = if lo <= hi { (*lo, *hi) } else { (*hi, *lo) };
                matched |= (lo..=hi).contains(&ch);
                class = rest;
            }
            [c, rest @ ..] => {
                matched |= *c == ch;
                class = rest;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::glob_match;

    #[test]
    fn star_matches_any_suffix() {
        assert!(glob_match("squads:*", "squads:all"));
        assert!(glob_match("squads:*", "squads:search:core"));
        assert!(glob_match("squads:*", "squads:"));
        assert!(!glob_match("squads:*", "squad:123"));
        assert!(glob_match("*", ""));
        assert!(glob_match("**", "anything"));
    }

    #[test]
    fn star_in_the_middle_backtracks() {
        assert!(glob_match(
            "reports:squad:*:total-hours:*",
            "reports:squad:42:total-hours:2024-01-01:2024-01-31"
        ));
        assert!(!glob_match(
            "reports:squad:*:total-hours:*",
            "reports:squad:42:member-hours:2024-01-01:2024-01-31"
        ));
    }

    #[test]
    fn question_mark_matches_exactly_one() {
        assert!(glob_match("employee:?", "employee:7"));
        assert!(!glob_match("employee:?", "employee:"));
        assert!(!glob_match("employee:?", "employee:77"));
    }

    #[test]
    fn classes_ranges_and_negation() {
        assert!(glob_match("h[ae]llo", "hello"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("v[0-9]", "v5"));
        assert!(glob_match("v[9-0]", "v5"));
        assert!(!glob_match("v[0-9]", "vx"));
    }

    #[test]
    fn escapes_are_literal() {
        assert!(glob_match(r"squads:search:\*", "squads:search:*"));
        assert!(!glob_match(r"squads:search:\*", "squads:search:x"));
        assert!(glob_match(r"a[\]]b", "a]b"));
    }

    #[test]
    fn literal_patterns_need_exact_match() {
        assert!(glob_match("dashboard:stats", "dashboard:stats"));
        assert!(!glob_match("dashboard:stats", "dashboard:stats2"));
        assert!(!glob_match("dashboard:stats2", "dashboard:stats"));
    }
}
