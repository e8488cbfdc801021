//! Host wildcard matching for directory enumeration.
//!
//! Matching is case-insensitive and understands the Windows expression
//! language:
//!
//! | Char | Meaning |
//! |------|---------|
//! | `*`  | any sequence, including empty |
//! | `?`  | exactly one character |
//! | `<`  | any sequence that stops at or before the name's final `.` |
//! | `>`  | one character, or nothing at a `.` or the end of the name |
//! | `"`  | a `.`, or nothing at the end of the name |
//!
//! Hosts translate `*.*` into `<"*`, which must also match names without an
//! extension.
//!
//! Expressions made only of `*`, `?` and literals go through
//! [`glob::Pattern`]. The DOS operators have no glob equivalent and use the
//! matcher below.

use glob::{MatchOptions, Pattern};

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Returns true if `name` matches `pattern`. An empty pattern matches every
/// name.
///
/// ```
/// use blobfs_mount::pattern::matches;
///
/// assert!(matches("*.TXT", "notes.txt"));
/// assert!(matches("<\"*", "README"));
/// assert!(!matches("?", "ab"));
/// ```
pub fn matches(pattern: &str, name: &str) -> bool {
    if pattern.is_empty() || pattern == "*" {
        return true;
    }
    // glob only folds ASCII case
    let pattern = pattern.to_lowercase();
    let name = name.to_lowercase();
    if !pattern.contains(['<', '>', '"'])
        && let Ok(compiled) = Pattern::new(&to_glob(&pattern))
    {
        return compiled.matches_with(&name, GLOB_OPTIONS);
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    Matcher::new(&pattern, &name).run()
}

/// Rewrites a host expression as a glob: brackets become literals and runs
/// of `*` collapse, since glob reserves `**` for whole path components.
fn to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' | ']' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            '*' if glob.ends_with('*') => {}
            _ => glob.push(c),
        }
    }
    glob
}

/// Memoized matcher over (pattern index, name index).
struct Matcher<'a> {
    pattern: &'a [char],
    name: &'a [char],
    last_dot: Option<usize>,
    memo: Vec<Option<bool>>,
}

impl<'a> Matcher<'a> {
    fn new(pattern: &'a [char], name: &'a [char]) -> Self {
        Self {
            pattern,
            name,
            last_dot: name.iter().rposition(|&c| c == '.'),
            memo: vec![None; (pattern.len() + 1) * (name.len() + 1)],
        }
    }

    fn run(&mut self) -> bool {
        self.at(0, 0)
    }

    fn at(&mut self, p: usize, n: usize) -> bool {
        let slot = p * (self.name.len() + 1) + n;
        if let Some(done) = self.memo[slot] {
            return done;
        }
        let result = self.step(p, n);
        self.memo[slot] = Some(result);
        result
    }

    fn step(&mut self, p: usize, n: usize) -> bool {
        let Some(&pc) = self.pattern.get(p) else {
            return n == self.name.len();
        };
        let nc = self.name.get(n).copied();
        match pc {
            '*' => self.at(p + 1, n) || (nc.is_some() && self.at(p, n + 1)),
            '?' => nc.is_some() && self.at(p + 1, n + 1),
            '<' => {
                // May consume up to, but not past, the final dot
                let limit = self.last_dot.unwrap_or(self.name.len()).max(n);
                (n..=limit).any(|end| self.at(p + 1, end))
            }
            '>' => match nc {
                Some('.') | None => self.at(p + 1, n),
                Some(_) => self.at(p + 1, n + 1),
            },
            '"' => match nc {
                Some('.') => self.at(p + 1, n + 1),
                None => self.at(p + 1, n),
                Some(_) => false,
            },
            literal => nc == Some(literal) && self.at(p + 1, n + 1),
        }
    }
}
