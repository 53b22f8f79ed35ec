//! Glob pattern matching for file paths.
//!
//! Implements the patterns a project host hands to `glob`:
//! - `*` matches zero or more characters within one path segment
//! - `**` matches zero or more characters across segments
//! - `?` matches exactly one character other than `/`
//! - `[abc]`, `[a-z]`, `[!abc]` character classes
//! - `{a,b,c}` brace alternatives

/// Upper bound on recursive calls, so patterns like `*a*a*a*a` cannot blow up.
const MAX_MATCH_CALLS: usize = 100_000;

/// True if `s` contains any glob metacharacter.
pub fn contains_glob(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Match a whole path against a glob pattern.
///
/// ```
/// use vuefs_core::glob::glob_match;
///
/// assert!(glob_match("/src/*.vue", "/src/App.vue"));
/// assert!(!glob_match("/src/*.vue", "/src/components/App.vue"));
/// assert!(glob_match("/src/**/*.{vue,ts}", "/src/components/App.vue"));
/// ```
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let calls = std::cell::Cell::new(0usize);
    let input: Vec<char> = path.chars().collect();
    expand_braces(pattern).into_iter().any(|pat| {
        let pat: Vec<char> = pat.chars().collect();
        match_bounded(&pat, 0, &input, 0, &calls)
    })
}

/// Literal directory prefix of a pattern: everything before the first
/// segment that contains a metacharacter.
///
/// `/src/**/*.ts` -> `/src`, `*.ts` -> ``.
pub fn literal_prefix(pattern: &str) -> &str {
    let Some(meta) = pattern.find(['*', '?', '[', '{']) else {
        return match pattern.rfind('/') {
            Some(0) => "/",
            Some(pos) => &pattern[..pos],
            None => "",
        };
    };
    match pattern[..meta].rfind('/') {
        Some(0) => "/",
        Some(pos) => &pattern[..pos],
        None => "",
    }
}

/// Expand `{a,b}` groups into every alternative pattern.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();

    let mut depth = 0usize;
    let mut open = None;
    let mut close = None;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    let (Some(start), Some(end)) = (open, close) else {
        return vec![pattern.to_string()];
    };

    let prefix: String = chars[..start].iter().collect();
    let suffix: String = chars[end + 1..].iter().collect();
    let body: String = chars[start + 1..end].iter().collect();

    split_alternatives(&body)
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}

fn split_alternatives(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in body.chars() {
        match c {
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => out.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    out.push(current);
    out
}

fn match_bounded(
    pattern: &[char],
    pi: usize,
    input: &[char],
    ii: usize,
    calls: &std::cell::Cell<usize>,
) -> bool {
    let count = calls.get() + 1;
    calls.set(count);
    if count > MAX_MATCH_CALLS {
        return false;
    }

    if pi >= pattern.len() {
        return ii >= input.len();
    }

    match pattern[pi] {
        '*' => {
            let globstar = pattern.get(pi + 1) == Some(&'*');
            let mut next = pi;
            while next < pattern.len() && pattern[next] == '*' {
                next += 1;
            }
            // `**/` also matches zero directories.
            if globstar
                && pattern.get(next) == Some(&'/')
                && match_bounded(pattern, next + 1, input, ii, calls)
            {
                return true;
            }
            for skip in 0..=(input.len() - ii) {
                if skip > 0 && !globstar && input[ii + skip - 1] == '/' {
                    break;
                }
                if match_bounded(pattern, next, input, ii + skip, calls) {
                    return true;
                }
            }
            false
        }

        '?' => {
            ii < input.len()
                && input[ii] != '/'
                && match_bounded(pattern, pi + 1, input, ii + 1, calls)
        }

        '[' => {
            if ii >= input.len() {
                return false;
            }
            match parse_char_class(&pattern[pi..], input[ii]) {
                Some((true, len)) => match_bounded(pattern, pi + len, input, ii + 1, calls),
                Some((false, _)) => false,
                // Unterminated class: treat '[' literally.
                None => input[ii] == '[' && match_bounded(pattern, pi + 1, input, ii + 1, calls),
            }
        }

        '\\' if pi + 1 < pattern.len() => {
            ii < input.len()
                && pattern[pi + 1] == input[ii]
                && match_bounded(pattern, pi + 2, input, ii + 1, calls)
        }

        c => {
            ii < input.len() && c == input[ii] && match_bounded(pattern, pi + 1, input, ii + 1, calls)
        }
    }
}

/// Returns (matched, consumed pattern length), or None if the class never closes.
fn parse_char_class(pattern: &[char], ch: char) -> Option<(bool, usize)> {
    let mut idx = 1;
    let mut negate = false;
    if matches!(pattern.get(idx), Some('!') | Some('^')) {
        negate = true;
        idx += 1;
    }

    let first = idx;
    let mut matched = false;
    while idx < pattern.len() {
        let c = pattern[idx];
        if c == ']' && idx > first {
            return Some((matched != negate && ch != '/', idx + 1));
        }
        if idx + 2 < pattern.len() && pattern[idx + 1] == '-' && pattern[idx + 2] != ']' {
            if c <= ch && ch <= pattern[idx + 2] {
                matched = true;
            }
            idx += 3;
            continue;
        }
        if c == ch {
            matched = true;
        }
        idx += 1;
    }
    None
}
