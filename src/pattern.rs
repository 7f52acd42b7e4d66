//! Ignore-pattern matching.
//!
//! Patterns use shell-style globbing. A pattern ending in `/` is a directory
//! pattern and is tested against every segment of a path, so `build/` hides
//! `build/x.txt` and `src/build/x.txt` alike. Any other pattern is tested
//! against the whole relative path, where `*` also crosses `/`.

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, warn};

/// Name of the generated document when no output path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "codebatch.md";

/// Name of the configuration store.
pub const CONFIG_FILE: &str = "cbatch.toml";

/// Name of the user-editable ignore file.
pub const IGNORE_FILE: &str = ".cbatchignore";

/// Built-in ignore patterns, always active unless [`MergePolicy::Replace`] is chosen.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    DEFAULT_OUTPUT_FILE,
    "README.md",
    ".gitignore",
    ".git/",
    "*.lock",
    ".env",
    ".env.*",
    "package-lock.json",
    "*.png",
    "*.jpg",
    "*.ico",
    "*.mp3",
    "*.ttf",
    "*.jpeg",
    "*.mp4",
    "*.mkv",
    "*.webm",
    "*.gif",
    "*.zip",
    "*.gz",
    "*.tar",
    "*.rar",
    "*.7z",
    "*.pdf",
    ".prettierrc",
    ".eslintrc",
    ".eslintignore",
    ".stylelintrc",
    ".stylelintignore",
    ".npmrc",
    ".babelrc",
    ".browserslistrc",
    ".dockerignore",
    ".editorconfig",
    ".git*",
    "eslint*",
    CONFIG_FILE,
    IGNORE_FILE,
    "*.pyc",
    "__pycache__/",
    "*.swp",
    ".DS_Store",
    "node_modules/",
    "venv/",
    "env/",
    "*.log",
    "data/",
    "temp/",
    "tmp/",
    "build/",
    "dist/",
    "dist-*/",
    // certificates, keys, databases
    "*.pem",
    "*.key",
    "*.csr",
    "*.crt",
    "*.cer",
    "*.pfx",
    "*.p12",
    "*.sqlite",
    "*.db",
    "*.log",
    // framework build and cache directories
    ".svelte-kit/",
    ".next/",
    ".nuxt/",
    ".output/",
    ".vitepress/",
    ".astro/",
    ".cache/",
    "out/",
    ".angular/",
    ".remix/",
    // bundler outputs
    ".parcel-cache/",
    ".webpack/",
    ".rollup.cache/",
    ".turbo/",
    ".yarn/",
    "yarn-error.log",
    ".yarn.lock",
    ".pnpm-store/",
    // editors and IDEs
    ".idea/",
    ".vscode/",
    "*.sublime-*",
    ".settings/",
    ".project",
    ".classpath",
    "*.iml",
];

/// How user patterns combine with [`DEFAULT_IGNORE_PATTERNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Defaults first, then the user's patterns. Defaults cannot be un-ignored.
    #[default]
    Append,
    /// Only the user's patterns.
    Replace,
}

impl MergePolicy {
    /// Builds the working pattern list for a run.
    #[must_use]
    pub fn merge(self, user_patterns: &[String]) -> Vec<String> {
        match self {
            Self::Append => DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .chain(user_patterns.iter().cloned())
                .collect(),
            Self::Replace => user_patterns.to_vec(),
        }
    }
}

/// Options controlling glob evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare letters case-insensitively.
    pub case_insensitive: bool,
}

impl Default for MatchOptions {
    /// Follows the host filesystem convention.
    fn default() -> Self {
        Self {
            case_insensitive: cfg!(windows),
        }
    }
}

#[derive(Debug, Clone)]
enum Rule {
    /// Matched against each path segment.
    Directory(GlobMatcher),
    /// Matched against the whole relative path.
    File(GlobMatcher),
}

impl Rule {
    fn matches(&self, relative_path: &str) -> bool {
        match self {
            Self::Directory(glob) => relative_path.split('/').any(|segment| glob.is_match(segment)),
            Self::File(glob) => glob.is_match(relative_path),
        }
    }
}

/// A compiled, immutable set of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<Rule>,
}

impl IgnoreMatcher {
    /// Compiles `patterns`.
    ///
    /// Patterns that fail to compile are logged and dropped: they never match.
    #[must_use]
    pub fn new<I, S>(patterns: I, options: MatchOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules: Vec<Rule> = patterns
            .into_iter()
            .filter_map(|pattern| Self::compile(pattern.as_ref(), options))
            .collect();

        debug!("Compiled {} ignore rules", rules.len());
        Self { rules }
    }

    fn compile(pattern: &str, options: MatchOptions) -> Option<Rule> {
        let (glob, is_directory) = pattern
            .strip_suffix('/')
            .map_or((pattern, false), |stripped| (stripped, true));

        let Some(glob) = translate(glob) else {
            debug!("Pattern '{}' can never match", pattern);
            return None;
        };

        let matcher = GlobBuilder::new(&glob)
            .literal_separator(false)
            .backslash_escape(false)
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|e| warn!("Ignoring malformed pattern '{}': {}", pattern, e))
            .ok()?
            .compile_matcher();

        Some(if is_directory {
            Rule::Directory(matcher)
        } else {
            Rule::File(matcher)
        })
    }

    /// Returns true if `relative_path` (separated by `/`) matches any rule.
    #[must_use]
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(relative_path))
    }

    /// Number of rules that compiled successfully.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rewrites a shell pattern into globset syntax with the same meaning.
///
/// Only `*`, `?`, `[...]` and `[!...]` are special. Braces are literal,
/// `**` is just `*`, a leading `^` in a class is a literal caret, and an
/// unclosed `[` matches itself. Returns `None` if the pattern can never match.
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut glob = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                glob.push('*');
            }
            '{' | '}' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    glob.push_str(&translate_class(&chars[i..end])?);
                    i = end + 1;
                }
                None => glob.push_str("[[]"),
            },
            _ => glob.push(c),
        }
    }

    Some(glob)
}

/// Index of the `]` closing a class whose body starts at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // a `]` right after the opening bracket is a member
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn translate_class(body: &[char]) -> Option<String> {
    let (negated, body) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items: Vec<(char, char)> = Vec::new();
    let mut i = 0;
    while i < body.len() {
        if body.get(i + 1) == Some(&'-') && i + 2 < body.len() {
            let (lo, hi) = (body[i], body[i + 2]);
            // reversed ranges are empty
            if lo <= hi {
                items.push((lo, hi));
            }
            i += 3;
        } else {
            items.push((body[i], body[i]));
            i += 1;
        }
    }

    if items.is_empty() {
        return negated.then(|| "?".to_string());
    }

    // a lone `-` is only literal at the edges of a globset class
    let has_dash = items.contains(&('-', '-'));
    items.retain(|&item| item != ('-', '-'));
    if has_dash {
        items.push(('-', '-'));
    }

    // globset reads a leading `^` or `!` as negation
    if !negated && matches!(items[0].0, '^' | '!') {
        let (lo, hi) = items[0];
        if lo < hi {
            let next = if lo == '^' { '_' } else { '"' };
            items[0] = (next, hi);
            items.insert(1, (lo, lo));
        } else if let Some(k) = items.iter().position(|&(l, _)| !matches!(l, '^' | '!')) {
            let item = items.remove(k);
            items.insert(0, item);
        } else {
            let members: Vec<String> = items.iter().map(|&(c, _)| c.to_string()).collect();
            return Some(if members.len() == 1 {
                members[0].clone()
            } else {
                format!("{{{}}}", members.join(","))
            });
        }
    }

    let mut class = String::from("[");
    if negated {
        class.push('!');
    }
    for (lo, hi) in items {
        class.push(lo);
        if lo != hi {
            class.push('-');
            class.push(hi);
        }
    }
    class.push(']');
    Some(class)
}

/// Checks a single path against `patterns` using the host matching convention.
///
/// Prefer [`IgnoreMatcher`] when testing many paths against the same patterns.
#[must_use]
pub fn is_excluded<S: AsRef<str>>(relative_path: &str, patterns: &[S]) -> bool {
    IgnoreMatcher::new(patterns, MatchOptions::default()).is_excluded(relative_path)
}
