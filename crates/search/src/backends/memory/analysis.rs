//! Text analysis and pattern matching.

use regex::Regex;

/// Splits `text` into lowercase alphanumeric words.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Compiles a wildcard pattern into an anchored regex. `*` stands for any
/// run of characters (including none) and `?` for exactly one. Everything
/// else matches literally.
pub(crate) fn glob_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("(?s)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                source.push_str(&regex::escape(&literal));
                literal.clear();
                source.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    source.push_str(&regex::escape(&literal));
    source.push('$');
    Regex::new(&source)
}
