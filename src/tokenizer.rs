// tokenizer.rs

/// Characters that separate tokens on an input line.
pub const DELIMITERS: &[char] = &[' ', '\t'];

/// Removes the line terminator (`\n` or `\r\n`) and nothing else.
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Splits `line` on runs of `delimiters`, dropping empty tokens.
pub fn tokenize(line: &str, delimiters: &[char]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    for ch in strip_line_ending(line).chars() {
        if delimiters.contains(&ch) {
            if !cur.is_empty() {
                tokens.push(std::mem::take(&mut cur));
            }
        } else {
            cur.push(ch);
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    tokens
}

/// Tokenizes with the shell's default delimiters.
pub fn split_words(line: &str) -> Vec<String> {
    tokenize(line, DELIMITERS)
}
