/// Punctuation replaced by a single space before whitespace collapse.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '{', '}', '[', ']', '"', '\'', '`', '~',
];

/// Deterministic Turkish-aware text normalization.
///
/// Turkish case folding runs before the generic lowercase: `İ → i` and
/// `I → ı`, so "İshal" and "IŞIK" fold the way Turkish readers expect.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'İ' => folded.push('i'),
            'I' => folded.push('ı'),
            c if PUNCTUATION.contains(&c) => folded.push(' '),
            c => folded.extend(c.to_lowercase()),
        }
    }

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
