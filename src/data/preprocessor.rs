// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises question text before tokenisation so training and
// inference see the same character stream.
//
// Cleaning steps (applied in order):
//   1. Map Unicode whitespace variants and control characters to
//      a plain space, drop the Arabic tatweel (U+0640) and
//      zero-width joiners
//   2. Collapse runs of spaces and trim each line
//   3. Join lines with a single space (a question is one line)

/// Arabic kashida/tatweel: typographic elongation only.
const TATWEEL: char = '\u{0640}';

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a question string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: Normalise individual characters ───────────────────────────
        let step1: String = text
            .chars()
            .filter(|&c| !matches!(c, TATWEEL | '\u{200C}' | '\u{200D}' | '\u{FEFF}'))
            .map(|c| match c {
                '\t' | '\u{00A0}' | '\u{200B}' => ' ',
                '\r' => '\n',
                c if c.is_control() && c != '\n' => ' ',
                c => c,
            })
            .collect();

        // ── Step 2 + 3: Collapse spaces per line, then join lines ─────────────
        step1
            .lines()
            .map(|line| line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("ما   هو  ناتج"), "ما هو ناتج");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  اذكر عاصمة فرنسا.  "), "اذكر عاصمة فرنسا.");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_strips_tatweel() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("اشـــرح"), "اشرح");
    }

    #[test]
    fn test_joins_lines() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("line1\r\n\n\nline2"), "line1 line2");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert_eq!(p.clean(" \t \n "), "");
    }
}
