/// Minimum number of non-whitespace characters for a document to count as non-empty.
pub const MIN_CONTENT_CHARS: usize = 10;

/// Normalizes extracted text into a single string.
///
/// - one `\n` between paragraphs, blank lines dropped
/// - runs of whitespace inside a paragraph collapse to one space
/// - C0/C1 control characters are removed (newline survives as the paragraph separator)
/// - outer whitespace trimmed
pub fn clean_text(raw: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();

    for line in raw.split(is_paragraph_break) {
        let mut paragraph = String::with_capacity(line.len());
        let mut pending_space = false;

        for c in line.chars() {
            if c.is_whitespace() {
                pending_space = true;
            } else if c.is_control() || c == '\u{feff}' {
                continue;
            } else {
                if pending_space && !paragraph.is_empty() {
                    paragraph.push(' ');
                }
                pending_space = false;
                paragraph.push(c);
            }
        }

        if !paragraph.is_empty() {
            paragraphs.push(paragraph);
        }
    }

    paragraphs.join("\n")
}

fn is_paragraph_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
