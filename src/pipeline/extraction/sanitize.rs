// Clean document text before it is placed into a model prompt.

/// Maximum document text sent to the model (characters).
pub const MAX_INPUT_LENGTH: usize = 50_000;

/// Strip invisible characters, normalize whitespace and truncate.
pub fn sanitize_for_llm(raw: &str) -> String {
    let cleaned = remove_invisible_chars(raw);
    let normalized = normalize_whitespace(&cleaned);
    truncate_chars(&normalized, MAX_INPUT_LENGTH)
}

/// Remove zero-width, bidi-override and control characters.
/// Space, tab and newlines survive.
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t' | '\r') {
                return true;
            }
            if matches!(
                *c,
                '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
            ) {
                return false;
            }
            !c.is_control()
        })
        .collect()
}

/// Trim each line and collapse runs of blank lines into one.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !blank_run && !out.is_empty() {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        blank_run = false;
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
