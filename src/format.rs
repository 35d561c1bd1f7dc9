//! Fits arbitrary message text onto the fixed display grid.

use serde_json::Value;

/// Format text into exactly `rows` lines of at most `width` characters.
///
/// Whitespace runs collapse to single spaces first. When the text parses as
/// a JSON object carrying a `message` field, that field's value replaces the
/// text. Overflow beyond `rows` lines is squeezed into the final line and
/// truncated. Total: every input yields exactly `rows` lines.
pub fn format_to_lines(text: &str, width: usize, rows: usize) -> Vec<String> {
    let mut txt = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&txt) {
        if let Some(message) = map.get("message") {
            txt = json_value_text(message);
        }
    }

    let mut lines = wrap(&txt, width);
    if lines.len() > rows {
        let tail = lines.split_off(rows - 1);
        lines.push(tail.join(" "));
    }
    lines.resize(rows, String::new());
    for line in &mut lines {
        truncate_chars(line, width);
    }
    lines
}

/// Render a JSON value the way it should read on the display: strings bare,
/// everything else as its JSON text.
pub(crate) fn json_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Greedy word wrap. Words longer than `width` are hard-broken so no line
/// ever exceeds the display width.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        loop {
            let word_len = word.len();
            if word_len == 0 {
                break;
            }

            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(word.iter());
                current_len += word_len;
                break;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }

            // Word alone exceeds the width: break it mid-word.
            let head: String = word[..width].iter().collect();
            lines.push(head);
            word.drain(..width);
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

fn truncate_chars(line: &mut String, width: usize) {
    if line.chars().count() > width {
        *line = line.chars().take(width).collect();
    }
}
