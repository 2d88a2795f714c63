//! Line splitting and context snippet rendering for search hits.

/// Split `text` into lines on every line boundary character.
///
/// Besides `\n` and `\r\n` this honors a bare `\r`, vertical tab, form feed,
/// the `\x1c`..`\x1e` separators, NEL and the Unicode line and paragraph
/// separators. A trailing boundary does not produce an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let is_boundary = matches!(
            ch,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
                | '\u{2029}'
        );
        if !is_boundary {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + ch.len_utf8();
        if ch == '\r' && chars.peek().is_some_and(|&(_, next)| next == '\n') {
            chars.next();
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Render the lines around `line_no` (1-indexed), clipped to the file.
///
/// Each line is `<marker><line number right-aligned to 4>: <text>`, where the
/// marker is `>` for the matched line and a space otherwise.
pub fn render_snippet(lines: &[&str], line_no: usize, context_lines: usize) -> Vec<String> {
    if line_no == 0 || line_no > lines.len() {
        return Vec::new();
    }
    let start = line_no.saturating_sub(context_lines).max(1);
    let end = line_no.saturating_add(context_lines).min(lines.len());
    (start..=end)
        .map(|ln| {
            let marker = if ln == line_no { '>' } else { ' ' };
            format!("{marker}{ln:>4}: {}", lines[ln - 1])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_every_line_boundary() {
        assert_eq!(split_lines("one\rtwo\rthree\r"), vec!["one", "two", "three"]);
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(
            split_lines("a\x0bb\x0cc\u{85}d\u{2028}e\u{2029}f\x1cg"),
            vec!["a", "b", "c", "d", "e", "f", "g"]
        );
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn marks_matched_line_with_context() {
        let lines = ["one", "two", "build failed: timeout", "four", "five"];
        assert_eq!(
            render_snippet(&lines, 3, 1),
            vec![
                "    2: two",
                ">   3: build failed: timeout",
                "    4: four"
            ]
        );
    }

    #[test]
    fn clips_to_file_bounds() {
        let lines = ["first", "second"];
        assert_eq!(
            render_snippet(&lines, 1, 5),
            vec![">   1: first", "    2: second"]
        );
    }

    #[test]
    fn zero_context_renders_only_the_match() {
        let lines = ["a", "b", "c"];
        assert_eq!(render_snippet(&lines, 2, 0), vec![">   2: b"]);
    }
}
