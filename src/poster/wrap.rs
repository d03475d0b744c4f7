/// Character budget per title line, spaces included.
pub const WRAP_WIDTH: usize = 38;

/// Greedy word wrap on character counts, not rendered width.
///
/// A word joins the current line while `line + word` stays within `width`,
/// where `line` keeps the space after each word. A word longer than `width`
/// gets a line to itself and may overflow the canvas. Whitespace-only input
/// yields no lines.
pub fn wrap_title(title: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in title.split_whitespace() {
        let word_len = word.chars().count();
        if line.is_empty() || line_len + word_len <= width {
            line.push_str(word);
            line.push(' ');
            line_len += word_len + 1;
        } else {
            lines.push(line.trim_end().to_string());
            line = format!("{word} ");
            line_len = word_len + 1;
        }
    }
    if !line.is_empty() {
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_words_stay_within_width() {
        let title = "Leaders gather in Geneva for talks on regional security as ceasefire deadline nears";
        let lines = wrap_title(title, WRAP_WIDTH);
        assert!(lines.len() > 1);
        for l in &lines {
            assert!(l.chars().count() <= WRAP_WIDTH, "line too long: {l:?}");
        }
        assert_eq!(lines.join(" "), title);
    }

    #[test]
    fn boundary_counts_the_trailing_space() {
        // "aaaa " is 5 chars; 7 words fill 35, the 8th would need 35 + 4 = 39
        let title = vec!["aaaa"; 8].join(" ");
        let lines = wrap_title(&title, WRAP_WIDTH);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(' ').count(), 7);
        assert_eq!(lines[1], "aaaa");

        // 38 exactly still fits: "aaaaaaaaaaaaaaaaa " (18) + 20-char word
        let fits = format!("{} {}", "a".repeat(17), "b".repeat(20));
        assert_eq!(wrap_title(&fits, WRAP_WIDTH), vec![fits.clone()]);
    }

    #[test]
    fn long_token_gets_its_own_line() {
        let token = "x".repeat(60);
        let title = format!("Breaking: {token} update");
        let lines = wrap_title(&title, WRAP_WIDTH);
        assert_eq!(lines, vec!["Breaking:".to_string(), token.clone(), "update".to_string()]);

        assert_eq!(wrap_title(&token, WRAP_WIDTH), vec![token]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let title = "é".repeat(30) + " ok";
        assert_eq!(wrap_title(&title, WRAP_WIDTH).len(), 1);
    }

    #[test]
    fn blank_title_has_no_lines() {
        assert!(wrap_title("", WRAP_WIDTH).is_empty());
        assert!(wrap_title("   \t ", WRAP_WIDTH).is_empty());
    }
}
