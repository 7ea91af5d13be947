use std::ops::Range;

const OPEN_FENCE: &str = "```json";
const CLOSE_FENCE: &str = "```";

/// Byte positions of the first ```` ```json ```` block in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonBlock {
    pub open: usize,
    pub content_start: usize,
    pub close: usize,
}

impl JsonBlock {
    /// First ```` ```json ```` marker and the next ```` ``` ```` after it.
    pub fn locate(text: &str) -> Option<Self> {
        let open = text.find(OPEN_FENCE)?;
        let content_start = open + OPEN_FENCE.len();
        let close = content_start + text[content_start..].find(CLOSE_FENCE)?;
        Some(Self {
            open,
            content_start,
            close,
        })
    }

    pub fn content<'a>(&self, text: &'a str) -> &'a str {
        text[self.content_start..self.close].trim()
    }

    /// Replace the block body, keeping both fences.
    pub fn splice(&self, text: &str, content: &str) -> String {
        format!(
            "{}\n{}\n{}",
            &text[..self.content_start],
            content,
            &text[self.close..]
        )
    }

    /// Indices of the lines the block spans, fences included.
    pub fn line_range(&self, text: &str) -> Range<usize> {
        let first = text[..self.open].matches('\n').count();
        let last = text[..self.close].matches('\n').count();
        first..last + 1
    }
}

/// Drop `//` comments that sit outside JSON string literals.
pub fn strip_line_comments(json: &str) -> String {
    json.lines()
        .map(|line| match comment_start(line) {
            Some(at) => line[..at].trim_end(),
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn comment_start(line: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    let mut previous_slash: Option<usize> = None;

    for (i, c) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                previous_slash = None;
            }
            '/' => {
                if let Some(start) = previous_slash {
                    return Some(start);
                }
                previous_slash = Some(i);
            }
            _ => previous_slash = None,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "intro\n```json\n{\"a\": 1}\n```\noutro";

    #[test]
    fn test_locate_and_content() {
        let block = JsonBlock::locate(RESPONSE).unwrap();
        assert_eq!(block.content(RESPONSE), "{\"a\": 1}");
        assert_eq!(block.line_range(RESPONSE), 1..4);
    }

    #[test]
    fn test_splice_keeps_surrounding_text() {
        let block = JsonBlock::locate(RESPONSE).unwrap();
        let spliced = block.splice(RESPONSE, "{\"a\": 2}");
        assert_eq!(spliced, "intro\n```json\n{\"a\": 2}\n```\noutro");
    }

    #[test]
    fn test_missing_closing_fence() {
        assert!(JsonBlock::locate("```json\n{}").is_none());
        assert!(JsonBlock::locate("no fences").is_none());
    }

    #[test]
    fn test_strip_comments_outside_strings() {
        let json = "{\n  \"url\": \"https://example.com\", // homepage\n  \"n\": 1 // count\n}";
        assert_eq!(
            strip_line_comments(json),
            "{\n  \"url\": \"https://example.com\",\n  \"n\": 1\n}"
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let json = r#""say \"hi\" // not a comment""#;
        assert_eq!(strip_line_comments(json), json);
    }
}
