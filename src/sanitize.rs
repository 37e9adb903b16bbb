//! Plain-text sanitisation for the notification channel.
//!
//! Inbound messages arrive as rich text and are stripped to plain text
//! before prefix matching; generated answers are markdown and are rendered
//! down to plain text before delivery.

/// Strip HTML tags and decode common entities. Block-level tags become
/// newlines so the text keeps its visual structure.
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' {
            let mut tag = String::new();
            for t in chars.by_ref() {
                if t == '>' {
                    break;
                }
                tag.push(t);
            }
            let name = tag
                .trim_start_matches('/')
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            if matches!(
                name.as_str(),
                "br" | "p" | "div" | "li" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            ) {
                out.push('\n');
            }
        } else {
            out.push(c);
        }
    }
    decode_entities(&out).trim().to_string()
}

fn decode_entities(s: &str) -> String {
    // &amp; last so "&amp;lt;" doesn't double-decode
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Render common LLM markdown down to plain text.
pub fn render_plain(md: &str) -> String {
    let mut result = String::with_capacity(md.len());
    let lines: Vec<&str> = md.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // Fenced code blocks: keep the code, drop the fences
        if line.trim_start().starts_with("```") {
            i += 1;
            while i < lines.len() && !lines[i].trim_start().starts_with("```") {
                result.push_str(lines[i]);
                result.push('\n');
                i += 1;
            }
            if i < lines.len() {
                i += 1; // skip closing ```
            }
            continue;
        }

        // Markdown table: each data row becomes "Header: cell" lines
        if line.trim_start().starts_with('|') {
            let mut table_lines = Vec::new();
            while i < lines.len() && lines[i].trim_start().starts_with('|') {
                table_lines.push(lines[i]);
                i += 1;
            }
            let parse_row = |row: &str| -> Vec<String> {
                row.split('|')
                    .map(|cell| cell.trim().to_string())
                    .filter(|cell| !cell.is_empty())
                    .collect()
            };
            let is_separator = |row: &str| -> bool { row.contains("---") || row.contains(":--") };

            let headers: Vec<String> = parse_row(table_lines[0]);
            for row_line in table_lines.iter().skip(1).filter(|l| !is_separator(l)) {
                for (ci, cell) in parse_row(row_line).iter().enumerate() {
                    let cell = strip_inline(cell);
                    if ci < headers.len() {
                        result.push_str(&strip_inline(&headers[ci]));
                        result.push_str(": ");
                    }
                    result.push_str(&cell);
                    result.push('\n');
                }
            }
            continue;
        }

        let trimmed = line.trim_start();
        let content = if let Some(heading) = strip_heading(trimmed) {
            heading
        } else if let Some(rest) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            format!("• {}", rest)
        } else if let Some(rest) = trimmed.strip_prefix("> ") {
            rest.to_string()
        } else {
            line.to_string()
        };

        result.push_str(&strip_inline(&content));
        result.push('\n');
        i += 1;
    }

    result.trim_end().to_string()
}

/// "### heading" → "heading". A '#' without a following space is not a
/// heading (e.g. issue references like "#42").
fn strip_heading(line: &str) -> Option<String> {
    let rest = line.trim_start_matches('#');
    if rest.len() != line.len() && rest.starts_with(' ') {
        Some(rest.trim_start().to_string())
    } else {
        None
    }
}

/// Strip inline marks: links keep their text, emphasis and code marks are
/// removed. Underscores are left alone so identifiers survive.
fn strip_inline(s: &str) -> String {
    strip_links(s)
        .replace("**", "")
        .replace("__", "")
        .replace("~~", "")
        .replace('`', "")
        .replace('*', "")
}

/// `[text](url)` → `text`, `![alt](url)` → `alt`.
fn strip_links(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    let find_from = |start: usize, target: char| -> Option<usize> {
        (start..chars.len()).find(|&j| chars[j] == target)
    };

    while i < chars.len() {
        let bracket = if chars[i] == '!' && i + 1 < chars.len() && chars[i + 1] == '[' {
            Some(i + 1)
        } else if chars[i] == '[' {
            Some(i)
        } else {
            None
        };

        if let Some(open) = bracket {
            if let Some(close) = find_from(open + 1, ']') {
                if close + 1 < chars.len() && chars[close + 1] == '(' {
                    if let Some(paren) = find_from(close + 2, ')') {
                        out.extend(&chars[open + 1..close]);
                        i = paren + 1;
                        continue;
                    }
                }
            }
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        assert_eq!(strip_html("<p>/devops fetch my log</p>"), "/devops fetch my log");
        assert_eq!(strip_html("a &amp;&amp; b &lt;ok&gt;"), "a && b <ok>");
        assert_eq!(strip_html("<b>bold</b> and <i>italic</i>"), "bold and italic");
    }

    #[test]
    fn block_tags_become_newlines() {
        let text = strip_html("<p>first</p><p>second</p>");
        assert_eq!(text, "first\n\nsecond");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("/devops hello"), "/devops hello");
    }

    #[test]
    fn renders_emphasis_to_plain() {
        assert_eq!(render_plain("**bold** and *italic* and `code`"), "bold and italic and code");
    }

    #[test]
    fn renders_headings_and_lists() {
        let md = "## Pipeline status\n- step one\n- step two";
        assert_eq!(render_plain(md), "Pipeline status\n• step one\n• step two");
    }

    #[test]
    fn keeps_code_block_content() {
        let md = "before\n```bash\ncargo test\n```\nafter";
        assert_eq!(render_plain(md), "before\ncargo test\nafter");
    }

    #[test]
    fn links_keep_their_text() {
        assert_eq!(
            render_plain("see [the docs](https://example.com) for more"),
            "see the docs for more"
        );
        assert_eq!(render_plain("![diagram](img.png)"), "diagram");
    }

    #[test]
    fn tables_become_labeled_lines() {
        let md = "| Step | Status |\n| --- | --- |\n| build | passed |";
        assert_eq!(render_plain(md), "Step: build\nStatus: passed");
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert_eq!(render_plain("fixes #42"), "fixes #42");
    }
}
