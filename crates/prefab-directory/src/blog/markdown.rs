//! Renderer for the small markdown dialect used by blog posts.
//!
//! Supported blocks: `#`..`###` headings, paragraphs, `-`/`*` and `1.` lists, `>` quotes and
//! `---` rules. Inline: `**bold**`, `*italic*`, `_italic_`, `` `code` ``, links and images.
//! Every piece of text is HTML-escaped and unmatched markers stay literal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Html,
    Plain,
}

#[derive(Debug)]
enum Block {
    Paragraph(Vec<String>),
    List { ordered: bool, items: Vec<String> },
    Quote(Vec<String>),
}

/// Renders post content to HTML.
pub fn render(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + content.len() / 2);
    let mut current: Option<Block> = None;

    for raw in content.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            flush(&mut current, &mut out);
            continue;
        }

        if is_rule(trimmed) {
            flush(&mut current, &mut out);
            out.push_str("<hr>\n");
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            flush(&mut current, &mut out);
            out.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                inline(text, Mode::Html)
            ));
            continue;
        }

        if let Some(text) = quote_line(trimmed) {
            match current.as_mut() {
                Some(Block::Quote(lines)) => lines.push(text.to_string()),
                _ => {
                    flush(&mut current, &mut out);
                    current = Some(Block::Quote(vec![text.to_string()]));
                }
            }
            continue;
        }

        if let Some((ordered, text)) = list_item(trimmed) {
            match current.as_mut() {
                Some(Block::List {
                    ordered: open,
                    items,
                }) if *open == ordered => items.push(text.to_string()),
                _ => {
                    flush(&mut current, &mut out);
                    current = Some(Block::List {
                        ordered,
                        items: vec![text.to_string()],
                    });
                }
            }
            continue;
        }

        match current.as_mut() {
            Some(Block::Paragraph(lines)) => lines.push(trimmed.to_string()),
            // lazy continuation of the previous list item
            Some(Block::List { items, .. }) if line.starts_with(' ') => {
                if let Some(last) = items.last_mut() {
                    last.push(' ');
                    last.push_str(trimmed);
                }
            }
            _ => {
                flush(&mut current, &mut out);
                current = Some(Block::Paragraph(vec![trimmed.to_string()]));
            }
        }
    }

    flush(&mut current, &mut out);
    out
}

/// Strips markup and returns the readable text, one space between blocks.
pub fn plain_text(content: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for raw in content.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_rule(trimmed) {
            continue;
        }

        let text = if let Some((_, text)) = heading(trimmed) {
            text
        } else if let Some(text) = quote_line(trimmed) {
            text
        } else if let Some((_, text)) = list_item(trimmed) {
            text
        } else {
            trimmed
        };

        let stripped = inline(text, Mode::Plain);
        words.extend(stripped.split_whitespace().map(str::to_string));
    }

    words.join(" ")
}

fn flush(current: &mut Option<Block>, out: &mut String) {
    let Some(block) = current.take() else {
        return;
    };

    match block {
        Block::Paragraph(lines) => {
            out.push_str("<p>");
            out.push_str(&inline(&lines.join(" "), Mode::Html));
            out.push_str("</p>\n");
        }
        Block::Quote(lines) => {
            out.push_str("<blockquote><p>");
            out.push_str(&inline(&lines.join(" "), Mode::Html));
            out.push_str("</p></blockquote>\n");
        }
        Block::List { ordered, items } => {
            let tag = if ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>\n"));
            for item in items {
                out.push_str("<li>");
                out.push_str(&inline(&item, Mode::Html));
                out.push_str("</li>\n");
            }
            out.push_str(&format!("</{tag}>\n"));
        }
    }
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|ch| ch == '-')
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|ch| *ch == '#').count();
    if !(1..=3).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    rest.strip_prefix(' ')
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| (level, text))
}

fn quote_line(line: &str) -> Option<&str> {
    line.strip_prefix('>').map(str::trim)
}

fn list_item(line: &str) -> Option<(bool, &str)> {
    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some((false, text.trim()));
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    line[digits..]
        .strip_prefix(". ")
        .map(|text| (true, text.trim()))
}

fn inline(text: &str, mode: Mode) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '`' => {
                if let Some(end) = find(&chars, i + 1, &['`']) {
                    let code: String = chars[i + 1..end].iter().collect();
                    wrap(&mut out, mode, "code", &escape_for(&code, mode));
                    i = end + 1;
                    continue;
                }
            }
            '!' if chars.get(i + 1) == Some(&'[') => {
                if let Some((alt, url, end)) = link_parts(&chars, i + 1) {
                    match mode {
                        Mode::Html if is_safe_image(&url) => out.push_str(&format!(
                            "<img src=\"{}\" alt=\"{}\">",
                            escape(&url),
                            escape(&alt)
                        )),
                        _ => out.push_str(&escape_for(&alt, mode)),
                    }
                    i = end;
                    continue;
                }
            }
            '[' => {
                if let Some((label, url, end)) = link_parts(&chars, i) {
                    let label = inline(&label, mode);
                    match mode {
                        Mode::Html if is_safe_link(&url) => out.push_str(&format!(
                            "<a href=\"{}\">{}</a>",
                            escape(&url),
                            label
                        )),
                        _ => out.push_str(&label),
                    }
                    i = end;
                    continue;
                }
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                if let Some(end) = find_pair(&chars, i + 2, '*') {
                    if end > i + 2 {
                        let inner: String = chars[i + 2..end].iter().collect();
                        wrap(&mut out, mode, "strong", &inline(&inner, mode));
                        i = end + 2;
                        continue;
                    }
                }
                out.push_str("**");
                i += 2;
                continue;
            }
            '*' | '_' => {
                let opens_word = ch == '*'
                    || i == 0
                    || !chars[i - 1].is_alphanumeric();
                let next_is_text = chars
                    .get(i + 1)
                    .is_some_and(|next| !next.is_whitespace() && *next != ch);
                if opens_word && next_is_text {
                    if let Some(end) = find(&chars, i + 1, &[ch]) {
                        let closes_word = ch == '*'
                            || chars
                                .get(end + 1)
                                .map_or(true, |after| !after.is_alphanumeric());
                        if closes_word && !chars[end - 1].is_whitespace() {
                            let inner: String = chars[i + 1..end].iter().collect();
                            wrap(&mut out, mode, "em", &inline(&inner, mode));
                            i = end + 1;
                            continue;
                        }
                    }
                }
            }
            _ => {}
        }

        push_escaped(&mut out, ch, mode);
        i += 1;
    }

    out
}

fn wrap(out: &mut String, mode: Mode, tag: &str, inner: &str) {
    match mode {
        Mode::Html => out.push_str(&format!("<{tag}>{inner}</{tag}>")),
        Mode::Plain => out.push_str(inner),
    }
}

/// Parses `[label](url)` starting at the `[` and returns the index just past `)`.
fn link_parts(chars: &[char], open: usize) -> Option<(String, String, usize)> {
    let close = find(chars, open + 1, &[']'])?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let end = find(chars, close + 2, &[')'])?;
    let label: String = chars[open + 1..close].iter().collect();
    let url: String = chars[close + 2..end].iter().collect();
    let url = url.trim().to_string();
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some((label, url, end + 1))
}

fn find(chars: &[char], from: usize, targets: &[char]) -> Option<usize> {
    (from..chars.len()).find(|&index| targets.contains(&chars[index]))
}

fn find_pair(chars: &[char], from: usize, marker: char) -> Option<usize> {
    (from..chars.len().saturating_sub(1))
        .find(|&index| chars[index] == marker && chars[index + 1] == marker)
}

fn is_safe_link(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with('#')
        || (lower.starts_with('/') && !lower.starts_with("//"))
}

fn is_safe_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || (lower.starts_with('/') && !lower.starts_with("//"))
}

fn escape_for(text: &str, mode: Mode) -> String {
    match mode {
        Mode::Html => escape(text),
        Mode::Plain => text.to_string(),
    }
}

fn push_escaped(out: &mut String, ch: char, mode: Mode) {
    if mode == Mode::Plain {
        out.push(ch);
        return;
    }
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        other => out.push(other),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        push_escaped(&mut out, ch, Mode::Html);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_paragraphs_and_rules() {
        let html = render("# Going Modular\n\nFactory built,\nsite assembled.\n\n---\n### Costs");
        assert_eq!(
            html,
            "<h1>Going Modular</h1>\n<p>Factory built, site assembled.</p>\n<hr>\n<h3>Costs</h3>\n"
        );
    }

    #[test]
    fn four_hashes_are_not_a_heading() {
        assert_eq!(render("#### Deep"), "<p>#### Deep</p>\n");
        assert_eq!(render("#NoSpace"), "<p>#NoSpace</p>\n");
    }

    #[test]
    fn renders_both_list_kinds() {
        let html = render("- Permits\n* Foundation\n\n1. Order\n2. Deliver");
        assert_eq!(
            html,
            "<ul>\n<li>Permits</li>\n<li>Foundation</li>\n</ul>\n<ol>\n<li>Order</li>\n<li>Deliver</li>\n</ol>\n"
        );
    }

    #[test]
    fn quotes_merge_consecutive_lines() {
        assert_eq!(
            render("> Best decision\n> we made."),
            "<blockquote><p>Best decision we made.</p></blockquote>\n"
        );
    }

    #[test]
    fn inline_emphasis_code_and_links() {
        let html = render(
            "**Net zero** homes are *efficient*, see `R-30` and [our guide](/blog/guide).",
        );
        assert_eq!(
            html,
            "<p><strong>Net zero</strong> homes are <em>efficient</em>, see <code>R-30</code> and <a href=\"/blog/guide\">our guide</a>.</p>\n"
        );
    }

    #[test]
    fn underscores_inside_words_stay_literal() {
        assert_eq!(
            render("set max_price_usd or _this_"),
            "<p>set max_price_usd or <em>this</em></p>\n"
        );
    }

    #[test]
    fn escapes_html_and_drops_unsafe_links() {
        let html = render("<script>alert('x')</script> [click](javascript:alert(1))");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("href"));
        assert!(html.contains("click"));
    }

    #[test]
    fn images_render_with_escaped_alt() {
        assert_eq!(
            render("![Cabin \"A\"](https://cdn.example.com/a.jpg)"),
            "<p><img src=\"https://cdn.example.com/a.jpg\" alt=\"Cabin &quot;A&quot;\"></p>\n"
        );
        assert_eq!(render("![x](data:image/png)"), "<p>x</p>\n");
    }

    #[test]
    fn unmatched_markers_are_literal() {
        assert_eq!(render("2 * 3 and **open"), "<p>2 * 3 and **open</p>\n");
        assert_eq!(render("`tick"), "<p>`tick</p>\n");
    }

    #[test]
    fn plain_text_strips_markup() {
        let text = plain_text("# Title\n\n- **Fast** build\n> [Read](/more) `now`\n---\n");
        assert_eq!(text, "Title Fast build Read now");
    }
}
