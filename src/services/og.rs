// Open Graph share cards rendered as SVG
use crate::services::moderation::mask_sensitive;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;
pub const MAX_CONTENT_CHARS: usize = 140;

const TEXT_WIDTH: u32 = 1040;

/// The parts of a question shown on its card
#[derive(Debug, Clone)]
pub struct CardQuestion<'a> {
    pub content: &'a str,
    pub is_sensitive: bool,
    pub image_count: usize,
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}

fn font_size(chars: usize) -> u32 {
    if chars > 100 {
        36
    } else if chars > 50 {
        44
    } else {
        52
    }
}

/// Break text into lines that fit the card at the given font size
fn wrap_lines(text: &str, font_size: u32) -> Vec<String> {
    let per_line = (TEXT_WIDTH / font_size).max(1) as usize;
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.is_empty() {
            continue;
        }
        for chunk in chars.chunks(per_line) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

fn frame(body: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<rect width="{w}" height="{h}" fill="#f0f8ff"/>
<text x="80" y="110" font-family="system-ui, sans-serif" font-size="40" font-weight="700" fill="#4a90e2">Qlink</text>
{body}
<text x="80" y="580" font-family="system-ui, sans-serif" font-size="24" fill="#7bb3f0">Answer anonymously on Qlink</text>
</svg>"##,
        w = WIDTH,
        h = HEIGHT,
        body = body
    )
}

/// Card for a question
pub fn render_question_card(question: &CardQuestion<'_>) -> String {
    let content = if question.is_sensitive {
        mask_sensitive(question.content)
    } else {
        question.content.to_string()
    };
    let content = truncate_chars(&content, MAX_CONTENT_CHARS);
    let size = font_size(content.chars().count());

    let mut body = String::new();
    if question.is_sensitive {
        body.push_str(
            r##"<text x="1120" y="110" text-anchor="end" font-family="system-ui, sans-serif" font-size="28" fill="#ffb347">Sensitive content</text>
"##,
        );
    }

    let line_height = size + size / 3;
    for (i, line) in wrap_lines(&content, size).iter().enumerate() {
        body.push_str(&format!(
            r##"<text x="80" y="{}" font-family="system-ui, sans-serif" font-size="{}" fill="#2c5aa0">{}</text>
"##,
            200 + i as u32 * line_height,
            size,
            escape_xml(line)
        ));
    }

    if question.image_count > 0 {
        let noun = if question.image_count == 1 { "image" } else { "images" };
        body.push_str(&format!(
            r##"<text x="1120" y="580" text-anchor="end" font-family="system-ui, sans-serif" font-size="24" fill="#7bb3f0">{} {} attached</text>
"##,
            question.image_count, noun
        ));
    }

    frame(&body)
}

/// Card served when the question does not exist
pub fn render_default_card() -> String {
    frame(
        r##"<text x="600" y="330" text-anchor="middle" font-family="system-ui, sans-serif" font-size="48" fill="#4a90e2">Question not found</text>
"##,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
    }

    #[test]
    fn truncates_by_characters() {
        let long = "質".repeat(MAX_CONTENT_CHARS + 10);
        let out = truncate_chars(&long, MAX_CONTENT_CHARS);
        assert_eq!(out.chars().count(), MAX_CONTENT_CHARS + 3);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_chars("short", MAX_CONTENT_CHARS), "short");
    }

    #[test]
    fn sensitive_cards_are_masked_and_badged() {
        let svg = render_question_card(&CardQuestion {
            content: "あいつはバカだと思う？",
            is_sensitive: true,
            image_count: 0,
        });
        assert!(svg.contains("●●"));
        assert!(!svg.contains("バカ"));
        assert!(svg.contains("Sensitive content"));
        assert!(!svg.contains("attached"));
    }

    #[test]
    fn image_note_and_escaping() {
        let svg = render_question_card(&CardQuestion {
            content: "Tom & Jerry <3",
            is_sensitive: false,
            image_count: 2,
        });
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(svg.contains("2 images attached"));
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn default_card() {
        assert!(render_default_card().contains("Question not found"));
    }
}
