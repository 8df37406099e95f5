//! Markdown-to-blocks transducer.
//!
//! Pure, line-oriented, deterministic: every non-blank source line becomes
//! exactly one block. No multi-line merging, no nested lists, no inline
//! formatting beyond the full-line image embed.

use std::sync::OnceLock;

use regex::Regex;

use crate::notion::Block;

fn image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^!\[[^\]]*\]\(([^)\s]+)\)$").expect("valid regex"))
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").expect("valid regex"))
}

fn divider_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-{3,}|\*{3,})$").expect("valid regex"))
}

/// Convert a constrained Markdown dialect into an ordered block sequence.
///
/// Classification precedence (first match wins): full-line image embed,
/// `### `, `## `, `# `, bullet, numbered item, quote, divider, paragraph.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    markdown
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(classify_line)
        .collect()
}

fn classify_line(line: &str) -> Block {
    if let Some(captures) = image_re().captures(line) {
        return Block::Image {
            url: captures[1].to_string(),
        };
    }
    if let Some(rest) = line.strip_prefix("### ") {
        return Block::Heading3(rest.to_string());
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return Block::Heading2(rest.to_string());
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return Block::Heading1(rest.to_string());
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::Bullet(rest.to_string());
    }
    if let Some(found) = numbered_re().find(line) {
        return Block::Numbered(line[found.end()..].to_string());
    }
    if let Some(rest) = line.strip_prefix("> ") {
        return Block::Quote(rest.to_string());
    }
    if divider_re().is_match(line) {
        return Block::Divider;
    }
    Block::Paragraph(line.to_string())
}
