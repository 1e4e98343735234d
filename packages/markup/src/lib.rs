//! # Diary Markup
//!
//! Read-side helpers over the rich-text markup a diary entry stores.
//!
//! The editor addresses content by *index*, not by byte: every visible
//! character is one unit, every line terminator (end of a block element or a
//! `<br>` inside a non-empty line) is one unit, and every embed (`<img>`) is
//! one unit. Tags and entity spellings take no room of their own.
//!
//! ```text
//! <p>Hi<img src="a.png"></p><p>&amp;</p>
//!    01 2              3      4    5
//! ```
//!
//! The same walk yields the plain-text projection (characters and line
//! terminators, embeds dropped) that is persisted next to the markup.

pub mod tag;
pub mod tokenizer;

pub use tokenizer::{tokenize, Token};

use tag::{decode_entity, escape_attribute, is_block, src_attribute, tag_name};

/// One addressable position in the markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Char { offset: usize, ch: char },
    LineEnd { offset: usize },
    Embed { offset: usize, src: Option<String> },
}

impl Unit {
    /// Byte offset in the markup where this unit starts.
    pub fn offset(&self) -> usize {
        match self {
            Unit::Char { offset, .. } | Unit::LineEnd { offset } | Unit::Embed { offset, .. } => {
                *offset
            }
        }
    }
}

/// Walks the markup into index units.
pub fn units(markup: &str) -> Vec<Unit> {
    let mut out = Vec::new();
    let mut line_has_content = false;
    let mut block_depth = 0usize;

    for (token, span) in tokenize(markup) {
        match token {
            Token::Text(text) => {
                // Formatting whitespace between blocks is not content.
                if block_depth == 0 && text.trim().is_empty() {
                    continue;
                }
                for (i, ch) in text.char_indices() {
                    out.push(Unit::Char {
                        offset: span.start + i,
                        ch,
                    });
                }
                line_has_content = true;
            }
            Token::Entity(raw) => {
                match decode_entity(raw) {
                    Some(ch) => out.push(Unit::Char {
                        offset: span.start,
                        ch,
                    }),
                    None => {
                        for (i, ch) in raw.char_indices() {
                            out.push(Unit::Char {
                                offset: span.start + i,
                                ch,
                            });
                        }
                    }
                }
                line_has_content = true;
            }
            Token::OpenTag(raw) => {
                let name = tag_name(raw);
                if name == "img" {
                    out.push(Unit::Embed {
                        offset: span.start,
                        src: src_attribute(raw),
                    });
                    line_has_content = true;
                } else if name == "br" {
                    if line_has_content {
                        out.push(Unit::LineEnd { offset: span.start });
                        line_has_content = false;
                    }
                } else if is_block(&name) && !raw.ends_with("/>") {
                    block_depth += 1;
                }
            }
            Token::CloseTag(raw) => {
                let name = tag_name(raw);
                if !is_block(&name) {
                    continue;
                }
                block_depth = block_depth.saturating_sub(1);

                // Code blocks already end their last line with a literal newline.
                let ends_with_newline = matches!(out.last(), Some(Unit::Char { ch: '\n', .. }));
                if name == "pre" && ends_with_newline {
                    line_has_content = false;
                    continue;
                }
                out.push(Unit::LineEnd { offset: span.start });
                line_has_content = false;
            }
        }
    }

    out
}

/// Number of addressable positions in the markup.
pub fn index_len(markup: &str) -> usize {
    units(markup).len()
}

/// Markup-stripped projection: characters plus `\n` per line terminator.
pub fn plain_text(markup: &str) -> String {
    units(markup)
        .into_iter()
        .filter_map(|unit| match unit {
            Unit::Char { ch, .. } => Some(ch),
            Unit::LineEnd { .. } => Some('\n'),
            Unit::Embed { .. } => None,
        })
        .collect()
}

/// Byte offset at which content inserted at editor `index` belongs.
///
/// Indices at or past the end clamp to the end of the last line, so an
/// insertion never lands after the closing tag of the final block.
pub fn byte_offset_for_index(markup: &str, index: usize) -> usize {
    let units = units(markup);
    match units.get(index) {
        Some(unit) => unit.offset(),
        None => match units.last() {
            Some(Unit::LineEnd { offset }) => *offset,
            _ => markup.len(),
        },
    }
}

/// Splices `fragment` into the markup at editor `index`. Empty markup gets a
/// paragraph to hold the fragment.
pub fn insert_at(markup: &str, index: usize, fragment: &str) -> String {
    if markup.trim().is_empty() {
        return format!("<p>{}</p>", fragment);
    }

    let offset = byte_offset_for_index(markup, index);
    let mut out = String::with_capacity(markup.len() + fragment.len());
    out.push_str(&markup[..offset]);
    out.push_str(fragment);
    out.push_str(&markup[offset..]);
    out
}

/// Markup for an image embed pointing at `url`.
pub fn embed_fragment(url: &str) -> String {
    format!(r#"<img src="{}">"#, escape_attribute(url))
}

/// Inserts an image embed for `url` at editor `index`.
pub fn insert_embed(markup: &str, index: usize, url: &str) -> String {
    insert_at(markup, index, &embed_fragment(url))
}

/// `src` of every embed, in document order.
pub fn embedded_sources(markup: &str) -> Vec<String> {
    units(markup)
        .into_iter()
        .filter_map(|unit| match unit {
            Unit::Embed { src, .. } => src,
            _ => None,
        })
        .collect()
}

/// Decoded text of every `<pre>` code block, in document order.
pub fn code_blocks(markup: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for (token, _) in tokenize(markup) {
        match token {
            Token::OpenTag(raw) if tag_name(raw) == "pre" => {
                current = Some(String::new());
            }
            Token::CloseTag(raw) if tag_name(raw) == "pre" => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            Token::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.push_str(text);
                }
            }
            Token::Entity(raw) => {
                if let Some(block) = current.as_mut() {
                    match decode_entity(raw) {
                        Some(ch) => block.push(ch),
                        None => block.push_str(raw),
                    }
                }
            }
            _ => {}
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_markup() {
        let markup = "<p>Hello <strong>world</strong></p><p>a &amp; b</p>";
        assert_eq!(plain_text(markup), "Hello world\na & b\n");
    }

    #[test]
    fn test_plain_text_drops_embeds_and_empty_lines() {
        let markup = r#"<p>x<img src="a.png">y</p><p><br></p><h2>T</h2>"#;
        assert_eq!(plain_text(markup), "xy\n\nT\n");
    }

    #[test]
    fn test_plain_text_ignores_formatting_whitespace() {
        let markup = "<p>one</p>\n  <p>two</p>\n";
        assert_eq!(plain_text(markup), "one\ntwo\n");
    }

    #[test]
    fn test_line_break_inside_paragraph() {
        assert_eq!(plain_text("<p>a<br>b</p>"), "a\nb\n");
    }

    #[test]
    fn test_code_block_newlines() {
        let markup = "<pre class=\"ql-syntax\">let x = 1;\nx + 1\n</pre>";
        assert_eq!(plain_text(markup), "let x = 1;\nx + 1\n");
        assert_eq!(code_blocks(markup), vec!["let x = 1;\nx + 1\n".to_string()]);
    }

    #[test]
    fn test_index_counts_embeds() {
        let markup = r#"<p>Hi<img src="a.png"></p><p>&amp;</p>"#;
        // H i img \n & \n
        assert_eq!(index_len(markup), 6);
    }

    #[test]
    fn test_byte_offset_uses_character_indices() {
        let markup = "<p>일기장</p>";
        // "<p>" is 3 bytes, each hangul syllable 3 bytes.
        assert_eq!(byte_offset_for_index(markup, 0), 3);
        assert_eq!(byte_offset_for_index(markup, 1), 6);
        assert_eq!(byte_offset_for_index(markup, 3), 12);
    }

    #[test]
    fn test_insert_embed_at_cursor() {
        let markup = "<p>ab</p><p>cd</p>";
        let out = insert_embed(markup, 1, "http://h/x.png");
        assert_eq!(out, r#"<p>a<img src="http://h/x.png">b</p><p>cd</p>"#);

        // Index 3 is the start of the second line.
        let out = insert_embed(markup, 3, "y.png");
        assert_eq!(out, r#"<p>ab</p><p><img src="y.png">cd</p>"#);
    }

    #[test]
    fn test_insert_past_end_clamps_into_last_line() {
        let markup = "<p>ab</p>";
        let out = insert_embed(markup, 99, "z.png");
        assert_eq!(out, r#"<p>ab<img src="z.png"></p>"#);
    }

    #[test]
    fn test_insert_into_empty_document() {
        assert_eq!(insert_embed("", 0, "a.png"), r#"<p><img src="a.png"></p>"#);
    }

    #[test]
    fn test_embedded_sources_in_order() {
        let markup = r#"<p><img src="a.png">t<img src='b.png'></p><p><img src="c&amp;d.png"></p>"#;
        assert_eq!(embedded_sources(markup), vec!["a.png", "b.png", "c&d.png"]);
    }
}
