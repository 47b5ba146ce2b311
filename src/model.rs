//! Record shape for one read book, as collected from a reader's catalog page.
//!
//! The exporters (XLSX, JSON, CSV) all consume this type.

use serde::{Deserialize, Serialize};

/// One book from a reader's "read" list.
///
/// `authors` and `genres` keep the order the links appear in on the page. `title` and
/// `rating` are the element text exactly as rendered (no normalization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "book_name")]
    pub title: String,
    #[serde(rename = "book_author")]
    pub authors: Vec<String>,
    #[serde(rename = "book_genres")]
    pub genres: Vec<String>,
    #[serde(rename = "book_rating")]
    pub rating: String,
}

/// Render a list-valued field as a single cell value in list-literal form: `['a', 'b']`.
///
/// Each item is single-quoted unless it contains a single quote and no double quote, in
/// which case it is double-quoted. Backslashes and the chosen quote are escaped. Control
/// characters and non-space whitespace (e.g. U+00A0) are written as `\n`, `\xa0`,
/// `\u2028` style escapes.
pub fn render_list(items: &[String]) -> String {
    let parts: Vec<String> = items.iter().map(|s| quote_item(s)).collect();
    format!("[{}]", parts.join(", "))
}

fn quote_item(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if needs_escape(c) => {
                let cp = c as u32;
                if cp < 0x100 {
                    out.push_str(&format!("\\x{:02x}", cp));
                } else if cp < 0x10000 {
                    out.push_str(&format!("\\u{:04x}", cp));
                } else {
                    out.push_str(&format!("\\U{:08x}", cp));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Characters shown as escapes rather than raw: controls, whitespace other than ' ',
/// and invisible format characters.
fn needs_escape(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(c, '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}')
}
