//! Text helpers for repeated tags (several authors, several genres) on a catalog entry.

use scraper::ElementRef;

/// Joiner used in genre labels, e.g. `№1\u{a0}в\u{a0}Фэнтези`: the preposition "в" wrapped in
/// non-breaking spaces.
pub const GENRE_JOINER: &str = "\u{a0}в\u{a0}";

/// Replace every [GENRE_JOINER] with the same word between plain spaces.
///
/// Always returns the (possibly unchanged) string, including when the joiner starts at
/// position 0.
pub fn replace_to_space(s: &str) -> String {
    match s.find(GENRE_JOINER) {
        Some(_) => s.replace(GENRE_JOINER, " в "),
        None => s.to_string(),
    }
}

/// One label per matched element, in document order.
///
/// Uses the element's text content (so nested markup inside a link is flattened rather than
/// truncated) and normalizes it with [replace_to_space]. Empty input gives an empty list.
pub fn search_all_items_in_tags<'a, I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    tags.into_iter()
        .map(|el| replace_to_space(&el.text().collect::<String>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn labels(html: &str, sel: &str) -> Vec<String> {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse(sel).unwrap();
        search_all_items_in_tags(doc.select(&sel))
    }

    #[test]
    fn replace_to_space_joiner_in_middle() {
        assert_eq!(
            replace_to_space("Жанр\u{a0}в\u{a0}Поджанр"),
            "Жанр в Поджанр"
        );
    }

    #[test]
    fn replace_to_space_joiner_at_start() {
        assert_eq!(replace_to_space("\u{a0}в\u{a0}Фэнтези"), " в Фэнтези");
    }

    #[test]
    fn replace_to_space_no_joiner_returns_input() {
        assert_eq!(replace_to_space("Фэнтези"), "Фэнтези");
        assert_eq!(replace_to_space(""), "");
    }

    #[test]
    fn replace_to_space_every_occurrence() {
        assert_eq!(
            replace_to_space("a\u{a0}в\u{a0}b\u{a0}в\u{a0}c"),
            "a в b в c"
        );
    }

    #[test]
    fn replace_to_space_leaves_lone_nbsp() {
        assert_eq!(replace_to_space("Том\u{a0}1"), "Том\u{a0}1");
    }

    #[test]
    fn search_all_items_preserves_order_and_length() {
        let html = r#"<div>
<a class="brow-book-author" href="/author/1">Иван Иванов</a>
<a class="brow-book-author" href="/author/2">Пётр Петров</a>
<a class="brow-book-author" href="/author/3">Анна Сидорова</a>
</div>"#;
        let out = labels(html, "a.brow-book-author");
        assert_eq!(out, vec!["Иван Иванов", "Пётр Петров", "Анна Сидорова"]);
    }

    #[test]
    fn search_all_items_normalizes_genre_joiner() {
        let html = "<a class=\"label-genre\" href=\"/genre/1\">№3\u{a0}в\u{a0}Фэнтези</a>";
        assert_eq!(labels(html, "a.label-genre"), vec!["№3 в Фэнтези"]);
    }

    #[test]
    fn search_all_items_flattens_nested_markup() {
        let html = r#"<a class="brow-book-author" href="/a"><span>Лев</span> Толстой</a>"#;
        assert_eq!(labels(html, "a.brow-book-author"), vec!["Лев Толстой"]);
    }

    #[test]
    fn search_all_items_empty_input() {
        assert!(labels("<div></div>", "a.brow-book-author").is_empty());
    }
}
