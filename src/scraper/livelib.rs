//! LiveLib reader pages. Builds the paginated "read" URL and turns one page of HTML into
//! [BookRecord]s.
//!
//! Layout markers: every book is a `div.book-item-manage`; inside it the title link, author
//! links, genre labels, and the reader's rating value.

use crate::model::BookRecord;
use crate::scraper::error::ScraperError;
use crate::text::search_all_items_in_tags;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_BASE_URL: &str = "https://www.livelib.ru";

const ENTRY_SELECTOR: &str = "div.book-item-manage";
const TITLE_SELECTOR: &str = "a.brow-book-name.with-cycle";
const AUTHOR_SELECTOR: &str = "a.brow-book-author";
const GENRE_SELECTOR: &str = "a.label-genre";
const RATING_SELECTOR: &str = "span.rating-value";
/// Placeholder block shown on a reader list with nothing (more) to display.
const EMPTY_STATE_SELECTOR: &str = "div.empty-block";

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::Selector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Build `{base}/reader/{user_id}/read/~{page}`. A trailing `/` on `base` is ignored.
pub fn reader_page_url(base: &str, user_id: &str, page: u32) -> Result<String, ScraperError> {
    if user_id.is_empty() || user_id.contains(['/', '?', '#']) {
        return Err(ScraperError::InvalidUserId(user_id.to_string()));
    }
    let base = base.trim_end_matches('/');
    let raw = format!("{}/reader/{}/read/~{}", base, user_id, page);
    let url = Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
        input: raw.clone(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            input: raw,
            reason: "URL has no host".to_string(),
        });
    }
    Ok(url.to_string())
}

/// What one fetched page contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// At least one entry, in page order.
    Entries(Vec<BookRecord>),
    /// No entries. `end_marker` is true when the page showed the empty-list placeholder,
    /// false when entries are simply missing (e.g. a throttled or degraded response).
    Empty { end_marker: bool },
}

/// Compiled selectors for reader pages. Build once per run.
#[derive(Debug)]
pub struct PageParser {
    entry: Selector,
    title: Selector,
    author: Selector,
    genre: Selector,
    rating: Selector,
    empty_state: Selector,
}

impl PageParser {
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            entry: parse_selector(ENTRY_SELECTOR)?,
            title: parse_selector(TITLE_SELECTOR)?,
            author: parse_selector(AUTHOR_SELECTOR)?,
            genre: parse_selector(GENRE_SELECTOR)?,
            rating: parse_selector(RATING_SELECTOR)?,
            empty_state: parse_selector(EMPTY_STATE_SELECTOR)?,
        })
    }

    /// Parse one reader page. `page` is only used for error and log context.
    ///
    /// Any entry missing its title or rating fails the whole page.
    pub fn parse_page(&self, html: &str, page: u32) -> Result<PageContent, ScraperError> {
        let doc = Html::parse_document(html);
        let entries: Vec<ElementRef<'_>> = doc.select(&self.entry).collect();
        if entries.is_empty() {
            let end_marker = doc.select(&self.empty_state).next().is_some();
            return Ok(PageContent::Empty { end_marker });
        }
        let records = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| self.parse_entry(entry, page, i + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageContent::Entries(records))
    }

    /// One entry node to one record. `position` is 1-based within the page.
    pub fn parse_entry(
        &self,
        entry: ElementRef<'_>,
        page: u32,
        position: usize,
    ) -> Result<BookRecord, ScraperError> {
        let title = entry
            .select(&self.title)
            .next()
            .map(|e| e.text().collect::<String>())
            .ok_or(ScraperError::MissingField {
                page,
                entry: position,
                field: "title",
                selector: TITLE_SELECTOR,
            })?;
        let authors = search_all_items_in_tags(entry.select(&self.author));
        let genres = search_all_items_in_tags(entry.select(&self.genre));
        let rating = entry
            .select(&self.rating)
            .next()
            .map(|e| e.text().collect::<String>())
            .ok_or(ScraperError::MissingField {
                page,
                entry: position,
                field: "rating",
                selector: RATING_SELECTOR,
            })?;

        if authors.is_empty() {
            tracing::warn!(page, entry = position, title = %title, "entry has no author links");
        }
        if genres.is_empty() {
            tracing::warn!(page, entry = position, title = %title, "entry has no genre labels");
        }

        Ok(BookRecord {
            title,
            authors,
            genres,
            rating,
        })
    }
}
