//! Page loop over a reader's "read" list: fetch, parse, accumulate, pause, repeat until a page
//! comes back with no entries.

mod client;
mod error;
mod stop;

pub mod livelib;

pub use client::{CatalogClient, CatalogClientBuilder, PageFetcher};
pub use error::ScraperError;
pub use stop::StopSignal;

use crate::model::BookRecord;
use livelib::{reader_page_url, PageContent, PageParser};
use std::time::Duration;

/// Pause between pages. The site returns empty or degraded pages under rapid requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(60);

/// Options for one collection run.
pub struct CollectOptions<'a> {
    /// Wait after each page that had entries, before fetching the next.
    pub page_delay: Duration,
    /// Checked before each fetch and used for the between-page wait.
    pub stop: Option<&'a StopSignal>,
    /// Called after each page with entries: (page number, total records so far).
    pub progress: Option<&'a dyn Fn(u32, usize)>,
}

impl Default for CollectOptions<'_> {
    fn default() -> Self {
        Self {
            page_delay: DEFAULT_PAGE_DELAY,
            stop: None,
            progress: None,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectEnd {
    /// Last page had no entries and showed the empty-list placeholder.
    EndOfCatalog,
    /// Last page had no entries and no placeholder: end of list or throttling, can't tell.
    Unconfirmed,
    /// A stop was requested; records cover the pages fetched before it.
    Stopped,
}

/// Result of [collect_user_rates].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Page order, then entry order within a page.
    pub records: Vec<BookRecord>,
    /// Number of pages requested, including the final empty one.
    pub pages_fetched: u32,
    pub end: CollectEnd,
}

/// Collect every read book for `user_id`, starting at page 1.
///
/// Stops at the first page with no entries. Fetch and parse errors abort the run and the
/// records gathered so far are dropped with it.
pub fn collect_user_rates(
    fetcher: &mut dyn PageFetcher,
    base_url: &str,
    user_id: &str,
    options: &CollectOptions<'_>,
) -> Result<Collection, ScraperError> {
    let parser = PageParser::new()?;
    let mut records: Vec<BookRecord> = Vec::new();
    let mut page_num: u32 = 1;
    let mut pages_fetched: u32 = 0;

    loop {
        if options.stop.is_some_and(StopSignal::is_stopped) {
            tracing::info!(page = page_num, "stop requested before fetch");
            return Ok(Collection {
                records,
                pages_fetched,
                end: CollectEnd::Stopped,
            });
        }

        let url = reader_page_url(base_url, user_id, page_num)?;
        let html = fetcher.fetch(&url)?;
        pages_fetched += 1;

        let entries = match parser.parse_page(&html, page_num)? {
            PageContent::Entries(entries) => entries,
            PageContent::Empty { end_marker } => {
                let end = if end_marker {
                    tracing::debug!(page = page_num, "end of list");
                    CollectEnd::EndOfCatalog
                } else {
                    tracing::warn!(
                        page = page_num,
                        url = %url,
                        "page has no entries and no end-of-list marker; the site may be throttling"
                    );
                    CollectEnd::Unconfirmed
                };
                return Ok(Collection {
                    records,
                    pages_fetched,
                    end,
                });
            }
        };

        tracing::debug!(page = page_num, entries = entries.len(), "page parsed");
        records.extend(entries);
        if let Some(p) = options.progress {
            p(page_num, records.len());
        }
        page_num += 1;

        if !options.page_delay.is_zero() {
            tracing::debug!(secs = options.page_delay.as_secs(), "waiting before next page");
        }
        let stopped = match options.stop {
            Some(signal) => signal.wait_timeout(options.page_delay),
            None => {
                std::thread::sleep(options.page_delay);
                false
            }
        };
        if stopped {
            tracing::info!(page = page_num, "stop requested during wait");
            return Ok(Collection {
                records,
                pages_fetched,
                end: CollectEnd::Stopped,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::livelib::tests::{entry_html, page_html};
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;

    /// Serves scripted responses in order and records requested URLs.
    struct ScriptedFetcher {
        pages: VecDeque<Result<String, ScraperError>>,
        requested: Vec<String>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<String, ScraperError>>) -> Self {
            Self {
                pages: pages.into(),
                requested: Vec::new(),
            }
        }
    }

    impl PageFetcher for ScriptedFetcher {
        fn fetch(&mut self, url: &str) -> Result<String, ScraperError> {
            self.requested.push(url.to_string());
            self.pages
                .pop_front()
                .unwrap_or_else(|| Ok("<html><body></body></html>".to_string()))
        }
    }

    fn no_delay() -> CollectOptions<'static> {
        CollectOptions {
            page_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn titles(c: &Collection) -> Vec<&str> {
        c.records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn stops_on_first_empty_page_and_concatenates() -> Result<(), ScraperError> {
        let page1 = page_html(&[
            entry_html("A1", &["a"], &["g"], "5"),
            entry_html("A2", &["a"], &["g"], "4"),
        ]);
        let page2 = page_html(&[entry_html("B1", &["b"], &["g"], "3")]);
        let page3 = r#"<html><body><div class="empty-block"></div></body></html>"#.to_string();
        let mut fetcher = ScriptedFetcher::new(vec![Ok(page1), Ok(page2), Ok(page3)]);

        let c = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &no_delay())?;

        assert_eq!(fetcher.requested.len(), 3);
        assert_eq!(
            fetcher.requested,
            vec![
                "https://www.livelib.ru/reader/Arlett/read/~1",
                "https://www.livelib.ru/reader/Arlett/read/~2",
                "https://www.livelib.ru/reader/Arlett/read/~3",
            ]
        );
        assert_eq!(titles(&c), vec!["A1", "A2", "B1"]);
        assert_eq!(c.pages_fetched, 3);
        assert_eq!(c.end, CollectEnd::EndOfCatalog);
        Ok(())
    }

    #[test]
    fn empty_first_page_gives_no_records() -> Result<(), ScraperError> {
        let mut fetcher = ScriptedFetcher::new(vec![Ok("<html></html>".to_string())]);
        let c = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "nobody", &no_delay())?;
        assert!(c.records.is_empty());
        assert_eq!(c.pages_fetched, 1);
        assert_eq!(c.end, CollectEnd::Unconfirmed);
        Ok(())
    }

    #[test]
    fn fetch_error_aborts_run() {
        let page1 = page_html(&[entry_html("A1", &["a"], &["g"], "5")]);
        let mut fetcher = ScriptedFetcher::new(vec![
            Ok(page1),
            Err(ScraperError::HttpStatus {
                status: 503,
                url: "https://www.livelib.ru/reader/Arlett/read/~2".to_string(),
            }),
        ]);
        let result = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &no_delay());
        assert!(matches!(
            result,
            Err(ScraperError::HttpStatus { status: 503, .. })
        ));
        assert_eq!(fetcher.requested.len(), 2);
    }

    #[test]
    fn missing_field_aborts_run() {
        let broken = page_html(&[r#"<div class="book-item-manage"></div>"#.to_string()]);
        let mut fetcher = ScriptedFetcher::new(vec![Ok(broken)]);
        let result = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &no_delay());
        assert!(matches!(
            result,
            Err(ScraperError::MissingField { page: 1, entry: 1, .. })
        ));
    }

    #[test]
    fn progress_reports_running_total() -> Result<(), ScraperError> {
        let page1 = page_html(&[
            entry_html("A1", &["a"], &["g"], "5"),
            entry_html("A2", &["a"], &["g"], "4"),
        ]);
        let page2 = page_html(&[entry_html("B1", &["b"], &["g"], "3")]);
        let mut fetcher = ScriptedFetcher::new(vec![Ok(page1), Ok(page2)]);
        let seen: std::cell::RefCell<Vec<(u32, usize)>> = Default::default();
        let cb = |page: u32, total: usize| seen.borrow_mut().push((page, total));
        let options = CollectOptions {
            page_delay: Duration::ZERO,
            stop: None,
            progress: Some(&cb),
        };
        collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &options)?;
        assert_eq!(*seen.borrow(), vec![(1, 2), (2, 3)]);
        Ok(())
    }

    #[test]
    fn stop_during_wait_returns_collected_records() -> Result<(), ScraperError> {
        let page1 = page_html(&[entry_html("A1", &["a"], &["g"], "5")]);
        let page2 = page_html(&[entry_html("B1", &["b"], &["g"], "3")]);
        let mut fetcher = ScriptedFetcher::new(vec![Ok(page1), Ok(page2)]);
        let signal = StopSignal::new();
        let pages_seen = Cell::new(0u32);
        // Stop as soon as the first page is in; the long wait must not be served.
        let cb = |page: u32, _total: usize| {
            pages_seen.set(page);
            signal.stop();
        };
        let options = CollectOptions {
            page_delay: Duration::from_secs(3600),
            stop: Some(&signal),
            progress: Some(&cb),
        };
        let c = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &options)?;
        assert_eq!(pages_seen.get(), 1);
        assert_eq!(c.end, CollectEnd::Stopped);
        assert_eq!(titles(&c), vec!["A1"]);
        assert_eq!(fetcher.requested.len(), 1);
        Ok(())
    }

    #[test]
    fn waits_once_after_each_page_with_entries() -> Result<(), ScraperError> {
        let delay = Duration::from_millis(200);
        let page1 = page_html(&[entry_html("A1", &["a"], &["g"], "5")]);
        let page2 = page_html(&[entry_html("B1", &["b"], &["g"], "3")]);
        let mut fetcher = ScriptedFetcher::new(vec![
            Ok(page1),
            Ok(page2),
            Ok("<html><body></body></html>".to_string()),
        ]);
        let options = CollectOptions {
            page_delay: delay,
            stop: None,
            progress: None,
        };
        let start = std::time::Instant::now();
        let c = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &options)?;
        let elapsed = start.elapsed();
        assert_eq!(fetcher.requested.len(), 3);
        assert_eq!(c.records.len(), 2);
        assert!(elapsed >= delay * 2, "expected two waits, took {:?}", elapsed);
        assert!(elapsed < delay * 3, "final empty page must not wait, took {:?}", elapsed);
        Ok(())
    }

    #[test]
    fn stop_signal_wait_serves_full_delay_when_not_stopped() -> Result<(), ScraperError> {
        let delay = Duration::from_millis(100);
        let page1 = page_html(&[entry_html("A1", &["a"], &["g"], "5")]);
        let mut fetcher = ScriptedFetcher::new(vec![Ok(page1)]);
        let signal = StopSignal::new();
        let options = CollectOptions {
            page_delay: delay,
            stop: Some(&signal),
            progress: None,
        };
        let start = std::time::Instant::now();
        let c = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &options)?;
        assert!(start.elapsed() >= delay);
        assert_eq!(fetcher.requested.len(), 2);
        assert_eq!(c.end, CollectEnd::Unconfirmed);
        Ok(())
    }

    #[test]
    fn stop_before_start_fetches_nothing() -> Result<(), ScraperError> {
        let mut fetcher = ScriptedFetcher::new(vec![]);
        let signal = StopSignal::new();
        signal.stop();
        let options = CollectOptions {
            page_delay: Duration::ZERO,
            stop: Some(&signal),
            progress: None,
        };
        let c = collect_user_rates(&mut fetcher, "https://www.livelib.ru", "Arlett", &options)?;
        assert!(fetcher.requested.is_empty());
        assert_eq!(c.pages_fetched, 0);
        assert_eq!(c.end, CollectEnd::Stopped);
        Ok(())
    }

    #[test]
    fn rerun_on_same_snapshot_is_identical() -> Result<(), ScraperError> {
        let pages = || {
            vec![
                Ok(page_html(&[entry_html("A1", &["a", "b"], &["g"], "5")])),
                Ok(page_html(&[entry_html("B1", &["c"], &["h", "i"], "3")])),
            ]
        };
        let first = collect_user_rates(
            &mut ScriptedFetcher::new(pages()),
            "https://www.livelib.ru",
            "Arlett",
            &no_delay(),
        )?;
        let second = collect_user_rates(
            &mut ScriptedFetcher::new(pages()),
            "https://www.livelib.ru",
            "Arlett",
            &no_delay(),
        )?;
        assert_eq!(first, second);
        Ok(())
    }
}
