//! livelib_rates: collect a LiveLib reader's read books (title, authors, genres, rating) and
//! export them to XLSX, JSON, or CSV.

pub mod cli;
pub mod config;
pub mod formats;
pub mod model;
pub mod scraper;
pub mod text;
pub mod xlsx;

// Re-exports for CLI and consumers.
pub use formats::{write_csv, write_json, FormatError, OutputFormat};
pub use model::BookRecord;
pub use scraper::{
    collect_user_rates, CatalogClient, CatalogClientBuilder, CollectEnd, CollectOptions,
    Collection, PageFetcher, ScraperError, StopSignal,
};
pub use text::{replace_to_space, search_all_items_in_tags};
pub use xlsx::{write_xlsx, XlsxError};
