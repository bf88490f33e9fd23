//! URL handling module for SitePack
//!
//! This module provides reference resolution, origin comparison, and the
//! URL-to-archive-path mapping that doubles as the crawl's dedup key.

mod origin;
mod path;
mod resolve;

// Re-export main functions
pub use origin::{is_same_origin, origin_of};
pub use path::{relative_path, DEFAULT_PAGE_PATH};
pub use resolve::{parse_seed_url, resolve};
