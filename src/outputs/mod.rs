//! Output writers.
//!
//! - [`json`]: writes each run's records to `<content_type>_<YYYYMMDD-HHMMSS>.json`
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── hot_news_20250506-081500.json
//! ├── honors_20250506-082210.json
//! ├── activity_20250506-083002.json
//! ├── about_20250506-083540.json
//! └── about_20250506-083540_failures.json   # only with --keep-going
//! ```

pub mod json;
