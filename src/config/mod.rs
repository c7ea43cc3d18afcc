//! Configuration module for Trust-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and publishes the catalogue of known category slugs.
//!
//! # Example
//!
//! ```no_run
//! use trust_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Scraping category: {}", config.scraper.category);
//! ```

mod category;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, ScraperConfig, SelectorConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

pub use category::{is_known_category, validate_category, KNOWN_CATEGORIES};
pub use validation::{compile_selector, validate};
