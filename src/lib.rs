//! # aipack
//!
//! Release tooling for an OpenTTD AI script package.
//! This library provides the routines behind the `aipack` binary: swapping the
//! AI's release and development names, packaging the current version into a
//! tar archive, and regenerating the library version declarations.
//!
//! ## Features
//!
//! - Byte-exact name swapping in `info.nut`, line endings preserved
//! - Packaging through configurable external commands, then a counter bump
//! - Latest library version detection from downloaded library file names
//! - Atomic rewrites of every file the tools modify
//!
//! ## Example
//!
//! ```no_run
//! use aipack::{config::NameConfig, core::NameSwapper};
//!
//! let swapper = NameSwapper::new(&NameConfig::default())?;
//! let report = swapper.swap_file("info.nut")?;
//! println!("{} name(s) replaced", report.replacements.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
