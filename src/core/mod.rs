//! Core release routines
//!
//! Contains name swapping for `info.nut`, versioned packaging driven by the
//! `version.nut` counter, and library version scanning.

pub mod counter;
pub mod libraries;
pub mod names;
pub mod packager;

pub use counter::VersionCounter;
pub use libraries::{LibraryScanner, LibraryVersionRecord};
pub use names::{NameSwapper, SwapReport};
pub use packager::{PackageReport, Packager};
