//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestLibrary, PLAYLIST_ID};
//!
//! #[test]
//! fn test_import() {
//!     let library = TestLibrary::with_export(&common::road_trip_export());
//!     let report = library.run().unwrap();
//!     assert_eq!(report.playlist_id, PLAYLIST_ID);
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{road_trip_export, TestLibrary};
