//! Slingshot Levels -- level documents, placement conversion, and level sources.
//!
//! Levels are authored in pixel coordinates as a flat list of typed
//! rectangles ([`PlacementRecord`](document::PlacementRecord)). This crate
//! owns that wire format, converts it into simulation-unit placement
//! parameters, and loads documents from the level storage API, a directory
//! of JSON files, or memory.
//!
//! # Quick Start
//!
//! ```
//! use slingshot_levels::prelude::*;
//!
//! let doc: LevelDocument = serde_json::from_str(
//!     r#"{ "blocks": [ { "type": "block", "x": 300, "y": 600, "width": 60, "height": 20 } ] }"#,
//! ).unwrap();
//! let level = Level::new("level1", doc);
//!
//! let converted = level.convert(DEFAULT_SCALE);
//! assert_eq!(converted.boxes.len(), 1);
//! assert!((converted.boxes[0].x - 10.0).abs() < 1e-9);
//! ```

#![deny(unsafe_code)]

pub mod convert;
pub mod document;
#[cfg(feature = "http")]
pub mod http;
pub mod source;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while fetching, parsing, or storing level documents.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// Reading or writing a level file failed.
    #[error("level '{id}' i/o failed: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// The level document was not valid JSON for the expected shape.
    #[error("level '{id}' is not a valid level document: {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// No level with this identifier exists in the source.
    #[error("level '{id}' not found")]
    NotFound { id: String },

    /// The storage API answered with an error or could not be reached.
    #[error("level storage request for '{id}' failed: {details}")]
    Http { id: String, details: String },

    /// Every requested identifier failed to load.
    #[error("no level could be loaded (tried: [{tried}])")]
    NoLevels { tried: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::convert::{
        convert, BoxPlacement, CoinPlacement, ConvertedLevel, PigPlacement, PlacementKind,
        SpikePlacement, DEFAULT_SCALE,
    };
    pub use crate::document::{Level, LevelDocument, PlacementRecord};
    #[cfg(feature = "http")]
    pub use crate::http::{HttpLevelSource, DEFAULT_API_BASE};
    pub use crate::source::{
        load_levels, DirectoryLevelSource, InMemoryLevelSource, LevelSink, LevelSource,
        DEFAULT_PLAYLIST,
    };
    pub use crate::LevelError;
}
