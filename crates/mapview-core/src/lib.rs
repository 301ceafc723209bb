//! mapview-core: source map decoding and position indexes.
//!
//! - `codec`: base64 VLQ `mappings` string into flat stride-6 records
//! - `index`: generated-order records and per-source original-order records
//! - `document`: the JSON document, loaded sources and point lookups

pub mod codec;
pub mod document;
pub mod error;
pub mod index;
pub mod record;

pub use codec::{decode, DecodedMappings};
pub use document::{MappingDocument, Source, SourceMap, SUPPORTED_VERSION};
pub use error::{LoadError, MappingField, Result};
pub use index::{ForwardIndex, InverseIndex};
pub use record::{KeyOrder, MappingRecord, Records, ABSENT, STRIDE};
