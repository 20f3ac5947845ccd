//! C++ text generation and in-place header edits
//!
//! Generators return plain lines with no base indentation. The editing
//! modules (`injector`, `includes`, `marker`) apply them to a
//! [`SourceBuffer`](headergen_core::SourceBuffer) without touching any other
//! byte of the file.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod find;
pub mod includes;
pub mod injector;
pub mod marker;
pub mod primary_key;
pub mod repository;
pub mod serialization;
pub mod writer;

pub use find::{generate_custom_finders, generate_finder, plan_finder, FinderPlan, FinderReturn};
pub use includes::{ensure_back_include, ensure_include, has_include, IncludeOutcome};
pub use injector::{inject_members, InjectOutcome};
pub use marker::{mark_processed, MarkOutcome};
pub use primary_key::generate_primary_key_methods;
pub use repository::generate_impl_header;
pub use serialization::{needs_serializer_helpers, optional_fields, SerializationGenerator};
pub use writer::CodeWriter;

/// Standard header pulled in when a class has optional fields
pub const OPTIONAL_HEADER: &str = "<optional>";
