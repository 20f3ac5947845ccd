//! Text-level scanning of C++ headers
//!
//! Everything here works on raw lines and regular expressions over
//! comment-free code. Nothing builds a syntax tree. Lookups that fail on
//! malformed input return `None` or an empty list instead of an error.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod boundary;
pub mod entity;
pub mod fields;
pub mod lexer;
pub mod markers;
pub mod methods;
pub mod naming;
pub mod repository;
pub mod types;
pub mod validation;

pub use boundary::{find_all_type_spans, find_type_span, find_type_span_from, member_lines};
pub use entity::{detect_entities, EntityDetection};
pub use fields::{extract_fields, key_fields};
pub use lexer::{code_lines, is_comment_line, strip_comments, strip_comments_preserving_lines};
pub use markers::{associate, find_markers, find_unprocessed_markers, Lookahead, MarkerSyntax};
pub use methods::{extract_methods, MatchStrategy, MethodExtractor, MethodMatch, MethodMatcher};
pub use naming::{
    extract_find_by_variable, extract_parameter_name, method_name_to_action, pascal_to_camel,
    Action,
};
pub use repository::{detect_repository, RepositoryDetection};
pub use types::{classify, is_optional, is_string_type, optional_inner, FieldKind};
pub use validation::{is_string_only_validator, parse_validation_macros};
