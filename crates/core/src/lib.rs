//! Core types for the headergen annotation processor
//!
//! This crate provides the foundational pieces shared by the scanner, the
//! code generators and the processor:
//!
//! - **Entities**: type spans, markers, fields, methods and repository descriptors
//! - **Source buffers**: byte-preserving, line-addressed file text
//! - **Configuration**: marker names, lookahead windows and generation settings
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod entities;
pub mod error;
pub mod source;

// Re-export main types for convenience
pub use config::{
    CodegenConfig, Config, DiscoveryConfig, MarkersConfig, RepositoryConfig, ScannerConfig,
};
pub use entities::{
    AccessRegion, FieldDecl, MarkerOccurrence, MethodDecl, RepositoryDescriptor, TypeKind,
    TypeSpan, ValidationMacroTable,
};
pub use error::{Error, Result, ResultExt};
pub use source::SourceBuffer;

