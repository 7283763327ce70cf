#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod embedded;
pub mod errors;
pub mod registry;
pub mod signature;

pub use embedded::{BeamSolidPair, CoreNumber, EmbeddedInfo, EmbeddedRecord, Relation, Tag};
pub use errors::{ComparisonError, RegistryError};
pub use registry::{ConflictPolicy, EmbeddingRegistry, Insertion, RegistryConfig};
pub use signature::Signature;
