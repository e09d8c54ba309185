//! # docmirror Testkit
//!
//! Testing utilities for docmirror.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Documents with the exact blocks they must chunk into
//! - **Generators**: Proptest strategies for documents
//! - **Fixtures**: A scratch directory wired to an in-memory channel and store
//!
//! ## Golden Vectors
//!
//! ```rust
//! use docmirror_testkit::vectors::verify_all_vectors;
//!
//! for (name, reason) in verify_all_vectors() {
//!     println!("{}: {}", name, reason);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docmirror_testkit::generators::document;
//!
//! proptest! {
//!     #[test]
//!     fn chunking_never_fails(doc in document()) {
//!         prop_assert!(docmirror_core::chunk(&doc).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use docmirror_testkit::fixtures::{MirrorFixture, SAMPLE_DOCUMENT};
//!
//! let fixture = MirrorFixture::with_document(SAMPLE_DOCUMENT);
//! assert!(fixture.document_path().exists());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{paragraphs, MirrorFixture, SAMPLE_DOCUMENT};
