//! # DocSeal Testkit
//!
//! Testing utilities for DocSeal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Canonical text and digests other implementations must reproduce
//! - **Generators**: Proptest strategies for messy document text
//! - **Documents**: Minimal PDF and DOCX builders for extraction tests
//! - **Fixtures**: A pipeline over in-memory components
//!
//! ## Golden Vectors
//!
//! ```rust
//! use docseal_testkit::vectors::all_vectors;
//! use docseal_core::normalize;
//!
//! for vector in all_vectors() {
//!     assert_eq!(normalize(vector.input), vector.canonical);
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use docseal_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let registration = fixture.register_text("nda.txt", "Hello World").await.unwrap();
//!     let result = fixture.verify_text(registration.contract_id, None, "Hello World").await;
//!     assert!(result.is_verified());
//! }
//! ```

pub mod documents;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use documents::{docx_from_paragraphs, pdf_from_lines};
pub use fixtures::TestFixture;
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
