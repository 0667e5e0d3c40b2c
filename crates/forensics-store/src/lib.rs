//! # forensics-store
//!
//! Concrete collaborators for the FaaS forensics pipeline:
//!
//! - [`memory`] - in-memory log store, blob store, metadata and identity
//!   services with failure injection
//! - [`fs`] - a blob store rooted in a local directory
//! - [`fixture`] - JSON documents describing an upstream environment
//! - [`mock_data`] - the built-in two-function demo environment

pub mod fixture;
pub mod fs;
pub mod memory;
pub mod mock_data;

pub use fixture::{Environment, Fixture, FixtureEvent, FunctionFixture};
pub use fs::FsBlobStore;
pub use memory::{InMemoryBlobStore, InMemoryFunctionMetadata, InMemoryIdentity, InMemoryLogStore};

// ── Tests ─────────────────────────────────────────────────────────────────────
