//! Repository implementations.
//!
//! # Repositories
//!
//! - [`MemoryCodeRepository`] - Issued codes kept in process memory

pub mod memory_code_repository;

pub use memory_code_repository::MemoryCodeRepository;
