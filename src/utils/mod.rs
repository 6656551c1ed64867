//! Utility Module
//!
//! # String Interning
//!
//! The interner module provides efficient string storage for frequently
//! used identifiers like instancing batch keys. Interned strings (Symbols)
//! can be compared in O(1) time.
//!
//! ```rust,ignore
//! use trellis::utils::interner;
//!
//! let sym1 = interner::intern("cube");
//! let sym2 = interner::intern("cube");
//! assert_eq!(sym1, sym2); // O(1) comparison
//! ```

pub mod interner;

pub use interner::Symbol;
