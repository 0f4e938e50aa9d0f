//! lc Core Types and Definitions
//!
//! This crate provides the backend-facing intermediate form produced by the
//! lc compiler. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **IR**: Target module, functions, blocks and instructions ([`ir`] module)
//! - **Builder**: Insertion-point based instruction builder ([`builder::Builder`])
//! - **Eval**: A reference interpreter for target modules ([`eval`] module)

pub mod builder;
pub mod eval;
pub mod identifier;
pub mod ir;
