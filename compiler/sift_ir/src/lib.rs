//! Sift IR - identifiers and source bookkeeping for compiled expression programs.
//!
//! This crate contains the small, dependency-free data structures shared by
//! every layer of the evaluator:
//! - `ExprId` for addressing instructions and their evaluation slots
//! - `Span` for byte ranges in the original expression text
//! - `Location` and `ProgramMetadata` for turning ids back into line/column
//!   positions when building diagnostics
//!
//! # Design Philosophy
//!
//! - **Flat ids, not pointers**: instructions refer to each other by `ExprId`,
//!   and the evaluator stores results in a dense table indexed by the same id.
//! - **Metadata is optional**: a program without source positions evaluates
//!   exactly the same; only error messages get less precise.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-copied types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod expr_id;
mod metadata;
mod span;

pub use expr_id::ExprId;
pub use metadata::{Location, ProgramMetadata};
pub use span::Span;
