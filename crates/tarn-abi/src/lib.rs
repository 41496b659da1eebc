// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Argument classification and the ABI rewrite pass.
//!
//! Every parameter and return type is split into two eightbyte classes.
//! Struct parameters that fit a single integer or float register are then
//! passed as a scalar of the same width, with bit-casts at both ends.

mod classify;
mod pass;

pub use classify::{classify, classify_type, merge};
pub use pass::fix_abi;

use tarn_ir::Type;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AbiError {
    #[error("internal error: `{0}` has a width no register class covers")]
    UnsupportedWidth(Type),
}
