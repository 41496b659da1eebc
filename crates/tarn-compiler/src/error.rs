// SPDX-License-Identifier: (MIT OR Apache-2.0)

use tarn_abi::AbiError;
use tarn_lower::LowerError;

/// An internal error that stopped compilation of a package. User mistakes
/// are reported as diagnostics instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("in function `{function}`: {source}")]
    Lower {
        function: String,
        #[source]
        source: LowerError,
    },
    #[error(transparent)]
    Abi(#[from] AbiError),
}
