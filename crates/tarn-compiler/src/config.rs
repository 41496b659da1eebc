// SPDX-License-Identifier: (MIT OR Apache-2.0)

use serde::Deserialize;
use tarn_lower::AnalysisOptions;

/// Switches for the middle-end pipeline. Missing keys keep their defaults
/// when read from a manifest section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MiddleEndConfig {
    /// Report functions that can reach their end without returning.
    pub check_returns: bool,
    /// Drop statements no path can reach.
    pub prune_unreachable: bool,
    /// Run the ABI rewrite after every function is lowered.
    pub fix_abi: bool,
}

impl Default for MiddleEndConfig {
    fn default() -> Self {
        Self {
            check_returns: true,
            prune_unreachable: true,
            fix_abi: true,
        }
    }
}

impl MiddleEndConfig {
    pub(crate) fn analysis(&self) -> AnalysisOptions {
        AnalysisOptions {
            check_returns: self.check_returns,
            prune_unreachable: self.prune_unreachable,
        }
    }
}
