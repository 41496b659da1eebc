//! Error codes emitted by the middle-end.
//!
//! The front-end owns E00xx through E06xx; codes here start at E0700.

use std::collections::HashMap;

/// A function can reach its end without returning a value.
pub const MISSING_RETURN: &str = "E0700";

/// Registry of the codes this crate knows how to describe.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy)]
pub enum ErrorCategory {
    ControlFlow,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::ControlFlow => write!(f, "ControlFlow"),
        }
    }
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        let mut codes = HashMap::new();
        codes.insert(
            MISSING_RETURN,
            ErrorCodeInfo {
                code: MISSING_RETURN,
                title: "not all control-flow paths return a value",
                category: ErrorCategory::ControlFlow,
            },
        );
        Self { codes }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }
}
