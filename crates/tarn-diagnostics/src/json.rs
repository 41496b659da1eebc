//! JSON diagnostic output for tools.
//!
//! Each diagnostic is enriched with a 1-based line/column for its primary
//! label and the source line it points at.

use serde::Serialize;
use tarn_ir::LineIndex;

use crate::{codes::ErrorCodeRegistry, Diagnostic, Severity};

/// Diagnostics of one compilation run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub version: u32,
    pub file: String,
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
    pub source_line: String,
}

/// Build a report for `diagnostics` against `source`.
pub fn report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let lines = LineIndex::new(source);

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    let diagnostics = diagnostics
        .iter()
        .map(|d| {
            let code = d.code.as_ref().map(|c| c.0.clone());
            let category = code
                .as_deref()
                .and_then(|c| registry.get(c))
                .map(|info| info.category.to_string());
            let location = d.primary_span().map(|span| {
                let (line, column) = lines.locate(span.start);
                SourceLocation {
                    line,
                    column,
                    byte_offset: span.start,
                    source_line: lines.line(line).unwrap_or("").to_string(),
                }
            });
            JsonDiagnostic {
                severity: d.severity,
                code,
                category,
                message: d.message.clone(),
                location,
                notes: d.notes.clone(),
                help: d.help.clone(),
            }
        })
        .collect();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics,
        error_count,
        warning_count,
    }
}

/// Serialize a report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
