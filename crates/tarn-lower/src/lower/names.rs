// SPDX-License-Identifier: (MIT OR Apache-2.0)

use tarn_ir::{Label, Symbol, SymbolKind, Type};

/// Fresh label and variable names for one function body.
///
/// Names carry a `$` sigil, which source identifiers cannot contain, and a
/// counter shared by labels and variables so output is reproducible.
#[derive(Debug, Default)]
pub struct NameGenerator {
    next: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&mut self, hint: &str) -> Label {
        Label(self.fresh(hint))
    }

    pub fn variable(&mut self, hint: &str, ty: Type) -> Symbol {
        Symbol::new(self.fresh(hint), ty, SymbolKind::Synthetic)
    }

    fn fresh(&mut self, hint: &str) -> String {
        let n = self.next;
        self.next += 1;
        format!("${}.{}", hint, n)
    }
}
