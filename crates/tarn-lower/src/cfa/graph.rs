// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Basic blocks and the edges between them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tarn_ir::{Label, Stmt};

use crate::LowerError;

/// A straight-line run of lowered statements.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    /// Label opening the block. The `Label` statement is also kept as the
    /// block's first statement.
    pub label: Option<Label>,
    pub statements: Vec<Stmt>,
    /// Indices of predecessor blocks.
    pub entries: BTreeSet<usize>,
    /// Indices of successor blocks.
    pub exits: BTreeSet<usize>,
    pub unreachable: bool,
}

impl BasicBlock {
    fn ends_with_return(&self) -> bool {
        matches!(self.statements.last(), Some(Stmt::Return(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub conditional: bool,
}

/// Control-flow graph of one lowered function body.
///
/// Block indices are stable: unreachable blocks are flagged, never removed.
#[derive(Debug, Clone, Default)]
pub struct ControlFlowGraph {
    pub blocks: Vec<BasicBlock>,
    pub connections: Vec<Connection>,
}

impl ControlFlowGraph {
    /// Partition `statements` into blocks and connect them.
    pub fn build(statements: &[Stmt]) -> Result<Self, LowerError> {
        let mut graph = ControlFlowGraph {
            blocks: partition(statements),
            connections: Vec::new(),
        };

        let mut targets = BTreeMap::new();
        for (index, block) in graph.blocks.iter().enumerate() {
            if let Some(label) = &block.label {
                if targets.insert(label.clone(), index).is_some() {
                    return Err(LowerError::DuplicateLabel(label.clone()));
                }
            }
        }
        let resolve = |label: &Label| {
            targets
                .get(label)
                .copied()
                .ok_or_else(|| LowerError::UnresolvedLabel(label.clone()))
        };

        let count = graph.blocks.len();
        for index in 0..count {
            let next = (index + 1 < count).then_some(index + 1);
            match graph.blocks[index].statements.last() {
                Some(Stmt::Goto(label)) => {
                    let to = resolve(label)?;
                    graph.connect(index, to, false);
                }
                Some(Stmt::GotoIf { label, .. }) => {
                    let to = resolve(label)?;
                    graph.connect(index, to, true);
                    if let Some(next) = next {
                        graph.connect(index, next, false);
                    }
                }
                Some(Stmt::Return(_)) => {}
                _ => {
                    if let Some(next) = next {
                        graph.connect(index, next, false);
                    }
                }
            }
        }
        Ok(graph)
    }

    fn connect(&mut self, from: usize, to: usize, conditional: bool) {
        self.connections.push(Connection {
            from,
            to,
            conditional,
        });
        self.blocks[from].exits.insert(to);
        self.blocks[to].entries.insert(from);
    }

    /// Index of the block opened by `label`.
    pub fn block_of(&self, label: &Label) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.label.as_ref() == Some(label))
    }

    /// Flag every block other than the entry that nothing jumps or falls
    /// into, repeating until no further block is orphaned. Returns how many
    /// blocks were flagged.
    pub fn remove_unreachable(&mut self) -> usize {
        let mut worklist: VecDeque<usize> = (1..self.blocks.len())
            .filter(|&i| self.blocks[i].entries.is_empty() && !self.blocks[i].unreachable)
            .collect();

        let mut removed = 0;
        while let Some(index) = worklist.pop_front() {
            if self.blocks[index].unreachable {
                continue;
            }
            self.blocks[index].unreachable = true;
            removed += 1;

            let exits = std::mem::take(&mut self.blocks[index].exits);
            for succ in exits {
                let block = &mut self.blocks[succ];
                block.entries.remove(&index);
                if succ != 0 && block.entries.is_empty() && !block.unreachable {
                    worklist.push_back(succ);
                }
            }
        }

        let blocks = &self.blocks;
        self.connections.retain(|c| !blocks[c.from].unreachable);
        removed
    }

    /// True when every path through the reachable blocks ends in a `return`.
    pub fn returns_on_all_paths(&self) -> bool {
        let Some(last) = self.blocks.len().checked_sub(1) else {
            return false;
        };
        self.blocks.iter().enumerate().all(|(index, block)| {
            // Function entry enters block 0 even when no jump targets it.
            let entered = index == 0 || !block.entries.is_empty();
            if block.unreachable || !entered {
                return true;
            }
            let falls_off_end = index == last
                && matches!(block.statements.last(), Some(Stmt::GotoIf { .. }));
            if falls_off_end {
                return false;
            }
            !block.exits.is_empty() || block.ends_with_return()
        })
    }

    /// Statements of all blocks not flagged unreachable, in original order.
    pub fn reachable_statements(&self) -> Vec<Stmt> {
        self.blocks
            .iter()
            .filter(|b| !b.unreachable)
            .flat_map(|b| b.statements.iter().cloned())
            .collect()
    }
}

/// Split a lowered statement list into basic blocks.
fn partition(statements: &[Stmt]) -> Vec<BasicBlock> {
    let mut blocks = Vec::new();
    let mut current = BasicBlock::default();
    for stmt in statements {
        match stmt {
            Stmt::Label(label) => {
                if !current.statements.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                current.label = Some(label.clone());
                current.statements.push(stmt.clone());
            }
            Stmt::Goto(_) | Stmt::GotoIf { .. } | Stmt::Return(_) => {
                current.statements.push(stmt.clone());
                blocks.push(std::mem::take(&mut current));
            }
            _ => current.statements.push(stmt.clone()),
        }
    }
    if !current.statements.is_empty() {
        blocks.push(current);
    }
    blocks
}
