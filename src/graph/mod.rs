//! Project-wide symbol table and dependency graph.
//!
//! Symbols form a directed graph that may cycle; edges are sets of
//! qualified ids, never direct references, so `remove_file` needs no
//! reference surgery. Every operation returning an iterable is either in
//! insertion order (files and per-file symbol maps) or sorted id order
//! (graph queries).

use crate::error::{AnalysisError, AnalysisResult};
use crate::symbol::{FileSymbols, Symbol};
use crate::types::{CancellationToken, QualifiedId};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Default)]
pub struct ProjectSymbolTable {
    /// Per-file records in insertion order.
    files: IndexMap<Box<str>, FileSymbols>,
    /// Flat id index: id -> owning file key. Sorted iteration drives the
    /// graph queries.
    global: BTreeMap<QualifiedId, Box<str>>,
    forward_edges: BTreeMap<QualifiedId, BTreeSet<QualifiedId>>,
    reverse_edges: BTreeMap<QualifiedId, BTreeSet<QualifiedId>>,
}

impl ProjectSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file's symbols and wire their edges.
    ///
    /// Fails with `DuplicateSymbol` before touching any state if an id
    /// already exists; callers remove a file before reinserting it.
    pub fn insert_file(&mut self, file: FileSymbols) -> AnalysisResult<()> {
        for symbol in file.symbols() {
            if self.global.contains_key(&symbol.id) {
                return Err(AnalysisError::DuplicateSymbol {
                    id: symbol.id.clone(),
                });
            }
        }

        for symbol in file.symbols() {
            self.global
                .insert(symbol.id.clone(), file.file_key.clone());
            for dep in &symbol.dependencies {
                self.forward_edges
                    .entry(symbol.id.clone())
                    .or_default()
                    .insert(dep.clone());
                self.reverse_edges
                    .entry(dep.clone())
                    .or_default()
                    .insert(symbol.id.clone());
            }
        }
        self.files.insert(file.file_key.clone(), file);
        Ok(())
    }

    /// Delete every symbol a file owns and all edges incident to them.
    /// Imports for the file are dropped with its record.
    pub fn remove_file(&mut self, file_key: &str) {
        let Some(file) = self.files.shift_remove(file_key) else {
            return;
        };
        for symbol in file.symbols() {
            self.global.remove(&symbol.id);
            if let Some(targets) = self.forward_edges.remove(&symbol.id) {
                for target in targets {
                    if let Some(sources) = self.reverse_edges.get_mut(&target) {
                        sources.remove(&symbol.id);
                        if sources.is_empty() {
                            self.reverse_edges.remove(&target);
                        }
                    }
                }
            }
            if let Some(sources) = self.reverse_edges.remove(&symbol.id) {
                for source in sources {
                    if let Some(targets) = self.forward_edges.get_mut(&source) {
                        targets.remove(&symbol.id);
                        if targets.is_empty() {
                            self.forward_edges.remove(&source);
                        }
                    }
                }
            }
        }
    }

    pub fn get(&self, id: &QualifiedId) -> Option<&Symbol> {
        let file_key = self.global.get(id)?;
        self.files.get(file_key)?.symbol(id.name())
    }

    pub fn file(&self, file_key: &str) -> Option<&FileSymbols> {
        self.files.get(file_key)
    }

    /// Files in insertion order.
    pub fn all_files(&self) -> impl Iterator<Item = &FileSymbols> {
        self.files.values()
    }

    /// Symbols in sorted id order.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.global
            .iter()
            .filter_map(|(id, file_key)| self.files.get(file_key)?.symbol(id.name()))
    }

    /// Ids in sorted order.
    pub fn all_ids(&self) -> impl Iterator<Item = &QualifiedId> {
        self.global.keys()
    }

    pub fn symbol_count(&self) -> usize {
        self.global.len()
    }

    pub fn contains(&self, id: &QualifiedId) -> bool {
        self.global.contains_key(id)
    }

    pub fn dependencies(&self, id: &QualifiedId) -> BTreeSet<QualifiedId> {
        self.forward_edges.get(id).cloned().unwrap_or_default()
    }

    pub fn dependents(&self, id: &QualifiedId) -> BTreeSet<QualifiedId> {
        self.reverse_edges.get(id).cloned().unwrap_or_default()
    }

    pub fn edge_count(&self) -> usize {
        self.forward_edges.values().map(|s| s.len()).sum()
    }

    /// Forward transitive closure: FIFO breadth-first walk from `roots`.
    /// Roots with no matching symbol are retained (they cannot expand).
    pub fn forward_closure(&self, roots: &[QualifiedId]) -> BTreeSet<QualifiedId> {
        self.closure(roots, &self.forward_edges)
    }

    /// Reverse transitive closure over the transposed edges.
    pub fn reverse_closure(&self, targets: &[QualifiedId]) -> BTreeSet<QualifiedId> {
        self.closure(targets, &self.reverse_edges)
    }

    fn closure(
        &self,
        roots: &[QualifiedId],
        edges: &BTreeMap<QualifiedId, BTreeSet<QualifiedId>>,
    ) -> BTreeSet<QualifiedId> {
        let mut seen: BTreeSet<QualifiedId> = BTreeSet::new();
        let mut queue: VecDeque<&QualifiedId> = VecDeque::new();
        for root in roots {
            if seen.insert(root.clone()) {
                queue.push_back(root);
            }
        }
        while let Some(current) = queue.pop_front() {
            if let Some(next) = edges.get(current) {
                for neighbor in next {
                    if seen.insert(neighbor.clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        seen
    }

    /// Enumerate cycles with a grey/black depth-first search started from
    /// symbols in sorted id order, so output is stable across runs.
    /// Rotations of the same cycle may appear; callers may canonicalize.
    pub fn find_cycles(&self) -> Vec<Vec<QualifiedId>> {
        // A fresh token never trips, so the walk cannot be cancelled.
        self.find_cycles_cancellable(&CancellationToken::new())
            .unwrap_or_default()
    }

    /// Cycle enumeration with a cancellation check between DFS roots.
    pub fn find_cycles_cancellable(
        &self,
        token: &CancellationToken,
    ) -> AnalysisResult<Vec<Vec<QualifiedId>>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            Grey,
            Black,
        }

        let mut colors: BTreeMap<&QualifiedId, Color> = BTreeMap::new();
        let mut cycles: Vec<Vec<QualifiedId>> = Vec::new();

        for root in self.global.keys() {
            if token.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            if colors.contains_key(root) {
                continue;
            }

            // Iterative DFS: each frame holds a node and its outgoing ids.
            let mut path: Vec<&QualifiedId> = Vec::new();
            let mut stack: Vec<(&QualifiedId, Vec<&QualifiedId>, usize)> = Vec::new();
            colors.insert(root, Color::Grey);
            path.push(root);
            stack.push((root, self.sorted_targets(root), 0));

            loop {
                let advanced = match stack.last_mut() {
                    None => break,
                    Some((_, targets, index)) => {
                        if *index < targets.len() {
                            let next = targets[*index];
                            *index += 1;
                            Some(next)
                        } else {
                            None
                        }
                    }
                };
                match advanced {
                    Some(next) => match colors.get(next) {
                        None => {
                            colors.insert(next, Color::Grey);
                            path.push(next);
                            stack.push((next, self.sorted_targets(next), 0));
                        }
                        Some(Color::Grey) => {
                            // Back edge: the slice of the current path from
                            // the first occurrence of `next` is a cycle.
                            if let Some(pos) = path.iter().position(|id| *id == next) {
                                cycles.push(path[pos..].iter().map(|id| (*id).clone()).collect());
                            }
                        }
                        Some(Color::Black) => {}
                    },
                    None => {
                        if let Some((done, _, _)) = stack.pop() {
                            colors.insert(done, Color::Black);
                        }
                        path.pop();
                    }
                }
            }
        }
        Ok(cycles)
    }

    fn sorted_targets(&self, id: &QualifiedId) -> Vec<&QualifiedId> {
        self.forward_edges
            .get(id)
            .map(|targets| targets.iter().collect())
            .unwrap_or_default()
    }

    /// Everything not in `live`, in sorted id order.
    pub fn find_unused(&self, live: &BTreeSet<QualifiedId>) -> BTreeSet<QualifiedId> {
        self.global
            .keys()
            .filter(|id| !live.contains(*id))
            .cloned()
            .collect()
    }

    /// Copy `reverse_edges` onto each symbol's `dependents` set: a
    /// convenience view populated once after all files are inserted.
    pub fn populate_dependents(&mut self) {
        for file in self.files.values_mut() {
            for symbol in file.symbols_mut() {
                symbol.dependents.clear();
            }
        }
        let entries: Vec<(QualifiedId, BTreeSet<QualifiedId>)> = self
            .reverse_edges
            .iter()
            .map(|(id, sources)| (id.clone(), sources.clone()))
            .collect();
        for (id, sources) in entries {
            let Some(file_key) = self.global.get(&id).cloned() else {
                continue;
            };
            if let Some(file) = self.files.get_mut(&file_key) {
                if let Some(symbol) = file.symbol_mut(id.name()) {
                    symbol.dependents = sources;
                }
            }
        }
    }
}
