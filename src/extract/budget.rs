//! Budgeted extraction: packing spans into a closed token interval.
//!
//! Depth-first packing under the closest enclosing boundary:
//!
//! 1. A node whose subtree fits `max_tokens` (and hides no boundary label)
//!    joins the current sibling run; the run flushes the moment the next
//!    member would overflow.
//! 2. A node too large to emit whole is recursed into, packing its children
//!    the same way.
//! 3. A single sentence above `max_tokens` is emitted alone and flagged
//!    `oversized`; sentences are never split internally.
//! 4. A flushed run under `min_tokens` merges with the neighboring unit of
//!    the same boundary scope when the merged total stays within budget;
//!    otherwise it is emitted flagged `undersized`.
//!
//! The iterator carries a one-unit lookahead buffer so rule 4 never reorders
//! output: units leave in document pre-order and their leaf sets partition
//! the document's leaves exactly.

use std::collections::VecDeque;

use tracing::warn;

use crate::model::{DocumentTree, NodeId};

use super::{unit_of_subtree, ExtractedUnit, ExtractionPolicy, UnitFlags};

/// One level of the packing traversal.
struct Frame {
    children: Vec<NodeId>,
    next: usize,
    /// Accumulated run of sibling subtrees that fit the budget together.
    run: Vec<NodeId>,
    run_tokens: u64,
    /// Nearest enclosing boundary node; units never merge across scopes.
    scope: NodeId,
}

impl Frame {
    fn new(tree: &DocumentTree, id: NodeId, scope: NodeId) -> Self {
        Self {
            children: tree.child_ids(id).to_vec(),
            next: 0,
            run: Vec::new(),
            run_tokens: 0,
            scope,
        }
    }
}

pub(super) struct BudgetIter<'a> {
    tree: &'a DocumentTree,
    policy: &'a ExtractionPolicy,
    min: u64,
    max: u64,
    frames: Vec<Frame>,
    /// Nodes with a boundary-labeled proper descendant; such nodes are
    /// never emitted whole even when they fit the budget.
    boundary_below: Vec<bool>,
    /// Lookahead buffer: (unit, scope) held back one step for rule 4.
    held: Option<(ExtractedUnit, NodeId)>,
    ready: VecDeque<ExtractedUnit>,
    finished: bool,
}

impl<'a> BudgetIter<'a> {
    pub(super) fn new(
        tree: &'a DocumentTree,
        policy: &'a ExtractionPolicy,
        min: u64,
        max: u64,
    ) -> Self {
        let mut iter = Self {
            tree,
            policy,
            min,
            max,
            frames: Vec::new(),
            boundary_below: boundary_below(tree, policy),
            held: None,
            ready: VecDeque::new(),
            finished: false,
        };

        let root = tree.root();
        if tree.leaves_in_order(root).next().is_none() {
            // Empty document: empty sequence, not an error.
            iter.finished = true;
        } else if tree.token_count(root) <= max && !iter.has_boundary_below(root) {
            let tokens = tree.token_count(root);
            let flags = UnitFlags {
                undersized: tokens < min,
                ..UnitFlags::default()
            };
            iter.ready.push_back(unit_of_subtree(tree, root, flags));
            iter.finished = true;
        } else {
            iter.frames.push(Frame::new(tree, root, root));
        }
        iter
    }

    fn has_boundary_below(&self, id: NodeId) -> bool {
        self.boundary_below.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Advance the traversal by one child (or one frame retirement),
    /// possibly moving a unit into the ready queue.
    fn step(&mut self) {
        let (child_id, scope, exhausted) = match self.frames.last_mut() {
            None => {
                self.finished = true;
                if let Some((unit, _)) = self.held.take() {
                    self.ready.push_back(unit);
                }
                return;
            }
            Some(frame) if frame.next >= frame.children.len() => {
                (NodeId::ROOT, frame.scope, true)
            }
            Some(frame) => {
                let id = frame.children[frame.next];
                frame.next += 1;
                (id, frame.scope, false)
            }
        };

        if exhausted {
            if let Some(frame) = self.frames.pop() {
                self.flush_run(frame.run, frame.run_tokens, frame.scope);
            }
            return;
        }

        let Some(child) = self.tree.node(child_id) else {
            return;
        };
        let tokens = child.token_count;
        let is_leaf = child.is_leaf();
        let is_boundary = self.policy.is_boundary(&child.label);
        let splittable = tokens > self.max || self.has_boundary_below(child_id);

        if is_boundary {
            // Runs never cross a boundary edge.
            self.flush_top_run();
            if splittable && !is_leaf {
                self.frames.push(Frame::new(self.tree, child_id, child_id));
            } else if tokens > self.max {
                // A boundary-labeled sentence over budget still goes out
                // whole (rule 3).
                warn!(
                    node = child_id.0,
                    tokens,
                    max = self.max,
                    "sentence exceeds token budget, emitted alone"
                );
                let unit = ExtractedUnit {
                    leaf_ids: vec![child_id],
                    token_count: tokens,
                    flags: UnitFlags {
                        oversized: true,
                        ..UnitFlags::default()
                    },
                };
                self.candidate(unit, child_id);
            } else {
                let flags = UnitFlags {
                    undersized: tokens < self.min,
                    ..UnitFlags::default()
                };
                // Its own scope: nothing outside the boundary may merge in.
                self.candidate(unit_of_subtree(self.tree, child_id, flags), child_id);
            }
            return;
        }

        if splittable {
            self.flush_top_run();
            if is_leaf {
                // Rule 3: sentences are never split below the sentence
                // boundary, so an over-budget sentence goes out alone.
                warn!(
                    node = child_id.0,
                    tokens,
                    max = self.max,
                    "sentence exceeds token budget, emitted alone"
                );
                let unit = ExtractedUnit {
                    leaf_ids: vec![child_id],
                    token_count: tokens,
                    flags: UnitFlags {
                        oversized: true,
                        ..UnitFlags::default()
                    },
                };
                self.candidate(unit, scope);
            } else {
                self.frames.push(Frame::new(self.tree, child_id, scope));
            }
            return;
        }

        // The child fits whole: accumulate it into the sibling run,
        // flushing first if it would overflow.
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if frame.run_tokens + tokens > self.max {
            let run = std::mem::take(&mut frame.run);
            let run_tokens = std::mem::replace(&mut frame.run_tokens, 0);
            frame.run.push(child_id);
            frame.run_tokens = tokens;
            self.flush_run(run, run_tokens, scope);
        } else {
            frame.run.push(child_id);
            frame.run_tokens += tokens;
        }
    }

    fn flush_top_run(&mut self) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if frame.run.is_empty() {
            return;
        }
        let run = std::mem::take(&mut frame.run);
        let run_tokens = std::mem::replace(&mut frame.run_tokens, 0);
        let scope = frame.scope;
        self.flush_run(run, run_tokens, scope);
    }

    fn flush_run(&mut self, run: Vec<NodeId>, tokens: u64, scope: NodeId) {
        if run.is_empty() {
            return;
        }
        let mut leaf_ids = Vec::new();
        for id in run {
            leaf_ids.extend(self.tree.leaves_in_order(id));
        }
        let flags = UnitFlags {
            undersized: tokens < self.min,
            ..UnitFlags::default()
        };
        self.candidate(
            ExtractedUnit {
                leaf_ids,
                token_count: tokens,
                flags,
            },
            scope,
        );
    }

    /// Route a finished unit through the lookahead buffer.
    ///
    /// A sub-minimum unit merges with its buffered neighbor when both share
    /// a boundary scope and the total stays within budget (rule 4); merging
    /// never chains further. Otherwise the buffered unit is released in
    /// order and the new one takes its place.
    fn candidate(&mut self, unit: ExtractedUnit, scope: NodeId) {
        if let Some((held, held_scope)) = &mut self.held {
            let sub_minimum = unit.token_count < self.min || held.token_count < self.min;
            if *held_scope == scope
                && sub_minimum
                && held.token_count + unit.token_count <= self.max
            {
                held.leaf_ids.extend(unit.leaf_ids);
                held.token_count += unit.token_count;
                held.flags.undersized = held.token_count < self.min;
                return;
            }
        }
        if let Some((previous, _)) = self.held.replace((unit, scope)) {
            self.ready.push_back(previous);
        }
    }
}

impl Iterator for BudgetIter<'_> {
    type Item = ExtractedUnit;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(unit) = self.ready.pop_front() {
                return Some(unit);
            }
            if self.finished {
                return None;
            }
            self.step();
        }
    }
}

/// Mark every node with a boundary-labeled proper descendant.
///
/// Walked once per extraction in reverse pre-order, so each node sees its
/// children's answers before its own.
fn boundary_below(tree: &DocumentTree, policy: &ExtractionPolicy) -> Vec<bool> {
    if policy.boundary_labels.is_empty() {
        return Vec::new();
    }
    let mut below = vec![false; tree.node_count()];
    let order: Vec<NodeId> = tree.iter_dfs(tree.root()).collect();
    for &id in order.iter().rev() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let any = node.children.iter().any(|&c| {
            below.get(c.0 as usize).copied().unwrap_or(false)
                || tree.node(c).is_some_and(|n| policy.is_boundary(&n.label))
        });
        below[id.0 as usize] = any;
    }
    below
}
