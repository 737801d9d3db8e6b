//! Recursive entity inheritance resolution.
//!
//! Entities arrive partially specified: a child carries a parent reference
//! and inherits unset data from it. Resolution walks each parent chain
//! pre-order (ancestors before descendants), merges parent data into the
//! child per field class, replays any overlay directives, and marks the
//! entity resolved exactly once.
//!
//! Two merge strategies coexist and must never be conflated:
//!
//! - **fallback**: the child's own value wins if present, otherwise the
//!   parent's is copied in. One-shot substitution, not a structural merge.
//! - **accumulate**: the parent's items are appended after the child's own,
//!   always, giving child-then-parent ordering.
//!
//! Each resolution run carries its own [`ResolutionContext`], so the base
//! and fluff graphs can never share marker state. The context tracks three
//! states per key; hitting an in-progress key during descent is a reported
//! cycle, not unbounded recursion.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::core::key::EntityKey;
use crate::graph::entity::ParentRef;
use crate::graph::EntityGraph;
use crate::modify::Modification;

/// Per-entity resolution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveState {
    #[default]
    Unvisited,
    /// On the current descent path; seeing this again means a cycle
    InProgress,
    Resolved,
}

/// Marker state for one resolution run. Never shared between runs.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    states: AHashMap<EntityKey, ResolveState>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &EntityKey) -> ResolveState {
        self.states.get(key).copied().unwrap_or_default()
    }

    fn mark_in_progress(&mut self, key: &EntityKey) {
        self.states.insert(key.clone(), ResolveState::InProgress);
    }

    fn mark_resolved(&mut self, key: &EntityKey) {
        self.states.insert(key.clone(), ResolveState::Resolved);
    }
}

/// Tuning knobs for the merge policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Treat a present-but-empty stat map as unset for fallback purposes.
    /// Off by default: a present container wins over the parent's.
    pub empty_stats_inherit: bool,
}

/// A recoverable condition recorded during resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDiagnostic {
    /// The referenced parent key is absent from the graph; the child kept
    /// its own fields
    MissingParent { child: EntityKey, parent: EntityKey },
    /// The parent chain loops back on itself; broken at `at`
    Cycle { at: EntityKey, parent: EntityKey },
}

/// Outcome of one resolution run over a graph
#[derive(Debug, Default)]
pub struct ResolveReport {
    pub diagnostics: Vec<ResolveDiagnostic>,
}

impl ResolveReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn missing_parents(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, ResolveDiagnostic::MissingParent { .. }))
            .count()
    }

    pub fn cycles(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, ResolveDiagnostic::Cycle { .. }))
            .count()
    }
}

/// The seam between the resolver and the entity schemas. Implementors pick
/// the merge strategy per field; the resolver only orders the walk.
pub trait Inherit {
    fn parent_ref(&self) -> Option<&ParentRef>;
    fn take_parent(&mut self) -> Option<ParentRef>;
    fn take_mods(&mut self) -> Option<BTreeMap<String, Modification>>;
    /// Merge the fully-resolved parent's data into `self`
    fn inherit_from(&mut self, parent: &Self, options: &ResolveOptions);
    /// Replay one overlay block on top of the inherited data
    fn apply_modification(&mut self, modification: &Modification);
}

/// Resolve every entity in the graph in place.
///
/// Parents are always resolved before the children that reference them.
/// Recoverable conditions (missing parents, cycles) are logged and recorded
/// in the returned report; resolution continues for all other entities.
/// The graph's key set is never changed.
pub fn resolve_graph<T: Inherit + Clone>(
    graph: &mut EntityGraph<T>,
    options: &ResolveOptions,
) -> ResolveReport {
    let mut ctx = ResolutionContext::new();
    let mut report = ResolveReport::default();

    let keys: Vec<EntityKey> = graph.keys().cloned().collect();
    for key in keys {
        resolve_entity(&key, graph, &mut ctx, options, &mut report);
    }

    report
}

fn resolve_entity<T: Inherit + Clone>(
    key: &EntityKey,
    graph: &mut EntityGraph<T>,
    ctx: &mut ResolutionContext,
    options: &ResolveOptions,
    report: &mut ResolveReport,
) {
    match ctx.state(key) {
        ResolveState::Resolved | ResolveState::InProgress => return,
        ResolveState::Unvisited => {}
    }

    // Entities with no parent reference are already complete; leave every
    // field untouched.
    let Some(parent_ref) = graph.get(key).and_then(|e| e.parent_ref().cloned()) else {
        ctx.mark_resolved(key);
        return;
    };
    let parent_key = parent_ref.key();

    ctx.mark_in_progress(key);

    if ctx.state(&parent_key) == ResolveState::InProgress {
        tracing::warn!(child = %key, parent = %parent_key, "cyclic parent chain, breaking here");
        report.diagnostics.push(ResolveDiagnostic::Cycle {
            at: key.clone(),
            parent: parent_key,
        });
        finish_unmerged(key, graph, ctx);
        return;
    }

    if !graph.contains(&parent_key) {
        tracing::warn!(child = %key, parent = %parent_key, "parent not found in graph");
        report.diagnostics.push(ResolveDiagnostic::MissingParent {
            child: key.clone(),
            parent: parent_key,
        });
        finish_unmerged(key, graph, ctx);
        return;
    }

    // Parent must be fully resolved before it can fill the child
    resolve_entity(&parent_key, graph, ctx, options, report);

    if let Some(parent) = graph.get(&parent_key).cloned() {
        if let Some(child) = graph.get_mut(key) {
            let mods = child.take_mods();
            child.inherit_from(&parent, options);
            if let Some(mods) = mods {
                for modification in mods.values() {
                    child.apply_modification(modification);
                }
            }
            child.take_parent();
        }
    }

    ctx.mark_resolved(key);
}

/// Close out an entity that keeps exactly its own field values: the parent
/// reference and any pending overlays are discarded so no partially-resolved
/// state persists.
fn finish_unmerged<T: Inherit>(
    key: &EntityKey,
    graph: &mut EntityGraph<T>,
    ctx: &mut ResolutionContext,
) {
    if let Some(entity) = graph.get_mut(key) {
        entity.take_parent();
        entity.take_mods();
    }
    ctx.mark_resolved(key);
}

// ---------------------------------------------------------------------------
// Merge strategies
// ---------------------------------------------------------------------------

/// Fallback merge: child's own value wins if present, else the parent's is
/// copied in
pub fn fallback<T: Clone>(child: &mut Option<T>, parent: &Option<T>) {
    if child.is_none() {
        *child = parent.clone();
    }
}

/// Accumulate merge: parent items appended after the child's own, always
pub fn accumulate<T: Clone>(child: &mut Vec<T>, parent: &[T]) {
    child.extend(parent.iter().cloned());
}

/// Fallback for container fields, with configurable emptiness semantics:
/// when `empty_is_unset` is set, a present-but-empty map also falls back.
pub fn fallback_map<K: Ord + Clone, V: Clone>(
    child: &mut Option<BTreeMap<K, V>>,
    parent: &Option<BTreeMap<K, V>>,
    empty_is_unset: bool,
) {
    let unset = match child {
        None => true,
        Some(map) => empty_is_unset && map.is_empty(),
    };
    if unset && parent.is_some() {
        *child = parent.clone();
    }
}
