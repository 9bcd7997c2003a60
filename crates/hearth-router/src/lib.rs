//! hearth-router: Declaration-order route table
//!
//! Single Source of Truth (SSOT) route table used by hearth-core. Entries
//! form a tree held in an index-based arena; matching is depth-first in
//! declaration order and the first structural match wins. There is no
//! priority scheme beyond the order routes are declared in.
//!
//! ## Path Syntax
//! - `segment` - Static segment, matched literally
//! - `:name` - Named parameter (captures one non-empty segment)
//! - `""` - Empty pattern, matches when the remaining path is empty
//!
//! ## Entry kinds
//! Every leaf entry carries exactly one of:
//! - a view handler id (`u32`, mapped to a loader by the caller),
//! - a redirect target (resolved against the entry's sibling scope),
//! - non-empty children (the entry becomes a prefix-matched group).
//!
//! Guards are referenced by id and attach to any entry; the table only
//! records them, evaluation order (ancestors first) is the caller's job.
//!
//! All configuration errors - duplicate siblings, entries with zero or
//! several kinds, dangling redirect targets, static redirect cycles - are
//! rejected by [`RouteTable::build`], never at match time.
//!
//! ## Example
//! ```
//! use hearth_router::{EntryKind, RouteDef, RouteTable};
//!
//! let table = RouteTable::build(vec![
//!     RouteDef::path("customers").children(vec![
//!         RouteDef::path("").redirect("list"),
//!         RouteDef::path("list").view(0),
//!         RouteDef::path(":id").children(vec![
//!             RouteDef::path("matches").view(1),
//!         ]),
//!     ]),
//! ])
//! .unwrap();
//!
//! let m = table.find("customers/42/matches").unwrap();
//! assert_eq!(table.kind(m.entry), &EntryKind::View(1));
//! assert_eq!(m.params, vec![("id".to_string(), "42".to_string())]);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

use std::collections::HashSet;
use thiserror::Error;

/// Errors detected while building a route table.
///
/// All of these indicate a misconfigured table and are meant to abort
/// application startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// Two siblings share the same pattern and match mode
    #[error("duplicate sibling route {path:?}")]
    DuplicateSibling { path: String },

    /// Entry declares neither a view, a redirect, nor children
    #[error("route {path:?} declares no view, redirect, or children")]
    EmptyEntry { path: String },

    /// Entry declares more than one of view / redirect / children
    #[error("route {path:?} must declare exactly one of view, redirect, or children")]
    AmbiguousEntry { path: String },

    /// An empty pattern cannot open a subtree
    #[error("empty route pattern {path:?} cannot carry children")]
    EmptyPatternChildren { path: String },

    /// Redirect targets must be concrete paths
    #[error("redirect target {target:?} on {path:?} contains a parameter segment")]
    InvalidRedirectTarget { path: String, target: String },

    /// Redirect target matches nothing in the entry's sibling scope
    #[error("redirect target {target:?} on {path:?} does not match any route")]
    DanglingRedirect { path: String, target: String },

    /// Following redirect entries revisits an entry
    #[error("redirect cycle starting at {path:?}")]
    RedirectCycle { path: String },
}

/// How an entry consumes the requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The remaining path must be empty after this entry's own segments
    Full,
    /// This entry consumes its segments and recurses into its children
    Prefix,
}

/// One segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// What a matched entry resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Terminal entry mapped to a view handler id
    View(u32),
    /// Terminal entry redirecting to a sibling-scoped target path
    Redirect(Vec<String>),
    /// Interior entry that only groups children
    Group,
}

/// Handle to an entry in the table's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u32);

/// Declarative description of one route entry, built with chained methods
/// and consumed by [`RouteTable::build`].
#[derive(Debug, Clone)]
pub struct RouteDef {
    pattern: String,
    mode: Option<MatchMode>,
    view: Option<u32>,
    redirect: Option<String>,
    guards: Vec<u32>,
    children: Vec<RouteDef>,
}

impl RouteDef {
    /// Start an entry for the given pattern (`""`, `list`, `:id`, ...)
    pub fn path(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            mode: None,
            view: None,
            redirect: None,
            guards: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Terminate this entry with a view handler id
    pub fn view(mut self, handler_id: u32) -> Self {
        self.view = Some(handler_id);
        self
    }

    /// Terminate this entry with a redirect, resolved in the sibling scope
    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// Attach a guard id; guards gate the whole subtree below this entry
    pub fn guard(mut self, guard_id: u32) -> Self {
        self.guards.push(guard_id);
        self
    }

    /// Nest child entries; the entry becomes a prefix-matched group
    pub fn children(mut self, children: Vec<RouteDef>) -> Self {
        self.children = children;
        self
    }

    /// Override the match mode (leaves default to `Full`)
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Arena node for one route entry
#[derive(Debug)]
struct Entry {
    pattern: String,
    segments: Vec<Segment>,
    mode: MatchMode,
    kind: EntryKind,
    guards: Vec<u32>,
    children: Vec<EntryId>,
    parent: Option<EntryId>,
}

/// A successful path match.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch {
    /// The terminal matched entry (a view or redirect, never a group)
    pub entry: EntryId,
    /// Entries from root to the terminal entry, inclusive
    pub chain: Vec<EntryId>,
    /// Captured path parameters as (name, value) pairs, in binding order
    pub params: Vec<(String, String)>,
    /// How many path segments the terminal entry consumed itself
    pub leaf_segments: usize,
    /// How many of `params` were bound by the terminal entry itself
    pub leaf_params: usize,
}

/// Immutable route table.
///
/// Built once at startup from [`RouteDef`] declarations and never mutated
/// afterwards; matching takes `&self` only.
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<Entry>,
    roots: Vec<EntryId>,
}

impl RouteTable {
    /// Build a table from root declarations, validating the whole tree.
    pub fn build(roots: Vec<RouteDef>) -> Result<Self, BuildError> {
        let mut table = RouteTable {
            entries: Vec::new(),
            roots: Vec::new(),
        };
        let root_ids = table.insert_all(None, roots, "")?;
        table.roots = root_ids;
        table.check_redirects()?;
        Ok(table)
    }

    fn insert_all(
        &mut self,
        parent: Option<EntryId>,
        defs: Vec<RouteDef>,
        prefix: &str,
    ) -> Result<Vec<EntryId>, BuildError> {
        let mut ids = Vec::with_capacity(defs.len());
        let mut seen: HashSet<(String, MatchMode)> = HashSet::new();

        for def in defs {
            let segments = parse_pattern(&def.pattern);
            let pattern = join_segments(&segments);
            let path = join_paths(prefix, &pattern);

            let kinds =
                usize::from(def.view.is_some()) + usize::from(def.redirect.is_some()) + usize::from(!def.children.is_empty());
            if kinds == 0 {
                return Err(BuildError::EmptyEntry { path });
            }
            if kinds > 1 {
                return Err(BuildError::AmbiguousEntry { path });
            }

            // Groups always match by prefix; leaves default to full.
            let mode = if def.children.is_empty() {
                def.mode.unwrap_or(MatchMode::Full)
            } else {
                MatchMode::Prefix
            };

            if segments.is_empty() && (!def.children.is_empty() || mode == MatchMode::Prefix) {
                return Err(BuildError::EmptyPatternChildren { path });
            }

            if !seen.insert((pattern.clone(), mode)) {
                return Err(BuildError::DuplicateSibling { path });
            }

            let kind = if let Some(handler_id) = def.view {
                EntryKind::View(handler_id)
            } else if let Some(target) = def.redirect {
                let target_segments = parse_pattern(&target);
                if target_segments.iter().any(|s| matches!(s, Segment::Param(_))) {
                    return Err(BuildError::InvalidRedirectTarget { path, target });
                }
                EntryKind::Redirect(
                    target_segments
                        .into_iter()
                        .map(|s| match s {
                            Segment::Static(text) => text,
                            Segment::Param(_) => unreachable!("rejected above"),
                        })
                        .collect(),
                )
            } else {
                EntryKind::Group
            };

            let id = EntryId(self.entries.len() as u32);
            self.entries.push(Entry {
                pattern,
                segments,
                mode,
                kind,
                guards: def.guards,
                children: Vec::new(),
                parent,
            });
            let children = self.insert_all(Some(id), def.children, &path)?;
            self.entries[id.0 as usize].children = children;
            ids.push(id);
        }

        Ok(ids)
    }

    /// Follow every redirect entry through its sibling scope, rejecting
    /// targets that match nothing and chains that revisit an entry.
    fn check_redirects(&self) -> Result<(), BuildError> {
        for index in 0..self.entries.len() {
            let start = EntryId(index as u32);
            if !matches!(self.entries[index].kind, EntryKind::Redirect(_)) {
                continue;
            }

            let mut visited = vec![start];
            let mut current = start;
            while let EntryKind::Redirect(target) = &self.entries[current.0 as usize].kind {
                let segments: Vec<&str> = target.iter().map(String::as_str).collect();
                let scope = self.scope_of(current);
                let mut params = Vec::new();
                let mut chain = Vec::new();
                let Some(next) = self.find_in(scope, &segments, &mut params, &mut chain) else {
                    return Err(BuildError::DanglingRedirect {
                        path: self.route_path(current),
                        target: target.join("/"),
                    });
                };
                if visited.contains(&next) {
                    return Err(BuildError::RedirectCycle {
                        path: self.route_path(start),
                    });
                }
                visited.push(next);
                current = next;
            }
        }
        Ok(())
    }

    /// Sibling scope a redirect target is resolved in
    fn scope_of(&self, id: EntryId) -> &[EntryId] {
        match self.entries[id.0 as usize].parent {
            Some(parent) => &self.entries[parent.0 as usize].children,
            None => &self.roots,
        }
    }

    /// Match a slash-separated path.
    ///
    /// Leading, trailing, and doubled slashes are ignored, so `/customers/`
    /// and `customers` are the same request.
    pub fn find(&self, path: &str) -> Option<PathMatch> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.find_segments(&segments)
    }

    /// Match an already-split path.
    pub fn find_segments(&self, path: &[&str]) -> Option<PathMatch> {
        let mut params = Vec::new();
        let mut chain = Vec::new();
        let entry = self.find_in(&self.roots, path, &mut params, &mut chain)?;
        Some(self.path_match(entry, chain, params))
    }

    /// Match a redirect target inside the sibling scope of `from`.
    ///
    /// This is the runtime counterpart of the build-time redirect checks:
    /// the target never re-enters matching from the root, so an
    /// earlier-declared tree that happens to consume the same prefix can
    /// never capture a redirect out of its scope. `inherited` carries the
    /// params already bound on the consumed prefix; the returned chain
    /// runs from the root through `from`'s ancestors into the new leaf.
    pub fn find_in_scope(
        &self,
        from: EntryId,
        target: &[&str],
        inherited: Vec<(String, String)>,
    ) -> Option<PathMatch> {
        let mut params = inherited;
        let mut chain = self.ancestors_of(from);
        let entry = self.find_in(self.scope_of(from), target, &mut params, &mut chain)?;
        Some(self.path_match(entry, chain, params))
    }

    fn path_match(&self, entry: EntryId, chain: Vec<EntryId>, params: Vec<(String, String)>) -> PathMatch {
        let leaf = &self.entries[entry.0 as usize];
        PathMatch {
            entry,
            chain,
            params,
            leaf_segments: leaf.segments.len(),
            leaf_params: leaf
                .segments
                .iter()
                .filter(|s| matches!(s, Segment::Param(_)))
                .count(),
        }
    }

    /// Chain of entries from the root down to `id`'s parent, exclusive of `id`
    fn ancestors_of(&self, id: EntryId) -> Vec<EntryId> {
        let mut chain = Vec::new();
        let mut current = self.entries[id.0 as usize].parent;
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.entries[ancestor.0 as usize].parent;
        }
        chain.reverse();
        chain
    }

    fn find_in(
        &self,
        nodes: &[EntryId],
        path: &[&str],
        params: &mut Vec<(String, String)>,
        chain: &mut Vec<EntryId>,
    ) -> Option<EntryId> {
        for &id in nodes {
            let entry = &self.entries[id.0 as usize];
            let mark = params.len();
            let Some(rest) = consume(&entry.segments, path, params) else {
                params.truncate(mark);
                continue;
            };
            chain.push(id);

            let matched = match entry.mode {
                // Terminal entries require the whole path consumed.
                MatchMode::Full => {
                    if rest.is_empty() && entry.kind != EntryKind::Group {
                        Some(id)
                    } else {
                        None
                    }
                }
                MatchMode::Prefix => {
                    if entry.children.is_empty() {
                        if rest.is_empty() && entry.kind != EntryKind::Group {
                            Some(id)
                        } else {
                            None
                        }
                    } else {
                        self.find_in(&entry.children, rest, params, chain)
                    }
                }
            };

            if matched.is_some() {
                return matched;
            }
            chain.pop();
            params.truncate(mark);
        }
        None
    }

    /// Kind of an entry
    pub fn kind(&self, id: EntryId) -> &EntryKind {
        &self.entries[id.0 as usize].kind
    }

    /// Guard ids attached to an entry, in declaration order
    pub fn guards(&self, id: EntryId) -> &[u32] {
        &self.entries[id.0 as usize].guards
    }

    /// Full pattern path of an entry, e.g. `customers/:id/matches`
    pub fn route_path(&self, id: EntryId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(entry_id) = current {
            let entry = &self.entries[entry_id.0 as usize];
            if !entry.pattern.is_empty() {
                parts.push(entry.pattern.as_str());
            }
            current = entry.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Match pattern segments against the head of the path, binding parameters.
/// Returns the unconsumed remainder, or `None` on mismatch.
fn consume<'p>(
    segments: &[Segment],
    path: &'p [&'p str],
    params: &mut Vec<(String, String)>,
) -> Option<&'p [&'p str]> {
    if path.len() < segments.len() {
        return None;
    }
    for (segment, part) in segments.iter().zip(path) {
        match segment {
            Segment::Static(text) => {
                if part != text {
                    return None;
                }
            }
            Segment::Param(name) => {
                if part.is_empty() {
                    return None;
                }
                params.push((name.clone(), (*part).to_string()));
            }
        }
    }
    Some(&path[segments.len()..])
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Static(s.to_string()),
        })
        .collect()
}

fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Static(text) => text.clone(),
            Segment::Param(name) => format!(":{name}"),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn join_paths(prefix: &str, pattern: &str) -> String {
    match (prefix.is_empty(), pattern.is_empty()) {
        (true, _) => pattern.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}/{pattern}"),
    }
}
