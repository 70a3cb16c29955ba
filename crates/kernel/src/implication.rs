//! The term-implication relation.
//!
//! Matching consumes implication as an opaque predicate: does the candidate's
//! value satisfy the required value? [`ExactImplication`] is plain string
//! equality. [`TermGraph`] is reachability over an externally supplied
//! directed acyclic graph of terms, with the transitive closure computed once
//! at construction so queries are a set lookup. The graph is closed-world:
//! only declared edges (and their closure) imply, nothing is inferred.
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The implication relation injected into categorical matching.
///
/// `implies(candidate, required)` answers whether a candidate carrying
/// `candidate` satisfies a requirement for `required`.
pub trait Implies: Send + Sync {
    fn implies(&self, candidate: &str, required: &str) -> bool;
}

/// Default relation when no graph is supplied: string equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactImplication;

impl Implies for ExactImplication {
    fn implies(&self, candidate: &str, required: &str) -> bool {
        candidate == required
    }
}

/// One edge of the external implication vocabulary: `from` implies `to`.
/// Bidirectional edges declare two terms mutually implying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub bidirectional: bool,
}

/// Errors raised while building a [`TermGraph`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("implication source contains no edges")]
    EmptySource,
    #[error("implication edge `{from}` -> `{to}` has an empty term")]
    EmptyTerm { from: String, to: String },
    #[error("implication cycle involving term `{term}`")]
    Cycle { term: String },
    #[error("implication source is not valid json: {message}")]
    Parse { message: String },
}

/// Reachability over a DAG of normalized terms, precomputed as a transitive
/// closure at construction.
///
/// One-way edges must form an acyclic graph once mutually-implying terms are
/// collapsed; a cycle among one-way edges is a construction error, as is an
/// empty edge source.
#[derive(Debug, Clone)]
pub struct TermGraph {
    closure: HashMap<String, HashSet<String>>,
}

impl TermGraph {
    /// Build the graph from an edge list, normalizing terms and computing the
    /// full reachability closure.
    pub fn from_edges(edges: impl IntoIterator<Item = TermEdge>) -> Result<Self, GraphError> {
        let mut normalized = Vec::new();
        for edge in edges {
            let from = edge.from.trim().to_lowercase();
            let to = edge.to.trim().to_lowercase();
            if from.is_empty() || to.is_empty() {
                return Err(GraphError::EmptyTerm { from: edge.from, to: edge.to });
            }
            normalized.push(TermEdge { from, to, bidirectional: edge.bidirectional });
        }
        if normalized.is_empty() {
            return Err(GraphError::EmptySource);
        }

        // Intern terms.
        fn intern(term: &str, ids: &mut HashMap<String, usize>, terms: &mut Vec<String>) -> usize {
            *ids.entry(term.to_string()).or_insert_with(|| {
                terms.push(term.to_string());
                terms.len() - 1
            })
        }
        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<String> = Vec::new();
        let mut edge_ids = Vec::with_capacity(normalized.len());
        for edge in &normalized {
            let from = intern(&edge.from, &mut ids, &mut terms);
            let to = intern(&edge.to, &mut ids, &mut terms);
            edge_ids.push((from, to, edge.bidirectional));
        }

        // Mutually-implying terms collapse into one component.
        let mut uf = UnionFind::new(terms.len());
        for &(from, to, bidirectional) in &edge_ids {
            if bidirectional {
                uf.union(from, to);
            }
        }

        // Component-level one-way adjacency. A one-way edge inside a
        // component is redundant, not a cycle.
        let mut adjacency: HashMap<usize, HashSet<usize>> = HashMap::new();
        let mut indegree: HashMap<usize, usize> = HashMap::new();
        let mut reps: HashSet<usize> = HashSet::new();
        for term_id in 0..terms.len() {
            reps.insert(uf.find(term_id));
        }
        for &(from, to, bidirectional) in &edge_ids {
            if bidirectional {
                continue;
            }
            let from_rep = uf.find(from);
            let to_rep = uf.find(to);
            if from_rep == to_rep {
                continue;
            }
            if adjacency.entry(from_rep).or_default().insert(to_rep) {
                *indegree.entry(to_rep).or_insert(0) += 1;
            }
        }

        // Kahn's algorithm: topological order doubles as cycle detection.
        let mut queue: Vec<usize> = reps
            .iter()
            .copied()
            .filter(|rep| indegree.get(rep).copied().unwrap_or(0) == 0)
            .collect();
        queue.sort_unstable();
        let mut order = Vec::with_capacity(reps.len());
        let mut remaining = indegree.clone();
        while let Some(rep) = queue.pop() {
            order.push(rep);
            if let Some(children) = adjacency.get(&rep) {
                for &child in children {
                    let entry = remaining.get_mut(&child).expect("indegree tracked");
                    *entry -= 1;
                    if *entry == 0 {
                        queue.push(child);
                    }
                }
            }
        }
        if order.len() < reps.len() {
            let stuck = reps
                .iter()
                .copied()
                .find(|rep| remaining.get(rep).copied().unwrap_or(0) > 0)
                .expect("cycle leaves a positive indegree");
            return Err(GraphError::Cycle { term: terms[stuck].clone() });
        }

        // Component members, then reachability in reverse topological order.
        let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
        for term_id in 0..terms.len() {
            members.entry(uf.find(term_id)).or_default().push(term_id);
        }
        let mut reachable: HashMap<usize, HashSet<usize>> = HashMap::new();
        for &rep in order.iter().rev() {
            let mut reach: HashSet<usize> = HashSet::new();
            if let Some(children) = adjacency.get(&rep) {
                for &child in children {
                    reach.insert(child);
                    if let Some(grand) = reachable.get(&child) {
                        reach.extend(grand.iter().copied());
                    }
                }
            }
            reachable.insert(rep, reach);
        }

        // Per-term closure: co-members plus every member of every reachable
        // component.
        let mut closure: HashMap<String, HashSet<String>> = HashMap::new();
        for term_id in 0..terms.len() {
            let rep = uf.find(term_id);
            let mut implied: HashSet<String> = HashSet::new();
            for &member in &members[&rep] {
                if member != term_id {
                    implied.insert(terms[member].clone());
                }
            }
            for reached_rep in &reachable[&rep] {
                for &member in &members[reached_rep] {
                    implied.insert(terms[member].clone());
                }
            }
            closure.insert(terms[term_id].clone(), implied);
        }

        Ok(Self { closure })
    }

    /// Parse a JSON edge list (`[{"from": ..., "to": ..., "bidirectional": ...}]`)
    /// and build the graph.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, GraphError> {
        let edges: Vec<TermEdge> = serde_json::from_slice(bytes)
            .map_err(|e| GraphError::Parse { message: e.to_string() })?;
        Self::from_edges(edges)
    }

    /// Number of distinct terms in the graph.
    pub fn term_count(&self) -> usize {
        self.closure.len()
    }

    /// Every term `candidate` implies, excluding itself.
    pub fn implied_terms(&self, candidate: &str) -> impl Iterator<Item = &str> {
        self.closure
            .get(candidate)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

impl Implies for TermGraph {
    fn implies(&self, candidate: &str, required: &str) -> bool {
        self.closure
            .get(candidate)
            .is_some_and(|implied| implied.contains(required))
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parent: (0..size).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}
