use super::VertexId;

/// ID for hyperedges, which are essentially `usize`.
///
/// As with [VertexId](super::VertexId), `0` is reserved as the unknown edge
/// and ids are never recycled.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

/// A factory to generate `EdgeId` uniquely.
#[derive(Clone)]
pub struct EdgeIdFactory(usize);

/// An edge of arbitrary arity.
///
/// The endpoint sequence is kept exactly as supplied, duplicates included, so
/// the same vertex may occur several times.  Queries that only care about
/// membership go through [Hyperedge::sorted_elements], the deduplicated
/// sorted endpoint set.
#[derive(Debug, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Hyperedge {
    id: EdgeId,
    elements: Vec<VertexId>,
    sorted_elements: Vec<VertexId>,
}

impl Default for EdgeIdFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeIdFactory {
    pub fn new() -> Self {
        Self(EdgeId::FIRST.0)
    }

    pub fn one_more(&mut self) -> EdgeId {
        let cur = self.0;
        self.0 += 1;
        EdgeId(cur)
    }
}

impl EdgeId {
    /// The reserved null edge.
    pub const UNKNOWN: EdgeId = EdgeId(0);
    /// The smallest id a live edge can carry.
    pub const FIRST: EdgeId = EdgeId(1);
    pub const MAX: EdgeId = EdgeId(usize::MAX);

    pub fn new(x: usize) -> Self {
        Self(x)
    }

    pub fn to_raw(&self) -> usize {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Hyperedge {
    pub fn new(id: EdgeId, elements: Vec<VertexId>) -> Self {
        let mut sorted_elements = elements.clone();
        sorted_elements.sort_unstable();
        sorted_elements.dedup();
        Self {
            id,
            elements,
            sorted_elements,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// The endpoints in the order they were supplied, duplicates included.
    pub fn elements(&self) -> &[VertexId] {
        &self.elements
    }

    /// The underlying endpoint set, sorted ascending without duplicates.
    pub fn sorted_elements(&self) -> &[VertexId] {
        &self.sorted_elements
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub fn contains(&self, v: &VertexId) -> bool {
        self.sorted_elements.binary_search(v).is_ok()
    }

    /// Whether every endpoint lies in `allowed` (sorted ascending).
    pub fn is_within(&self, allowed: &[VertexId]) -> bool {
        let mut rest = allowed;
        for v in self.sorted_elements.iter() {
            match rest.binary_search(v) {
                Ok(pos) => rest = &rest[pos + 1..],
                Err(_) => return false,
            }
        }
        true
    }
}
