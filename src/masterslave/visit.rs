use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque identity of a logical session (connection, unit of work, thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Key bound to the calling thread, for thread-per-session callers.
    pub fn current_thread() -> Self {
        Self::new(format!("{:?}", std::thread::current().id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SessionKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Records which sessions have already been routed to a master.
///
/// Once a session writes (or takes a row lock), its later reads go to the
/// master as well, so it always observes its own writes. Entries live until
/// the caller invokes `clear` at the end of the session; the tracker never
/// expires them on its own.
#[derive(Debug, Default)]
pub struct MasterVisitTracker {
    visited: DashMap<SessionKey, bool>,
}

impl MasterVisitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_visited(&self, session: &SessionKey) {
        self.visited.insert(session.clone(), true);
    }

    pub fn has_visited(&self, session: &SessionKey) -> bool {
        self.visited
            .get(session)
            .map(|visited| *visited)
            .unwrap_or(false)
    }

    pub fn clear(&self, session: &SessionKey) {
        self.visited.remove(session);
    }

    /// Number of sessions currently pinned to master.
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
