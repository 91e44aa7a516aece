//! In-memory address bar with browser history semantics.
//!
//! Used by tests and the CLI replay command. External navigation
//! (`back`, `forward`, `go`, `navigate`) queues one notification per
//! subscribed listener; the host drains them with
//! [`MemoryHistory::take_notifications`] and calls the navigator's
//! `reconcile` for each.

use crate::history::{AddressBar, ListenerId};

#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
    listeners: Vec<ListenerId>,
    next_listener: u64,
    pending: usize,
    notify_on_write: bool,
    pushes: usize,
    replaces: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryHistory {
    /// History with a single entry showing `query`.
    pub fn new(query: &str) -> Self {
        Self {
            entries: vec![strip(query).to_string()],
            cursor: 0,
            listeners: Vec::new(),
            next_listener: 0,
            pending: 0,
            notify_on_write: false,
            pushes: 0,
            replaces: 0,
        }
    }

    /// Also notify listeners after push/replace.
    ///
    /// Some hosts echo their own writes back as change events; this lets
    /// tests exercise that path.
    #[must_use]
    pub fn with_write_notifications(mut self, enable: bool) -> Self {
        self.notify_on_write = enable;
        self
    }

    fn notify(&mut self) {
        if !self.listeners.is_empty() {
            self.pending += 1;
        }
    }

    // =========================================================================
    // EXTERNAL NAVIGATION
    // =========================================================================

    /// Browser Back. Returns false at the oldest entry.
    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    /// Browser Forward. Returns false at the newest entry.
    pub fn forward(&mut self) -> bool {
        self.go(1)
    }

    /// Move the cursor by `delta`; out-of-range moves do nothing.
    pub fn go(&mut self, delta: isize) -> bool {
        let Some(target) = self.cursor.checked_add_signed(delta) else {
            return false;
        };
        if delta == 0 || target >= self.entries.len() {
            return false;
        }
        self.cursor = target;
        self.notify();
        true
    }

    /// User typed or followed a link to `query`.
    pub fn navigate(&mut self, query: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(strip(query).to_string());
        self.cursor = self.entries.len() - 1;
        self.notify();
    }

    /// Number of notifications queued since the last call.
    pub fn take_notifications(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn push_count(&self) -> usize {
        self.pushes
    }

    pub fn replace_count(&self) -> usize {
        self.replaces
    }

    pub fn write_count(&self) -> usize {
        self.pushes + self.replaces
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl AddressBar for MemoryHistory {
    fn query(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn push(&mut self, query: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(strip(query).to_string());
        self.cursor = self.entries.len() - 1;
        self.pushes += 1;
        if self.notify_on_write {
            self.notify();
        }
    }

    fn replace(&mut self, query: &str) {
        self.entries[self.cursor] = strip(query).to_string();
        self.replaces += 1;
        if self.notify_on_write {
            self.notify();
        }
    }

    fn subscribe(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(id);
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|listener| *listener != id);
    }
}

fn strip(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_drops_forward_entries() {
        let mut history = MemoryHistory::new("");
        history.push("a=1");
        history.push("a=2");
        assert!(history.back());
        history.push("a=3");
        assert_eq!(history.entries(), ["", "a=1", "a=3"]);
        assert!(!history.forward());
    }

    #[test]
    fn test_go_bounds() {
        let mut history = MemoryHistory::new("?x=1");
        assert_eq!(history.query(), "x=1");
        assert!(!history.back());
        assert!(!history.go(0));
        history.push("x=2");
        assert!(!history.go(-5));
        assert!(history.go(-1));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_notifications_require_listener() {
        let mut history = MemoryHistory::new("");
        history.push("a=1");
        history.back();
        assert_eq!(history.take_notifications(), 0);

        let id = history.subscribe();
        history.forward();
        history.navigate("b=1");
        assert_eq!(history.take_notifications(), 2);
        assert_eq!(history.take_notifications(), 0);

        history.unsubscribe(id);
        history.back();
        assert_eq!(history.take_notifications(), 0);
        assert_eq!(history.listener_count(), 0);
    }

    #[test]
    fn test_write_notifications_opt_in() {
        let mut history = MemoryHistory::new("").with_write_notifications(true);
        history.subscribe();
        history.push("a=1");
        history.replace("a=2");
        assert_eq!(history.take_notifications(), 2);
        assert_eq!(history.push_count(), 1);
        assert_eq!(history.replace_count(), 1);
        assert_eq!(history.write_count(), 2);
    }
}
