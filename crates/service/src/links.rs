use std::sync::atomic::{AtomicBool, Ordering};

use codec::{Netstat, Vertex};

/// Connection readiness, one flag per peer slot.
///
/// Each flag is written by its own endpoint loop (accept, close, timeout)
/// and by the router when a send to that slot fails; everyone else only
/// reads. One-byte atomics with release/acquire ordering are enough, no
/// lock is taken on the read path.
///
/// # Test
///
/// ```
/// use codec::Vertex;
/// use gss_server_service::links::LinkTable;
///
/// let links = LinkTable::default();
/// links.set_ready(Vertex::Client, true);
/// links.set_ready(Vertex::Track, true);
///
/// assert!(links.is_ready(Vertex::Client));
/// assert!(!links.is_ready(Vertex::Haystack));
/// assert_eq!(links.snapshot().bits(), 0x88);
/// ```
#[derive(Default)]
pub struct LinkTable([AtomicBool; 5]);

impl LinkTable {
    pub fn set_ready(&self, slot: Vertex, ready: bool) {
        if let Some(index) = slot.slot() {
            self.0[index].store(ready, Ordering::Release);
        }
    }

    /// `Server` is not a peer slot and always reads as not ready.
    pub fn is_ready(&self, slot: Vertex) -> bool {
        slot.slot()
            .map(|index| self.0[index].load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Current liveness bitmask, taken at call time.
    pub fn snapshot(&self) -> Netstat {
        let mut netstat = Netstat::default();
        for vertex in Vertex::PEERS {
            if self.is_ready(vertex) {
                netstat.insert(vertex);
            }
        }

        netstat
    }
}
