use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use ahash::AHashMap;
use codec::Vertex;
use parking_lot::RwLock;

/// Identifies one accepted peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddr {
    pub slot: Vertex,
    pub address: SocketAddr,
}

/// The type of information passed in the statistics channel.
#[derive(Debug, Clone, Copy)]
pub enum Stats {
    ReceivedBytes(usize),
    SendBytes(usize),
    ReceivedPkts(usize),
    SendPkts(usize),
    DroppedPkts(usize),
    ErrorPkts(usize),
}

pub trait Number {
    fn add(&self, value: usize);
    fn get(&self) -> usize;
}

#[derive(Default)]
pub struct Count(AtomicUsize);

impl Number for Count {
    fn add(&self, value: usize) {
        self.0.fetch_add(value, Ordering::Relaxed);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Traffic counters of a single connection.
pub struct Counts<T> {
    pub received_bytes: T,
    pub send_bytes: T,
    pub received_pkts: T,
    pub send_pkts: T,
    pub dropped_pkts: T,
    pub error_pkts: T,
}

impl<T: Number> Counts<T> {
    /// # Example
    ///
    /// ```
    /// use gss_server::statistics::*;
    ///
    /// let counts = Counts {
    ///     received_bytes: Count::default(),
    ///     send_bytes: Count::default(),
    ///     received_pkts: Count::default(),
    ///     send_pkts: Count::default(),
    ///     dropped_pkts: Count::default(),
    ///     error_pkts: Count::default(),
    /// };
    ///
    /// counts.add(&Stats::ReceivedBytes(285));
    /// assert_eq!(counts.received_bytes.get(), 285);
    ///
    /// counts.add(&Stats::ReceivedPkts(1));
    /// assert_eq!(counts.received_pkts.get(), 1);
    /// ```
    pub fn add(&self, payload: &Stats) {
        match payload {
            Stats::ReceivedBytes(v) => self.received_bytes.add(*v),
            Stats::ReceivedPkts(v) => self.received_pkts.add(*v),
            Stats::SendBytes(v) => self.send_bytes.add(*v),
            Stats::SendPkts(v) => self.send_pkts.add(*v),
            Stats::DroppedPkts(v) => self.dropped_pkts.add(*v),
            Stats::ErrorPkts(v) => self.error_pkts.add(*v),
        }
    }
}

impl Default for Counts<Count> {
    fn default() -> Self {
        Self {
            received_bytes: Count::default(),
            send_bytes: Count::default(),
            received_pkts: Count::default(),
            send_pkts: Count::default(),
            dropped_pkts: Count::default(),
            error_pkts: Count::default(),
        }
    }
}

/// Per-connection traffic statistics.
///
/// Connections register on accept and unregister after the disconnect is
/// reported, so totals for a link stay readable while its final log line
/// is written.
#[derive(Clone)]
pub struct Statistics(Arc<RwLock<AHashMap<LinkAddr, Counts<Count>>>>);

impl Default for Statistics {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(AHashMap::with_capacity(
            Vertex::PEERS.len(),
        ))))
    }
}

impl Statistics {
    /// Get a reporter bound to this statistics table.
    ///
    /// The reporter is held by an endpoint loop and used to update the
    /// counters of whatever connection the loop currently serves.
    ///
    /// # Example
    ///
    /// ```
    /// use codec::Vertex;
    /// use gss_server::statistics::*;
    ///
    /// let statistics = Statistics::default();
    /// let reporter = statistics.get_reporter();
    ///
    /// let addr = LinkAddr {
    ///     slot: Vertex::Client,
    ///     address: "127.0.0.1:8080".parse().unwrap(),
    /// };
    ///
    /// statistics.register(addr);
    /// reporter.send(&addr, &[Stats::ReceivedBytes(100)]);
    /// assert_eq!(statistics.get(&addr).unwrap().received_bytes, 100);
    /// ```
    pub fn get_reporter(&self) -> StatisticsReporter {
        StatisticsReporter(self.0.clone())
    }

    /// Add a connection to the watch list.
    pub fn register(&self, addr: LinkAddr) {
        self.0.write().insert(addr, Counts::default());
    }

    /// Remove a connection from the watch list.
    pub fn unregister(&self, addr: &LinkAddr) {
        self.0.write().remove(addr);
    }

    /// Current counter values of a registered connection.
    pub fn get(&self, addr: &LinkAddr) -> Option<Counts<usize>> {
        self.0.read().get(addr).map(|counts| Counts {
            received_bytes: counts.received_bytes.get(),
            received_pkts: counts.received_pkts.get(),
            send_bytes: counts.send_bytes.get(),
            send_pkts: counts.send_pkts.get(),
            dropped_pkts: counts.dropped_pkts.get(),
            error_pkts: counts.error_pkts.get(),
        })
    }
}

/// Statistics reporter.
///
/// Reports against an unregistered connection are silently ignored.
#[derive(Clone)]
pub struct StatisticsReporter(Arc<RwLock<AHashMap<LinkAddr, Counts<Count>>>>);

impl StatisticsReporter {
    pub fn send(&self, addr: &LinkAddr, reports: &[Stats]) {
        if let Some(counts) = self.0.read().get(addr) {
            for item in reports {
                counts.add(item);
            }
        }
    }
}
