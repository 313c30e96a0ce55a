//! Bounded, insertion-ordered demand history (C2).
//!
//! The ring holds at most `capacity` [`DemandRecord`]s; on overflow the
//! oldest record is dropped, strictly FIFO by insertion order. The
//! aggregator turns the current window into a snapshot of per-node
//! [`NodeState`], which callers must treat as immutable once produced.

use std::collections::{HashMap, VecDeque};

use crate::model::{DemandRecord, NodeState};

/// Default ring capacity per spec.md §4.2.
pub const DEFAULT_RING_CAPACITY: usize = 1000;

/// A bounded FIFO ring of [`DemandRecord`]s.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    capacity: usize,
    records: VecDeque<DemandRecord>,
}

impl RingBuffer {
    /// Create a ring with the given capacity. Panics if `capacity == 0`,
    /// since the invariant in spec.md §3 requires `N >= 1`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "ring capacity must be at least 1");
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a record, evicting the oldest entry if at capacity.
    /// Returns the number of records evicted (0 or 1).
    pub fn push(&mut self, record: DemandRecord) -> usize {
        let mut evicted = 0;
        if self.records.len() >= self.capacity {
            self.records.pop_front();
            evicted = 1;
        }
        self.records.push_back(record);
        evicted
    }

    /// Append many records in order, returning the total number evicted.
    pub fn push_all(&mut self, records: impl IntoIterator<Item = DemandRecord>) -> usize {
        records.into_iter().map(|r| self.push(r)).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot the current window as an ordered slice view, oldest first.
    pub fn snapshot(&self) -> Vec<DemandRecord> {
        self.records.iter().copied().collect()
    }

    /// Aggregate the current window into per-node state: history sorted by
    /// timestamp, latest demand, latest fulfillment.
    pub fn aggregate(&self) -> HashMap<u8, NodeState> {
        aggregate_records(&self.snapshot())
    }
}

/// Aggregate an arbitrary slice of records into per-node state. Exposed
/// separately from [`RingBuffer::aggregate`] so callers can aggregate a
/// snapshot taken elsewhere (e.g. in tests) without owning a ring.
pub fn aggregate_records(records: &[DemandRecord]) -> HashMap<u8, NodeState> {
    let mut by_node: HashMap<u8, Vec<DemandRecord>> = HashMap::new();
    for record in records {
        by_node.entry(record.node_id).or_default().push(*record);
    }

    by_node
        .into_iter()
        .map(|(node_id, mut recs)| {
            recs.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            let history = recs.iter().map(|r| (r.timestamp, r.demand_amps)).collect();
            let latest = recs.last().expect("non-empty group");
            (
                node_id,
                NodeState {
                    node_id,
                    history,
                    latest_demand: latest.demand_amps,
                    latest_fulfillment: latest.fulfillment,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(node_id: u8, t: f64, demand: f64) -> DemandRecord {
        DemandRecord {
            timestamp: t,
            node_id,
            demand_amps: demand,
            fulfillment: 100.0,
        }
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut ring = RingBuffer::new(3);
        for i in 0..5 {
            ring.push(record(1, i as f64, i as f64));
        }
        let snapshot = ring.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].timestamp, 2.0);
        assert_eq!(snapshot[2].timestamp, 4.0);
    }

    #[test]
    fn ring_size_passes_n_evicts_exactly_inserted_minus_n() {
        let mut ring = RingBuffer::new(10);
        let total_evicted: usize = (0..25).map(|i| ring.push(record(1, i as f64, 1.0))).sum();
        assert_eq!(total_evicted, 25 - 10);
        assert_eq!(ring.len(), 10);
    }

    #[test]
    fn aggregate_sorts_history_and_tracks_latest() {
        let mut ring = RingBuffer::new(10);
        ring.push(record(1, 2.0, 20.0));
        ring.push(record(1, 1.0, 10.0));
        ring.push(record(2, 0.5, 5.0));

        let agg = ring.aggregate();
        assert_eq!(agg.len(), 2);

        let node1 = &agg[&1];
        assert_eq!(node1.history, vec![(1.0, 10.0), (2.0, 20.0)]);
        assert_eq!(node1.latest_demand, 20.0);

        let node2 = &agg[&2];
        assert_eq!(node2.latest_demand, 5.0);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        RingBuffer::new(0);
    }
}
