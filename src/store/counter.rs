use dashmap::DashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Cell {
    value: Mutex<i64>,
}

/// Concurrent map of counter id → partial value with per-id locking.
///
/// Entries are created lazily on first write; a read of an unknown id
/// returns 0 without creating anything. The map's entry API makes
/// insert-if-absent atomic, so at most one cell ever exists per id.
#[derive(Default)]
pub struct CounterStore {
    counters: DashMap<String, Arc<Cell>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, counter_id: &str) -> Arc<Cell> {
        self.counters
            .entry(counter_id.to_string())
            .or_default()
            .clone()
    }

    /// Adds one to the counter's partial value and returns the result.
    pub fn increment(&self, counter_id: &str) -> i64 {
        let cell = self.cell(counter_id);
        let mut value = cell.value.lock().unwrap();
        *value += 1;
        *value
    }

    /// Subtracts one from the counter's partial value and returns the result.
    pub fn decrement(&self, counter_id: &str) -> i64 {
        let cell = self.cell(counter_id);
        let mut value = cell.value.lock().unwrap();
        *value -= 1;
        *value
    }

    /// Current partial value; 0 for ids this shard has never written.
    pub fn get(&self, counter_id: &str) -> i64 {
        match self.counters.get(counter_id) {
            Some(cell) => *cell.value.lock().unwrap(),
            None => 0,
        }
    }

    /// Number of counters this shard currently holds.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
