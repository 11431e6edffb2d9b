//! Priority queue for tracking account health (min-heap by health factor)

use crate::health::AccountHealth;
use cdp_engine::{Address, U256};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Health-based priority queue (min-heap: lowest health first)
pub struct HealthQueue {
    /// Priority queue (using Reverse for min-heap)
    queue: PriorityQueue<Address, Reverse<U256>>,
    /// Map for O(1) lookups
    map: HashMap<Address, AccountHealth>,
}

impl HealthQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update account health
    pub fn push(&mut self, health: AccountHealth) {
        let user = health.user;
        let priority = Reverse(health.health_factor);

        self.map.insert(user, health);
        self.queue.push(user, priority);
    }

    /// Pop account with lowest health
    pub fn pop(&mut self) -> Option<AccountHealth> {
        let (user, _priority) = self.queue.pop()?;
        self.map.remove(&user)
    }

    /// Peek at account with lowest health without removing
    pub fn peek(&self) -> Option<&AccountHealth> {
        let (user, _priority) = self.queue.peek()?;
        self.map.get(user)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Accounts below the minimum health factor, lowest first
    pub fn liquidatable(&self) -> Vec<AccountHealth> {
        let mut out: Vec<AccountHealth> = self
            .map
            .values()
            .filter(|h| h.needs_liquidation())
            .cloned()
            .collect();
        out.sort_by_key(|h| (h.health_factor, h.user));
        out
    }

    /// Healthy accounts within `buffer_pct` of the minimum
    pub fn warning_candidates(&self, buffer_pct: u64) -> Vec<AccountHealth> {
        let mut out: Vec<AccountHealth> = self
            .map
            .values()
            .filter(|h| h.in_warning_zone(buffer_pct))
            .cloned()
            .collect();
        out.sort_by_key(|h| (h.health_factor, h.user));
        out
    }

    /// Replace the contents with a fresh scan
    pub fn refill(&mut self, snapshot: Vec<AccountHealth>) {
        self.clear();
        for health in snapshot {
            self.push(health);
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }
}

impl Default for HealthQueue {
    fn default() -> Self {
        Self::new()
    }
}
