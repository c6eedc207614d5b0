//! Strictly sequential write queue
//!
//! Jobs leave the queue in insertion order, one at a time. A taken job
//! mutably borrows the queue until it is dropped, so the next job cannot be
//! taken while a write is still in flight: the dispatcher has to await each
//! write before asking for the next one. This keeps the target store's load
//! at a single request and the run log in row order.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct WriteQueue<T> {
    pending: VecDeque<T>,
    total: usize,
    taken: usize,
}

impl<T> WriteQueue<T> {
    pub fn new(jobs: impl IntoIterator<Item = T>) -> Self {
        let pending: VecDeque<T> = jobs.into_iter().collect();
        let total = pending.len();
        Self {
            pending,
            total,
            taken: 0,
        }
    }

    /// Jobs not yet taken
    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Take the next job
    pub fn next_job(&mut self) -> Option<Job<'_, T>> {
        let item = self.pending.pop_front()?;
        self.taken += 1;
        Some(Job {
            position: self.taken,
            total: self.total,
            item,
            _queue: self,
        })
    }
}

/// A job in flight, holding the queue until it is finished
#[derive(Debug)]
pub struct Job<'q, T> {
    position: usize,
    total: usize,
    item: T,
    _queue: &'q mut WriteQueue<T>,
}

impl<T> Job<'_, T> {
    /// 1-based position in the queue
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    /// Consume the job, releasing the queue
    #[cfg(test)]
    pub fn into_item(self) -> T {
        self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_leave_in_order() {
        let mut queue = WriteQueue::new(["a", "b", "c"]);
        assert_eq!(queue.total(), 3);

        let mut seen = Vec::new();
        while let Some(job) = queue.next_job() {
            seen.push((job.position(), job.total(), *job.item()));
        }

        assert_eq!(seen, vec![(1, 3, "a"), (2, 3, "b"), (3, 3, "c")]);
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue: WriteQueue<u8> = WriteQueue::new(Vec::new());
        assert!(queue.next_job().is_none());
        assert_eq!(queue.total(), 0);
    }

    #[test]
    fn test_into_item() {
        let mut queue = WriteQueue::new(vec![String::from("x")]);
        let job = queue.next_job().unwrap();
        assert_eq!(job.into_item(), "x");
        assert_eq!(queue.remaining(), 0);
    }
}
