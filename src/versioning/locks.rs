//! Per-quiz advisory locks.
//!
//! Two operations are read-modify-write on per-quiz counters: snapshot
//! version assignment and the apply merger's order_index assignment.
//! Both must hold the quiz's lock across read and write; everything else
//! in the engine runs unserialized.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

#[derive(Default)]
pub struct QuizLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl QuizLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the lock for one quiz, created on first use.
    pub fn for_quiz(&self, quiz_id: &Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("quiz lock registry poisoned");
        locks.entry(*quiz_id).or_default().clone()
    }
}

/// Acquire the per-quiz critical section.
pub fn acquire(lock: &Arc<Mutex<()>>) -> MutexGuard<'_, ()> {
    lock.lock().expect("per-quiz lock poisoned")
}
