use std::sync::atomic::{AtomicUsize, Ordering};

// Single counter shared by every scene object
static NEXT_OBJECT_ID: AtomicUsize = AtomicUsize::new(1);

/// Hands out a fresh scene object id. Ids are never reused within a session.
pub fn generate_id() -> usize {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}
