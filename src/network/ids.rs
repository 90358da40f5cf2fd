//! Request id allocation

/// Hands out correlation ids for one session
///
/// Ids start at 1 and strictly increase; they are never reused within the
/// session.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: i32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> i32 {
        self.last = self.last.wrapping_add(1);
        self.last
    }

    /// Most recently allocated id, 0 if none yet
    pub fn last(&self) -> i32 {
        self.last
    }
}
