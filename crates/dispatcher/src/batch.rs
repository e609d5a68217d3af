//! Batch buffer - FIFO accumulation between flushes

/// Ordered buffer of pending records
///
/// Clearing keeps the allocation, so steady-state flush cycles do not
/// reallocate. Size limits are the flush policy's job, not the buffer's.
#[derive(Debug)]
pub struct BatchBuffer<T> {
    items: Vec<T>,
}

impl<T> BatchBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Drop every record, retaining capacity
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }
}

impl<T> Default for BatchBuffer<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
