//! Array-backed binary min-heap.
//!
//! Implicit layout: parent(i) = (i - 1) / 2, children(i) = 2i + 1, 2i + 2.
//! Kept as a growable array with index math so push/pop stay
//! allocation-free once the backing storage is warm.

/// A binary min-heap: `pop` returns the smallest element
#[derive(Debug, Clone, Default)]
pub struct MinHeap<T: Ord> {
    items: Vec<T>,
}

impl<T: Ord> MinHeap<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let top = self.items.pop();
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        top
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove every element, in arbitrary order
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.items[index] >= self.items[parent] {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.items[left] < self.items[smallest] {
                smallest = left;
            }
            if right < len && self.items[right] < self.items[smallest] {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.items.swap(index, smallest);
            index = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_returns_minimum() {
        let mut heap = MinHeap::new();
        for value in [5, 1, 4, 2, 3] {
            heap.push(value);
        }

        let mut drained = Vec::new();
        while let Some(value) = heap.pop() {
            drained.push(value);
        }
        assert_eq!(drained, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_size_tracks_pushes_and_pops() {
        let mut heap = MinHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.pop(), None);

        for value in 0..10 {
            heap.push(value);
        }
        assert_eq!(heap.len(), 10);

        heap.pop();
        heap.pop();
        assert_eq!(heap.len(), 8);

        heap.push(42);
        assert_eq!(heap.len(), 9);
    }

    #[test]
    fn test_interleaved_operations_keep_invariant() {
        let mut heap = MinHeap::new();
        heap.push(7);
        heap.push(3);
        assert_eq!(heap.peek(), Some(&3));
        assert_eq!(heap.pop(), Some(3));

        heap.push(1);
        heap.push(9);
        heap.push(0);
        assert_eq!(heap.pop(), Some(0));
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(7));
        assert_eq!(heap.pop(), Some(9));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut heap = MinHeap::new();
        for value in [2, 2, 1, 1] {
            heap.push(value);
        }
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(2));
        assert_eq!(heap.pop(), Some(2));
    }
}
