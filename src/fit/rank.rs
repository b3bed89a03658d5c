//! Lowest-K selection over evaluated grid points
//!
//! A bounded max-heap keeps the K best points seen so far: O(N log K)
//! instead of sorting the whole grid. Ties keep grid order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::GridPoint;

// Max-heap item: the worst retained point sits on top and is evicted first
#[derive(Debug)]
struct MaxHeapItem {
    loss: f64,
    index: usize,
}

impl PartialEq for MaxHeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MaxHeapItem {}

impl Ord for MaxHeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.loss
            .total_cmp(&other.loss)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for MaxHeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `k` points with the smallest loss, ascending.
#[must_use]
pub fn lowest_k(points: &[GridPoint], k: usize) -> Vec<GridPoint> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<MaxHeapItem> = BinaryHeap::with_capacity(k);
    for (index, point) in points.iter().enumerate() {
        let item = MaxHeapItem {
            loss: point.loss,
            index,
        };
        if heap.len() < k {
            heap.push(item);
        } else if let Some(top) = heap.peek() {
            if item < *top {
                heap.pop();
                heap.push(item);
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|item| points[item.index])
        .collect()
}
