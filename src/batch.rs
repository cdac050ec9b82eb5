//! Batcher: groups a fragment stream into fixed-size chunks.
//!
//! Batching bounds the working set handed to the aggregation engine per
//! step; it never reorders elements and never changes which document a
//! fragment belongs to. The final batch may be shorter than the
//! configured size.

/// Iterator adapter yielding `Vec`s of up to `size` elements.
pub struct Batched<I: Iterator> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batched<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.size);
        for element in self.inner.by_ref() {
            batch.push(element);
            if batch.len() == self.size {
                break;
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

/// Extension trait adding [`batched`](BatchedExt::batched) to any iterator.
pub trait BatchedExt: Iterator + Sized {
    /// Group elements into chunks of `size` (minimum 1), preserving order.
    fn batched(self, size: usize) -> Batched<Self> {
        Batched {
            inner: self,
            size: size.max(1),
        }
    }
}

impl<I: Iterator> BatchedExt for I {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_batches() {
        let batches: Vec<Vec<i32>> = (1..=6).batched(2).collect();
        assert_eq!(batches, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_final_batch_may_be_short() {
        let batches: Vec<Vec<i32>> = (1..=5).batched(2).collect();
        assert_eq!(batches, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn test_empty_stream_yields_no_batches() {
        let batches: Vec<Vec<i32>> = std::iter::empty().batched(10).collect();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_order_preserved_across_batches() {
        let flattened: Vec<i32> = (1..=10).batched(3).flatten().collect();
        assert_eq!(flattened, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_size_clamped_to_one() {
        let batches: Vec<Vec<i32>> = (1..=3).batched(0).collect();
        assert_eq!(batches.len(), 3);
    }
}
