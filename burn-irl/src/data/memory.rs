use rand::{seq::IteratorRandom, Rng};
use ringbuffer::{AllocRingBuffer, RingBuffer};

pub trait Memory {
    type T;
    type TBatch;

    fn push(&mut self, value: Self::T);

    fn append(&mut self, values: Self::TBatch);

    fn sample_random_batch(&mut self, n: usize) -> Self::TBatch;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-capacity memory; once full, each push evicts the oldest value.
pub struct RingbufferMemory<T: Clone, R: Rng> {
    rng: R,
    buffer: AllocRingBuffer<T>,
}

impl<T: Clone, R: Rng> RingbufferMemory<T, R> {
    pub fn new(capacity: usize, rng: R) -> RingbufferMemory<T, R> {
        RingbufferMemory {
            rng,
            buffer: AllocRingBuffer::new(capacity),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }
}

impl<T: Clone, R: Rng> Memory for RingbufferMemory<T, R> {
    type T = T;
    type TBatch = Vec<T>;

    fn push(&mut self, value: T) {
        self.buffer.push(value);
    }

    fn append(&mut self, values: Self::TBatch) {
        for value in values {
            self.push(value);
        }
    }

    fn sample_random_batch(&mut self, n: usize) -> Vec<T> {
        self.buffer
            .iter()
            .choose_multiple(&mut self.rng, n)
            .into_iter()
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use rand::{rngs::StdRng, SeedableRng};

    use super::{Memory, RingbufferMemory};

    #[test]
    fn test_ringbuffer_memory() {
        let rng = StdRng::seed_from_u64(1234);
        let mut memory = RingbufferMemory::<i32, _>::new(10, rng);
        assert!(memory.is_empty());
        memory.append((0..10).collect());
        assert_eq!(memory.len(), 10);

        let mut sample = memory.sample_random_batch(5);
        assert_eq!(sample.len(), 5);
        sample.sort();
        sample.dedup();
        assert_eq!(sample.len(), 5);

        for i in 10..15 {
            memory.push(i);
        }
        assert_eq!(memory.len(), 10);
        let expected = expect![[r#"
            [
                5,
                6,
                7,
                8,
                9,
                10,
                11,
                12,
                13,
                14,
            ]
        "#]];
        expected.assert_debug_eq(&memory.iter().collect::<Vec<_>>());
        assert!(memory.sample_random_batch(10).iter().all(|x| *x >= 5));
    }
}
