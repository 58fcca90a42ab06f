//! Concurrent take/put tests

use bytes::BytesMut;
use parking_lot::Mutex;
use slabpool::BufferPool;
use std::sync::{Arc, Barrier};
use std::thread;

const PARTITION_SIZE: usize = 10;
const TAKERS: usize = 256;

/// As many takers as buffers: every taker gets a distinct buffer and the pool
/// is observed empty before anyone returns
#[test]
fn test_concurrent_exhaustion() {
    let pool = BufferPool::new(PARTITION_SIZE, TAKERS);
    let taken = Arc::new(Barrier::new(TAKERS + 1));
    let release = Arc::new(Barrier::new(TAKERS + 1));
    let ranges = Arc::new(Mutex::new(Vec::with_capacity(TAKERS)));

    let handles: Vec<_> = (0..TAKERS)
        .map(|id| {
            let pool = pool.clone();
            let taken = Arc::clone(&taken);
            let release = Arc::clone(&release);
            let ranges = Arc::clone(&ranges);

            thread::spawn(move || {
                let mut buffer = pool.take().expect("one buffer per taker");
                ranges.lock().push(buffer.as_ptr() as usize);
                taken.wait();

                release.wait();
                for (k, b) in buffer.iter_mut().enumerate() {
                    *b = ((k + id) & 0xFF) as u8;
                }
                let intact = buffer
                    .iter()
                    .enumerate()
                    .all(|(k, &b)| b == ((k + id) & 0xFF) as u8);
                (intact, pool.put(buffer))
            })
        })
        .collect();

    taken.wait();
    assert_eq!(pool.len(), 0);
    assert!(pool.take().is_none());
    release.wait();

    for handle in handles {
        let (intact, returned) = handle.join().unwrap();
        assert!(intact);
        assert!(returned);
    }
    assert_eq!(pool.len(), TAKERS);

    let mut starts = ranges.lock().clone();
    starts.sort_unstable();
    assert_eq!(starts.len(), TAKERS);
    for pair in starts.windows(2) {
        assert!(pair[0] + PARTITION_SIZE <= pair[1]);
    }
}

/// Many short take/put cycles while another thread keeps expanding
#[test]
fn test_churn_with_expansion() {
    const WORKERS: usize = 8;
    const CYCLES: usize = 2_000;
    const EXPANSIONS: usize = 50;

    let pool = BufferPool::new(64, 4);

    crossbeam::thread::scope(|s| {
        for id in 0..WORKERS {
            let pool = &pool;
            s.spawn(move |_| {
                let tag = id as u8;
                for _ in 0..CYCLES {
                    let Some(mut buf) = pool.take() else {
                        thread::yield_now();
                        continue;
                    };
                    buf.fill(tag);
                    thread::yield_now();
                    assert!(buf.iter().all(|&b| b == tag));
                    assert!(pool.put(buf));
                }
            });
        }

        s.spawn(|_| {
            for _ in 0..EXPANSIONS {
                pool.expand(2);
                thread::yield_now();
            }
        });
    })
    .unwrap();

    assert_eq!(pool.capacity(), 4 + 2 * EXPANSIONS);
    assert_eq!(pool.len(), pool.capacity());
    assert_eq!(pool.region_count(), 1 + EXPANSIONS);
}

/// Foreign buffers race against returning owners; the pool never exceeds
/// its capacity
#[test]
fn test_capacity_holds_under_contention() {
    let pool = BufferPool::new(16, 32);
    let held: Vec<BytesMut> = std::iter::from_fn(|| pool.take()).take(16).collect();

    let admitted = crossbeam::thread::scope(|s| {
        let owners = s.spawn(|_| held.into_iter().map(|b| pool.put(b)).filter(|&ok| ok).count());
        let strangers = s.spawn(|_| {
            (0..64)
                .filter(|_| pool.put(BytesMut::zeroed(16)))
                .count()
        });
        owners.join().unwrap() + strangers.join().unwrap()
    })
    .unwrap();

    assert_eq!(admitted, 16);
    assert_eq!(pool.len(), pool.capacity());
    assert_eq!(pool.stats().rejected_full, 64);
}
