//! End-to-end pool scenarios

use bytes::BytesMut;
use slabpool::pool::partition;
use slabpool::BufferPool;

/// Full take/put/expand walk-through on a 10 x 10 pool
#[test]
fn test_smoke_buffer_pool() {
    let pool = BufferPool::new(10, 10);
    assert_eq!(pool.len(), 10);

    let buf = pool.take().unwrap();
    assert_eq!(pool.len(), 9);
    assert!(pool.put(buf));
    assert_eq!(pool.len(), 10);

    pool.expand(10);
    assert_eq!(pool.len(), 20);
    assert_eq!(pool.capacity(), 20);

    let pile: Vec<BytesMut> = std::iter::from_fn(|| pool.take()).collect();
    assert_eq!(pile.len(), 20);
    assert!(pool.take().is_none());

    assert!(!pool.put(BytesMut::zeroed(100)));

    for buf in pile {
        assert!(pool.put(buf));
    }
    assert_eq!(pool.len(), 20);

    // Full: even a correctly sized buffer is turned away
    assert!(!pool.put(BytesMut::zeroed(10)));
    assert_eq!(pool.len(), 20);

    let _held = pool.take().unwrap();
    assert_eq!(pool.len(), 19);

    // Wrong size is rejected regardless of room
    assert!(!pool.put(BytesMut::zeroed(100)));
    assert_eq!(pool.len(), 19);
}

/// Drained buffers never overlap, across the original and expanded regions
#[test]
fn test_drained_buffers_are_disjoint() {
    let pool = BufferPool::new(24, 8);
    pool.expand(8);
    pool.expand(4);

    let mut ranges: Vec<(usize, usize)> = std::iter::from_fn(|| pool.take())
        .map(|b| (b.as_ptr() as usize, b.len()))
        .collect();
    assert_eq!(ranges.len(), 20);

    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        let (start, len) = pair[0];
        assert!(start + len <= pair[1].0);
    }
}

/// Writes through taken buffers land in the backing region at their offsets
#[test]
fn test_region_views_alias() {
    let (mut parts, region) = partition::create(10, 10);

    for (k, part) in parts.iter_mut().enumerate() {
        part.fill(k as u8);
    }

    let whole = region.reassemble(parts).unwrap();
    for (k, &b) in whole.iter().enumerate() {
        assert_eq!(b, (k / 10) as u8);
    }
}

/// Take-then-deferred-put through a lease
#[test]
fn test_lease_scope() {
    let pool = BufferPool::new(10, 1000);

    {
        let mut buffer = pool.lease().unwrap();
        for (k, b) in buffer.iter_mut().enumerate() {
            *b = (k & 0xFF) as u8;
        }
        assert_eq!(pool.len(), 999);
    }

    assert_eq!(pool.len(), 1000);
}
