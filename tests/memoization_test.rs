use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use memofn::prelude::*;

fn hash_code<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Wraps `f` so every real invocation bumps `calls`
fn counted<A, B, R>(
    calls: &Arc<AtomicUsize>,
    f: impl Fn(A, B) -> R + Send + Sync,
) -> impl Fn(A, B) -> R + Send + Sync {
    let calls = Arc::clone(calls);
    move |a, b| {
        calls.fetch_add(1, Ordering::SeqCst);
        f(a, b)
    }
}

#[test]
fn test_reference_and_primitive_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let f = counted(&calls, |x: Arc<str>, y: i32| format!("{}{}", x, hash_code(&y)));
    let memo = f.memoized();
    let obj1: Arc<str> = Arc::from("obj1");

    let expected = format!("obj1{}", hash_code(&5));
    for _ in 0..3 {
        assert_eq!(memo.apply(Arc::clone(&obj1), 5), expected);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(
        memo.apply(Arc::clone(&obj1), 6),
        format!("obj1{}", hash_code(&6))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_at_most_once_for_repeated_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let memo = counted(&calls, |a: u64, b: u64| a.pow(b as u32)).memoized();

    for _ in 0..100 {
        assert_eq!(memo.apply(2, 10), 1024);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let stats = memo.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 99);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_memoized_matches_unwrapped_values() {
    let f = |a: i64, b: i64| a.wrapping_mul(31).wrapping_add(b);
    let memo: Memoized<_, (i64, i64)> = Memoized::new(f);

    for a in -5..5 {
        for b in -5..5 {
            assert_eq!(memo.apply(a, b), f(a, b));
            assert_eq!(memo.apply(a, b), f(a, b));
        }
    }
    assert_eq!(memo.len(), 100);
}

#[test]
fn test_distinct_tuples_are_cached_independently() {
    let calls = Arc::new(AtomicUsize::new(0));
    let memo = counted(&calls, |a: char, b: bool| format!("{a}:{b}")).memoized();

    assert_eq!(memo.apply('a', true), "a:true");
    assert_eq!(memo.apply('a', false), "a:false");
    assert_eq!(memo.apply('b', true), "b:true");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    assert_eq!(memo.cached(&('a', false)), Some("a:false".to_string()));
    assert_eq!(memo.cached(&('c', false)), None);
}

#[test]
fn test_memoize_is_idempotent() {
    let first = memoize(|s: String| s.to_uppercase());
    let probe = first.clone();
    let second = memoize(first);
    let third = memoize_checked(Some(second)).unwrap();

    assert!(Memoized::ptr_eq(&probe, &third));
    assert!(Memoize::is_memoized(&third));
}

#[test]
fn test_absent_callable_is_rejected() {
    let missing: Option<fn(u8, u8) -> u8> = None;
    match memoize_checked(missing) {
        Err(MemoError::InvalidArgument(message)) => assert!(message.contains("absent")),
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[test]
fn test_absent_argument_components_are_valid_keys() {
    let calls = Arc::new(AtomicUsize::new(0));
    let memo = counted(&calls, |name: Option<String>, n: u8| {
        name.map_or(n as usize, |s| s.len() + n as usize)
    })
    .memoized();

    assert_eq!(memo.apply(None, 1), 1);
    assert_eq!(memo.apply(Some(String::new()), 1), 1);
    assert_eq!(memo.apply(None, 1), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(memo.len(), 2);
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("backend unavailable for {0}")]
struct Unavailable(u32);

#[test]
fn test_failures_are_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lookup = move |id: u32, region: &'static str| -> Result<String, Unavailable> {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        if attempt < 2 {
            Err(Unavailable(id))
        } else {
            Ok(format!("{region}-{id}"))
        }
    };
    let memo = lookup.try_memoized();

    assert_eq!(memo.apply(7, "eu"), Err(Unavailable(7)));
    assert_eq!(memo.apply(7, "eu"), Err(Unavailable(7)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(memo.is_empty());

    assert_eq!(memo.apply(7, "eu"), Ok("eu-7".to_string()));
    assert_eq!(memo.apply(7, "eu"), Ok("eu-7".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let stats = memo.stats();
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_panicking_callable_is_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let memo = (move |n: u32| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first attempt for {n} fails");
        }
        n * 3
    })
    .memoized();

    let first = panic::catch_unwind(AssertUnwindSafe(|| memo.apply(4)));
    assert!(first.is_err());
    assert!(memo.is_empty());
    assert_eq!(memo.cached(&(4,)), None);

    assert_eq!(memo.apply(4), 12);
    assert_eq!(memo.apply(4), 12);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(memo.len(), 1);
}

#[test]
fn test_try_memoize_is_idempotent() {
    let memo = try_memoize(|a: i32, b: i32| a.checked_div(b).ok_or("division by zero"));
    let probe = memo.clone();
    let again = try_memoize(memo);

    assert!(TryMemoized::ptr_eq(&probe, &again));
    assert_eq!(again.apply(9, 3), Ok(3));
    assert_eq!(again.apply(9, 0), Err("division by zero"));
    assert_eq!(probe.len(), 1);
}

#[test]
fn test_combinators_then_memoize() {
    let calls = Arc::new(AtomicUsize::new(0));
    let in_range = counted(&calls, |x: i32, limit: i32| x.abs() <= limit);
    let is_even = |x: i32, _limit: i32| x % 2 == 0;
    let memo = in_range.and(is_even).negate().memoized();

    assert!(!memo.apply(4, 10));
    assert!(memo.apply(3, 10));
    assert!(memo.apply(40, 10));
    assert!(!memo.apply(4, 10));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_config_is_applied() {
    memofn::utils::logging::init_logging(memofn::utils::logging::LogFormat::Text).unwrap();

    let config = MemoConfig::default()
        .with_label("rounding")
        .with_initial_capacity(64);
    let round_down = |x: u32, step: u32| x / step * step;
    let memo: Memoized<_, (u32, u32)> = Memoized::with_config(round_down, config);
    assert_eq!(memo.apply(17, 5), 15);
    assert!(format!("{:?}", memo).contains("rounding"));
}
