use hllpp::{HllSketch, Mixer};

#[test]
fn test_empty_sketch() {
    let sketch = HllSketch::with_precision(14).unwrap();
    assert!(sketch.is_empty());
    assert_eq!(sketch.cardinality(), 0);
}

#[test]
fn test_single_element() {
    let mut sketch = HllSketch::with_precision(14).unwrap();
    sketch.add(0);
    sketch.add(0);
    sketch.add(0);
    assert_eq!(sketch.cardinality(), 1);
}

#[test]
fn test_linear_counting_regime() {
    let mut sketch = HllSketch::with_precision(14).unwrap();
    for i in 1..=100u64 {
        sketch.add(i);
    }

    let estimate = sketch.cardinality();
    assert!(
        (95..=105).contains(&estimate),
        "estimate should be close to 100, got {}",
        estimate
    );
}

#[test]
fn test_small_range_many_duplicates() {
    let mut sketch = HllSketch::with_precision(14).unwrap();
    for _ in 0..10_000 {
        for i in 1..=10u64 {
            sketch.add(i);
        }
    }

    let estimate = sketch.cardinality();
    assert!(
        (9..=11).contains(&estimate),
        "duplicates should not inflate the estimate, got {}",
        estimate
    );
}

#[test]
fn test_large_range() {
    let mut sketch = HllSketch::with_precision(14).unwrap();
    for i in 1..=1_000_000u64 {
        sketch.add(i);
    }

    let estimate = sketch.cardinality();
    assert!(
        (970_000..=1_030_000).contains(&estimate),
        "estimate should be within 3% of 1M at precision 14, got {}",
        estimate
    );
}

#[test]
fn test_large_range_high_precision() {
    let mut sketch = HllSketch::with_precision(18).unwrap();
    for i in 1..=1_000_000u64 {
        sketch.add(i);
    }

    let estimate = sketch.cardinality();
    assert!(
        (993_000..=1_007_000).contains(&estimate),
        "estimate should be within 0.7% of 1M at precision 18, got {}",
        estimate
    );
}

#[test]
fn test_sparse_promotion() {
    // m = 1024, so the sparse list holds at most 256 entries.
    let mut sketch = HllSketch::with_precision(10).unwrap();
    for i in 1..=257u64 {
        sketch.add(i);
    }
    assert!(
        !sketch.is_sparse(),
        "sketch should have promoted by item 257"
    );

    for i in 258..=300u64 {
        sketch.add(i);
    }
    let estimate = sketch.cardinality();
    assert!(
        (285..=315).contains(&estimate),
        "estimate should be close to 300 after promotion, got {}",
        estimate
    );
}

#[test]
fn test_add_many_matches_add() {
    let items: Vec<u64> = (0..500).collect();

    let mut one_by_one = HllSketch::with_precision(12).unwrap();
    for &item in &items {
        one_by_one.add(item);
    }

    let mut batched = HllSketch::with_precision(12).unwrap();
    batched.add_many(&items);

    assert_eq!(one_by_one, batched);
}

#[test]
fn test_registers_only_grow() {
    let mut sketch = HllSketch::new(10, false, Mixer::default()).unwrap();
    for i in 0..1000u64 {
        sketch.add(i);
    }
    let before = sketch.to_bytes().unwrap();

    for i in 1000..2000u64 {
        sketch.add(i);
    }
    let after = sketch.to_bytes().unwrap();

    // Register payload starts after the 8-byte preamble.
    assert!(
        before[8..]
            .iter()
            .zip(after[8..].iter())
            .all(|(b, a)| a >= b),
        "adding items must never decrease a register"
    );
}

#[test]
fn test_all_mixers_estimate_reasonably() {
    for mixer in [
        Mixer::NumericalRecipes,
        Mixer::Murmur3Finalizer,
        Mixer::Wang,
    ] {
        let mut sketch = HllSketch::new(12, true, mixer).unwrap();
        for i in 0..10_000u64 {
            sketch.add(i);
        }

        let estimate = sketch.cardinality();
        assert!(
            (9_000..=11_000).contains(&estimate),
            "estimate with {:?} should be within 10% of 10000, got {}",
            mixer,
            estimate
        );
    }
}

#[test]
fn test_custom_mixer() {
    fn splitmix(mut z: u64) -> u64 {
        z = z.wrapping_add(0x9e3779b97f4a7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    let mut sketch = HllSketch::new(12, true, Mixer::Custom(splitmix)).unwrap();
    for i in 0..10_000u64 {
        sketch.add(i);
    }

    let estimate = sketch.cardinality();
    assert!(
        (9_000..=11_000).contains(&estimate),
        "estimate with a custom mixer should be within 10% of 10000, got {}",
        estimate
    );
}

#[test]
fn test_reset_clears_state() {
    let mut sketch = HllSketch::with_precision(12).unwrap();
    for i in 0..50_000u64 {
        sketch.add(i);
    }
    assert!(!sketch.is_sparse());

    sketch.reset();
    assert!(sketch.is_sparse());
    assert_eq!(sketch.cardinality(), 0);

    // The sketch is fully usable after a reset.
    for i in 0..100u64 {
        sketch.add(i);
    }
    let estimate = sketch.cardinality();
    assert!((95..=105).contains(&estimate), "got {}", estimate);
}
