use std::collections::{BTreeMap, HashMap, HashSet};

use bplus::{BPTree, Result, KD};
use rand::{rngs::StdRng, Rng, SeedableRng};

// Here are the highest level APIs tests.
// Some `mod`s also have their own tests inside.

#[test]
fn test_crud() -> Result<()> {
    let mut tree = BPTree::default();
    let key_value_pairs = obtain_key_value_pairs(5000, u32::MAX);

    // Test `set` and `get`.
    for (key, value) in &key_value_pairs {
        assert_eq!(tree.set(*key, value.clone()), None);
    }
    for (key, value) in &key_value_pairs {
        assert_eq!(tree.get(key), Some(value));
    }
    assert_eq!(tree.len(), key_value_pairs.len());
    tree.verify()?;

    // Test `delete`.
    let deleted_pairs = &key_value_pairs[..2000];
    let key_value_pairs = &key_value_pairs[2000..];

    for (key, _) in deleted_pairs {
        assert!(tree.delete(key));
    }
    for (key, value) in key_value_pairs {
        assert_eq!(tree.get(key), Some(value));
    }
    for (key, _) in deleted_pairs {
        assert_eq!(tree.get(key), None);
        assert!(!tree.delete(key));
    }
    assert_eq!(tree.len(), key_value_pairs.len());
    tree.verify()?;

    // Test `set` after `delete`.
    for (key, value) in deleted_pairs {
        tree.set(*key, value.clone());
    }
    for (key, value) in deleted_pairs {
        assert_eq!(tree.get(key), Some(value));
    }
    tree.verify()?;

    // Test `delete all`.
    for (key, value) in key_value_pairs.iter().chain(deleted_pairs) {
        assert_eq!(tree.remove(key), Some((*key, value.clone())));
    }
    assert!(tree.is_empty());
    assert_eq!(tree.first(), None);
    assert_eq!(tree.last(), None);
    tree.verify()
}

#[test]
fn test_upsert() -> Result<()> {
    let mut tree = BPTree::default();
    let mut reference = HashMap::new();
    let mut rng = rand::thread_rng();

    for _ in 0..20000 {
        let key = rng.gen_range(0..3000u32);
        let value = rng.gen::<u64>();
        assert_eq!(tree.set(key, value), reference.insert(key, value));
    }
    for key in 0..3000 {
        assert_eq!(tree.get(&key), reference.get(&key));
        assert_eq!(tree.contains(&key), reference.contains_key(&key));
    }
    assert_eq!(tree.len(), reference.len());
    tree.verify()
}

#[test]
fn test_random_workload() -> Result<()> {
    let mut tree = BPTree::default();
    let mut reference = BTreeMap::new();
    let mut rng = rand::thread_rng();

    for round in 0..50_000 {
        let key = rng.gen_range(0..4000u32);
        // Lean towards inserts first and deletes later, so the tree grows and shrinks again.
        if rng.gen_bool(if round < 25_000 { 0.7 } else { 0.3 }) {
            assert_eq!(tree.set(key, round), reference.insert(key, round));
        } else {
            assert_eq!(tree.delete(&key), reference.remove(&key).is_some());
        }
        assert_eq!(tree.len(), reference.len());

        if round % 1000 == 0 {
            tree.verify()?;
        }
    }

    tree.verify()?;
    assert!(tree.iter().eq(reference.iter()));
    assert_eq!(tree.first(), reference.first_key_value());
    assert_eq!(tree.last(), reference.last_key_value());
    Ok(())
}

#[test]
fn test_random_workload_deep_tree() -> Result<()> {
    let mut tree = BPTree::default();
    let mut reference = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let key_range = 0..400_000u32;

    // Far more entries than two index levels can address, so that random deletes rotate
    // and merge index pages below the root.
    for round in 0..400_000 {
        let key = rng.gen_range(key_range.clone());
        assert_eq!(tree.set(key, round), reference.insert(key, round));
    }
    tree.verify()?;

    for round in 0..600_000 {
        let key = rng.gen_range(key_range.clone());
        if rng.gen_bool(0.35) {
            assert_eq!(tree.set(key, round), reference.insert(key, round));
        } else {
            assert_eq!(tree.remove(&key), reference.remove_entry(&key));
        }

        if round % 50_000 == 0 {
            tree.verify()?;
            assert_eq!(tree.len(), reference.len());
        }
    }

    tree.verify()?;
    assert!(tree.iter().eq(reference.iter()));
    for _ in 0..10_000 {
        let key = rng.gen_range(key_range.clone());
        assert_eq!(tree.get(&key), reference.get(&key));
    }
    Ok(())
}

#[test]
fn test_sequential_grow_and_shrink() -> Result<()> {
    let mut tree = BPTree::default();
    let count = 100_000u32;

    for key in 0..count {
        tree.set(key, key);
    }
    tree.verify()?;

    // Delete from the back half first, then the front half in reverse.
    for key in count / 2..count {
        assert!(tree.delete(&key));
    }
    tree.verify()?;
    for key in (0..count / 2).rev() {
        assert_eq!(tree.remove(&key), Some((key, key)));
        if key % 10_000 == 0 {
            tree.verify()?;
        }
    }
    assert!(tree.is_empty());
    tree.verify()
}

#[test]
fn test_scenario_custom_comparator() {
    let mut tree = BPTree::new(|a: &i32, b: &i32| (a - b).cmp(&0));
    tree.set(5, "five");
    tree.set(10, "ten");
    tree.set(1, "one");

    assert_eq!(tree.first(), Some((&1, &"one")));
    assert_eq!(tree.last(), Some((&10, &"ten")));
    assert_eq!(tree.len(), 3);

    assert!(tree.delete(&5));
    assert_eq!(tree.get(&5), None);
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_scenario_split() {
    let mut tree = BPTree::default();
    let count = 2 * KD as u32 + 1;
    for key in 0..count {
        tree.set(key, ());
    }

    let mut e = tree.seek_first().unwrap();
    for key in 0..count {
        assert_eq!(e.next(&tree), Some((&key, &())));
    }
    assert_eq!(e.next(&tree), None);
    assert!(e.is_exhausted());
}

#[test]
fn test_enumerator_order() -> Result<()> {
    let mut tree = BPTree::new(|a: &u32, b: &u32| b.cmp(a));
    let key_value_pairs = obtain_key_value_pairs(3000, 100_000);
    for (key, value) in &key_value_pairs {
        tree.set(*key, value.clone());
    }
    tree.verify()?;

    // The comparator orders keys descendingly.
    let mut sorted_keys = key_value_pairs.iter().map(|x| x.0).collect::<Vec<_>>();
    sorted_keys.sort_by(|l, r| r.cmp(l));

    let mut keys = Vec::new();
    let mut e = tree.seek_first().unwrap();
    while let Some((key, _)) = e.next(&tree) {
        keys.push(*key);
    }
    assert_eq!(keys, sorted_keys);

    let mut keys = Vec::new();
    let mut e = tree.seek_last().unwrap();
    while let Some((key, _)) = e.prev(&tree) {
        keys.push(*key);
    }
    sorted_keys.reverse();
    assert_eq!(keys, sorted_keys);
    Ok(())
}

#[test]
fn test_seek() {
    let mut tree = BPTree::default();
    for key in (0..1000u32).map(|key| key * 3) {
        tree.set(key, ());
    }

    let (mut e, hit) = tree.seek(&300);
    assert!(hit);
    assert_eq!(e.next(&tree), Some((&300, &())));
    assert_eq!(e.next(&tree), Some((&303, &())));

    let (mut e, hit) = tree.seek(&301);
    assert!(!hit);
    assert_eq!(e.next(&tree), Some((&303, &())));

    let (mut e, _) = tree.seek(&301);
    assert_eq!(e.prev(&tree), Some((&300, &())));
    assert_eq!(e.prev(&tree), Some((&297, &())));

    let (mut e, hit) = tree.seek(&5000);
    assert!(!hit);
    assert_eq!(e.next(&tree), None);
    let (mut e, _) = tree.seek(&5000);
    assert_eq!(e.prev(&tree), Some((&2997, &())));

    let empty = BPTree::<u32, ()>::default();
    assert!(empty.seek_first().is_none());
    assert!(empty.seek_last().is_none());
    let (mut e, hit) = empty.seek(&1);
    assert!(!hit);
    assert_eq!(e.next(&empty), None);
    assert!(e.is_exhausted());
}

#[test]
fn test_enumerator_exhausted_is_sticky() {
    let mut tree = BPTree::default();
    for key in 0..10 {
        tree.set(key, ());
    }

    let (mut e, _) = tree.seek(&8);
    assert_eq!(e.next(&tree), Some((&8, &())));
    assert_eq!(e.next(&tree), Some((&9, &())));
    assert_eq!(e.next(&tree), None);

    tree.set(10, ());
    tree.set(11, ());
    assert_eq!(e.next(&tree), None);
    assert_eq!(e.prev(&tree), None);

    let mut e = tree.seek_first().unwrap();
    assert_eq!(e.prev(&tree), Some((&0, &())));
    tree.set(-1, ());
    assert_eq!(e.prev(&tree), None);
}

#[test]
fn test_enumerator_resync() {
    let mut tree = BPTree::default();
    for key in 0..1000 {
        tree.set(key, key);
    }

    // The pending key is deleted before the enumerator yields it.
    let (mut e, _) = tree.seek(&100);
    tree.delete(&100);
    assert_eq!(e.next(&tree), Some((&101, &101)));

    // The key after the one yielded last is deleted.
    tree.delete(&102);
    assert_eq!(e.next(&tree), Some((&103, &103)));

    // A key inserted right after the current position is yielded.
    tree.set(102, 0);
    assert_eq!(e.next(&tree), Some((&104, &104)));
    tree.set(105, -1);
    assert_eq!(e.next(&tree), Some((&105, &-1)));

    // The same going backwards.
    let (mut e, _) = tree.seek(&500);
    tree.delete(&500);
    assert_eq!(e.prev(&tree), Some((&499, &499)));
    tree.delete(&498);
    assert_eq!(e.prev(&tree), Some((&497, &497)));
    tree.set(498, 0);
    assert_eq!(e.prev(&tree), Some((&496, &496)));

    // Reads don't count as modifications.
    let (mut e, _) = tree.seek(&700);
    tree.get(&700);
    tree.put(700, |_| None);
    assert_eq!(e.next(&tree), Some((&700, &700)));
}

#[test]
fn test_enumerate_while_mutating() {
    let mut tree = BPTree::default();
    let mut reference = BTreeMap::new();
    let mut rng = rand::thread_rng();

    for key in (0..5000u32).map(|key| key * 2) {
        tree.set(key, ());
        reference.insert(key, ());
    }
    let initial = reference.keys().copied().collect::<Vec<_>>();
    let mut touched = HashSet::new();

    let mut yielded = Vec::new();
    let mut e = tree.seek_first().unwrap();
    while let Some((&key, _)) = e.next(&tree) {
        assert!(reference.contains_key(&key));
        yielded.push(key);

        for _ in 0..rng.gen_range(0..3) {
            let key = rng.gen_range(0..10_000u32);
            touched.insert(key);
            if rng.gen_bool(0.5) {
                tree.set(key, ());
                reference.insert(key, ());
            } else {
                tree.delete(&key);
                reference.remove(&key);
            }
        }
    }

    assert!(yielded.windows(2).all(|w| w[0] < w[1]));
    // Every key that stayed untouched throughout was yielded.
    let yielded = yielded.into_iter().collect::<HashSet<_>>();
    for key in initial.iter().filter(|key| !touched.contains(key)) {
        assert!(yielded.contains(key));
    }
}

#[test]
fn test_put() {
    let mut tree: BPTree<&str, u32> = BPTree::default();

    assert_eq!(tree.put("a", |old| old.map(|v| v + 1)), (None, false));
    assert!(tree.is_empty());

    assert_eq!(tree.put("a", |old| Some(old.map_or(1, |v| v + 1))), (None, true));
    assert_eq!(tree.put("a", |old| Some(old.map_or(1, |v| v + 1))), (Some(1), true));
    assert_eq!(tree.get(&"a"), Some(&2));

    assert_eq!(tree.put("a", |_| None), (None, false));
    assert_eq!(tree.get(&"a"), Some(&2));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_clear() -> Result<()> {
    let mut tree = BPTree::default();
    for key in 0..10_000 {
        tree.set(key, key.to_string());
    }

    let (mut e, _) = tree.seek(&10);
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.get(&10), None);
    assert_eq!(e.next(&tree), None);
    tree.verify()?;

    // The tree is usable again after clearing.
    for key in 0..1000 {
        tree.set(key, key.to_string());
    }
    assert_eq!(tree.len(), 1000);
    assert_eq!(tree.get(&999).map(String::as_str), Some("999"));
    tree.verify()
}

#[test]
fn test_iter() {
    let mut tree = BPTree::default();
    let key_value_pairs = obtain_key_value_pairs(2000, 1_000_000);
    for (key, value) in &key_value_pairs {
        tree.set(*key, value.clone());
    }

    let mut sorted = key_value_pairs.clone();
    sorted.sort_by(|l, r| l.0.cmp(&r.0));

    let pairs = tree.iter().map(|(k, v)| (*k, v.clone())).collect::<Vec<_>>();
    assert_eq!(pairs, sorted);
    assert_eq!(tree.iter().len(), sorted.len());

    let reversed = (&tree).into_iter().rev().map(|(k, _)| *k).collect::<Vec<_>>();
    assert!(reversed.iter().eq(sorted.iter().rev().map(|x| &x.0)));
}

fn obtain_key_value_pairs(count: usize, key_max: u32) -> Vec<(u32, String)> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let key = rng.gen_range(0..=key_max);
            (key, rand_string(&mut rng, 16))
        })
        .collect::<HashMap<_, _>>()
        .into_iter()
        .collect()
}

fn rand_string(rng: &mut impl Rng, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| rng.gen_range('a'..='z')).collect()
}
