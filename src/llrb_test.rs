use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::prelude::random;
use rand::seq::SliceRandom;
use rand::{rngs::SmallRng, SeedableRng};

use crate::llrb::Llrb;

#[test]
fn test_id() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");
    assert_eq!(llrb.id(), "test-llrb".to_string());
}

#[test]
fn test_empty() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");
    assert_eq!(llrb.len(), 0);
    assert!(llrb.is_empty());
    assert!(llrb.get(&10).is_none());
    assert!(llrb.delete(&10).is_none());
    assert!(llrb.delete_min().is_none());
    assert!(llrb.delete_max().is_none());
    assert!(llrb.keys().is_empty());
    assert_eq!(llrb.validate(), Ok(0));
    assert_eq!(llrb.to_dot(), "digraph llrb {\n}".to_string());
}

#[test]
fn test_set() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");
    let mut refns = RefNodes::new(10);

    for key in [2_i64, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(llrb.set(*key, 10).is_none());
        refns.set(*key, 10);
        assert!(llrb.validate().is_ok());
    }

    assert_eq!(llrb.len(), 10);

    for i in 0..10 {
        let val = llrb.get(&i);
        let refval = refns.get(i);
        assert_eq!(val, refval);
    }
    assert_eq!(llrb.keys(), refns.keys());
}

#[test]
fn test_set_overwrite() {
    let llrb: Llrb<i64, &str, _> = Llrb::with_ord("test-llrb");

    assert!(llrb.set(5, "a").is_none());
    assert_eq!(llrb.set(5, "b"), Some("a"));
    assert_eq!(llrb.get(&5), Some("b"));
    assert_eq!(llrb.len(), 1);
    assert!(llrb.validate().is_ok());
}

// after every insert the tree must hold all five invariants, and the
// keys must come back in comparator order.
#[test]
fn test_set_sequence() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");

    for key in [0_i64, 2, 26, 33, 15, 59, 78, 47, 89, 94].iter() {
        assert!(llrb.set(*key, *key * 2).is_none());
        assert!(llrb.validate().is_ok());
    }

    assert_eq!(llrb.len(), 10);
    assert_eq!(llrb.keys(), vec![0, 2, 15, 26, 33, 47, 59, 78, 89, 94]);
}

#[test]
fn test_delete() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");
    let mut refns = RefNodes::new(11);

    for key in [2_i64, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(llrb.set(*key, 100).is_none());
        refns.set(*key, 100);
    }

    // delete a missing key, shape and contents must be untouched.
    let shape = llrb.to_dot();
    assert!(llrb.delete(&10).is_none());
    assert!(refns.delete(10).is_none());
    assert_eq!(llrb.to_dot(), shape);
    assert_eq!(llrb.len(), 10);
    assert!(llrb.validate().is_ok());

    // delete all entries, one at a time.
    for i in 0..10 {
        let val = llrb.delete(&i);
        let refval = refns.delete(i);
        assert_eq!(val, refval);
        assert!(llrb.get(&i).is_none());
        assert!(llrb.validate().is_ok());
    }
    assert_eq!(llrb.len(), 0);
    assert!(llrb.keys().is_empty());
}

#[test]
fn test_delete_min_drain() {
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");

    let mut keys: Vec<i64> = (0..200).collect();
    keys.shuffle(&mut rng);
    for key in keys.iter() {
        assert!(llrb.set(*key, *key * 10).is_none());
    }

    for key in 0..200 {
        assert_eq!(llrb.delete_min(), Some((key, key * 10)));
        assert!(llrb.validate().is_ok());
    }
    assert_eq!(llrb.delete_min(), None);
    assert!(llrb.is_empty());
}

#[test]
fn test_delete_max_drain() {
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");

    let mut keys: Vec<i64> = (0..200).collect();
    keys.shuffle(&mut rng);
    for key in keys.iter() {
        assert!(llrb.set(*key, *key * 10).is_none());
    }

    for key in (0..200).rev() {
        assert_eq!(llrb.delete_max(), Some((key, key * 10)));
        assert!(llrb.validate().is_ok());
    }
    assert_eq!(llrb.delete_max(), None);
    assert!(llrb.is_empty());
}

#[test]
fn test_insert_1000_remove_500() {
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");

    let mut keys: Vec<i64> = (0..1000).collect();
    keys.shuffle(&mut rng);
    for key in keys.iter() {
        assert!(llrb.set(*key, *key * 10).is_none());
    }
    assert_eq!(llrb.len(), 1000);

    keys.shuffle(&mut rng);
    for key in keys[..500].iter() {
        assert_eq!(llrb.delete(key), Some(*key * 10));
    }

    assert_eq!(llrb.len(), 500);
    assert!(llrb.validate().is_ok());

    let mut left: Vec<i64> = keys[500..].to_vec();
    left.sort();
    assert_eq!(llrb.keys(), left);
}

#[test]
fn test_random() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());

    assert_eq!(llrb.random(&mut rng), None);

    assert!(llrb.set(0, 0).is_none());
    assert_eq!(llrb.random(&mut rng), Some((0, 0)));

    for key in 1..10_000 {
        assert!(llrb.set(key, key * 10).is_none());
    }
    for _i in 0..20_000 {
        let (key, value) = llrb.random(&mut rng).unwrap();
        assert!(key >= 0 && key < 10_000);
        assert_eq!(value, key * 10);
    }
}

#[test]
fn test_reverse_comparator() {
    let llrb = Llrb::new("test-llrb-desc", |a: &i64, b: &i64| b < a);

    for key in [5_i64, 1, 9, 3, 7].iter() {
        assert!(llrb.set(*key, *key).is_none());
    }

    assert!(llrb.validate().is_ok());
    assert_eq!(llrb.keys(), vec![9, 7, 5, 3, 1]);
    assert_eq!(llrb.get(&5), Some(5));
    assert_eq!(llrb.delete_min(), Some((9, 9)));
    assert_eq!(llrb.delete_max(), Some((1, 1)));
    assert!(llrb.validate().is_ok());
}

#[test]
fn test_to_dot() {
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");

    assert!(llrb.set(1, 10).is_none());
    assert!(llrb.set(2, 20).is_none());
    assert!(llrb.set(3, 30).is_none());

    let out = concat!(
        "digraph llrb {\n",
        "2 -> 1 [color = \"black\", label = \"L\"]\n",
        "2 -> 3 [color = \"black\", label = \"R\"]\n",
        "}"
    );
    assert_eq!(llrb.to_dot(), out.to_string());
}

#[test]
fn test_crud() {
    let size = 500;
    let llrb: Llrb<i64, i64, _> = Llrb::with_ord("test-llrb");
    let mut refns = RefNodes::new(size);

    for _ in 0..20_000 {
        let key: i64 = (random::<i64>() % (size as i64)).abs();
        let value: i64 = random();
        match (random::<i64>() % 4).abs() {
            0 => {
                let val = llrb.set(key, value);
                let refval = refns.set(key, value);
                assert_eq!(val, refval);
            }
            1 => {
                let val = llrb.delete(&key);
                let refval = refns.delete(key);
                assert_eq!(val, refval);
            }
            2 => {
                let val = llrb.get(&key);
                let refval = refns.get(key);
                assert_eq!(val, refval);
            }
            3 => {
                let val = llrb.delete_min();
                let refval = refns.delete_min();
                assert_eq!(val, refval);
            }
            op => panic!("unreachable {}", op),
        };

        assert!(llrb.validate().is_ok());
    }

    assert_eq!(llrb.len(), refns.len());
    assert_eq!(llrb.keys(), refns.keys());
}

#[test]
fn test_concurrent_writers() {
    let llrb: Arc<Llrb<i64, i64, _>> = Arc::new(Llrb::with_ord("test-llrb"));

    let mut handles = vec![];
    for t in 0..4_i64 {
        let llrb = Arc::clone(&llrb);
        handles.push(thread::spawn(move || {
            for key in (t * 1000)..((t + 1) * 1000) {
                assert!(llrb.set(key, key * 10).is_none());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(llrb.len(), 4000);
    assert!(llrb.validate().is_ok());
    assert_eq!(llrb.keys(), (0..4000).collect::<Vec<i64>>());
}

#[test]
fn test_concurrent_readers() {
    let llrb: Arc<Llrb<i64, i64, _>> = Arc::new(Llrb::with_ord("test-llrb"));
    for key in 0..1000 {
        assert!(llrb.set(key, key * 10).is_none());
    }

    let writer = {
        let llrb = Arc::clone(&llrb);
        thread::spawn(move || {
            for key in 0..1000 {
                assert_eq!(llrb.delete(&key), Some(key * 10));
            }
        })
    };
    let mut readers = vec![];
    for _ in 0..2 {
        let llrb = Arc::clone(&llrb);
        readers.push(thread::spawn(move || {
            for _ in 0..10_000 {
                let key: i64 = (random::<i64>() % 1000).abs();
                // the entry is either still there with its value, or
                // already deleted, nothing in between.
                match llrb.get(&key) {
                    Some(value) => assert_eq!(value, key * 10),
                    None => (),
                }
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(llrb.len(), 0);
}

fn make_seed() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

include!("./ref_test.rs");
