use darray_hashmap::{ChainedHashMap, MapError, DEFAULT_BUCKET_COUNT};
use std::ops::ControlFlow;

struct Fixture {
    keys: [String; 3],
    values: [String; 3],
}

fn fixture() -> Fixture {
    Fixture {
        keys: [1, 2, 3].map(|i| format!("test data {i}")),
        values: [1, 2, 3].map(|i| format!("THE VALUE {i}")),
    }
}

#[test]
fn set_get_traverse_delete() {
    let f = fixture();
    let mut map: ChainedHashMap<String, String> = ChainedHashMap::new().expect("create map");
    assert_eq!(DEFAULT_BUCKET_COUNT, 100);

    for (k, v) in f.keys.iter().zip(f.values.iter()) {
        map.set(k, v).expect("set");
        let got = map.get(k).expect("value present");
        assert!(std::ptr::eq(got, v), "get must return the stored reference");
    }

    let mut called = 0;
    let rc = map.traverse(|node| {
        assert!(!node.key().is_empty());
        called += 1;
        ControlFlow::<i32>::Continue(())
    });
    assert_eq!(rc, ControlFlow::Continue(()));
    assert_eq!(called, 3);

    called = 0;
    let rc = map.traverse(|_| {
        called += 1;
        if called == 2 {
            ControlFlow::Break(1)
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(rc, ControlFlow::Break(1));
    assert_eq!(called, 2);

    for (k, v) in f.keys.iter().zip(f.values.iter()) {
        let deleted = map.delete(k).expect("delete returns value");
        assert!(std::ptr::eq(deleted, v));
        assert!(map.get(k).is_none());
    }
    assert!(map.is_empty());
}

#[test]
fn traversal_count_matches_sets_minus_deletes() {
    let keys: Vec<String> = (0..1_000).map(|i| format!("k{i:04}")).collect();
    let mut map: ChainedHashMap<str, str> = ChainedHashMap::new().unwrap();
    for k in &keys {
        map.set(k, k).unwrap();
    }
    for k in keys.iter().take(300) {
        assert_eq!(map.delete(k), Some(k.as_str()));
    }

    let mut count = 0usize;
    let _ = map.traverse(|_| {
        count += 1;
        ControlFlow::<()>::Continue(())
    });
    assert_eq!(count, 700);
    assert_eq!(map.len(), 700);
    for k in keys.iter().skip(300) {
        assert_eq!(map.get(k), Some(k.as_str()));
    }
}

#[test]
fn unique_insert_and_shadowing_set() {
    let (a, b) = (1, 2);
    let mut map: ChainedHashMap<str, i32> = ChainedHashMap::new().unwrap();
    map.insert("key", &a).unwrap();
    assert_eq!(map.insert("key", &b), Err(MapError::DuplicateKey));

    map.set("key", &b).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("key"), Some(&a));
    assert_eq!(map.iter().filter(|(k, _)| *k == "key").count(), 2);
}

#[test]
fn errors_render_readable_messages() {
    assert_eq!(
        MapError::DuplicateKey.to_string(),
        "an equal key is already present in the map"
    );
    let e: MapError = darray_hashmap::ArrayError::AllocationFailure { requested: 8 }.into();
    assert_eq!(e.to_string(), "failed to allocate storage for 8 slots");
}
