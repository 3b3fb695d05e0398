//! Lookup, growth and deletion behavior of `OpenAddressHashTable`

use slotkit::{BucketView, Error, OpenAddressHashTable, TableBuilder};

/// Hasher with heavy collisions, so probe runs overlap and wrap
type Clumpy = fn(&u32) -> u64;

fn clumpy_table(capacity: usize) -> OpenAddressHashTable<u32, u32, Clumpy> {
    let hasher: Clumpy = |k| u64::from(*k % 3) * 5;
    TableBuilder::with_hasher(hasher)
        .capacity(capacity)
        .build()
        .unwrap()
}

#[test]
fn every_insert_order_is_findable() {
    let mut keys = [11_u32, 4, 7, 30, 2, 19, 8];
    let heap = permutohedron::Heap::new(&mut keys);
    for order in heap {
        let mut table = clumpy_table(8);
        for k in order {
            assert_eq!(table.insert(k, k * 10), Ok(true));
        }
        for k in order {
            assert_eq!(table.get(&k), Ok(&(k * 10)));
        }
        for missing in [0, 1, 3, 5, 6, 9, 12] {
            assert_eq!(table.find(&missing), Err(Error::NotFound));
        }
    }
}

#[test]
fn every_erase_order_keeps_the_rest() {
    let keys = [11_u32, 4, 7, 30, 2, 19, 8];
    let mut order = keys;
    let heap = permutohedron::Heap::new(&mut order);
    for erase_order in heap {
        let mut table = clumpy_table(8);
        for k in keys {
            table.insert(k, k).unwrap();
        }
        for (i, k) in erase_order.iter().enumerate() {
            assert_eq!(table.erase(k), Ok(*k));
            assert_eq!(table.erase(k), Err(Error::NotFound));
            for rest in &erase_order[i + 1..] {
                assert_eq!(table.get(rest), Ok(rest));
            }
        }
        assert!(table.is_empty());
        assert!(table.buckets().all(|b| b == BucketView::Empty));
    }
}

#[test]
fn growth_preserves_lookups() {
    let mut table = OpenAddressHashTable::<u64, String>::new().unwrap();
    for k in 0..8 {
        table.insert(k, format!("v{k}")).unwrap();
    }
    assert_eq!(table.capacity(), 8);
    let before: Vec<String> = (0..8).map(|k| table.get(&k).unwrap().clone()).collect();

    table.insert(8, "v8".into()).unwrap();
    assert_eq!(table.capacity(), 12);
    for k in 0..8 {
        assert_eq!(table.get(&k), Ok(&before[k as usize]));
    }

    for k in 9..1000 {
        table.insert(k, format!("v{k}")).unwrap();
    }
    assert_eq!(table.len(), 1000);
    for k in 0..1000 {
        assert_eq!(table.get(&k).map(String::as_str), Ok(format!("v{k}").as_str()));
    }
}

#[test]
fn insert_never_updates() {
    let mut table = OpenAddressHashTable::new().unwrap();
    assert_eq!(table.insert("k", 1), Ok(true));
    assert_eq!(table.insert("k", 2), Ok(false));
    assert_eq!(table.get(&"k"), Ok(&1));
    *table.get_mut(&"k").unwrap() = 3;
    assert_eq!(table.get(&"k"), Ok(&3));
    assert_eq!(table.len(), 1);
}

#[test]
fn capped_growth_fails_without_change() {
    let config = slotkit::BufferConfig::builder()
        .max_capacity(8)
        .build()
        .unwrap();
    let mut table = TableBuilder::new()
        .capacity(4)
        .config(config)
        .build::<u32, u32>()
        .unwrap();
    for k in 0..4 {
        table.insert(k, k).unwrap();
    }
    // Growing to 6 slots needs a buffer of capacity 8, which is allowed;
    // growing to 9 needs 16, which isn't.
    table.insert(4, 4).unwrap();
    table.insert(5, 5).unwrap();
    assert_eq!(table.capacity(), 6);
    assert_eq!(table.insert(6, 6), Err(Error::NoMemory));
    assert_eq!(table.capacity(), 6);
    assert_eq!(table.len(), 6);
    for k in 0..6 {
        assert_eq!(table.get(&k), Ok(&k));
    }
    table.erase(&0).unwrap();
    assert_eq!(table.insert(6, 6), Ok(true));
}

#[test]
fn clear_keeps_capacity() {
    let mut table = clumpy_table(4);
    for k in 0..10 {
        table.insert(k, k).unwrap();
    }
    let capacity = table.capacity();
    table.clear();
    assert!(table.is_empty());
    assert_eq!(table.capacity(), capacity);
    assert_eq!(table.iter().count(), 0);
    assert_eq!(table.get(&3), Err(Error::NotFound));
}
