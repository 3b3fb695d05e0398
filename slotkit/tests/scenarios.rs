//! Small end-to-end scenarios with exact expected capacities and orders

use slotkit::{ArrayLinkedList, BufferConfig, Error, GrowableBuffer, OpenAddressHashTable};

#[test]
fn buffer_grows_past_default_capacity() {
    let config = BufferConfig::builder()
        .default_capacity(8)
        .grow_factor(2)
        .build()
        .unwrap();
    let mut buffer = GrowableBuffer::with_hint(0, config);
    assert_eq!(buffer.capacity(), 8);
    for value in (10..=90).step_by(10) {
        buffer.push(value).unwrap();
    }
    assert_eq!(buffer.capacity(), 16);
    assert_eq!(buffer.len(), 9);
    assert_eq!(buffer[8], 90);
}

#[test]
fn list_pops_from_front_in_order() {
    let mut list = ArrayLinkedList::<u32>::new().unwrap();
    for value in [10, 20, 30] {
        list.push_back(value).unwrap();
    }
    assert_eq!(list.pop_front(), Ok(10));
    assert_eq!(list.pop_front(), Ok(20));
    assert_eq!(list.len(), 1);

    let head = list.head().unwrap();
    let tail = list.tail().unwrap();
    assert_eq!(head, tail);
    assert_eq!(list.get(head), Ok(&30));
    assert_eq!(list.next(head), Ok(None));
    assert_eq!(list.prev(head), Ok(None));
}

#[test]
fn table_without_growth() {
    let mut table = OpenAddressHashTable::<String, usize>::new().unwrap();
    assert_eq!(table.capacity(), 8);
    let keys = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(table.insert(key.to_string(), i), Ok(true));
    }
    assert_eq!(table.capacity(), 8);
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(table.get(&key.to_string()), Ok(&i));
    }
    assert_eq!(table.get(&"eta".to_string()), Err(Error::NotFound));
}
