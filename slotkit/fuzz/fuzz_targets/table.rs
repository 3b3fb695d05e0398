//! Fuzzer for the `OpenAddressHashTable` API.
//!
//! Operations run against the table and a `HashMap` model. A hasher with
//! only a few distinct outputs keeps probe runs long, so backward-shift
//! deletion sees wrapped and interleaved runs.

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use slotkit::{
    BufferConfig, Error, KeyHasher, OpenAddressHashTable, StdKeyHasher, TableBuilder,
};
use std::collections::HashMap;

type Key = u16;
type Val = u32;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(Key, Val),
    Erase(Key),
    Get(Key),
    Mutate(Key, Val),
    Clear,
    Walk,
}

struct Sim<H> {
    table: OpenAddressHashTable<Key, Val, H>,
    model: HashMap<Key, Val>,
}

impl<H: KeyHasher<Key>> Sim<H> {
    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Insert(k, v) => {
                let full = self.table.len() == self.table.capacity();
                let capacity = self.table.capacity();
                match self.table.insert(k, v) {
                    Ok(added) => {
                        assert_eq!(added, !self.model.contains_key(&k));
                        self.model.entry(k).or_insert(v);
                    }
                    Err(Error::NoMemory) => {
                        assert!(full && !self.model.contains_key(&k));
                        assert_eq!(self.table.capacity(), capacity);
                    }
                    Err(e) => panic!("unexpected insert error {e}"),
                }
            }
            Op::Erase(k) => match self.model.remove(&k) {
                Some(v) => assert_eq!(self.table.erase(&k), Ok(v)),
                None => assert_eq!(self.table.erase(&k), Err(Error::NotFound)),
            },
            Op::Get(k) => match self.model.get(&k) {
                Some(v) => assert_eq!(self.table.get(&k), Ok(v)),
                None => assert_eq!(self.table.get(&k), Err(Error::NotFound)),
            },
            Op::Mutate(k, v) => match self.model.get_mut(&k) {
                Some(slot) => {
                    *self.table.get_mut(&k).unwrap() = v;
                    *slot = v;
                }
                None => assert!(self.table.get_mut(&k).is_err()),
            },
            Op::Clear => {
                let capacity = self.table.capacity();
                self.table.clear();
                self.model.clear();
                assert_eq!(self.table.capacity(), capacity);
            }
            Op::Walk => {
                let seen: HashMap<Key, Val> = self.table.iter().map(|(k, v)| (*k, *v)).collect();
                assert_eq!(seen, self.model);
            }
        }
        self.table.check_probes();
        assert_eq!(self.table.len(), self.model.len());
    }
}

fuzz_target!(|ex: Vec<Op>| {
    let mut plain = Sim {
        table: OpenAddressHashTable::<Key, Val, StdKeyHasher>::new().unwrap(),
        model: HashMap::new(),
    };

    // Few distinct hashes and a capped slot array
    let clumpy: fn(&Key) -> u64 = |k| u64::from(*k % 5) * 3;
    let capped = BufferConfig::builder().max_capacity(64).build().unwrap();
    let mut crowded = Sim {
        table: TableBuilder::with_hasher(clumpy)
            .capacity(3)
            .config(capped)
            .build()
            .unwrap(),
        model: HashMap::new(),
    };

    for o in &ex {
        plain.apply(o);
        crowded.apply(o);
    }
});
