//! Fuzzer for the `ArrayLinkedList` API.
//!
//! Every operation runs against the list and against a plain `Vec` model of
//! the same sequence, and the two must agree. The link and free-list
//! invariants are checked after every step.

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use slotkit::{ArrayLinkedList, BufferConfig, Error, ErrorCode, SlotIndex, SlotRef};

type Val = u64;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    PushBack(Val),
    PushFront(Val),
    InsertAfter(u8, Val),
    InsertBefore(u8, Val),
    Pop(u8),
    PopFront,
    PopBack,
    Get(u8, Val),
    Stale(u8, Val),
    Clear,
    Walk,
}

struct Sim<I> {
    list: ArrayLinkedList<Val, I>,
    model: Vec<(SlotRef, Val)>,
    dead: Vec<SlotRef>,
    limit: usize,
}

impl<I: SlotIndex> Sim<I> {
    fn new(config: BufferConfig, limit: usize) -> Self {
        Self {
            list: ArrayLinkedList::with_config(0, config).unwrap(),
            model: Vec::new(),
            dead: Vec::new(),
            limit,
        }
    }

    /// Pick an existing element, or the sentinel for the one extra position.
    fn pick(&self, pos: u8) -> (usize, SlotRef) {
        let i = (pos as usize) % (self.model.len() + 1);
        match self.model.get(i) {
            Some((r, _)) => (i, *r),
            None => (i, SlotRef::SENTINEL),
        }
    }

    fn inserted(&mut self, result: Result<SlotRef, Error>, at: usize, value: Val) {
        if self.model.len() == self.limit {
            assert_eq!(result, Err(Error::NoMemory));
        } else {
            let r = result.unwrap();
            assert_eq!(self.list.get(r), Ok(&value));
            self.model.insert(at, (r, value));
        }
    }

    fn popped(&mut self, result: Result<Val, Error>, at: usize) {
        if self.model.is_empty() {
            assert_eq!(result, Err(Error::NotFound));
        } else {
            let (r, value) = self.model.remove(at);
            assert_eq!(result, Ok(value));
            self.dead.push(r);
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::PushBack(v) => {
                let result = self.list.push_back(v);
                self.inserted(result, self.model.len(), v);
            }
            Op::PushFront(v) => {
                let result = self.list.push_front(v);
                self.inserted(result, 0, v);
            }
            Op::InsertAfter(pos, v) => {
                let (i, r) = self.pick(pos);
                let result = self.list.insert_after(v, r);
                let at = if r == SlotRef::SENTINEL { 0 } else { i + 1 };
                self.inserted(result, at, v);
            }
            Op::InsertBefore(pos, v) => {
                let (i, r) = self.pick(pos);
                let result = self.list.insert_before(v, r);
                self.inserted(result, i, v);
            }
            Op::Pop(pos) => {
                let (i, r) = self.pick(pos);
                if r == SlotRef::SENTINEL {
                    let result = self.list.pop(r);
                    assert_eq!(ErrorCode::of(&result), ErrorCode::IndexOutOfBounds);
                } else {
                    let result = self.list.pop(r);
                    self.popped(result, i);
                }
            }
            Op::PopFront => {
                let result = self.list.pop_front();
                self.popped(result, 0);
            }
            Op::PopBack => {
                let result = self.list.pop_back();
                let at = self.model.len().saturating_sub(1);
                self.popped(result, at);
            }
            Op::Get(pos, v) => {
                let (i, r) = self.pick(pos);
                if r == SlotRef::SENTINEL {
                    assert!(self.list.get(r).is_err());
                    return;
                }
                assert_eq!(self.list.get(r), Ok(&self.model[i].1));
                let expect_next = self.model.get(i + 1).map(|(r, _)| *r);
                let expect_prev = i.checked_sub(1).map(|p| self.model[p].0);
                assert_eq!(self.list.next(r), Ok(expect_next));
                assert_eq!(self.list.prev(r), Ok(expect_prev));
                *self.list.get_mut(r).unwrap() = v;
                self.model[i].1 = v;
            }
            Op::Stale(k, v) => {
                if self.dead.is_empty() {
                    return;
                }
                let r = self.dead[(k as usize) % self.dead.len()];
                let len = self.list.len();
                assert_eq!(
                    ErrorCode::of(&self.list.get(r)),
                    ErrorCode::IndexOutOfBounds
                );
                assert_eq!(
                    ErrorCode::of(&self.list.insert_after(v, r)),
                    ErrorCode::IndexOutOfBounds
                );
                assert_eq!(ErrorCode::of(&self.list.pop(r)), ErrorCode::IndexOutOfBounds);
                assert_eq!(self.list.len(), len);
            }
            Op::Clear => {
                self.list.clear();
                self.dead.extend(self.model.drain(..).map(|(r, _)| r));
            }
            Op::Walk => {
                let forward: Vec<_> = self.list.iter().map(|(r, v)| (r, *v)).collect();
                assert_eq!(forward, self.model);
                let backward: Vec<_> = self.list.iter().rev().map(|(r, v)| (r, *v)).collect();
                assert!(backward.iter().eq(self.model.iter().rev()));
            }
        }
        self.list.check_links();
        assert_eq!(self.list.len(), self.model.len());
    }
}

fuzz_target!(|ex: Vec<Op>| {
    // Narrow indices run out of link values at 254 elements
    let mut narrow = Sim::<u8>::new(BufferConfig::default(), 254);

    // Wide indices, but the buffers may not grow past 32 slots
    let capped = BufferConfig::builder().max_capacity(32).build().unwrap();
    let mut wide = Sim::<u32>::new(capped, 31);

    for o in &ex {
        narrow.apply(o);
        wide.apply(o);
    }
});
