//! String table of the encoder.
//!
//! Open addressing with double hashing on the prefix code / next symbol combination. The first
//! probe is an exclusive-or of the symbol and the prefix; collisions walk the table with
//! G. Knott's relatively prime secondary step. The table size is a prime big enough that at 4096
//! codes it is only ~80% full, which keeps probe sequences short.

/// Number of slots. Prime, so that any secondary step visits every slot.
pub(crate) const TABLE_SIZE: usize = 5003;

/// Codes are at most 12 bits: no code at or above this value is ever assigned.
pub(crate) const MAX_CODE_COUNT: u16 = 1 << 12;

const HASH_SHIFT: u32 = hash_shift(TABLE_SIZE);

/// Shift applied to the symbol on the first probe, so that symbol and prefix together spread
/// over the whole table.
const fn hash_shift(table_size: usize) -> u32 {
    let mut shift = 0;
    let mut size = table_size;
    while size < 65536 {
        shift += 1;
        size *= 2;
    }
    8 - shift
}

/// Key of a slot: the symbol in the high bits, the prefix code in the low 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint(u32);

impl Fingerprint {
    #[inline(always)]
    fn new(prefix: u16, symbol: u8) -> Self {
        Self(((symbol as u32) << 12) | prefix as u32)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    fingerprint: Fingerprint,
    code: u16,
}

/// An empty slot found while probing, where the probed string can be stored.
#[derive(Debug)]
pub(crate) struct VacantSlot {
    index: usize,
    fingerprint: Fingerprint,
}

#[derive(Debug)]
pub(crate) enum Probe {
    /// The string is already known under this code.
    Match(u16),
    /// The string is unknown.
    Vacant(VacantSlot),
    /// Every slot was probed without finding the string or a free slot.
    Exhausted,
}

pub(crate) struct CodeTable {
    slots: Box<[Option<Entry>]>,
    first_code: u16,
    next_code: u16,
}

impl CodeTable {
    /// Creates an empty table, whose first assigned code follows the clear and end codes.
    pub fn new(clear_code: u16) -> Self {
        let first_code = clear_code + 2;
        Self {
            slots: vec![None; TABLE_SIZE].into_boxed_slice(),
            first_code,
            next_code: first_code,
        }
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.next_code = self.first_code;
    }

    /// The code the next inserted string will get.
    #[inline(always)]
    pub fn next_code(&self) -> u16 {
        self.next_code
    }

    #[inline(always)]
    pub fn lookup(&self, prefix: u16, symbol: u8) -> Probe {
        let fingerprint = Fingerprint::new(prefix, symbol);
        let mut index = ((symbol as usize) << HASH_SHIFT) ^ prefix as usize;
        debug_assert!(index < TABLE_SIZE);

        match self.slots[index] {
            None => return Probe::Vacant(VacantSlot { index, fingerprint }),
            Some(entry) if entry.fingerprint == fingerprint => return Probe::Match(entry.code),
            Some(_) => {}
        }

        let displacement = if index == 0 { 1 } else { TABLE_SIZE - index };
        for _ in 0..TABLE_SIZE {
            index = (index + TABLE_SIZE - displacement) % TABLE_SIZE;

            match self.slots[index] {
                None => return Probe::Vacant(VacantSlot { index, fingerprint }),
                Some(entry) if entry.fingerprint == fingerprint => {
                    return Probe::Match(entry.code)
                }
                Some(_) => {}
            }
        }

        Probe::Exhausted
    }

    /// Stores the probed string under the next code and returns that code, or `None` once all
    /// 12 bit codes are taken.
    #[inline(always)]
    pub fn insert(&mut self, slot: VacantSlot) -> Option<u16> {
        if self.next_code >= MAX_CODE_COUNT {
            return None;
        }

        let code = self.next_code;
        self.slots[slot.index] = Some(Entry {
            fingerprint: slot.fingerprint,
            code,
        });
        self.next_code += 1;

        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vacant(probe: Probe) -> VacantSlot {
        match probe {
            Probe::Vacant(slot) => slot,
            other => panic!("Expected a vacant slot, got {other:?}"),
        }
    }

    #[test]
    fn shift_for_default_table_size() {
        assert_eq!(HASH_SHIFT, 4);
    }

    #[test]
    fn insert_then_match() {
        let mut table = CodeTable::new(4);
        assert_eq!(table.next_code(), 6);

        let slot = vacant(table.lookup(1, 2));
        assert_eq!(table.insert(slot), Some(6));
        assert_eq!(table.next_code(), 7);

        assert!(matches!(table.lookup(1, 2), Probe::Match(6)));
        assert!(matches!(table.lookup(2, 1), Probe::Vacant(_)));
    }

    #[test]
    fn collision_uses_secondary_probe() {
        let mut table = CodeTable::new(256);

        // Both land on slot 16 on the first probe.
        let first = vacant(table.lookup(0x10, 0));
        assert_eq!(first.index, 16);
        table.insert(first);

        let second = vacant(table.lookup(0, 1));
        assert_eq!(second.index, 32);
        assert_eq!(table.insert(second), Some(259));

        assert!(matches!(table.lookup(0x10, 0), Probe::Match(258)));
        assert!(matches!(table.lookup(0, 1), Probe::Match(259)));
    }

    #[test]
    fn probe_wraps_from_slot_zero() {
        let mut table = CodeTable::new(4);

        let first = vacant(table.lookup(0, 0));
        assert_eq!(first.index, 0);
        table.insert(first);

        // Slot 0 again, stepping back by one wraps to the end of the table.
        let second = vacant(table.lookup(0x10, 1));
        assert_eq!(second.index, TABLE_SIZE - 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut table = CodeTable::new(4);
        let slot = vacant(table.lookup(3, 3));
        table.insert(slot);

        table.clear();

        assert_eq!(table.next_code(), 6);
        assert!(matches!(table.lookup(3, 3), Probe::Vacant(_)));
    }

    #[test]
    fn no_code_past_twelve_bits() {
        let mut table = CodeTable::new(256);
        let mut assigned = 0;

        for i in 0u32.. {
            let prefix = (i % 4096) as u16;
            let symbol = (i / 4096) as u8;
            let slot = vacant(table.lookup(prefix, symbol));
            match table.insert(slot) {
                Some(code) => {
                    assert!(code < MAX_CODE_COUNT);
                    assigned += 1;
                }
                None => break,
            }
        }

        assert_eq!(assigned, 4096 - 258);
        assert_eq!(table.next_code(), MAX_CODE_COUNT);
        assert!(matches!(table.lookup(3837, 0), Probe::Match(4095)));
    }
}
