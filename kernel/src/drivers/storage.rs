// Calibration persistence with repair-on-load
//
// Layout (little-endian f32, 4-byte slots):
//   0x0000          offset
//   0x0010 + 4*i    threshold i, i in 0..THRESHOLD_COUNT
//
// A NaN offset is reset to 0.0. Any threshold that is NaN or outside
// THRESHOLD_MIN..=THRESHOLD_MAX throws away the whole table: it is
// regenerated from DEFAULT_BASE + i * DEFAULT_STEP and rewritten.

use log::{info, warn};

use crate::board::NvStorage;

pub const OFFSET_ADDR: u16 = 0x0000;
pub const THRESHOLD_ADDR: u16 = 0x0010;
pub const SLOT_SIZE: u16 = 4;

pub const THRESHOLD_COUNT: usize = 10;
pub const THRESHOLD_MIN: f32 = 10.0;
pub const THRESHOLD_MAX: f32 = 20.0;
pub const DEFAULT_BASE: f32 = 12.48;
pub const DEFAULT_STEP: f32 = 0.48;

pub const DEFAULT_OFFSET: f32 = 0.0;

/// Voltage breakpoints, index 0 = low-battery boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable([f32; THRESHOLD_COUNT]);

impl ThresholdTable {
    pub fn defaults() -> Self {
        let mut levels = [0.0; THRESHOLD_COUNT];
        for (i, level) in levels.iter_mut().enumerate() {
            *level = DEFAULT_BASE + i as f32 * DEFAULT_STEP;
        }
        Self(levels)
    }

    pub const fn from_levels(levels: [f32; THRESHOLD_COUNT]) -> Self {
        Self(levels)
    }

    pub fn levels(&self) -> &[f32; THRESHOLD_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut f32> {
        self.0.get_mut(index)
    }

    pub fn is_plausible(value: f32) -> bool {
        !value.is_nan() && (THRESHOLD_MIN..=THRESHOLD_MAX).contains(&value)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Which parts of the stored calibration had to be rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repairs {
    pub offset: bool,
    pub thresholds: bool,
}

impl Repairs {
    pub const fn any(self) -> bool {
        self.offset || self.thresholds
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedConfig {
    pub offset: f32,
    pub thresholds: ThresholdTable,
    pub repairs: Repairs,
}

impl LoadedConfig {
    pub const fn was_repaired(&self) -> bool {
        self.repairs.any()
    }
}

pub const fn threshold_addr(index: usize) -> u16 {
    THRESHOLD_ADDR + index as u16 * SLOT_SIZE
}

pub struct ConfigStore<S> {
    storage: S,
}

impl<S: NvStorage> ConfigStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&mut self) -> LoadedConfig {
        let mut repairs = Repairs::default();

        let mut offset = self.storage.read_f32(OFFSET_ADDR);
        if offset.is_nan() {
            warn!("config: offset NaN, reset to {}", DEFAULT_OFFSET);
            offset = DEFAULT_OFFSET;
            self.storage.write_f32(OFFSET_ADDR, offset);
            repairs.offset = true;
        }

        let mut levels = [0.0; THRESHOLD_COUNT];
        let mut bad_slot = None;
        for (i, level) in levels.iter_mut().enumerate() {
            *level = self.storage.read_f32(threshold_addr(i));
            if bad_slot.is_none() && !ThresholdTable::is_plausible(*level) {
                bad_slot = Some(i);
            }
        }

        let thresholds = match bad_slot {
            None => ThresholdTable::from_levels(levels),
            Some(i) => {
                warn!(
                    "config: threshold[{}] = {} invalid, rewriting default table",
                    i, levels[i]
                );
                let table = ThresholdTable::defaults();
                for (i, &level) in table.levels().iter().enumerate() {
                    self.storage.write_f32(threshold_addr(i), level);
                }
                repairs.thresholds = true;
                table
            }
        };

        info!(
            "config: loaded offset {:.2}, t0 {:.2} (repaired: {})",
            offset,
            thresholds.levels()[0],
            repairs.any()
        );

        LoadedConfig {
            offset,
            thresholds,
            repairs,
        }
    }

    pub fn save_offset(&mut self, value: f32) {
        self.storage.write_f32(OFFSET_ADDR, value);
        info!("config: offset saved {:.2}", value);
    }

    pub fn save_threshold(&mut self, index: usize, value: f32) {
        if index >= THRESHOLD_COUNT {
            warn!("config: threshold index {} out of range, not saved", index);
            return;
        }
        self.storage.write_f32(threshold_addr(index), value);
        info!("config: threshold[{}] saved {:.2}", index, value);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::RamStorage;
    use proptest::prelude::*;

    fn store_with(offset: f32, levels: [f32; THRESHOLD_COUNT]) -> ConfigStore<RamStorage> {
        let mut ram = RamStorage::new();
        ram.write_f32(OFFSET_ADDR, offset);
        for (i, &l) in levels.iter().enumerate() {
            ram.write_f32(threshold_addr(i), l);
        }
        ConfigStore::new(ram)
    }

    #[test]
    fn default_table_formula() {
        let t = ThresholdTable::defaults();
        assert_eq!(t.levels()[0], 12.48);
        assert!((t.levels()[9] - 16.80).abs() < 1e-4);
    }

    #[test]
    fn valid_contents_load_untouched() {
        let levels = *ThresholdTable::defaults().levels();
        let mut store = store_with(0.25, levels);
        let writes_before = store.storage().writes;

        let loaded = store.load();
        assert_eq!(loaded.offset, 0.25);
        assert_eq!(loaded.thresholds.levels(), &levels);
        assert!(!loaded.was_repaired());
        assert_eq!(store.storage().writes, writes_before);
    }

    #[test]
    fn blank_storage_is_repaired_and_rewritten() {
        // erased flash/EEPROM reads back 0xFF, which is a NaN pattern
        let mut store = ConfigStore::new(RamStorage::erased());
        let loaded = store.load();

        assert!(loaded.repairs.offset);
        assert!(loaded.repairs.thresholds);
        assert_eq!(loaded.offset, 0.0);
        assert_eq!(loaded.thresholds, ThresholdTable::defaults());

        let again = store.load();
        assert!(!again.was_repaired());
        assert_eq!(again.thresholds, ThresholdTable::defaults());
    }

    #[test]
    fn nan_offset_repair_leaves_table_alone() {
        let mut levels = *ThresholdTable::defaults().levels();
        levels[4] = 14.0;
        let mut store = store_with(f32::NAN, levels);

        let loaded = store.load();
        assert!(loaded.repairs.offset);
        assert!(!loaded.repairs.thresholds);
        assert_eq!(loaded.thresholds.levels()[4], 14.0);
    }

    #[test]
    fn single_bad_entry_resets_whole_table() {
        let mut levels = [15.0; THRESHOLD_COUNT];
        levels[7] = 20.5;
        let mut store = store_with(0.0, levels);

        let loaded = store.load();
        assert!(loaded.repairs.thresholds);
        assert!(!loaded.repairs.offset);
        assert_eq!(loaded.thresholds, ThresholdTable::defaults());
        assert_eq!(store.storage_mut().read_f32(threshold_addr(0)), 12.48);
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut levels = [THRESHOLD_MIN; THRESHOLD_COUNT];
        levels[9] = THRESHOLD_MAX;
        let loaded = store_with(0.0, levels).load();
        assert!(!loaded.was_repaired());
    }

    #[test]
    fn out_of_range_save_index_is_ignored() {
        let mut store = ConfigStore::new(RamStorage::new());
        let writes = store.storage().writes;
        store.save_threshold(THRESHOLD_COUNT, 13.0);
        assert_eq!(store.storage().writes, writes);
    }

    proptest! {
        #[test]
        fn any_implausible_entry_forces_defaults(
            mut levels in proptest::array::uniform10(10.0f32..=20.0),
            slot in 0usize..THRESHOLD_COUNT,
            bad in prop_oneof![
                Just(f32::NAN),
                -1000.0f32..9.99,
                20.01f32..1000.0,
            ],
        ) {
            levels[slot] = bad;
            let loaded = store_with(0.0, levels).load();
            prop_assert!(loaded.was_repaired());
            prop_assert_eq!(loaded.thresholds, ThresholdTable::defaults());
        }

        #[test]
        fn offset_round_trips(x in proptest::num::f32::NORMAL | proptest::num::f32::ZERO) {
            let mut store = ConfigStore::new(RamStorage::new());
            store.save_offset(x);
            prop_assert_eq!(store.load().offset, x);
        }

        #[test]
        fn threshold_slots_round_trip(index in 0usize..THRESHOLD_COUNT, x in 10.0f32..=20.0) {
            let mut store = ConfigStore::new(RamStorage::new());
            store.load();
            store.save_threshold(index, x);
            let loaded = store.load();
            prop_assert!(!loaded.was_repaired());
            prop_assert_eq!(loaded.thresholds.get(index), Some(x));
        }
    }
}
