// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use crate::factory::{RecordRead, RecordStore};

struct StoredRecord {
    binary: bool,
    data: Vec<u8>,
}

/// In-memory record store used for scratch tapes and tests. Writing at any
/// position destroys everything after it, as recording over a physical tape
/// would. A zero-length record acts as the logical end-of-file mark.
pub struct MemStore {
    records: Vec<StoredRecord>,
    pos: usize,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inspect a stored record by 0-based index.
    pub fn record(&self, index: usize) -> Option<(bool, &[u8])> {
        self.records
            .get(index)
            .map(|record| (record.binary, record.data.as_slice()))
    }
}

impl RecordStore for MemStore {
    fn read_record(&mut self) -> RecordRead {
        if self.pos >= self.records.len() {
            return RecordRead::EndOfMedium;
        }
        let record = &self.records[self.pos];
        self.pos += 1;
        if record.data.is_empty() {
            RecordRead::EofMark
        } else {
            RecordRead::Record {
                binary: record.binary,
                data: record.data.clone(),
            }
        }
    }

    fn write_record(&mut self, binary: bool, data: &[u8]) {
        self.records.truncate(self.pos);
        self.records.push(StoredRecord {
            binary,
            data: data.to_vec(),
        });
        self.pos += 1;
    }

    fn back_space(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn rewind(&mut self) {
        self.pos = 0;
    }

    fn write_eof(&mut self) {
        self.write_record(false, &[]);
    }

    fn num_of_records(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_last_record_is_end_of_medium() {
        let mut store = MemStore::new();
        assert_eq!(RecordRead::EndOfMedium, store.read_record());
        store.write_record(true, &[1, 2, 3]);
        assert_eq!(RecordRead::EndOfMedium, store.read_record());
    }

    #[test]
    fn zero_length_record_reads_as_eof_mark() {
        let mut store = MemStore::new();
        store.write_eof();
        store.rewind();
        assert_eq!(RecordRead::EofMark, store.read_record());
    }

    #[test]
    fn write_truncates_tail() {
        let mut store = MemStore::new();
        store.write_record(true, &[1]);
        store.write_record(true, &[2]);
        store.write_record(true, &[3]);
        store.rewind();
        store.read_record();
        store.write_record(false, &[4]);
        assert_eq!(2, store.len());
        assert_eq!(RecordRead::EndOfMedium, store.read_record());
    }

    #[test]
    fn back_space_saturates_at_load_point() {
        let mut store = MemStore::new();
        store.write_record(true, &[1]);
        store.back_space();
        store.back_space();
        assert_eq!(
            RecordRead::Record {
                binary: true,
                data: vec![1]
            },
            store.read_record()
        );
    }

    #[test]
    fn num_of_records_tracks_position() {
        let mut store = MemStore::new();
        assert_eq!(0, store.num_of_records());
        store.write_record(true, &[1]);
        store.write_record(true, &[2]);
        assert_eq!(2, store.num_of_records());
        store.back_space();
        assert_eq!(1, store.num_of_records());
        store.rewind();
        store.read_record();
        assert_eq!(1, store.num_of_records());
    }
}
