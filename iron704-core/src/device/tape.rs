// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use crate::factory::{
    Device, DeviceError, RecordRead, RecordStore, TransferState, TransferStatus,
};
use crate::util::{Shared, SharedCell, Word};

// Design:
//   TapeDrive models one magnetic tape unit on the i/o channel. The channel
//   selects the unit for reading or writing, copies words one at a time
//   through the shared accumulator, and eventually moves on. Record i/o is
//   lazy: a whole record is staged on read select, and written words are
//   buffered until the next operation ends the write episode, matching a
//   physical drive that records one full block per write command sequence.

/// Pack words into a byte record, one byte per 6-bit symbol, most
/// significant symbol of each word first.
pub fn pack_record(words: &[Word]) -> Vec<u8> {
    let mut data = Vec::with_capacity(words.len() * Word::SYMBOLS);
    for word in words {
        for i in 0..Word::SYMBOLS {
            data.push(word.symbol(i));
        }
    }
    data
}

/// Unpack a byte record into words, six symbols per word. A short final
/// group pads out with zero symbols on the right, as a partial character
/// group on tape reads back as a full word with trailing zero bits.
pub fn unpack_record(data: &[u8]) -> Vec<Word> {
    let mut words = Vec::with_capacity((data.len() + Word::SYMBOLS - 1) / Word::SYMBOLS);
    let mut acc = 0u64;
    let mut count = 0;
    for byte in data {
        acc = acc << Word::SYMBOL_BITS | u64::from(byte & 0x3f);
        count += 1;
        if count == Word::SYMBOLS {
            words.push(Word::from_bits(acc));
            acc = 0;
            count = 0;
        }
    }
    if count > 0 {
        acc <<= Word::SYMBOL_BITS * (Word::SYMBOLS - count);
        words.push(Word::from_bits(acc));
    }
    words
}

fn mode_name(binary: bool) -> &'static str {
    if binary {
        "binary"
    } else {
        "BCD"
    }
}

pub struct TapeDrive {
    // Dependencies
    accumulator: SharedCell<Word>,
    tape_check: SharedCell<bool>,
    // Configuration
    unit: u8,
    // Runtime State
    store: Option<Shared<dyn RecordStore>>,
    read_only: bool,
    state: TransferState,
    eof: bool,
    write_binary: bool,
    read_buffer: Vec<Word>,
    cursor: usize,
    write_buffer: Vec<Word>,
}

impl TapeDrive {
    pub fn new(unit: u8, accumulator: SharedCell<Word>, tape_check: SharedCell<bool>) -> Self {
        Self {
            accumulator,
            tape_check,
            unit,
            store: None,
            read_only: false,
            state: TransferState::Idle,
            eof: false,
            write_binary: false,
            read_buffer: Vec::new(),
            cursor: 0,
            write_buffer: Vec::new(),
        }
    }

    pub fn unit(&self) -> u8 {
        self.unit
    }

    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn transfer_state(&self) -> TransferState {
        self.state
    }

    pub fn is_at_eof(&self) -> bool {
        self.eof
    }

    /// Attach a record store to the unit. Remounting requires an explicit
    /// unmount first.
    pub fn mount(
        &mut self,
        store: Shared<dyn RecordStore>,
        read_only: bool,
    ) -> Result<(), DeviceError> {
        if self.store.is_some() {
            return Err(DeviceError::AlreadyMounted(self.unit));
        }
        info!(target: "tape", "Tape {} mounted{}", self.unit,
            if read_only { " read-only" } else { "" });
        self.store = Some(store);
        self.read_only = read_only;
        Ok(())
    }

    /// Detach the record store, forcing any active transfer to completion
    /// first. Unmounting an unmounted unit is a protocol error.
    pub fn unmount(&mut self) -> Result<(), DeviceError> {
        if self.store.is_none() {
            return Err(DeviceError::NotMounted(self.unit));
        }
        self.end_transfer();
        self.store = None;
        self.read_only = false;
        info!(target: "tape", "Tape {} unmounted", self.unit);
        Ok(())
    }

    /// Move the tape back one record.
    pub fn backspace(&mut self) -> Result<(), DeviceError> {
        self.end_transfer();
        let store = self
            .store
            .as_ref()
            .ok_or(DeviceError::NotMounted(self.unit))?;
        debug!(target: "tape", "Tape {} backspace", self.unit);
        store.borrow_mut().back_space();
        Ok(())
    }

    /// Write a logical end-of-file mark.
    pub fn write_eof(&mut self) -> Result<(), DeviceError> {
        self.end_transfer();
        let store = self
            .store
            .as_ref()
            .ok_or(DeviceError::NotMounted(self.unit))?;
        if self.read_only {
            return Err(DeviceError::WriteProtected(self.unit));
        }
        debug!(target: "tape", "Tape {} write EOF", self.unit);
        store.borrow_mut().write_eof();
        Ok(())
    }

    /// Reposition the tape to the load point.
    pub fn rewind(&mut self) -> Result<(), DeviceError> {
        self.end_transfer();
        let store = self
            .store
            .as_ref()
            .ok_or(DeviceError::NotMounted(self.unit))?;
        debug!(target: "tape", "Tape {} rewind", self.unit);
        store.borrow_mut().rewind();
        Ok(())
    }

    /// Finish the current read or write episode before the next operation
    /// starts or the store is released. A read episode discards whatever is
    /// left of the staged record; a write episode commits the buffered words
    /// as one record. Words buffered with no store mounted, or with a
    /// write-protected reel mounted mid-episode, are dropped with a
    /// diagnostic.
    fn end_transfer(&mut self) {
        match self.state {
            TransferState::Idle => {}
            TransferState::Read => {
                self.read_buffer.clear();
                self.cursor = 0;
                self.eof = false;
                self.state = TransferState::Idle;
                debug!(target: "tape", "Tape {} end read", self.unit);
            }
            TransferState::Write => {
                match self.store {
                    Some(ref store) if !self.read_only => {
                        let data = pack_record(&self.write_buffer);
                        let mut store = store.borrow_mut();
                        store.write_record(self.write_binary, &data);
                        debug!(target: "tape", "Tape {}: {} record {} with {} words written",
                            self.unit, mode_name(self.write_binary),
                            store.num_of_records(), self.write_buffer.len());
                    }
                    Some(_) => {
                        warn!(target: "tape", "Tape {}: discarding {} words, tape is write protected",
                            self.unit, self.write_buffer.len());
                    }
                    None => {
                        warn!(target: "tape", "Tape {}: discarding {} words, no tape mounted",
                            self.unit, self.write_buffer.len());
                    }
                }
                self.write_buffer.clear();
                self.state = TransferState::Idle;
            }
        }
    }
}

impl Device for TapeDrive {
    fn select_read(&mut self, expect_binary: bool) -> Result<(), DeviceError> {
        self.end_transfer();
        self.eof = true;
        if let Some(ref store) = self.store {
            let mut store = store.borrow_mut();
            match store.read_record() {
                RecordRead::Record { binary, data } => {
                    if binary != expect_binary {
                        self.tape_check.set(true);
                        warn!(target: "tape", "Tape {}: {} record read while {} expected",
                            self.unit, mode_name(binary), mode_name(expect_binary));
                    }
                    self.read_buffer = unpack_record(&data);
                    debug!(target: "tape", "Tape {}: {} record {} with {} words read",
                        self.unit, mode_name(binary), store.num_of_records(),
                        self.read_buffer.len());
                    self.eof = false;
                }
                RecordRead::EofMark => {
                    debug!(target: "tape", "Tape {}: EOF read at record {}",
                        self.unit, store.num_of_records());
                }
                RecordRead::EndOfMedium => {
                    debug!(target: "tape", "Tape {} EOM", self.unit);
                }
            }
        }
        self.state = TransferState::Read;
        self.cursor = 0;
        Ok(())
    }

    fn select_write(&mut self, binary: bool) -> Result<(), DeviceError> {
        self.end_transfer();
        if self.read_only {
            return Err(DeviceError::WriteProtected(self.unit));
        }
        self.write_binary = binary;
        self.state = TransferState::Write;
        debug!(target: "tape", "Tape {} start {} write", self.unit, mode_name(binary));
        Ok(())
    }

    fn transfer(&mut self, word: &mut Word) -> Result<TransferStatus, DeviceError> {
        match self.state {
            TransferState::Read => {
                if self.eof {
                    debug!(target: "tape", "Tape {} EOF", self.unit);
                    Ok(TransferStatus::EndOfFile)
                } else if self.cursor >= self.read_buffer.len() {
                    debug!(target: "tape", "Tape {} EOR", self.unit);
                    Ok(TransferStatus::EndOfRecord)
                } else {
                    *word = self.read_buffer[self.cursor];
                    self.cursor += 1;
                    self.accumulator.set(*word);
                    trace!(target: "tape", "Copy {} from tape {}", *word, self.unit);
                    Ok(TransferStatus::Ok)
                }
            }
            TransferState::Write => {
                self.accumulator.set(*word);
                self.write_buffer.push(*word);
                trace!(target: "tape", "Copy {} to tape {}", *word, self.unit);
                Ok(TransferStatus::Ok)
            }
            TransferState::Idle => Err(DeviceError::NotSelected(self.unit)),
        }
    }

    fn disconnect(&mut self) {
        self.end_transfer();
    }
}

impl Drop for TapeDrive {
    fn drop(&mut self) {
        if self.store.is_some() {
            self.end_transfer();
            self.store = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;
    use crate::util::{new_shared, new_shared_cell};

    fn setup_drive() -> (TapeDrive, SharedCell<Word>, SharedCell<bool>) {
        let accumulator = new_shared_cell(Word::default());
        let tape_check = new_shared_cell(false);
        let drive = TapeDrive::new(1, accumulator.clone(), tape_check.clone());
        (drive, accumulator, tape_check)
    }

    #[test]
    fn pack_emits_one_byte_per_symbol() {
        let words = [Word::from_bits(0o010203040506), Word::from_bits(0o770000000077)];
        let data = pack_record(&words);
        assert_eq!(
            vec![0o01, 0o02, 0o03, 0o04, 0o05, 0o06, 0o77, 0, 0, 0, 0, 0o77],
            data
        );
    }

    #[test]
    fn unpack_pads_short_final_group_with_zero_symbols() {
        let words = unpack_record(&[0o77, 0o01]);
        assert_eq!(1, words.len());
        assert_eq!(Word::from_bits(0o770100000000), words[0]);
    }

    #[test]
    fn unpack_masks_symbols_to_6_bits() {
        let words = unpack_record(&[0xff, 0, 0, 0, 0, 0]);
        assert_eq!(Word::from_bits(0o770000000000), words[0]);
    }

    #[test]
    fn pack_unpack_round_trip() {
        let words = vec![
            Word::from_bits(0o123456701234),
            Word::from_bits(0),
            Word::from_bits(0o777777777777),
        ];
        assert_eq!(words, unpack_record(&pack_record(&words)));
    }

    #[test]
    fn transfer_on_idle_unit_is_a_protocol_error() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        let mut word = Word::from_bits(1);
        assert_eq!(
            Err(DeviceError::NotSelected(1)),
            drive.transfer(&mut word)
        );
    }

    #[test]
    fn read_without_mount_reports_eof() {
        let (mut drive, accumulator, _tape_check) = setup_drive();
        drive.select_read(true).unwrap();
        assert!(drive.is_at_eof());
        let mut word = Word::default();
        assert_eq!(Ok(TransferStatus::EndOfFile), drive.transfer(&mut word));
        assert_eq!(Word::default(), accumulator.get());
    }

    #[test]
    fn mount_twice_fails() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        drive.mount(new_shared(MemStore::new()), false).unwrap();
        assert_eq!(
            Err(DeviceError::AlreadyMounted(1)),
            drive.mount(new_shared(MemStore::new()), false)
        );
    }

    #[test]
    fn unmount_without_mount_fails() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        assert_eq!(Err(DeviceError::NotMounted(1)), drive.unmount());
    }

    #[test]
    fn reposition_without_mount_fails() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        assert_eq!(Err(DeviceError::NotMounted(1)), drive.backspace());
        assert_eq!(Err(DeviceError::NotMounted(1)), drive.rewind());
        assert_eq!(Err(DeviceError::NotMounted(1)), drive.write_eof());
    }

    #[test]
    fn select_write_on_read_only_mount_fails() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        drive.mount(new_shared(MemStore::new()), true).unwrap();
        assert_eq!(Err(DeviceError::WriteProtected(1)), drive.select_write(true));
        assert_eq!(Err(DeviceError::WriteProtected(1)), drive.write_eof());
    }

    #[test]
    fn write_episode_commits_one_record_on_next_select() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        let store = new_shared(MemStore::new());
        drive.mount(store.clone(), false).unwrap();
        drive.select_write(true).unwrap();
        let mut word = Word::from_bits(0o123456701234);
        drive.transfer(&mut word).unwrap();
        drive.transfer(&mut word).unwrap();
        assert_eq!(0, store.borrow().len());
        drive.select_read(true).unwrap();
        assert_eq!(1, store.borrow().len());
        assert_eq!(
            Some((true, pack_record(&[word, word]))),
            store.borrow().record(0).map(|(b, d)| (b, d.to_vec()))
        );
    }

    #[test]
    fn end_of_record_is_idempotent() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        let store = new_shared(MemStore::new());
        store.borrow_mut().write_record(true, &pack_record(&[Word::from_bits(1)]));
        store.borrow_mut().rewind();
        drive.mount(store, false).unwrap();
        drive.select_read(true).unwrap();
        let mut word = Word::default();
        assert_eq!(Ok(TransferStatus::Ok), drive.transfer(&mut word));
        assert_eq!(Ok(TransferStatus::EndOfRecord), drive.transfer(&mut word));
        assert_eq!(Ok(TransferStatus::EndOfRecord), drive.transfer(&mut word));
    }

    #[test]
    fn mode_mismatch_sets_tape_check_but_read_succeeds() {
        let (mut drive, _accumulator, tape_check) = setup_drive();
        let store = new_shared(MemStore::new());
        store.borrow_mut().write_record(false, &pack_record(&[Word::from_bits(0o42)]));
        store.borrow_mut().rewind();
        drive.mount(store, false).unwrap();
        drive.select_read(true).unwrap();
        assert!(tape_check.get());
        let mut word = Word::default();
        assert_eq!(Ok(TransferStatus::Ok), drive.transfer(&mut word));
        assert_eq!(Word::from_bits(0o42), word);
    }

    #[test]
    fn unmounted_write_episode_is_discarded() {
        let (mut drive, accumulator, _tape_check) = setup_drive();
        drive.select_write(true).unwrap();
        let mut word = Word::from_bits(0o7070);
        assert_eq!(Ok(TransferStatus::Ok), drive.transfer(&mut word));
        assert_eq!(word, accumulator.get());
        drive.disconnect();
        assert_eq!(TransferState::Idle, drive.transfer_state());
    }

    #[test]
    fn write_episode_ending_on_read_only_mount_is_discarded() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        let store = new_shared(MemStore::new());
        drive.select_write(true).unwrap();
        let mut word = Word::from_bits(0o1234);
        drive.transfer(&mut word).unwrap();
        drive.mount(store.clone(), true).unwrap();
        drive.disconnect();
        // the write-protected reel must not receive the buffered record
        assert!(store.borrow().is_empty());
        assert_eq!(TransferState::Idle, drive.transfer_state());
    }

    #[test]
    fn empty_write_episode_writes_an_eof_mark() {
        let (mut drive, _accumulator, _tape_check) = setup_drive();
        let store = new_shared(MemStore::new());
        drive.mount(store.clone(), false).unwrap();
        drive.select_write(true).unwrap();
        drive.disconnect();
        assert_eq!(1, store.borrow().len());
        drive.rewind().unwrap();
        drive.select_read(true).unwrap();
        assert!(drive.is_at_eof());
    }

    #[test]
    fn drop_flushes_active_write() {
        let accumulator = new_shared_cell(Word::default());
        let tape_check = new_shared_cell(false);
        let store = new_shared(MemStore::new());
        {
            let mut drive = TapeDrive::new(4, accumulator, tape_check);
            drive.mount(store.clone(), false).unwrap();
            drive.select_write(true).unwrap();
            let mut word = Word::from_bits(0o55);
            drive.transfer(&mut word).unwrap();
        }
        assert_eq!(1, store.borrow().len());
    }
}
