// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use core::fmt;
use std::error;

use crate::util::Word;

/// Device represents a peripheral attached to the i/o channel. The channel
/// drives every device through the same select/copy/disconnect sequence.
pub trait Device {
    /// Select the device for reading. The next record is staged for transfer.
    fn select_read(&mut self, expect_binary: bool) -> Result<(), DeviceError>;
    /// Select the device for writing in the given mode.
    fn select_write(&mut self, binary: bool) -> Result<(), DeviceError>;
    /// Copy one word between the device and the processor.
    fn transfer(&mut self, word: &mut Word) -> Result<TransferStatus, DeviceError>;
    /// Release the device from the channel without unmounting its medium.
    fn disconnect(&mut self);
}

/// RecordStore represents sequential record-oriented backing storage for
/// a tape reel. Synchronous and non-blocking; position advances on every
/// read or write.
pub trait RecordStore {
    /// Fetch the next record and advance the position.
    fn read_record(&mut self) -> RecordRead;
    /// Append one record at the current position and advance.
    fn write_record(&mut self, binary: bool, data: &[u8]);
    /// Move the position back one record.
    fn back_space(&mut self);
    /// Reposition to the first record.
    fn rewind(&mut self);
    /// Append a logical end-of-file mark at the current position.
    fn write_eof(&mut self);
    /// 1-based index of the record just read or written. Diagnostics only.
    fn num_of_records(&self) -> usize;
}

/// Outcome of a RecordStore read.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordRead {
    Record { binary: bool, data: Vec<u8> },
    EofMark,
    EndOfMedium,
}

/// Transfer state of a device. Read and write are mutually exclusive
/// by construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransferState {
    Idle,
    Read,
    Write,
}

/// Medium conditions reported by a word transfer. These mirror tape drive
/// status lines: expected outcomes of sequential i/o that the processor
/// polls and recovers from, never errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransferStatus {
    Ok,
    EndOfFile,
    EndOfRecord,
}

/// Protocol errors indicating a sequencing bug in the caller. Each variant
/// carries the offending unit number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceError {
    AlreadyMounted(u8),
    NotMounted(u8),
    NotSelected(u8),
    WriteProtected(u8),
    InvalidUnit(u8),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceError::AlreadyMounted(unit) => {
                write!(f, "tape on unit {} already mounted", unit)
            }
            DeviceError::NotMounted(unit) => write!(f, "no tape mounted on unit {}", unit),
            DeviceError::NotSelected(unit) => {
                write!(f, "copy while unit {} not selected", unit)
            }
            DeviceError::WriteProtected(unit) => {
                write!(f, "tape on unit {} is write protected", unit)
            }
            DeviceError::InvalidUnit(unit) => write!(f, "invalid unit {}", unit),
        }
    }
}

impl error::Error for DeviceError {}
