// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::rc::Rc;

use iron704_core::device::TapeDrive;
use iron704_core::factory::{Device, DeviceError, RecordStore};
use iron704_core::util::{new_shared, new_shared_cell, Shared, SharedCell, Word};

use crate::config::Config;

// Design:
//   IoSystem represents the i/o side of the machine: the bank of tape
//   drives, the accumulator register they all copy words through and the
//   tape check indicator they all raise on a mode mismatch. Connections
//   between components are managed as component dependencies.

pub struct IoSystem {
    config: Rc<Config>,
    accumulator: SharedCell<Word>,
    tape_check: SharedCell<bool>,
    tapes: Vec<Shared<TapeDrive>>,
}

impl IoSystem {
    pub fn build(config: Rc<Config>) -> IoSystem {
        info!(target: "system", "Building i/o subsystem with {} tape units", config.tape_units);
        let accumulator = new_shared_cell(Word::default());
        let tape_check = new_shared_cell(false);
        let tapes = (1..=config.tape_units)
            .map(|unit| {
                new_shared(TapeDrive::new(
                    unit,
                    accumulator.clone(),
                    tape_check.clone(),
                ))
            })
            .collect();
        IoSystem {
            config,
            accumulator,
            tape_check,
            tapes,
        }
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_accumulator(&self) -> SharedCell<Word> {
        self.accumulator.clone()
    }

    pub fn get_tape(&self, unit: u8) -> Option<Shared<TapeDrive>> {
        if unit >= 1 && (unit as usize) <= self.tapes.len() {
            Some(self.tapes[unit as usize - 1].clone())
        } else {
            None
        }
    }

    pub fn tape_check(&self) -> bool {
        self.tape_check.get()
    }

    pub fn clear_tape_check(&self) {
        self.tape_check.set(false);
    }

    pub fn mount_tape(
        &self,
        unit: u8,
        store: Shared<dyn RecordStore>,
        read_only: bool,
    ) -> Result<(), DeviceError> {
        let tape = self.get_tape(unit).ok_or(DeviceError::InvalidUnit(unit))?;
        let result = tape.borrow_mut().mount(store, read_only);
        result
    }

    pub fn unmount_tape(&self, unit: u8) -> Result<(), DeviceError> {
        let tape = self.get_tape(unit).ok_or(DeviceError::InvalidUnit(unit))?;
        let result = tape.borrow_mut().unmount();
        result
    }

    /// Channel reset: disconnect every drive, forcing active transfers to
    /// completion, clear the tape check indicator and zero the accumulator.
    /// Mounted reels stay in place.
    pub fn reset(&self) {
        info!(target: "system", "Resetting i/o subsystem");
        for tape in &self.tapes {
            tape.borrow_mut().disconnect();
        }
        self.tape_check.set(false);
        self.accumulator.set(Word::default());
    }
}
