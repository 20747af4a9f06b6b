// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use iron704_core::device::TapeDrive;
use iron704_core::factory::{Device, TransferStatus};
use iron704_core::storage::MemStore;
use iron704_core::util::{new_shared, Word};
use iron704_system::IoSystem;

use crate::cli::Opt;

// Write/read-back acceptance exercise for one drive: mount a scratch reel,
// write a batch of pattern records followed by an EOF mark, rewind, verify
// everything back including the status sequencing at the record and file
// boundaries, then backspace and re-verify the final record.

pub fn exercise_unit(io_system: &IoSystem, unit: u8, opt: &Opt) -> Result<String, String> {
    if opt.words == 0 {
        return Err("words per record must be at least 1".to_string());
    }
    let binary = !opt.bcd;
    io_system
        .mount_tape(unit, new_shared(MemStore::new()), false)
        .map_err(|err| err.to_string())?;
    let result = run_exercise(io_system, unit, binary, opt.records, opt.words);
    io_system.unmount_tape(unit).map_err(|err| err.to_string())?;
    result?;
    Ok(format!(
        "{} {} records of {} words verified",
        opt.records,
        if binary { "binary" } else { "BCD" },
        opt.words
    ))
}

fn run_exercise(
    io_system: &IoSystem,
    unit: u8,
    binary: bool,
    records: usize,
    words: usize,
) -> Result<(), String> {
    let tape = io_system
        .get_tape(unit)
        .ok_or_else(|| format!("invalid unit {}", unit))?;
    let mut drive = tape.borrow_mut();

    // Write pass. Each select starts a new record; the record is committed
    // by the operation that ends the episode.
    for record in 0..records {
        drive.select_write(binary).map_err(|err| err.to_string())?;
        for index in 0..words {
            let mut word = pattern_word(unit, record, index);
            expect_status(
                drive.transfer(&mut word).map_err(|err| err.to_string())?,
                TransferStatus::Ok,
                "write",
                record,
            )?;
        }
    }
    drive.write_eof().map_err(|err| err.to_string())?;
    drive.rewind().map_err(|err| err.to_string())?;

    // Read pass.
    for record in 0..records {
        drive.select_read(binary).map_err(|err| err.to_string())?;
        verify_record(&mut drive, unit, record, words)?;
    }
    // the EOF mark, then running off the end of the medium
    drive.select_read(binary).map_err(|err| err.to_string())?;
    let mut word = Word::default();
    expect_status(
        drive.transfer(&mut word).map_err(|err| err.to_string())?,
        TransferStatus::EndOfFile,
        "read at EOF mark",
        records,
    )?;
    drive.select_read(binary).map_err(|err| err.to_string())?;
    expect_status(
        drive.transfer(&mut word).map_err(|err| err.to_string())?,
        TransferStatus::EndOfFile,
        "read at end of medium",
        records,
    )?;

    // Backspace over the mark and the final record, then re-verify it.
    if records > 0 {
        drive.backspace().map_err(|err| err.to_string())?;
        drive.backspace().map_err(|err| err.to_string())?;
        drive.select_read(binary).map_err(|err| err.to_string())?;
        verify_record(&mut drive, unit, records - 1, words)?;
    }
    Ok(())
}

fn verify_record(
    drive: &mut TapeDrive,
    unit: u8,
    record: usize,
    words: usize,
) -> Result<(), String> {
    for index in 0..words {
        let mut word = Word::default();
        expect_status(
            drive.transfer(&mut word).map_err(|err| err.to_string())?,
            TransferStatus::Ok,
            "read",
            record,
        )?;
        let expected = pattern_word(unit, record, index);
        if word != expected {
            return Err(format!(
                "data mismatch in record {} at word {}: expected {} got {}",
                record + 1,
                index,
                expected,
                word
            ));
        }
    }
    let mut word = Word::default();
    expect_status(
        drive.transfer(&mut word).map_err(|err| err.to_string())?,
        TransferStatus::EndOfRecord,
        "read past record",
        record,
    )
}

fn expect_status(
    status: TransferStatus,
    expected: TransferStatus,
    context: &str,
    record: usize,
) -> Result<(), String> {
    if status == expected {
        Ok(())
    } else {
        Err(format!(
            "unexpected status {:?} on {} at record {}, expected {:?}",
            status,
            context,
            record + 1,
            expected
        ))
    }
}

fn pattern_word(unit: u8, record: usize, index: usize) -> Word {
    let value = (u64::from(unit) << 30) ^ ((record as u64) << 15) ^ index as u64;
    Word::from_bits(value)
}
