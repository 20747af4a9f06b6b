// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

mod cli;
mod diag;
mod util;

use std::process;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use structopt::StructOpt;

use iron704_system::IoSystem;

use crate::cli::Opt;
use crate::util::Logger;

static NAME: &str = "iron704";

fn main() {
    let opt = Opt::from_args();
    match run(&opt) {
        Ok(_) => process::exit(0),
        Err(err) => {
            println!("Error: {}", err);
            process::exit(1)
        }
    };
}

fn run(opt: &Opt) -> Result<()> {
    let logger = Logger::build(opt.log_level.as_str(), &opt.log_target_level)
        .map_err(anyhow::Error::msg)?;
    Logger::enable(logger).map_err(anyhow::Error::msg)?;
    info!(target: "main", "Starting {}", NAME);
    let config = Rc::new(cli::build_config(opt).map_err(anyhow::Error::msg)?);
    let io_system = IoSystem::build(config.clone());
    let mut failed = 0;
    for unit in 1..=config.tape_units {
        match diag::exercise_unit(&io_system, unit, opt) {
            Ok(report) => {
                println!("Tape {:2}: ok, {}", unit, report);
            }
            Err(err) => {
                error!(target: "main", "Tape {} failed: {}", unit, err);
                println!("Tape {:2}: FAILED, {}", unit, err);
                failed += 1;
            }
        }
    }
    if io_system.tape_check() {
        return Err(anyhow!("tape check indicator raised"));
    }
    if failed > 0 {
        return Err(anyhow!("{} of {} units failed", failed, config.tape_units));
    }
    Ok(())
}
