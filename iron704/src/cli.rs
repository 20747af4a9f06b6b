// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::error::Error;

use structopt::StructOpt;

use iron704_system::Config;

#[derive(StructOpt, Debug)]
#[structopt(name = "iron704")]
pub struct Opt {
    /// number of tape units to exercise
    #[structopt(long, default_value = "10")]
    pub units: u8,
    /// records written per unit
    #[structopt(long, default_value = "4")]
    pub records: usize,
    /// words per record
    #[structopt(long, default_value = "32")]
    pub words: usize,
    /// write BCD records instead of binary
    #[structopt(long)]
    pub bcd: bool,

    // -- Logging
    /// set log level
    #[structopt(long = "loglevel", default_value = "info")]
    pub log_level: String,
    /// set log level for a target
    #[structopt(long = "log", parse(try_from_str = parse_key_val))]
    pub log_target_level: Vec<(String, String)>,
}

pub fn build_config(opt: &Opt) -> Result<Config, String> {
    if opt.units == 0 {
        return Err("invalid unit count".to_string());
    }
    Ok(Config::new(opt.units))
}

fn parse_key_val(s: &str) -> Result<(String, String), Box<dyn Error>> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
