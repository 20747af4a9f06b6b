// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

// Units are numbered 1 to 10 on the modeled channel.
const DEFAULT_TAPE_UNITS: u8 = 10;

pub struct Config {
    pub tape_units: u8,
}

impl Config {
    pub fn new(tape_units: u8) -> Config {
        Config { tape_units }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new(DEFAULT_TAPE_UNITS)
    }
}
