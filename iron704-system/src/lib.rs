// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

mod config;
mod io_system;

pub use self::config::Config;
pub use self::io_system::IoSystem;
