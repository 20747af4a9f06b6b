// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

pub mod device;
pub mod factory;
pub mod storage;
pub mod util;
