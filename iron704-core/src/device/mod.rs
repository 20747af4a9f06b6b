// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod tape;

pub use self::tape::{pack_record, unpack_record, TapeDrive};
