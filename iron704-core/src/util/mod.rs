// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod shared;
mod word;

pub use self::shared::{new_shared, new_shared_cell, Shared, SharedCell};
pub use self::word::Word;
