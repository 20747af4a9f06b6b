// This file is part of iron704.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod logger;

pub use self::logger::Logger;
