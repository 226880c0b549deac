/*!
 * Core Traits
 * Interfaces shared by the allocator components
 */

use std::io::{self, Write};

/// Human-readable counter dump
///
/// Components with usage counters write them to any sink in one line,
/// usable for logging and monitoring. No side effects beyond the write.
pub trait Dump {
    /// Write the component's counters to `out`
    fn dump(&self, out: &mut dyn Write) -> io::Result<()>;
}
