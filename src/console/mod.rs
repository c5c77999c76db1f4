//! Serial console for the bus shell
//!
//! Byte-at-a-time line editing, echo and prompt. Completed lines go to an
//! [`Evaluate`](crate::shell::Evaluate) implementation.
//! Zero heap allocation - all static buffers.

pub mod console;
pub mod line_buffer;

pub use console::{Console, VERSION};
pub use line_buffer::{LineBuffer, LINE_SIZE};
