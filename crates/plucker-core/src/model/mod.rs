//! Declaration-time model of a serializer.
//!
//! A [`descriptor::Descriptor`] is built once through its builder, then
//! shared read-only by every render. Field and relationship descriptors own
//! the value-resolution protocol; the renderers in `render` only drive them.
//!
//! In general:
//! - builders define *what is exposed*
//! - `render` defines *how it is produced*

pub mod condition;
pub mod descriptor;
pub mod field;
pub mod relationship;

#[cfg(test)]
mod tests;
