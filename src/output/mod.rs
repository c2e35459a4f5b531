//! Output layout on disk
//!
//! An [`OutputLocation`] is the versioned directory a batch writes into; each
//! [`SequenceDescriptor`] names one image sequence (and its video) inside it.

pub mod location;
pub mod sequence;

pub use location::OutputLocation;
pub use sequence::{SequenceDescriptor, HOST_FRAME_TOKEN};
