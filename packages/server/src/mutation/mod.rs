//! The shared mutation pipeline behind every content write.
//!
//! Each admin mutation runs the same sequence: validate the submitted
//! fields, stage any attachments through an [`uploads::UploadBatch`],
//! perform the single authoritative database write, and either compensate
//! (discard everything staged in this call) on failure or release the
//! superseded attachments after the write is confirmed.

pub mod slug;
pub mod uploads;
