//! Frame body encoding.
//!
//! Frames are `u32` big-endian length prefixed (`LengthDelimitedCodec`); the body is
//! a protobuf [`WireCommand`]. A frame is only handed to the decoder once complete.

use crate::error::command::CommandError;

use models::{Command, WireCommand};

use prost::Message;
use prost::bytes::{Bytes, BytesMut};
use tokio_util::codec::LengthDelimitedCodec;

pub(crate) fn frame_codec(max_frame_length: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(max_frame_length)
        .new_codec()
}

pub fn encode_command(command: &Command, sequence: u64) -> Result<Bytes, CommandError> {
    let wire = WireCommand::from_command(command, sequence);
    let mut buffer = BytesMut::with_capacity(wire.encoded_len());
    wire.encode(&mut buffer)?;
    Ok(buffer.freeze())
}

/// Decode one frame body into its sequence number and validated command.
///
/// # Errors
///
/// Returns [`CommandError`] for undecodable bytes, unknown names or payload mismatches.
pub fn decode_command(frame: &[u8]) -> Result<(u64, Command), CommandError> {
    let wire = WireCommand::decode(frame)?;
    let sequence = wire.sequence;
    let command = wire.into_command()?;
    Ok((sequence, command))
}
