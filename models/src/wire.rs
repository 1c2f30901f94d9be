//! Protobuf messages carried inside each length-delimited frame.
//!
//! Declared with prost derives rather than generated from a `.proto` file; the
//! equivalent schema is:
//!
//! ```text
//! message WireCommand {
//!   string name = 1;
//!   uint64 sequence = 2;
//!   oneof payload {
//!     bool bool_value = 3;
//!     uint32 uint32_value = 4;
//!     int64 int64_value = 5;
//!     double double_value = 6;
//!     string string_value = 7;
//!     WireStringList string_list_value = 8;
//!   }
//! }
//! message WireStringList { repeated string values = 1; }
//! ```
//!
//! An absent `payload` is [`TypedPayload::None`]. An empty list is still a present
//! `WireStringList`, so it never collapses into `None`.

use crate::command::{Command, CommandName};
use crate::error::model_error::ModelError;
use crate::payload::TypedPayload;

#[derive(Clone, PartialEq, prost::Message)]
pub struct WireCommand {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub sequence: u64,
    #[prost(oneof = "wire_command::Payload", tags = "3, 4, 5, 6, 7, 8")]
    pub payload: Option<wire_command::Payload>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WireStringList {
    #[prost(string, repeated, tag = "1")]
    pub values: Vec<String>,
}

pub mod wire_command {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Payload {
        #[prost(bool, tag = "3")]
        BoolValue(bool),
        #[prost(uint32, tag = "4")]
        Uint32Value(u32),
        #[prost(int64, tag = "5")]
        Int64Value(i64),
        #[prost(double, tag = "6")]
        DoubleValue(f64),
        #[prost(string, tag = "7")]
        StringValue(String),
        #[prost(message, tag = "8")]
        StringListValue(super::WireStringList),
    }
}

impl WireCommand {
    pub fn from_command(command: &Command, sequence: u64) -> Self {
        Self {
            name: command.name().wire_name().to_string(),
            sequence,
            payload: payload_to_wire(command.payload()),
        }
    }

    /// Converts back into a validated [`Command`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownName`] or [`ModelError::PayloadMismatch`].
    #[track_caller]
    pub fn into_command(self) -> Result<Command, ModelError> {
        let name = CommandName::from_wire(&self.name)?;
        Command::new(name, payload_from_wire(self.payload))
    }
}

fn payload_to_wire(payload: &TypedPayload) -> Option<wire_command::Payload> {
    use wire_command::Payload;

    match payload {
        TypedPayload::None => None,
        TypedPayload::Bool(value) => Some(Payload::BoolValue(*value)),
        TypedPayload::UInt32(value) => Some(Payload::Uint32Value(*value)),
        TypedPayload::Int64(value) => Some(Payload::Int64Value(*value)),
        TypedPayload::Double(value) => Some(Payload::DoubleValue(*value)),
        TypedPayload::String(value) => Some(Payload::StringValue(value.clone())),
        TypedPayload::StringList(values) => Some(Payload::StringListValue(WireStringList {
            values: values.clone(),
        })),
    }
}

fn payload_from_wire(payload: Option<wire_command::Payload>) -> TypedPayload {
    use wire_command::Payload;

    match payload {
        None => TypedPayload::None,
        Some(Payload::BoolValue(value)) => TypedPayload::Bool(value),
        Some(Payload::Uint32Value(value)) => TypedPayload::UInt32(value),
        Some(Payload::Int64Value(value)) => TypedPayload::Int64(value),
        Some(Payload::DoubleValue(value)) => TypedPayload::Double(value),
        Some(Payload::StringValue(value)) => TypedPayload::String(value),
        Some(Payload::StringListValue(list)) => TypedPayload::StringList(list.values),
    }
}
