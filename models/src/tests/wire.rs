use crate::{Command, CommandName, TypedPayload, WireCommand};

use prost::Message;

fn round_trip(command: &Command) -> Command {
    let mut buffer = Vec::new();
    WireCommand::from_command(command, 7)
        .encode(&mut buffer)
        .expect("encode into Vec cannot fail");
    WireCommand::decode(buffer.as_slice())
        .expect("decode")
        .into_command()
        .expect("valid command")
}

/// **VALUE**: Verifies every payload variant survives encode and decode, including edge values.
///
/// **WHY THIS MATTERS**: Payloads are the only data crossing the process boundary. A variant
/// that decodes as another (e.g. `false` as `None`) silently changes behaviour in the worker.
///
/// **BUG THIS CATCHES**: Would catch default-valued scalars or the empty list collapsing into
/// an absent payload.
#[test]
fn given_every_payload_variant_when_round_tripped_then_identical() {
    // GIVEN: Echo commands carrying each variant, including defaults and extremes
    let payloads = vec![
        TypedPayload::None,
        TypedPayload::Bool(false),
        TypedPayload::Bool(true),
        TypedPayload::UInt32(0),
        TypedPayload::UInt32(u32::MAX),
        TypedPayload::Int64(i64::MIN),
        TypedPayload::Int64(0),
        TypedPayload::Double(0.0),
        TypedPayload::Double(-12.25),
        TypedPayload::String(String::new()),
        TypedPayload::String("héllo wörld".to_string()),
        TypedPayload::StringList(Vec::new()),
        TypedPayload::StringList(vec!["a".to_string(), String::new(), "c".to_string()]),
    ];

    for payload in payloads {
        let command = Command::echo(payload.clone());

        // WHEN: Round-tripping through the wire message
        let decoded = round_trip(&command);

        // THEN: Same payload variant and value
        assert_eq!(decoded.payload(), &payload, "Payload changed on the wire");
        assert_eq!(decoded.name(), CommandName::Echo);
    }
}

/// **VALUE**: Verifies a frame naming an unknown command fails conversion instead of panicking.
///
/// **WHY THIS MATTERS**: The reader task drops malformed frames and keeps reading.
///
/// **BUG THIS CATCHES**: Would catch `into_command` defaulting unknown names.
#[test]
fn given_unknown_name_on_wire_when_converted_then_error() {
    // GIVEN: A wire message with an unknown name
    let wire = WireCommand {
        name: "fastForward".to_string(),
        sequence: 1,
        payload: None,
    };

    // WHEN / THEN: Conversion fails
    assert!(wire.into_command().is_err());
}
