//! Integration tests for the shared id newtypes.

use cmdgate_common::{ChannelId, CmdGateError, GuildId, UserId};

#[test]
fn test_ids_serialize_transparently() {
    let user = UserId(42);
    assert_eq!(serde_json::to_string(&user).unwrap(), "42");

    let guild: GuildId = serde_json::from_str("555").unwrap();
    assert_eq!(guild, GuildId(555));

    let channel: ChannelId = serde_json::from_str("7").unwrap();
    assert_eq!(channel.to_string(), "7");
}

#[test]
fn test_error_display() {
    let err = CmdGateError::Config("missing token".to_string());
    assert_eq!(err.to_string(), "Configuration error: missing token");

    let io: CmdGateError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, CmdGateError::Io(_)));
}
