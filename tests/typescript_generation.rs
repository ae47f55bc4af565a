//! TypeScript Generation Tests
//!
//! Validates that the serializable link types can be exported to TypeScript
//! when the tauri feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_core_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, all types are properly configured for TypeScript export.
    fn assert_type<T: Type>() {}

    // Link types
    assert_type::<mumblelink::Snapshot>();
    assert_type::<mumblelink::LinkStatus>();
    assert_type::<mumblelink::Vec3>();

    // Negotiation and configuration types
    assert_type::<mumblelink::MumbleUrlMessage>();
    assert_type::<mumblelink::VoipClient>();
    assert_type::<mumblelink::AutoLaunchOption>();
    assert_type::<mumblelink::ClientConfig>();
    assert_type::<mumblelink::ServerConfig>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Types still compile without specta::Type
    let _ = mumblelink::VoipClient::Mumble;
    let _ = mumblelink::LinkStatus::disconnected();
}
