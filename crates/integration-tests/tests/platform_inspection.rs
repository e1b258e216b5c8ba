//! Platform inspection against the real host

use std::sync::Arc;

use repoinf_core::application::constants::BOOT_TIME;
use repoinf_core::application::{PlatformInspector, PlatformInspectorConfig};
use repoinf_core::domain::{FieldValue, HostFact};
use repoinf_core::port::time_provider::SystemTimeProvider;
use repoinf_core::port::TimeProvider;
use repoinf_infra_system::SystemHostInfo;

fn default_config() -> PlatformInspectorConfig {
    PlatformInspectorConfig::new(Arc::new(SystemTimeProvider))
}

fn inspector(config: PlatformInspectorConfig) -> PlatformInspector {
    PlatformInspector::new(Arc::new(SystemHostInfo::new()), config).unwrap()
}

#[test]
fn test_default_record_shape() {
    let info = inspector(default_config()).inspect();

    let keys: Vec<&str> = info.keys().collect();
    assert_eq!(keys[..4], ["version", "uptime", "platform", "type"]);
    assert_eq!(keys[4..], ["release", "hostname", "arch", BOOT_TIME]);
    assert_eq!(
        info.get("platform"),
        Some(&FieldValue::Text(std::env::consts::OS.into()))
    );
}

#[test]
fn test_boot_time_matches_uptime() {
    let before = SystemTimeProvider.now_millis();
    let info = inspector(default_config()).inspect();
    let after = SystemTimeProvider.now_millis();

    let uptime_ms = info.get("uptime").and_then(FieldValue::as_i64).unwrap() * 1000;
    let boot = info
        .get(BOOT_TIME)
        .and_then(FieldValue::as_timestamp)
        .unwrap()
        .timestamp_millis();

    assert_eq!(boot % 1000, 0);
    // uptime is read in whole seconds and may tick between the reads
    assert!(boot + uptime_ms >= before - 2000);
    assert!(boot + uptime_ms <= after + 1000);
}

#[test]
fn test_extra_facts() {
    let facts = vec![HostFact::TotalMem, HostFact::FreeMem, HostFact::Endianness];
    let config = default_config().with_facts(facts);

    let info = inspector(config).inspect();

    let total = info.get("totalmem").and_then(FieldValue::as_i64).unwrap();
    let free = info.get("freemem").and_then(FieldValue::as_i64).unwrap();
    assert!(total > 0);
    assert!(free <= total);
    let endianness = info.get("endianness").map(ToString::to_string);
    assert!(matches!(endianness.as_deref(), Some("LE" | "BE")));
    assert_eq!(info.get(BOOT_TIME), Some(&FieldValue::Null));
}

#[test]
fn test_serializes_flat() {
    let info = inspector(default_config()).inspect();

    let value = serde_json::to_value(&info).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 8);
    assert!(object["bootTime"].is_string());
    assert!(object["uptime"].is_u64());
}
