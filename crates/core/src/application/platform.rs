// Platform Inspector - host facts plus derived fields
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::constants::BOOT_TIME;
use super::formatter::{derivation, format_output, Derivations};
use crate::domain::{FieldValue, HostFact, PlatformInfo, Record};
use crate::error::{AppError, Result};
use crate::port::{HostInfo, TimeProvider};

/// Boot instant: current time floored to the whole second, minus uptime
///
/// Returns `None` if the result is outside the representable range.
pub fn boot_time(now_millis: i64, uptime_secs: i64) -> Option<FieldValue> {
    let now = now_millis.div_euclid(1000) * 1000;
    let boot = now.checked_sub(uptime_secs.checked_mul(1000)?)?;
    Utc.timestamp_millis_opt(boot)
        .single()
        .map(FieldValue::from)
}

/// Default derivations: `bootTime` from the `uptime` fact
pub fn default_platform_derivations(time_provider: Arc<dyn TimeProvider>) -> Derivations {
    let mut derivations = Derivations::new();
    derivations.insert(
        BOOT_TIME.to_string(),
        derivation(move |r: &Record| {
            r.get(HostFact::Uptime.name())
                .and_then(FieldValue::as_i64)
                .and_then(|uptime| boot_time(time_provider.now_millis(), uptime))
                .unwrap_or(FieldValue::Null)
        }),
    );
    derivations
}

/// Platform Inspector configuration
#[derive(Clone)]
pub struct PlatformInspectorConfig {
    /// Facts to collect, in output order
    pub facts: Vec<HostFact>,
    pub derivations: Derivations,
}

impl PlatformInspectorConfig {
    /// Default fact list and `bootTime` derivation
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            facts: HostFact::DEFAULTS.to_vec(),
            derivations: default_platform_derivations(time_provider),
        }
    }

    pub fn with_facts(mut self, facts: Vec<HostFact>) -> Self {
        self.facts = facts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for fact in &self.facts {
            if !seen.insert(fact) {
                return Err(AppError::Config(format!(
                    "Host fact '{}' listed twice",
                    fact
                )));
            }
        }

        for name in self.derivations.keys() {
            if self.facts.iter().any(|fact| fact.name() == name) {
                return Err(AppError::Config(format!(
                    "Derived field '{}' collides with a host fact of the same name",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for PlatformInspectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformInspectorConfig")
            .field("facts", &self.facts)
            .field("derivations", &self.derivations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Platform Inspector
pub struct PlatformInspector {
    host: Arc<dyn HostInfo>,
    config: PlatformInspectorConfig,
}

impl PlatformInspector {
    /// Create a new platform inspector
    ///
    /// # Errors
    /// AppError::Config if `config` fails validation
    pub fn new(host: Arc<dyn HostInfo>, config: PlatformInspectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { host, config })
    }

    pub fn config(&self) -> &PlatformInspectorConfig {
        &self.config
    }

    /// Collect the configured facts and derive extra fields from them
    pub fn inspect(&self) -> PlatformInfo {
        let facts: Record = self
            .config
            .facts
            .iter()
            .map(|&fact| {
                let value = self.host.fact(fact);
                debug!(fact = %fact, value = %value, "Host fact collected");
                (fact.name().to_string(), value)
            })
            .collect();
        let formatted = format_output(Some(&facts), &self.config.derivations);

        info!(
            facts = facts.len(),
            derived = formatted.len(),
            "Platform inspection complete"
        );

        PlatformInfo { facts, formatted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::host_info::mocks::MockHostInfo;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::time_provider::SystemTimeProvider;

    // 2026-10-19T08:00:00.750Z
    const NOW_MS: i64 = 1_792_396_800_750;

    fn inspector(uptime_secs: u64) -> PlatformInspector {
        PlatformInspector::new(
            Arc::new(MockHostInfo::new(uptime_secs)),
            PlatformInspectorConfig::new(Arc::new(FixedTimeProvider(NOW_MS))),
        )
        .unwrap()
    }

    fn boot_millis(info: &PlatformInfo) -> i64 {
        let boot = info.get(BOOT_TIME).and_then(FieldValue::as_timestamp);
        boot.unwrap().timestamp_millis()
    }

    #[test]
    fn test_default_facts_then_boot_time() {
        let info = inspector(3600).inspect();

        let keys: Vec<&str> = info.keys().collect();
        assert_eq!(keys[..4], ["version", "uptime", "platform", "type"]);
        assert_eq!(keys[4..], ["release", "hostname", "arch", "bootTime"]);
        assert_eq!(info.get("type"), Some(&FieldValue::Text("Linux".into())));
    }

    #[test]
    fn test_boot_time_floors_to_whole_second() {
        let info = inspector(3600).inspect();

        assert_eq!(boot_millis(&info), 1_792_396_800_000 - 3_600_000);
    }

    #[test]
    fn test_boot_time_helper() {
        let value = boot_time(1_999, 1).unwrap();
        assert_eq!(value.as_timestamp().unwrap().timestamp_millis(), 0);
        assert!(boot_time(0, i64::MAX).is_none());
    }

    #[test]
    fn test_custom_fact_list_without_uptime() {
        let config = PlatformInspectorConfig::new(Arc::new(FixedTimeProvider(NOW_MS)))
            .with_facts(vec![HostFact::Arch, HostFact::Endianness]);
        let inspector = PlatformInspector::new(Arc::new(MockHostInfo::new(5)), config).unwrap();

        let info = inspector.inspect();

        assert_eq!(
            info.keys().collect::<Vec<_>>(),
            vec!["arch", "endianness", "bootTime"]
        );
        assert_eq!(info.get(BOOT_TIME), Some(&FieldValue::Null));
    }

    #[test]
    fn test_boot_time_stable_within_a_second() {
        let inspector = PlatformInspector::new(
            Arc::new(MockHostInfo::new(120)),
            PlatformInspectorConfig::new(Arc::new(SystemTimeProvider)),
        )
        .unwrap();

        let first = inspector.inspect();
        let second = inspector.inspect();

        let (a, b) = (boot_millis(&first), boot_millis(&second));
        assert!((b - a).abs() <= 1000);
        assert_eq!(a % 1000, 0);
    }

    #[test]
    fn test_config_validation() {
        let time: Arc<dyn TimeProvider> = Arc::new(FixedTimeProvider(NOW_MS));

        let duplicated = PlatformInspectorConfig::new(time.clone())
            .with_facts(vec![HostFact::Arch, HostFact::Arch]);
        assert!(matches!(duplicated.validate(), Err(AppError::Config(_))));

        let mut colliding = PlatformInspectorConfig::new(time);
        colliding
            .derivations
            .insert("arch".to_string(), derivation(|_| FieldValue::Null));
        assert!(matches!(colliding.validate(), Err(AppError::Config(_))));
    }
}
