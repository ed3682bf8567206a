//! Host-facing sensors derived from the coordinator's latest data.

mod timestamp;

use std::sync::Arc;

use portal_client::AccountInfo;
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};
use tokio::sync::RwLock;

use crate::coordinator::CoordinatorData;

pub use timestamp::parse_reading_time;

pub const DOMAIN: &str = "plano_water";
pub const MANUFACTURER: &str = "City of Plano";
pub const MODEL: &str = "Water Meter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    CurrentUsage,
    DailyUsage,
    LastReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub kind: SensorKind,
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
}

pub static SENSOR_TYPES: [SensorDescription; 3] = [
    SensorDescription {
        kind: SensorKind::CurrentUsage,
        key: "current_usage",
        name: "Current Hour Usage",
        unit: Some("gal"),
        icon: "mdi:water",
        device_class: None,
        state_class: Some(StateClass::Measurement),
    },
    SensorDescription {
        kind: SensorKind::DailyUsage,
        key: "daily_usage",
        name: "Daily Usage",
        unit: Some("gal"),
        icon: "mdi:water-pump",
        device_class: None,
        state_class: Some(StateClass::TotalIncreasing),
    },
    SensorDescription {
        kind: SensorKind::LastReading,
        key: "last_reading",
        name: "Last Reading Time",
        unit: None,
        icon: "mdi:clock",
        device_class: Some(DeviceClass::Timestamp),
        state_class: None,
    },
];

impl SensorKind {
    pub fn description(self) -> &'static SensorDescription {
        match self {
            Self::CurrentUsage => &SENSOR_TYPES[0],
            Self::DailyUsage => &SENSOR_TYPES[1],
            Self::LastReading => &SENSOR_TYPES[2],
        }
    }
}

impl SensorDescription {
    pub fn display_name(&self) -> String {
        format!("Plano Water {}", self.name)
    }

    /// Stable across restarts for a given account.
    pub fn unique_id(&self, account_number: &str) -> String {
        format!("{DOMAIN}_{account_number}_{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Gallons(f64),
    Timestamp(#[serde(serialize_with = "timestamp::serialize")] PrimitiveDateTime),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub account_number: Option<String>,
    pub meter_number: Option<String>,
    pub account_name: Option<String>,
    pub last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reading_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub sw_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub key: &'static str,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub value: Option<SensorValue>,
    pub available: bool,
    pub attributes: Option<SensorAttributes>,
    pub device: DeviceInfo,
}

pub fn native_value(kind: SensorKind, data: Option<&CoordinatorData>) -> Option<SensorValue> {
    let usage = &data?.usage_data;

    match kind {
        SensorKind::CurrentUsage => Some(SensorValue::Gallons(usage.current_usage)),
        SensorKind::DailyUsage => Some(SensorValue::Gallons(usage.daily_usage)),
        SensorKind::LastReading => {
            let raw = usage.last_reading.as_deref()?;
            match parse_reading_time(raw) {
                Some(ts) => Some(SensorValue::Timestamp(ts)),
                None => {
                    tracing::warn!(value = raw, "could not parse reading time");
                    None
                }
            }
        }
    }
}

pub fn extra_attributes(
    kind: SensorKind,
    data: Option<&CoordinatorData>,
    now: OffsetDateTime,
) -> Option<SensorAttributes> {
    let data = data?;
    let account = &data.account_info;

    let mut attributes = SensorAttributes {
        account_number: Some(account.account_number.clone()),
        meter_number: Some(account.meter_number.clone()),
        account_name: Some(account.name.clone()),
        last_updated: now.format(&Rfc3339).unwrap_or_default(),
        ..Default::default()
    };

    match kind {
        SensorKind::CurrentUsage => attributes.last_reading_date = data.usage_data.last_reading.clone(),
        SensorKind::DailyUsage => attributes.reading_count = Some(data.usage_data.raw_data.len()),
        SensorKind::LastReading => {}
    }

    Some(attributes)
}

pub fn device_info(account: Option<&AccountInfo>) -> DeviceInfo {
    let account_number = account.map(|a| a.account_number.as_str());
    let meter_number = account.map(|a| a.meter_number.as_str());

    DeviceInfo {
        identifiers: vec![(
            DOMAIN.to_string(),
            account_number.unwrap_or("unknown").to_string(),
        )],
        name: format!("Plano Water Account {}", account_number.unwrap_or("Unknown")),
        manufacturer: MANUFACTURER,
        model: MODEL,
        sw_version: meter_number.unwrap_or("Unknown").to_string(),
    }
}

/// Current state of every sensor.
pub fn sensor_states(
    data: Option<&CoordinatorData>,
    last_update_success: bool,
    now: OffsetDateTime,
) -> Vec<SensorState> {
    let account = data.map(|d| &d.account_info);
    let account_number = account.map(|a| a.account_number.as_str()).unwrap_or_default();
    let device = device_info(account);

    SENSOR_TYPES
        .iter()
        .map(|desc| SensorState {
            unique_id: desc.unique_id(account_number),
            name: desc.display_name(),
            key: desc.key,
            unit: desc.unit,
            icon: desc.icon,
            device_class: desc.device_class,
            state_class: desc.state_class,
            value: native_value(desc.kind, data),
            available: last_update_success && data.is_some(),
            attributes: extra_attributes(desc.kind, data, now),
            device: device.clone(),
        })
        .collect()
}

/// Latest sensor states, shared with the HTTP endpoint.
#[derive(Clone, Default)]
pub struct SensorBoard {
    states: Arc<RwLock<Vec<SensorState>>>,
}

impl SensorBoard {
    pub async fn publish(&self, states: Vec<SensorState>) {
        *self.states.write().await = states;
    }

    pub async fn snapshot(&self) -> Vec<SensorState> {
        self.states.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_client::{UsageRecord, UsageSnapshot};
    use time::macros::datetime;

    fn data() -> CoordinatorData {
        CoordinatorData {
            account_info: AccountInfo {
                account_number: "12345".to_string(),
                name: "Jane Doe".to_string(),
                address: "1 Main St".to_string(),
                meter_id: "99".to_string(),
                meter_number: "M-99".to_string(),
            },
            usage_data: UsageSnapshot::from_records(vec![
                UsageRecord {
                    date: "11/26/24".to_string(),
                    time: "3:00 AM".to_string(),
                    usage: 12.5,
                },
                UsageRecord {
                    date: "11/26/24".to_string(),
                    time: "2:00 AM".to_string(),
                    usage: 2.5,
                },
            ]),
        }
    }

    #[test]
    fn unique_ids_combine_account_and_key() {
        let ids: Vec<String> = SENSOR_TYPES.iter().map(|d| d.unique_id("12345")).collect();
        assert_eq!(
            ids,
            vec![
                "plano_water_12345_current_usage",
                "plano_water_12345_daily_usage",
                "plano_water_12345_last_reading",
            ]
        );
    }

    #[test]
    fn descriptions_carry_units_and_classes() {
        let current = SensorKind::CurrentUsage.description();
        assert_eq!(current.unit, Some("gal"));
        assert_eq!(current.state_class, Some(StateClass::Measurement));

        let daily = SensorKind::DailyUsage.description();
        assert_eq!(daily.icon, "mdi:water-pump");
        assert_eq!(daily.state_class, Some(StateClass::TotalIncreasing));

        let last = SensorKind::LastReading.description();
        assert_eq!(last.unit, None);
        assert_eq!(last.device_class, Some(DeviceClass::Timestamp));
        assert_eq!(last.display_name(), "Plano Water Last Reading Time");
    }

    #[test]
    fn native_values_follow_snapshot() {
        let data = data();

        assert_eq!(
            native_value(SensorKind::CurrentUsage, Some(&data)),
            Some(SensorValue::Gallons(12.5))
        );
        assert_eq!(
            native_value(SensorKind::DailyUsage, Some(&data)),
            Some(SensorValue::Gallons(15.0))
        );
        assert_eq!(
            native_value(SensorKind::LastReading, Some(&data)),
            Some(SensorValue::Timestamp(datetime!(2024-11-26 3:00)))
        );
        assert_eq!(native_value(SensorKind::CurrentUsage, None), None);
    }

    #[test]
    fn unparsable_reading_time_has_no_value() {
        let mut data = data();
        data.usage_data.last_reading = Some("yesterday-ish".to_string());

        assert_eq!(native_value(SensorKind::LastReading, Some(&data)), None);
    }

    #[test]
    fn attributes_are_sensor_specific() {
        let data = data();
        let now = datetime!(2024-11-26 10:00 UTC);

        let current = extra_attributes(SensorKind::CurrentUsage, Some(&data), now).unwrap();
        assert_eq!(current.account_number.as_deref(), Some("12345"));
        assert_eq!(current.meter_number.as_deref(), Some("M-99"));
        assert_eq!(current.account_name.as_deref(), Some("Jane Doe"));
        assert_eq!(current.last_updated, "2024-11-26T10:00:00Z");
        assert_eq!(current.last_reading_date.as_deref(), Some("11/26/24 3:00 AM"));
        assert_eq!(current.reading_count, None);

        let daily = extra_attributes(SensorKind::DailyUsage, Some(&data), now).unwrap();
        assert_eq!(daily.reading_count, Some(2));
        assert_eq!(daily.last_reading_date, None);

        assert!(extra_attributes(SensorKind::DailyUsage, None, now).is_none());
    }

    #[test]
    fn device_info_falls_back_when_account_unknown() {
        let device = device_info(None);
        assert_eq!(device.identifiers, vec![("plano_water".to_string(), "unknown".to_string())]);
        assert_eq!(device.name, "Plano Water Account Unknown");
        assert_eq!(device.sw_version, "Unknown");

        let data = data();
        let device = device_info(Some(&data.account_info));
        assert_eq!(device.name, "Plano Water Account 12345");
        assert_eq!(device.manufacturer, "City of Plano");
        assert_eq!(device.sw_version, "M-99");
    }

    #[test]
    fn states_are_unavailable_without_successful_update() {
        let now = datetime!(2024-11-26 10:00 UTC);
        let data = data();

        let states = sensor_states(Some(&data), true, now);
        assert_eq!(states.len(), 3);
        assert!(states.iter().all(|s| s.available));

        let stale = sensor_states(Some(&data), false, now);
        assert!(stale.iter().all(|s| !s.available));
        assert_eq!(stale[0].value, Some(SensorValue::Gallons(12.5)));

        let empty = sensor_states(None, false, now);
        assert!(empty.iter().all(|s| !s.available && s.value.is_none()));
        assert_eq!(empty[0].unique_id, "plano_water__current_usage");
    }

    #[test]
    fn timestamp_values_serialize_as_iso_local_time() {
        let value = SensorValue::Timestamp(datetime!(2024-11-26 15:00));
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"2024-11-26T15:00:00\"");
        assert_eq!(serde_json::to_string(&SensorValue::Gallons(1.5)).unwrap(), "1.5");
    }
}
