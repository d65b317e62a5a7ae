//! Room record schema for wifisurvey.
//!
//! This module defines the surveyed-room record, the statically declared
//! list of form fields with their labels, and the policy deciding which of
//! those fields must be filled in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label used for the record identifier in headers and diagnostics.
pub const ID_LABEL: &str = "ID";

/// A user-editable field of a room record.
///
/// The declaration order is the form order; validation reports missing
/// fields in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Free-form room label.
    Room,
    /// Signal level on the 2.4GHz band, in dBm.
    SignalLevel24,
    /// Signal level on the 5GHz band, in dBm.
    SignalLevel5,
    /// Throughput on the 2.4GHz band, in Mbps.
    Speed24,
    /// Throughput on the 5GHz band, in Mbps.
    Speed5,
    /// Free-form notes about interference sources.
    Interference,
}

impl Field {
    /// Number of declared fields.
    pub const COUNT: usize = 6;

    /// All declared fields, in form order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Room,
        Self::SignalLevel24,
        Self::SignalLevel5,
        Self::Speed24,
        Self::Speed5,
        Self::Interference,
    ];

    /// The submitted form name of this field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::SignalLevel24 => "signalLevel24",
            Self::SignalLevel5 => "signalLevel5",
            Self::Speed24 => "speed24",
            Self::Speed5 => "speed5",
            Self::Interference => "interference",
        }
    }

    /// Human-readable label, used in notices and column headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Room => "Cômodo",
            Self::SignalLevel24 => "Nível de sinal (dbm) 2,4GHz",
            Self::SignalLevel5 => "Nível de sinal (dbm) 5GHz",
            Self::Speed24 => "Velocidade (Mbps) 2,4GHz",
            Self::Speed5 => "Velocidade (Mbps) 5GHz",
            Self::Interference => "Interferência",
        }
    }

    /// Look up a declared field by its submitted form name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Whether the field holds a measurement rather than free text.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Room | Self::Interference)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which fields a submission may leave empty.
///
/// Two policies were observed in the field: one requiring both bands and one
/// accepting surveys of the 2.4GHz band only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredPolicy {
    /// Every field except interference is required.
    #[default]
    AllBands,
    /// The 5GHz signal and speed are optional as well.
    PrimaryBand,
}

impl RequiredPolicy {
    /// Fields exempt from the required check under this policy.
    #[must_use]
    pub fn exempt(self) -> &'static [Field] {
        match self {
            Self::AllBands => &[Field::Interference],
            Self::PrimaryBand => &[Field::Interference, Field::SignalLevel5, Field::Speed5],
        }
    }

    /// Whether `field` must be non-empty under this policy.
    #[must_use]
    pub fn is_required(self, field: Field) -> bool {
        !self.exempt().contains(&field)
    }

    /// Describe every declared field under this policy.
    #[must_use]
    pub fn describe(self) -> Vec<FieldInfo> {
        Field::ALL
            .into_iter()
            .map(|field| FieldInfo {
                key: field.key(),
                label: field.label(),
                required: self.is_required(field),
                numeric: field.is_numeric(),
            })
            .collect()
    }
}

/// Summary of one declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    /// Form name.
    pub key: &'static str,
    /// Label.
    pub label: &'static str,
    /// Whether it must be filled in.
    pub required: bool,
    /// Whether it holds a measurement.
    pub numeric: bool,
}

impl fmt::Display for RequiredPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllBands => write!(f, "all_bands"),
            Self::PrimaryBand => write!(f, "primary_band"),
        }
    }
}

/// Opaque unique identifier of a room record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(Uuid);

impl RoomId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The first eight hex digits, enough to address a record in a session.
    #[must_use]
    pub fn short(&self) -> String {
        let mut text = self.0.simple().to_string();
        text.truncate(8);
        text
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RoomId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Raw values for every declared field, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: [String; Field::COUNT],
}

impl FieldValues {
    /// The value of `field`, empty when never set.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Set the value of `field`.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Iterate over `(field, value)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

/// One surveyed room.
///
/// Measurement fields keep the submitted text; nothing beyond the
/// required-field check is enforced. Use [`Room::numeric`] to read them as
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Unique identifier, assigned on create and preserved on edit.
    pub id: RoomId,
    /// Room label.
    pub room: String,
    /// 2.4GHz signal level (dBm).
    #[serde(rename = "signalLevel24")]
    pub signal_level_24: String,
    /// 5GHz signal level (dBm).
    #[serde(rename = "signalLevel5")]
    pub signal_level_5: String,
    /// 2.4GHz throughput (Mbps).
    #[serde(rename = "speed24")]
    pub speed_24: String,
    /// 5GHz throughput (Mbps).
    #[serde(rename = "speed5")]
    pub speed_5: String,
    /// Interference notes.
    pub interference: String,
}

impl Room {
    /// Build a record from field values.
    #[must_use]
    pub fn from_values(id: RoomId, values: &FieldValues) -> Self {
        Self {
            id,
            room: values.get(Field::Room).to_string(),
            signal_level_24: values.get(Field::SignalLevel24).to_string(),
            signal_level_5: values.get(Field::SignalLevel5).to_string(),
            speed_24: values.get(Field::Speed24).to_string(),
            speed_5: values.get(Field::Speed5).to_string(),
            interference: values.get(Field::Interference).to_string(),
        }
    }

    /// The raw value of `field`.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Room => &self.room,
            Field::SignalLevel24 => &self.signal_level_24,
            Field::SignalLevel5 => &self.signal_level_5,
            Field::Speed24 => &self.speed_24,
            Field::Speed5 => &self.speed_5,
            Field::Interference => &self.interference,
        }
    }

    /// Copy of all field values, used to prefill an edit form.
    #[must_use]
    pub fn values(&self) -> FieldValues {
        let mut values = FieldValues::default();
        for field in Field::ALL {
            values.set(field, self.value(field));
        }
        values
    }

    /// The value of `field` as a number, if it parses as a finite one.
    #[must_use]
    pub fn numeric(&self, field: Field) -> Option<f64> {
        parse_measurement(self.value(field))
    }
}

/// Parse a measurement as entered in a number input.
#[must_use]
pub fn parse_measurement(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> FieldValues {
        let mut values = FieldValues::default();
        values.set(Field::Room, "Sala");
        values.set(Field::SignalLevel24, "-40");
        values.set(Field::SignalLevel5, "-55");
        values.set(Field::Speed24, "100");
        values.set(Field::Speed5, "50");
        values
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("id"), None);
        assert_eq!(Field::from_key("unknown"), None);
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(Field::Room.label(), "Cômodo");
        assert_eq!(Field::Interference.label(), "Interferência");
        assert_eq!(Field::Speed5.label(), "Velocidade (Mbps) 5GHz");
    }

    #[test]
    fn test_field_is_numeric() {
        assert!(!Field::Room.is_numeric());
        assert!(Field::SignalLevel24.is_numeric());
        assert!(Field::Speed5.is_numeric());
        assert!(!Field::Interference.is_numeric());
    }

    #[test]
    fn test_all_bands_policy() {
        let policy = RequiredPolicy::AllBands;
        assert!(policy.is_required(Field::Room));
        assert!(policy.is_required(Field::SignalLevel5));
        assert!(policy.is_required(Field::Speed5));
        assert!(!policy.is_required(Field::Interference));
    }

    #[test]
    fn test_primary_band_policy() {
        let policy = RequiredPolicy::PrimaryBand;
        assert!(policy.is_required(Field::Room));
        assert!(policy.is_required(Field::SignalLevel24));
        assert!(!policy.is_required(Field::SignalLevel5));
        assert!(!policy.is_required(Field::Speed5));
        assert!(!policy.is_required(Field::Interference));
    }

    #[test]
    fn test_describe() {
        let infos = RequiredPolicy::PrimaryBand.describe();
        assert_eq!(infos.len(), Field::COUNT);
        assert_eq!(infos[0].key, "room");
        assert!(infos[0].required);
        assert!(!infos[0].numeric);
        assert!(!infos[2].required);
        assert!(infos[2].numeric);
    }

    #[test]
    fn test_policy_default_and_display() {
        assert_eq!(RequiredPolicy::default(), RequiredPolicy::AllBands);
        assert_eq!(RequiredPolicy::PrimaryBand.to_string(), "primary_band");
    }

    #[test]
    fn test_room_id_unique() {
        assert_ne!(RoomId::generate(), RoomId::generate());
    }

    #[test]
    fn test_room_id_parse_and_short() {
        let id = RoomId::generate();
        let parsed: RoomId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
        assert!("not-a-uuid".parse::<RoomId>().is_err());
    }

    #[test]
    fn test_room_from_values() {
        let id = RoomId::generate();
        let room = Room::from_values(id, &sample_values());

        assert_eq!(room.id, id);
        assert_eq!(room.room, "Sala");
        assert_eq!(room.value(Field::SignalLevel5), "-55");
        assert_eq!(room.interference, "");
        assert_eq!(room.values(), sample_values());
    }

    #[test]
    fn test_room_numeric() {
        let mut values = sample_values();
        values.set(Field::Speed5, "fast");
        let room = Room::from_values(RoomId::generate(), &values);

        assert_eq!(room.numeric(Field::SignalLevel24), Some(-40.0));
        assert_eq!(room.numeric(Field::Speed5), None);
        assert_eq!(room.numeric(Field::Interference), None);
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement(" 12.5 "), Some(12.5));
        assert_eq!(parse_measurement(""), None);
        assert_eq!(parse_measurement("inf"), None);
        assert_eq!(parse_measurement("NaN"), None);
    }

    #[test]
    fn test_room_serializes_with_form_keys() {
        let room = Room::from_values(RoomId::generate(), &sample_values());
        let json = serde_json::to_value(&room).unwrap();

        assert_eq!(json["room"], "Sala");
        assert_eq!(json["signalLevel24"], "-40");
        assert_eq!(json["speed5"], "50");
        assert_eq!(json["id"], room.id.to_string());
    }
}
