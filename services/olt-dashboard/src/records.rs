//! Canonical record types for the dashboard's list views

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{count, is_blank, text, text_or, PLACEHOLDER};

/// A normalized backend list item
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    /// Key the backend uses for this list, e.g. `onus` in `{"onus": [...]}`
    const COLLECTION: &'static str;

    /// Fields the free-text search looks at
    const SEARCHABLE: &'static [&'static str];

    /// Fields that make a record "complete" for ranking; empty disables ranking
    const DESCRIPTIVE: &'static [&'static str] = &[];

    /// Map one raw item; `index` is its 1-based position in the payload
    fn from_raw(index: usize, item: &Value) -> Self;

    /// Stable identity: external id, serial number, or insertion index
    fn key(&self) -> &str;

    /// Value of a canonical field by name
    fn field(&self, name: &str) -> Option<&str>;

    /// Value matched against the category selector
    fn category(&self) -> &str;
}

fn pick_key(candidates: &[&str], index: usize) -> String {
    candidates
        .iter()
        .find(|c| !is_blank(c))
        .map(|c| c.to_string())
        .unwrap_or_else(|| index.to_string())
}

/// An authorized ONU, i.e. an active customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnuRecord {
    pub key: String,
    pub unique_external_id: String,
    pub sn: String,
    pub name: String,
    pub olt_name: String,
    pub board: String,
    pub port: String,
    pub onu: String,
    pub onu_type_name: String,
    pub zone_name: String,
    pub location: String,
    pub status: String,
    pub signal: String,
    pub signal_1310: String,
    pub signal_1490: String,
    pub vlan: String,
    pub mode: String,
    pub wan_mode: String,
    pub plan_up: String,
    pub plan_down: String,
    pub administrative_status: String,
    pub authorization_date: String,
}

impl OnuRecord {
    fn zone_label(item: &Value) -> String {
        match text(item, &["zone_name"]) {
            Some(name) => name,
            None => text(item, &["zone_id"])
                .map(|id| format!("Zone {}", id))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }

    // Only parts the backend actually sent; board/port defaults would match searches
    fn location(zone_name: &str, item: &Value) -> String {
        let parts: Vec<String> = [
            Some(zone_name.to_string()).filter(|z| !is_blank(z)),
            text(item, &["board"]).map(|b| format!("Board {}", b)),
            text(item, &["port"]).map(|p| format!("Port {}", p)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            parts.join(", ")
        }
    }

    fn vlan(item: &Value) -> String {
        text(item, &["vlan"])
            .or_else(|| {
                item.get("service_ports")
                    .and_then(Value::as_array)
                    .and_then(|ports| ports.first())
                    .and_then(|port| text(port, &["vlan"]))
            })
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

impl Record for OnuRecord {
    const COLLECTION: &'static str = "onus";
    const SEARCHABLE: &'static [&'static str] = &[
        "name",
        "sn",
        "unique_external_id",
        "olt_name",
        "onu_type_name",
        "status",
        "zone_name",
        "location",
    ];
    const DESCRIPTIVE: &'static [&'static str] = &["name", "zone_name", "onu_type_name"];

    fn from_raw(index: usize, item: &Value) -> Self {
        let unique_external_id = text_or(item, &["unique_external_id"], PLACEHOLDER);
        let sn = text_or(item, &["sn"], PLACEHOLDER);
        let board = text_or(item, &["board"], "0");
        let port = text_or(item, &["port"], "0");
        let zone_name = Self::zone_label(item);
        let location = Self::location(&zone_name, item);

        Self {
            key: pick_key(&[unique_external_id.as_str(), sn.as_str()], index),
            name: text_or(item, &["name"], PLACEHOLDER),
            olt_name: text_or(item, &["olt_name"], PLACEHOLDER),
            onu: text_or(item, &["onu"], PLACEHOLDER),
            onu_type_name: text_or(item, &["onu_type_name", "model", "type"], PLACEHOLDER),
            status: text_or(item, &["status"], PLACEHOLDER),
            signal: text_or(item, &["signal"], PLACEHOLDER),
            signal_1310: text_or(item, &["signal_1310"], PLACEHOLDER),
            signal_1490: text_or(item, &["signal_1490"], PLACEHOLDER),
            vlan: Self::vlan(item),
            mode: text_or(item, &["mode"], PLACEHOLDER),
            wan_mode: text_or(item, &["wan_mode"], PLACEHOLDER),
            plan_up: text_or(item, &["plan_up", "upload_speed_profile_name"], PLACEHOLDER),
            plan_down: text_or(item, &["plan_down", "download_speed_profile_name"], PLACEHOLDER),
            administrative_status: text_or(item, &["administrative_status"], PLACEHOLDER),
            authorization_date: text_or(
                item,
                &["authorization_date", "last_status_change"],
                PLACEHOLDER,
            ),
            unique_external_id,
            sn,
            board,
            port,
            zone_name,
            location,
        }
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "unique_external_id" => &self.unique_external_id,
            "sn" => &self.sn,
            "name" => &self.name,
            "olt_name" => &self.olt_name,
            "board" => &self.board,
            "port" => &self.port,
            "onu" => &self.onu,
            "onu_type_name" => &self.onu_type_name,
            "zone_name" => &self.zone_name,
            "location" => &self.location,
            "status" => &self.status,
            "signal" => &self.signal,
            "signal_1310" => &self.signal_1310,
            "signal_1490" => &self.signal_1490,
            "vlan" => &self.vlan,
            "mode" => &self.mode,
            "wan_mode" => &self.wan_mode,
            "plan_up" => &self.plan_up,
            "plan_down" => &self.plan_down,
            "administrative_status" => &self.administrative_status,
            "authorization_date" => &self.authorization_date,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn category(&self) -> &str {
        &self.olt_name
    }
}

/// An ONU that has been discovered but not yet authorized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnconfiguredOnu {
    pub key: String,
    pub pon_type: String,
    pub olt_name: String,
    pub board: String,
    pub port: String,
    pub sn: String,
    pub model: String,
    pub status: String,
}

impl Record for UnconfiguredOnu {
    const COLLECTION: &'static str = "onus";
    const SEARCHABLE: &'static [&'static str] = &["sn", "model", "olt_name", "status"];

    fn from_raw(index: usize, item: &Value) -> Self {
        let sn = text_or(item, &["sn"], PLACEHOLDER);
        Self {
            key: pick_key(&[sn.as_str()], index),
            pon_type: text(item, &["pon_type"])
                .map(|t| t.to_uppercase())
                .unwrap_or_else(|| "GPON".to_string()),
            olt_name: text_or(item, &["olt_name", "olt_id"], PLACEHOLDER),
            board: text_or(item, &["board"], "0"),
            port: text_or(item, &["port"], "0"),
            model: text_or(item, &["model", "onu_type_name"], PLACEHOLDER),
            status: text_or(item, &["status"], "Disabled"),
            sn,
        }
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "pon_type" => &self.pon_type,
            "olt_name" => &self.olt_name,
            "board" => &self.board,
            "port" => &self.port,
            "sn" => &self.sn,
            "model" => &self.model,
            "status" => &self.status,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn category(&self) -> &str {
        &self.pon_type
    }
}

/// An optical line terminal with its environment readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OltRecord {
    pub key: String,
    pub olt_id: String,
    pub olt_name: String,
    pub uptime: String,
    pub env_temp: String,
}

impl Record for OltRecord {
    const COLLECTION: &'static str = "olts";
    const SEARCHABLE: &'static [&'static str] = &["olt_name", "olt_id"];

    fn from_raw(index: usize, item: &Value) -> Self {
        let olt_id = text_or(item, &["olt_id", "id"], PLACEHOLDER);
        let env_temp = text(item, &["env_temp", "temperature"])
            .map(|t| t.trim_end_matches("°C").trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            key: pick_key(&[olt_id.as_str()], index),
            olt_name: text_or(item, &["olt_name", "name"], "Unknown"),
            uptime: text_or(item, &["uptime"], "N/A"),
            olt_id,
            env_temp,
        }
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "olt_id" => &self.olt_id,
            "olt_name" => &self.olt_name,
            "uptime" => &self.uptime,
            "env_temp" => &self.env_temp,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn category(&self) -> &str {
        &self.olt_name
    }
}

/// ONU counters shown on the dashboard summary cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OltStats {
    pub waiting: u64,
    pub online: u64,
    pub offline: u64,
    pub low_signal: u64,
}

impl OltStats {
    pub fn from_raw(payload: &Value) -> Self {
        let source = payload
            .get("response")
            .filter(|r| r.is_object())
            .unwrap_or(payload);
        Self {
            waiting: count(source, "waiting"),
            online: count(source, "online"),
            offline: count(source, "offline"),
            low_signal: count(source, "lowsignal").max(count(source, "low_signal")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn single_onu_with_only_serial() {
        let records: Vec<OnuRecord> = normalize(&json!({"response": {"onus": [{"sn": "A1"}]}}));
        assert_eq!(records.len(), 1);
        let onu = &records[0];
        assert_eq!(onu.sn, "A1");
        assert_eq!(onu.key(), "A1");
        assert_eq!(onu.name, PLACEHOLDER);
        assert_eq!(onu.olt_name, PLACEHOLDER);
        assert_eq!(onu.status, PLACEHOLDER);
        assert_eq!(onu.vlan, PLACEHOLDER);
        assert_eq!(onu.zone_name, PLACEHOLDER);
        assert_eq!(onu.board, "0");
        assert_eq!(onu.location, PLACEHOLDER);
    }

    #[test]
    fn onu_maps_aliases_and_numbers() {
        let item = json!({
            "unique_external_id": "ext-9",
            "sn": "HWTC0F8317A",
            "board": 6,
            "port": 13,
            "zone_id": 1,
            "model": "HG8245H",
            "service_ports": [{"vlan": 100}],
            "last_status_change": "2025-01-10"
        });
        let onu = OnuRecord::from_raw(4, &item);
        assert_eq!(onu.key(), "ext-9");
        assert_eq!(onu.board, "6");
        assert_eq!(onu.zone_name, "Zone 1");
        assert_eq!(onu.location, "Zone 1, Board 6, Port 13");
        assert_eq!(onu.onu_type_name, "HG8245H");
        assert_eq!(onu.vlan, "100");
        assert_eq!(onu.authorization_date, "2025-01-10");
        assert_eq!(onu.field("location"), Some("Zone 1, Board 6, Port 13"));
        assert_eq!(onu.field("nonexistent"), None);
    }

    #[test]
    fn record_without_identity_uses_index() {
        let onu = OnuRecord::from_raw(7, &json!({"name": "Casa Lopez"}));
        assert_eq!(onu.key(), "7");
    }

    #[test]
    fn unconfigured_defaults() {
        let onus: Vec<UnconfiguredOnu> =
            normalize(&json!({"response": [{"sn": "ZTEG222942E", "pon_type": "gpon"}, {}]}));
        assert_eq!(onus.len(), 2);
        assert_eq!(onus[0].pon_type, "GPON");
        assert_eq!(onus[0].status, "Disabled");
        assert_eq!(onus[0].category(), "GPON");
        assert_eq!(onus[1].sn, PLACEHOLDER);
        assert_eq!(onus[1].key(), "2");
    }

    #[test]
    fn olt_strips_degree_suffix() {
        let olts: Vec<OltRecord> = normalize(&json!({
            "response": [
                {"id": "1", "olt_name": "POAQUIL", "uptime": "12 days", "env_temp": "41°C"},
                {"olt_id": "2"}
            ]
        }));
        assert_eq!(olts[0].olt_id, "1");
        assert_eq!(olts[0].env_temp, "41");
        assert_eq!(olts[1].olt_name, "Unknown");
        assert_eq!(olts[1].uptime, "N/A");
        assert_eq!(olts[1].env_temp, "N/A");
    }

    #[test]
    fn stats_read_flat_or_wrapped() {
        let flat = OltStats::from_raw(&json!({"waiting": 3, "online": 410, "offline": "12", "lowsignal": 5}));
        assert_eq!(
            flat,
            OltStats {
                waiting: 3,
                online: 410,
                offline: 12,
                low_signal: 5
            }
        );

        let wrapped = OltStats::from_raw(&json!({"response": {"online": 2}}));
        assert_eq!(wrapped.online, 2);
        assert_eq!(OltStats::from_raw(&json!({})), OltStats::default());
    }
}
