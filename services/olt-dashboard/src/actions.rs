//! ONU management actions: authorize, delete, static WAN, detail lookup

use std::net::Ipv4Addr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fetcher::{ActionOutcome, RemoteFetcher};
use crate::normalize::is_blank;
use crate::records::{OnuRecord, Record};
use crate::DashboardError;

fn default_dns1() -> String {
    "8.8.8.8".to_string()
}

fn default_dns2() -> String {
    "8.8.4.4".to_string()
}

/// Authorization form for an unconfigured ONU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    pub sn: String,
    pub pon_type: String,
    pub board: String,
    pub port: String,
    pub onu_type: String,
    pub zone: String,
    pub vlan: String,
    pub name: String,
}

impl AuthorizeRequest {
    pub fn validate(&self) -> crate::Result<()> {
        let required = [
            ("sn", &self.sn),
            ("board", &self.board),
            ("port", &self.port),
            ("onu_type", &self.onu_type),
            ("name", &self.name),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| is_blank(value)) {
            return Err(DashboardError::InvalidInput(format!("{} is required", field)));
        }
        Ok(())
    }
}

/// Static WAN addressing for an ONU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WanStaticConfig {
    pub ipv4_address: String,
    pub subnet_mask: String,
    pub gateway: String,
    #[serde(default = "default_dns1")]
    pub dns1: String,
    #[serde(default = "default_dns2")]
    pub dns2: String,
}

impl WanStaticConfig {
    /// Every field must be a dotted IPv4 address
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [
            ("ipv4_address", &self.ipv4_address),
            ("subnet_mask", &self.subnet_mask),
            ("gateway", &self.gateway),
            ("dns1", &self.dns1),
            ("dns2", &self.dns2),
        ] {
            value.trim().parse::<Ipv4Addr>().map_err(|_| {
                DashboardError::InvalidInput(format!("{} is not a valid IPv4 address: {}", field, value))
            })?;
        }
        Ok(())
    }
}

/// Issues ONU actions against the backend
#[derive(Debug, Clone)]
pub struct OnuActions {
    fetcher: Arc<RemoteFetcher>,
}

impl OnuActions {
    pub fn new(fetcher: Arc<RemoteFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn authorize(&self, request: &AuthorizeRequest) -> crate::Result<ActionOutcome> {
        request.validate()?;
        tracing::info!("Authorizing ONU {} on board {} port {}", request.sn, request.board, request.port);
        let body = serde_json::to_value(request)?;
        self.fetcher.post("/onus/authorize", &body).await
    }

    pub async fn delete(&self, external_id: &str) -> crate::Result<ActionOutcome> {
        let external_id = required_segment("id", external_id)?;
        tracing::info!("Deleting ONU {}", external_id);
        self.fetcher
            .post(&format!("/onus/delete/{}", external_id), &Value::Object(Default::default()))
            .await
    }

    pub async fn set_wan_static(
        &self,
        external_id: &str,
        wan: &WanStaticConfig,
    ) -> crate::Result<ActionOutcome> {
        let external_id = required_segment("id", external_id)?;
        wan.validate()?;
        tracing::info!("Setting static WAN {} on ONU {}", wan.ipv4_address, external_id);
        let body = serde_json::to_value(wan)?;
        self.fetcher
            .post(&format!("/onus/{}/set-wan-static", external_id), &body)
            .await
    }

    /// Look up one ONU by serial number
    pub async fn details(&self, sn: &str) -> crate::Result<OnuRecord> {
        let sn = required_segment("sn", sn)?;
        let payload = self.fetcher.fetch(&format!("/onus/by-sn/{}", sn), false).await?;

        let item = match payload.get("response") {
            Some(Value::Array(items)) => items.first(),
            Some(inner @ Value::Object(_)) => Some(inner),
            _ => Some(&payload),
        }
        .filter(|item| item.is_object())
        .ok_or_else(|| DashboardError::Malformed(format!("No ONU details for {}", sn)))?;

        let record = OnuRecord::from_raw(1, item);
        if is_blank(&record.sn) && is_blank(&record.unique_external_id) {
            return Err(DashboardError::Malformed(format!(
                "ONU details for {} carry no identity",
                sn
            )));
        }
        Ok(record)
    }
}

fn required_segment<'a>(field: &str, value: &'a str) -> crate::Result<&'a str> {
    let value = value.trim();
    if is_blank(value) || value.contains('/') {
        return Err(DashboardError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}
