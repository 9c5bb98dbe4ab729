// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! IQMESH network services (`iqmeshNetwork_*`).
//!
//! These are multi-step daemon services. AutoNetwork answers one request
//! with a progress response per wave, all sharing the request's msgId.

use super::{Message, Validate};
use crate::error::ValidationError;
use crate::hdp::MAX_NODE_ADDR;
use crate::mtype::MType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_bonding_retries() -> u8 {
    1
}

fn check_device_addr(addr: u16) -> Result<(), ValidationError> {
    if addr > MAX_NODE_ADDR {
        return Err(ValidationError::out_of_range(
            "deviceAddr",
            addr as i64,
            0,
            MAX_NODE_ADDR as i64,
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartConnectRequest {
    /// Requested address, 0 lets the coordinator pick the next free one.
    pub device_addr: u16,
    /// Code printed on the device (IBK and MID, base32 encoded).
    pub smart_connect_code: String,
    #[serde(default = "default_bonding_retries")]
    pub bonding_test_retries: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Vec<u8>>,
}

impl Validate for SmartConnectRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_device_addr(self.device_addr)?;
        if self.smart_connect_code.is_empty() {
            return Err(ValidationError::MissingField("smartConnectCode"));
        }
        if !self.smart_connect_code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::Malformed {
                field: "smartConnectCode",
                reason: "only ASCII letters and digits are allowed".into(),
            });
        }
        if let Some(data) = &self.user_data {
            if data.len() != 4 {
                return Err(ValidationError::length("userData", data.len(), "4"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondNodeLocalRequest {
    pub device_addr: u16,
    #[serde(default = "default_bonding_retries")]
    pub bonding_test_retries: u8,
}

impl Validate for BondNodeLocalRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_device_addr(self.device_addr)
    }
}

/// Result of SmartConnect and BondNodeLocal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondResult {
    pub assigned_addr: u16,
    pub nodes_nr: u16,
    #[serde(default)]
    pub hwp_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hwp_id_version: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_read: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerateDeviceRequest {
    pub device_addr: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_peripherals_info: Option<bool>,
}

impl Validate for EnumerateDeviceRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_device_addr(self.device_addr)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerateDeviceResponse {
    pub device_addr: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrn: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_read: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peripheral_enumeration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tr_configuration: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waves: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_waves: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_size: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoNetworkRequest {
    pub discovery_tx_power: u8,
    pub discovery_before_start: bool,
    pub action_retries: u8,
    #[serde(default)]
    pub stop_conditions: StopConditions,
}

impl Default for AutoNetworkRequest {
    fn default() -> Self {
        Self {
            discovery_tx_power: 6,
            discovery_before_start: false,
            action_retries: 1,
            stop_conditions: StopConditions {
                waves: Some(10),
                empty_waves: Some(2),
                network_size: None,
            },
        }
    }
}

impl Validate for AutoNetworkRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.discovery_tx_power > 7 {
            return Err(ValidationError::out_of_range(
                "discoveryTxPower",
                self.discovery_tx_power as i64,
                0,
                7,
            ));
        }
        if let Some(size) = self.stop_conditions.network_size {
            if size as u16 > MAX_NODE_ADDR {
                return Err(ValidationError::out_of_range(
                    "networkSize",
                    size as i64,
                    0,
                    MAX_NODE_ADDR as i64,
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    pub mid: String,
    pub address: u16,
}

/// One per wave; the last one has `lastWave` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoNetworkProgress {
    pub wave: u8,
    pub nodes_nr: u16,
    pub new_nodes_nr: u16,
    #[serde(default)]
    pub new_nodes: Vec<NewNode>,
    #[serde(default)]
    pub last_wave: bool,
}

/// `iqmeshNetwork_SmartConnect`
#[derive(Debug, Clone, Copy)]
pub struct SmartConnect;

impl Message for SmartConnect {
    const M_TYPE: MType = MType::IqmeshSmartConnect;
    type Req = SmartConnectRequest;
    type Rsp = BondResult;
}

/// `iqmeshNetwork_BondNodeLocal`
#[derive(Debug, Clone, Copy)]
pub struct BondNodeLocal;

impl Message for BondNodeLocal {
    const M_TYPE: MType = MType::IqmeshBondNodeLocal;
    type Req = BondNodeLocalRequest;
    type Rsp = BondResult;
}

/// `iqmeshNetwork_EnumerateDevice`
#[derive(Debug, Clone, Copy)]
pub struct EnumerateDevice;

impl Message for EnumerateDevice {
    const M_TYPE: MType = MType::IqmeshEnumerateDevice;
    type Req = EnumerateDeviceRequest;
    type Rsp = EnumerateDeviceResponse;
}

/// `iqmeshNetwork_AutoNetwork`
#[derive(Debug, Clone, Copy)]
pub struct AutoNetwork;

impl Message for AutoNetwork {
    const M_TYPE: MType = MType::IqmeshAutoNetwork;
    type Req = AutoNetworkRequest;
    type Rsp = AutoNetworkProgress;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bonding_retries_default_to_one() {
        let req: SmartConnectRequest = serde_json::from_value(json!({
            "deviceAddr": 5, "smartConnectCode": "AB12CD"
        }))
        .unwrap();
        assert_eq!(req.bonding_test_retries, 1);
        req.validate().unwrap();
    }

    #[test]
    fn test_device_addr_above_node_range_is_invalid() {
        let req = BondNodeLocalRequest {
            device_addr: 240,
            bonding_test_retries: 1,
        };
        assert!(matches!(
            req.validate(),
            Err(ValidationError::OutOfRange { field: "deviceAddr", value: 240, .. })
        ));
    }

    #[test]
    fn test_smart_connect_code_alphabet() {
        let req = SmartConnectRequest {
            device_addr: 0,
            smart_connect_code: "AB-12".into(),
            bonding_test_retries: 1,
            user_data: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_progress_decodes_without_new_nodes() {
        let p: AutoNetworkProgress = serde_json::from_value(json!({
            "wave": 1, "nodesNr": 3, "newNodesNr": 0
        }))
        .unwrap();
        assert!(!p.last_wave);
        assert!(p.new_nodes.is_empty());
    }
}
