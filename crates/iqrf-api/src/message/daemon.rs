// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Daemon management messages (`mngDaemon_*`).

use super::{Empty, Message, Validate};
use crate::error::ValidationError;
use crate::mtype::MType;
use serde::{Deserialize, Serialize};

/// Daemon operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperMode {
    Operational,
    Service,
    Forwarding,
}

/// `{ operMode }`. An absent mode queries the current one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oper_mode: Option<OperMode>,
}

impl Validate for ModeRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeResponse {
    pub oper_mode: OperMode,
}

/// `{ timeToExit }` in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitRequest {
    pub time_to_exit: f64,
}

impl Validate for ExitRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.time_to_exit.is_finite() || self.time_to_exit < 0.0 {
            return Err(ValidationError::Malformed {
                field: "timeToExit",
                reason: "must be a non-negative number".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitResponse {
    pub time_to_exit: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// `mngDaemon_Mode`
#[derive(Debug, Clone, Copy)]
pub struct Mode;

impl Message for Mode {
    const M_TYPE: MType = MType::DaemonMode;
    type Req = ModeRequest;
    type Rsp = ModeResponse;
}

/// `mngDaemon_Exit`
#[derive(Debug, Clone, Copy)]
pub struct Exit;

impl Message for Exit {
    const M_TYPE: MType = MType::DaemonExit;
    type Req = ExitRequest;
    type Rsp = ExitResponse;
}

/// `mngDaemon_Version`
#[derive(Debug, Clone, Copy)]
pub struct Version;

impl Message for Version {
    const M_TYPE: MType = MType::DaemonVersion;
    type Req = Empty;
    type Rsp = VersionResponse;
}
