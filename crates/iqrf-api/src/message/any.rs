// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged unions over every supported message kind.
//!
//! Decoding reads `mType` first and dispatches on the parsed [`MType`];
//! the payload is never inspected to guess the kind.

use super::daemon::{ExitRequest, ExitResponse, ModeRequest, ModeResponse, VersionResponse};
use super::iqmesh::{
    AutoNetworkProgress, AutoNetworkRequest, BondNodeLocalRequest, BondResult,
    EnumerateDeviceRequest, EnumerateDeviceResponse, SmartConnectRequest,
};
use super::notice::ErrorNotice;
use super::raw::{RawRequest, RawResponse};
use super::scheduler::{AddTaskRequest, ClientRef, GetTaskResponse, ListResponse, TaskRef};
use super::standard::{StdRequest, StdResponse};
use super::{Empty, Request, Response, Validate};
use crate::error::{ApiError, ApiResult};
use crate::hdp::{HdpRequest, HdpResponse};
use crate::mtype::{Family, MType};
use serde_json::Value;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct KindOnly {
    m_type: MType,
}

macro_rules! any_messages {
    (
        standard: $std_req:ty => $std_rsp:ty;
        $( $variant:ident ( $($mtype:ident)|+ ) : $req:ty => $rsp:ty; )+
    ) => {
        /// Any request the daemon accepts.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyRequest {
            /// Embedded peripherals and standards, parameters left untyped.
            Standard(Request<$std_req>),
            $( $variant(Request<$req>), )+
        }

        /// Any response or notification the daemon emits.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyResponse {
            Standard(Response<$std_rsp>),
            $( $variant(Response<$rsp>), )+
            Error(Response<ErrorNotice>),
        }

        impl AnyRequest {
            pub fn decode(text: &str) -> ApiResult<Self> {
                let value: Value = serde_json::from_str(text)?;
                Self::from_value(value)
            }

            pub fn from_value(value: Value) -> ApiResult<Self> {
                let kind: KindOnly = serde_json::from_value(value.clone())?;
                match kind.m_type {
                    $( $(MType::$mtype)|+ => Ok(AnyRequest::$variant(serde_json::from_value(value)?)), )+
                    m if m.is_standard_shape() => {
                        Ok(AnyRequest::Standard(serde_json::from_value(value)?))
                    }
                    m => Err(ApiError::UnknownMType(format!("{} is not a request kind", m))),
                }
            }

            pub fn m_type(&self) -> MType {
                match self {
                    AnyRequest::Standard(r) => r.m_type,
                    $( AnyRequest::$variant(r) => r.m_type, )+
                }
            }

            pub fn msg_id(&self) -> &str {
                match self {
                    AnyRequest::Standard(r) => r.msg_id(),
                    $( AnyRequest::$variant(r) => r.msg_id(), )+
                }
            }

            /// Validate, then serialize to JSON text.
            pub fn encode(&self) -> ApiResult<String> {
                self.validate()?;
                let text = match self {
                    AnyRequest::Standard(r) => serde_json::to_string(r)?,
                    $( AnyRequest::$variant(r) => serde_json::to_string(r)?, )+
                };
                Ok(text)
            }

            /// Envelope checks, plus for standard requests the checks of
            /// the typed adapter their parameters map to.
            pub fn validate(&self) -> ApiResult<()> {
                match self {
                    AnyRequest::Standard(r) => {
                        r.validate()?;
                        r.data.req.to_frame(r.m_type).map(drop)
                    }
                    $( AnyRequest::$variant(r) => Ok(r.validate()?), )+
                }
            }
        }

        impl AnyResponse {
            pub fn decode(text: &str) -> ApiResult<Self> {
                let value: Value = serde_json::from_str(text)?;
                Self::from_value(value)
            }

            pub fn from_value(value: Value) -> ApiResult<Self> {
                let kind: KindOnly = serde_json::from_value(value.clone())?;
                match kind.m_type {
                    $( $(MType::$mtype)|+ => Ok(AnyResponse::$variant(Response::from_value(value)?)), )+
                    m if m.is_standard_shape() => {
                        Ok(AnyResponse::Standard(Response::from_value(value)?))
                    }
                    m if m.family() == Family::Error => {
                        Ok(AnyResponse::Error(Response::from_value(value)?))
                    }
                    m => Err(ApiError::UnknownMType(format!("{} is not a response kind", m))),
                }
            }

            pub fn m_type(&self) -> MType {
                match self {
                    AnyResponse::Standard(r) => r.m_type,
                    $( AnyResponse::$variant(r) => r.m_type, )+
                    AnyResponse::Error(r) => r.m_type,
                }
            }

            pub fn msg_id(&self) -> &str {
                match self {
                    AnyResponse::Standard(r) => &r.msg_id,
                    $( AnyResponse::$variant(r) => &r.msg_id, )+
                    AnyResponse::Error(r) => &r.msg_id,
                }
            }

            pub fn status(&self) -> i32 {
                match self {
                    AnyResponse::Standard(r) => r.status(),
                    $( AnyResponse::$variant(r) => r.status(), )+
                    AnyResponse::Error(r) => r.status(),
                }
            }

            pub fn encode(&self) -> ApiResult<String> {
                match self {
                    AnyResponse::Standard(r) => r.encode(),
                    $( AnyResponse::$variant(r) => r.encode(), )+
                    AnyResponse::Error(r) => r.encode(),
                }
            }
        }
    };
}

any_messages! {
    standard: StdRequest<Value> => StdResponse<Value>;
    Raw(IqrfRaw): RawRequest => RawResponse;
    RawHdp(IqrfRawHdp): HdpRequest => HdpResponse;
    AddTask(SchedulerAddTask): AddTaskRequest => TaskRef;
    GetTask(SchedulerGetTask): TaskRef => GetTaskResponse;
    RemoveTask(SchedulerRemoveTask): TaskRef => TaskRef;
    ClientTasks(SchedulerRemoveAll | SchedulerList): ClientRef => ListResponse;
    Mode(DaemonMode): ModeRequest => ModeResponse;
    Exit(DaemonExit): ExitRequest => ExitResponse;
    Version(DaemonVersion): Empty => VersionResponse;
    SmartConnect(IqmeshSmartConnect): SmartConnectRequest => BondResult;
    BondNodeLocal(IqmeshBondNodeLocal): BondNodeLocalRequest => BondResult;
    EnumerateDevice(IqmeshEnumerateDevice): EnumerateDeviceRequest => EnumerateDeviceResponse;
    AutoNetwork(IqmeshAutoNetwork): AutoNetworkRequest => AutoNetworkProgress;
}

impl AnyRequest {
    pub fn family(&self) -> Family {
        self.m_type().family()
    }
}
