// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Peripheral enumeration and information (pNum 0xFF and per-peripheral 0x3F).
//!
//! Unlike the other adapters, `PeripheralInformation` addresses the queried
//! peripheral directly and `MorePeripheralsInformation` carries the first
//! peripheral number in `pCmd`; both override `pnum`/`pcmd` and response
//! matching.

use super::{bitmap_to_indexes, command_header, command_type, PeripheralCommand};
use crate::error::{FrameError, FrameResult, ValidationError};
use crate::hdp::{pnum, HdpResponse, PayloadReader};
use crate::message::{Empty, Validate};
use serde::{Deserialize, Serialize};

/// `pCmd` of the enumeration and information requests.
pub const CMD_GET_PER_INFO: u8 = 0x3F;
/// First user peripheral number.
pub const USER_PER_OFFSET: u8 = 0x20;
const EMBEDDED_PERS_LEN: usize = 4;
const PER_INFO_LEN: usize = 4;

command_type!(Enumerate, PeripheralInformation, MorePeripheralsInformation);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeripheralEnumeration {
    pub dpa_ver: u16,
    pub per_nr: u8,
    pub embedded_pers: Vec<u8>,
    pub hwp_id: u16,
    pub hwp_id_ver: u16,
    pub flags: u8,
    pub user_per: Vec<u8>,
}

/// Reads the enumeration block; shared with OS Read, which appends it.
pub(crate) fn read_enumeration(r: &mut PayloadReader<'_>) -> FrameResult<PeripheralEnumeration> {
    let dpa_ver = r.read_u16_le()?;
    let per_nr = r.read_u8()?;
    let embedded_pers = bitmap_to_indexes("embeddedPers", r.read_bytes(EMBEDDED_PERS_LEN)?)?;
    let hwp_id = r.read_u16_le()?;
    let hwp_id_ver = r.read_u16_le()?;
    let flags = r.read_u8()?;
    let user_per = bitmap_to_indexes("userPer", r.read_rest())?
        .into_iter()
        .map(|i| {
            i.checked_add(USER_PER_OFFSET).ok_or_else(|| FrameError::InvalidValue {
                field: "userPer",
                reason: format!("user peripheral {} is past pNum 0xff", i),
            })
        })
        .collect::<FrameResult<_>>()?;
    Ok(PeripheralEnumeration {
        dpa_ver,
        per_nr,
        embedded_pers,
        hwp_id,
        hwp_id_ver,
        flags,
        user_per,
    })
}

impl PeripheralCommand for Enumerate {
    command_header!(ExploreEnumerate, pnum::ENUMERATION, CMD_GET_PER_INFO, Empty => PeripheralEnumeration);

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_enumeration(r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeripheralInfo {
    pub per_te: u8,
    pub per_t: u8,
    pub par1: u8,
    pub par2: u8,
}

fn read_info(r: &mut PayloadReader<'_>) -> FrameResult<PeripheralInfo> {
    Ok(PeripheralInfo {
        per_te: r.read_u8()?,
        per_t: r.read_u8()?,
        par1: r.read_u8()?,
        par2: r.read_u8()?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerParams {
    pub per: u8,
}

impl Validate for PerParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.per == pnum::ENUMERATION {
            return Err(ValidationError::out_of_range(
                "per",
                self.per as i64,
                0,
                (pnum::ENUMERATION - 1) as i64,
            ));
        }
        Ok(())
    }
}

impl PeripheralCommand for PeripheralInformation {
    // pNum is taken from the params.
    command_header!(ExplorePeripheralInformation, pnum::COORDINATOR, CMD_GET_PER_INFO, PerParams => PeripheralInfo);

    fn pnum(params: &Self::Params) -> u8 {
        params.per
    }

    fn matches_response(frame: &HdpResponse) -> bool {
        frame.p_num != pnum::ENUMERATION && frame.command() == CMD_GET_PER_INFO
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        read_info(r)
    }
}

/// First peripheral to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorePerParams {
    pub per: u8,
}

impl Validate for MorePerParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.per >= crate::hdp::RESPONSE_FLAG || self.per == CMD_GET_PER_INFO {
            return Err(ValidationError::Malformed {
                field: "per",
                reason: format!("{:#04x} cannot be carried in pCmd", self.per),
            });
        }
        Ok(())
    }
}

impl PeripheralCommand for MorePeripheralsInformation {
    command_header!(ExploreMorePeripheralsInformation, pnum::ENUMERATION, 0x00, MorePerParams => Vec<PeripheralInfo>, "peripherals");

    fn pcmd(params: &Self::Params) -> u8 {
        params.per
    }

    fn matches_response(frame: &HdpResponse) -> bool {
        frame.p_num == pnum::ENUMERATION && frame.command() != CMD_GET_PER_INFO
    }

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        let mut infos = Vec::with_capacity(r.remaining() / PER_INFO_LEN);
        while !r.is_empty() {
            infos.push(read_info(r)?);
        }
        Ok(infos)
    }
}
