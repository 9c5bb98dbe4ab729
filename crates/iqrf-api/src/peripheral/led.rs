// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Red (0x06) and green (0x07) LED peripherals.
//!
//! Both expose the same commands and differ only in peripheral number, so
//! the commands are generic over [`LedColor`].

use super::{Ack, PeripheralCommand};
use crate::error::FrameResult;
use crate::hdp::{pnum, HdpResponse, PayloadReader};
use crate::message::{Empty, Validate};
use crate::mtype::MType;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

const CMD_OFF: u8 = 0x00;
const CMD_ON: u8 = 0x01;

pub trait LedColor {
    const PNUM: u8;
    const SET: MType;
    const GET: MType;
    const PULSE: MType;
    const FLASHING: MType;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Red;

#[derive(Debug, Clone, Copy, Default)]
pub struct Green;

impl LedColor for Red {
    const PNUM: u8 = pnum::LEDR;
    const SET: MType = MType::LedrSet;
    const GET: MType = MType::LedrGet;
    const PULSE: MType = MType::LedrPulse;
    const FLASHING: MType = MType::LedrFlashing;
}

impl LedColor for Green {
    const PNUM: u8 = pnum::LEDG;
    const SET: MType = MType::LedgSet;
    const GET: MType = MType::LedgGet;
    const PULSE: MType = MType::LedgPulse;
    const FLASHING: MType = MType::LedgFlashing;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Set<L>(PhantomData<L>);
#[derive(Debug, Clone, Copy, Default)]
pub struct Get<L>(PhantomData<L>);
#[derive(Debug, Clone, Copy, Default)]
pub struct Pulse<L>(PhantomData<L>);
#[derive(Debug, Clone, Copy, Default)]
pub struct Flashing<L>(PhantomData<L>);

pub type LedrSet = Set<Red>;
pub type LedrGet = Get<Red>;
pub type LedrPulse = Pulse<Red>;
pub type LedrFlashing = Flashing<Red>;
pub type LedgSet = Set<Green>;
pub type LedgGet = Get<Green>;
pub type LedgPulse = Pulse<Green>;
pub type LedgFlashing = Flashing<Green>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnOff {
    pub on_off: bool,
}

impl Validate for OnOff {}

impl<L: LedColor> PeripheralCommand for Set<L> {
    const M_TYPE: MType = L::SET;
    const PNUM: u8 = L::PNUM;
    const PCMD: u8 = CMD_OFF;
    const RESULT_KEY: Option<&'static str> = Some("onOff");
    type Params = OnOff;
    type Output = bool;

    fn pcmd(params: &Self::Params) -> u8 {
        if params.on_off {
            CMD_ON
        } else {
            CMD_OFF
        }
    }

    fn matches_response(frame: &HdpResponse) -> bool {
        frame.p_num == L::PNUM && matches!(frame.command(), CMD_OFF | CMD_ON)
    }

    // The response carries no data; the state follows from the command.
    fn decode(frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(frame.command() == CMD_ON)
    }
}

impl<L: LedColor> PeripheralCommand for Get<L> {
    const M_TYPE: MType = L::GET;
    const PNUM: u8 = L::PNUM;
    const PCMD: u8 = 0x02;
    const RESULT_KEY: Option<&'static str> = Some("onOff");
    type Params = Empty;
    type Output = bool;

    fn decode(_frame: &HdpResponse, r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        r.read_bool()
    }
}

impl<L: LedColor> PeripheralCommand for Pulse<L> {
    const M_TYPE: MType = L::PULSE;
    const PNUM: u8 = L::PNUM;
    const PCMD: u8 = 0x03;
    type Params = Empty;
    type Output = Ack;

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

impl<L: LedColor> PeripheralCommand for Flashing<L> {
    const M_TYPE: MType = L::FLASHING;
    const PNUM: u8 = L::PNUM;
    const PCMD: u8 = 0x04;
    type Params = Empty;
    type Output = Ack;

    fn decode(_frame: &HdpResponse, _r: &mut PayloadReader<'_>) -> FrameResult<Self::Output> {
        Ok(Ack {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_encodes_state_in_pcmd() {
        let on = LedgSet::build_request(3, None, &OnOff { on_off: true }).unwrap();
        assert_eq!((on.p_num, on.p_cmd), (0x07, 0x01));
        assert!(on.p_data.is_empty());
        let off = LedrSet::build_request(3, None, &OnOff { on_off: false }).unwrap();
        assert_eq!((off.p_num, off.p_cmd), (0x06, 0x00));
    }

    #[test]
    fn test_set_result_follows_response_command() {
        let req = LedgSet::build_request(3, None, &OnOff { on_off: true }).unwrap();
        let rsp = HdpResponse::answering(&req, vec![]);
        let value = serde_json::to_value(LedgSet::parse_result(&rsp).unwrap()).unwrap();
        assert_eq!(value, json!({"onOff": true}));
    }

    #[test]
    fn test_red_response_does_not_match_green() {
        let req = LedrPulse::build_request(3, None, &Empty {}).unwrap();
        let rsp = HdpResponse::answering(&req, vec![]);
        assert!(LedrPulse::parse_response(&rsp).is_ok());
        assert!(LedgPulse::parse_response(&rsp).is_err());
    }

    #[test]
    fn test_get_reads_state() {
        let req = LedrGet::build_request(0, None, &Empty {}).unwrap();
        assert!(LedrGet::parse_response(&HdpResponse::answering(&req, vec![1])).unwrap());
    }
}
