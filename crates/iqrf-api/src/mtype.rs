// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message kinds (`mType`) understood by the gateway daemon.
//!
//! Every kind has exactly one wire string. Parsing an unknown string is an
//! error, so an `MType` value is always encodable.

use crate::error::ApiError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Payload family of a message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `iqrfRaw`: dotted hex DPA packet.
    Raw,
    /// `iqrfRawHdp`: DPA packet split into named fields.
    RawHdp,
    /// `iqrfEmbed*`: embedded peripherals.
    Embed,
    /// `iqrfSensor_*`, `iqrfBinaryoutput_*`: IQRF standards.
    Standard,
    /// `mngScheduler_*`
    Scheduler,
    /// `mngDaemon_*`
    Daemon,
    /// `iqmeshNetwork_*`
    Iqmesh,
    /// Error notifications emitted by the daemon.
    Error,
}

macro_rules! define_mtypes {
    ($( $variant:ident => $wire:literal, $family:ident; )+) => {
        /// Closed set of supported message kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MType {
            $( $variant, )+
        }

        impl MType {
            /// Every supported kind, in declaration order.
            pub const ALL: &'static [MType] = &[ $( MType::$variant, )+ ];

            /// Wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( MType::$variant => $wire, )+
                }
            }

            /// Payload family this kind belongs to.
            pub const fn family(self) -> Family {
                match self {
                    $( MType::$variant => Family::$family, )+
                }
            }

            /// Whether the kind uses the `{nAdr, hwpId, param}` request
            /// and `{nAdr, hwpId, rCode, dpaVal, result}` response shape.
            pub const fn is_standard_shape(self) -> bool {
                matches!(self.family(), Family::Embed | Family::Standard)
            }
        }

        impl FromStr for MType {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(MType::$variant), )+
                    other => Err(ApiError::UnknownMType(other.to_string())),
                }
            }
        }
    };
}

define_mtypes! {
    IqrfRaw => "iqrfRaw", Raw;
    IqrfRawHdp => "iqrfRawHdp", RawHdp;

    CoordinatorAddrInfo => "iqrfEmbedCoordinator_AddrInfo", Embed;
    CoordinatorDiscoveredDevices => "iqrfEmbedCoordinator_DiscoveredDevices", Embed;
    CoordinatorBondedDevices => "iqrfEmbedCoordinator_BondedDevices", Embed;
    CoordinatorClearAllBonds => "iqrfEmbedCoordinator_ClearAllBonds", Embed;
    CoordinatorBondNode => "iqrfEmbedCoordinator_BondNode", Embed;
    CoordinatorRemoveBond => "iqrfEmbedCoordinator_RemoveBond", Embed;
    CoordinatorDiscovery => "iqrfEmbedCoordinator_Discovery", Embed;
    CoordinatorSetDpaParams => "iqrfEmbedCoordinator_SetDpaParams", Embed;
    CoordinatorSetHops => "iqrfEmbedCoordinator_SetHops", Embed;
    CoordinatorBackup => "iqrfEmbedCoordinator_Backup", Embed;
    CoordinatorRestore => "iqrfEmbedCoordinator_Restore", Embed;
    CoordinatorAuthorizeBond => "iqrfEmbedCoordinator_AuthorizeBond", Embed;
    CoordinatorSmartConnect => "iqrfEmbedCoordinator_SmartConnect", Embed;
    CoordinatorSetMid => "iqrfEmbedCoordinator_SetMID", Embed;

    NodeRead => "iqrfEmbedNode_Read", Embed;
    NodeRemoveBond => "iqrfEmbedNode_RemoveBond", Embed;
    NodeBackup => "iqrfEmbedNode_Backup", Embed;
    NodeRestore => "iqrfEmbedNode_Restore", Embed;
    NodeValidateBonds => "iqrfEmbedNode_ValidateBonds", Embed;

    OsRead => "iqrfEmbedOs_Read", Embed;
    OsReset => "iqrfEmbedOs_Reset", Embed;
    OsReadCfg => "iqrfEmbedOs_ReadCfg", Embed;
    OsRfpgm => "iqrfEmbedOs_Rfpgm", Embed;
    OsSleep => "iqrfEmbedOs_Sleep", Embed;
    OsBatch => "iqrfEmbedOs_Batch", Embed;
    OsRestart => "iqrfEmbedOs_Restart", Embed;
    OsWriteCfgByte => "iqrfEmbedOs_WriteCfgByte", Embed;
    OsLoadCode => "iqrfEmbedOs_LoadCode", Embed;
    OsSelectiveBatch => "iqrfEmbedOs_SelectiveBatch", Embed;
    OsTestRfSignal => "iqrfEmbedOs_TestRfSignal", Embed;
    OsFactorySettings => "iqrfEmbedOs_FactorySettings", Embed;
    OsIndicate => "iqrfEmbedOs_Indicate", Embed;

    EepromRead => "iqrfEmbedEeprom_Read", Embed;
    EepromWrite => "iqrfEmbedEeprom_Write", Embed;
    EeepromRead => "iqrfEmbedEeeprom_Read", Embed;
    EeepromWrite => "iqrfEmbedEeeprom_Write", Embed;
    RamRead => "iqrfEmbedRam_Read", Embed;
    RamWrite => "iqrfEmbedRam_Write", Embed;

    LedrSet => "iqrfEmbedLedr_Set", Embed;
    LedrGet => "iqrfEmbedLedr_Get", Embed;
    LedrPulse => "iqrfEmbedLedr_Pulse", Embed;
    LedrFlashing => "iqrfEmbedLedr_Flashing", Embed;
    LedgSet => "iqrfEmbedLedg_Set", Embed;
    LedgGet => "iqrfEmbedLedg_Get", Embed;
    LedgPulse => "iqrfEmbedLedg_Pulse", Embed;
    LedgFlashing => "iqrfEmbedLedg_Flashing", Embed;

    IoDirection => "iqrfEmbedIo_Direction", Embed;
    IoSet => "iqrfEmbedIo_Set", Embed;
    IoGet => "iqrfEmbedIo_Get", Embed;

    ThermometerRead => "iqrfEmbedThermometer_Read", Embed;

    UartOpen => "iqrfEmbedUart_Open", Embed;
    UartClose => "iqrfEmbedUart_Close", Embed;
    UartWriteRead => "iqrfEmbedUart_WriteRead", Embed;
    UartClearWriteRead => "iqrfEmbedUart_ClearWriteRead", Embed;

    FrcSend => "iqrfEmbedFrc_Send", Embed;
    FrcExtraResult => "iqrfEmbedFrc_ExtraResult", Embed;
    FrcSendSelective => "iqrfEmbedFrc_SendSelective", Embed;
    FrcSetParams => "iqrfEmbedFrc_SetParams", Embed;

    ExploreEnumerate => "iqrfEmbedExplore_Enumerate", Embed;
    ExplorePeripheralInformation => "iqrfEmbedExplore_PeripheralInformation", Embed;
    ExploreMorePeripheralsInformation => "iqrfEmbedExplore_MorePeripheralsInformation", Embed;

    SensorEnumerate => "iqrfSensor_Enumerate", Standard;
    SensorReadSensorsWithTypes => "iqrfSensor_ReadSensorsWithTypes", Standard;
    SensorFrc => "iqrfSensor_Frc", Standard;

    BinaryOutputEnumerate => "iqrfBinaryoutput_Enumerate", Standard;
    BinaryOutputSetOutput => "iqrfBinaryoutput_SetOutput", Standard;

    SchedulerAddTask => "mngScheduler_AddTask", Scheduler;
    SchedulerGetTask => "mngScheduler_GetTask", Scheduler;
    SchedulerRemoveTask => "mngScheduler_RemoveTask", Scheduler;
    SchedulerRemoveAll => "mngScheduler_RemoveAll", Scheduler;
    SchedulerList => "mngScheduler_List", Scheduler;

    DaemonMode => "mngDaemon_Mode", Daemon;
    DaemonExit => "mngDaemon_Exit", Daemon;
    DaemonVersion => "mngDaemon_Version", Daemon;

    IqmeshSmartConnect => "iqmeshNetwork_SmartConnect", Iqmesh;
    IqmeshBondNodeLocal => "iqmeshNetwork_BondNodeLocal", Iqmesh;
    IqmeshEnumerateDevice => "iqmeshNetwork_EnumerateDevice", Iqmesh;
    IqmeshAutoNetwork => "iqmeshNetwork_AutoNetwork", Iqmesh;

    MessageError => "messageError", Error;
    ErrorUnsupportedMsg => "error_UnsupportedMsg", Error;
    ErrorInvalidMsg => "error_InvalidMsg", Error;
    ErrorMessageQueueFull => "error_MessageQueueFull", Error;
    ErrorMessageQueueInactive => "error_MessageQueueInactive", Error;
}

impl fmt::Display for MType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_strings_are_unique() {
        let mut seen = HashSet::new();
        for m in MType::ALL {
            assert!(seen.insert(m.as_str()), "duplicate wire string {}", m);
        }
    }

    #[test]
    fn test_every_kind_parses_back() {
        for m in MType::ALL {
            assert_eq!(m.as_str().parse::<MType>().unwrap(), *m);
        }
    }

    #[test]
    fn test_unknown_string_is_rejected() {
        let err = "iqrfEmbedSpi_WriteRead".parse::<MType>().unwrap_err();
        assert!(matches!(err, ApiError::UnknownMType(ref s) if s == "iqrfEmbedSpi_WriteRead"));

        let json = serde_json::from_str::<MType>("\"iqrfrawhdp\"");
        assert!(json.is_err());
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let json = serde_json::to_string(&MType::SchedulerRemoveTask).unwrap();
        assert_eq!(json, "\"mngScheduler_RemoveTask\"");
        let back: MType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MType::SchedulerRemoveTask);
    }

    #[test]
    fn test_families() {
        assert_eq!(MType::IqrfRawHdp.family(), Family::RawHdp);
        assert_eq!(MType::SensorFrc.family(), Family::Standard);
        assert_eq!(MType::LedrSet.family(), Family::Embed);
        assert!(MType::LedrSet.is_standard_shape());
        assert!(MType::BinaryOutputSetOutput.is_standard_shape());
        assert!(!MType::DaemonVersion.is_standard_shape());
        assert_eq!(MType::IqmeshSmartConnect.family(), Family::Iqmesh);
        assert_eq!(MType::ErrorInvalidMsg.family(), Family::Error);
    }
}
