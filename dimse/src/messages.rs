//! The DIMSE message catalogue:
//! one value type per command of PS3.7, Sections 9 and 10,
//! each with a fixed projection to and from its command set.

use snafu::{Backtrace, Snafu};

use crate::commandset::{tags, CommandSet, ProjectError};
use ferrodicom_ul::uids;

/// The `CommandDataSetType` value stating that no data set follows.
pub const NO_DATA_SET: u16 = 0x0101;
/// The `CommandDataSetType` value used when a data set follows.
pub const DATA_SET_PRESENT: u16 = 0x0001;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Unknown command field {:#06x}", value))]
    UnknownCommandField { value: u16, backtrace: Backtrace },

    #[snafu(display("Invalid priority value {:#06x}", value))]
    InvalidPriority { value: u16, backtrace: Backtrace },

    #[snafu(transparent)]
    Project { source: ProjectError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The command field codes of PS3.7, Table E.1-1.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum CommandField {
    C_STORE_RQ = 0x0001,
    C_STORE_RSP = 0x8001,
    C_GET_RQ = 0x0010,
    C_GET_RSP = 0x8010,
    C_FIND_RQ = 0x0020,
    C_FIND_RSP = 0x8020,
    C_MOVE_RQ = 0x0021,
    C_MOVE_RSP = 0x8021,
    C_ECHO_RQ = 0x0030,
    C_ECHO_RSP = 0x8030,
    N_EVENT_REPORT_RQ = 0x0100,
    N_EVENT_REPORT_RSP = 0x8100,
    N_GET_RQ = 0x0110,
    N_GET_RSP = 0x8110,
    N_SET_RQ = 0x0120,
    N_SET_RSP = 0x8120,
    N_ACTION_RQ = 0x0130,
    N_ACTION_RSP = 0x8130,
    N_CREATE_RQ = 0x0140,
    N_CREATE_RSP = 0x8140,
    N_DELETE_RQ = 0x0150,
    N_DELETE_RSP = 0x8150,
    C_CANCEL_RQ = 0x0FFF,
}

impl CommandField {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(CommandField::C_STORE_RQ),
            0x8001 => Some(CommandField::C_STORE_RSP),
            0x0010 => Some(CommandField::C_GET_RQ),
            0x8010 => Some(CommandField::C_GET_RSP),
            0x0020 => Some(CommandField::C_FIND_RQ),
            0x8020 => Some(CommandField::C_FIND_RSP),
            0x0021 => Some(CommandField::C_MOVE_RQ),
            0x8021 => Some(CommandField::C_MOVE_RSP),
            0x0030 => Some(CommandField::C_ECHO_RQ),
            0x8030 => Some(CommandField::C_ECHO_RSP),
            0x0100 => Some(CommandField::N_EVENT_REPORT_RQ),
            0x8100 => Some(CommandField::N_EVENT_REPORT_RSP),
            0x0110 => Some(CommandField::N_GET_RQ),
            0x8110 => Some(CommandField::N_GET_RSP),
            0x0120 => Some(CommandField::N_SET_RQ),
            0x8120 => Some(CommandField::N_SET_RSP),
            0x0130 => Some(CommandField::N_ACTION_RQ),
            0x8130 => Some(CommandField::N_ACTION_RSP),
            0x0140 => Some(CommandField::N_CREATE_RQ),
            0x8140 => Some(CommandField::N_CREATE_RSP),
            0x0150 => Some(CommandField::N_DELETE_RQ),
            0x8150 => Some(CommandField::N_DELETE_RSP),
            0x0FFF => Some(CommandField::C_CANCEL_RQ),
            _ => None,
        }
    }
}

/// The priority of a composite service request.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Medium = 0x0000,
    High = 0x0001,
    Low = 0x0002,
}

impl Priority {
    fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0000 => Some(Priority::Medium),
            0x0001 => Some(Priority::High),
            0x0002 => Some(Priority::Low),
            _ => None,
        }
    }
}

fn read_priority(cs: &CommandSet) -> Result<Priority> {
    let value = cs.require_u16(tags::PRIORITY)?;
    Priority::from_u16(value).ok_or_else(|| InvalidPrioritySnafu { value }.build())
}

fn data_set_present(cs: &CommandSet) -> bool {
    cs.get_u16(tags::COMMAND_DATA_SET_TYPE) != Some(NO_DATA_SET)
}

fn data_set_type_of(present: bool) -> u16 {
    if present {
        DATA_SET_PRESENT
    } else {
        NO_DATA_SET
    }
}

/// C-STORE request. See PS3.7, Section 9.3.1.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CStoreRq {
    pub message_id: u16,
    pub priority: Priority,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    /// AE title of the node that invoked the C-MOVE
    /// this store is a sub-operation of, if any
    pub move_originator_application_entity_title: Option<String>,
    pub move_originator_message_id: Option<u16>,
}

impl CStoreRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_STORE_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::PRIORITY, self.priority as u16);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, DATA_SET_PRESENT);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        if let Some(message_id) = self.move_originator_message_id {
            cs.put_u16(tags::MOVE_ORIGINATOR_MESSAGE_ID, message_id);
        }
        if let Some(ae_title) = &self.move_originator_application_entity_title {
            cs.put_str(tags::MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE, &**ae_title);
        }
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CStoreRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            priority: read_priority(cs)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            move_originator_application_entity_title: cs
                .get_str(tags::MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE)
                .map(str::to_string),
            move_originator_message_id: cs.get_u16(tags::MOVE_ORIGINATOR_MESSAGE_ID),
        })
    }
}

/// C-STORE response. See PS3.7, Section 9.3.1.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CStoreRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub status: u16,
}

impl CStoreRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_STORE_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs.put_u16(tags::STATUS, self.status);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CStoreRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            status: cs.require_u16(tags::STATUS)?,
        })
    }
}

/// C-GET request. See PS3.7, Section 9.3.3.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CGetRq {
    pub message_id: u16,
    pub priority: Priority,
    pub affected_sop_class_uid: String,
}

impl CGetRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_GET_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::PRIORITY, self.priority as u16);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, DATA_SET_PRESENT);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CGetRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            priority: read_priority(cs)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
        })
    }
}

/// C-GET response. See PS3.7, Section 9.3.3.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CGetRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub data_set_present: bool,
    pub status: u16,
    /// required while the status is pending
    pub number_of_remaining_sub_operations: Option<u16>,
    pub number_of_completed_sub_operations: u16,
    pub number_of_failed_sub_operations: u16,
    pub number_of_warning_sub_operations: u16,
}

impl CGetRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_GET_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        if let Some(remaining) = self.number_of_remaining_sub_operations {
            cs.put_u16(tags::NUMBER_OF_REMAINING_SUBOPERATIONS, remaining);
        }
        cs.put_u16(
            tags::NUMBER_OF_COMPLETED_SUBOPERATIONS,
            self.number_of_completed_sub_operations,
        );
        cs.put_u16(
            tags::NUMBER_OF_FAILED_SUBOPERATIONS,
            self.number_of_failed_sub_operations,
        );
        cs.put_u16(
            tags::NUMBER_OF_WARNING_SUBOPERATIONS,
            self.number_of_warning_sub_operations,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CGetRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            data_set_present: data_set_present(cs),
            status: cs.require_u16(tags::STATUS)?,
            number_of_remaining_sub_operations: cs
                .get_u16(tags::NUMBER_OF_REMAINING_SUBOPERATIONS),
            number_of_completed_sub_operations: cs
                .get_u16(tags::NUMBER_OF_COMPLETED_SUBOPERATIONS)
                .unwrap_or(0),
            number_of_failed_sub_operations: cs
                .get_u16(tags::NUMBER_OF_FAILED_SUBOPERATIONS)
                .unwrap_or(0),
            number_of_warning_sub_operations: cs
                .get_u16(tags::NUMBER_OF_WARNING_SUBOPERATIONS)
                .unwrap_or(0),
        })
    }
}

/// C-FIND request. See PS3.7, Section 9.3.2.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFindRq {
    pub message_id: u16,
    pub priority: Priority,
    pub affected_sop_class_uid: String,
}

impl CFindRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_FIND_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::PRIORITY, self.priority as u16);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, DATA_SET_PRESENT);
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CFindRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            priority: read_priority(cs)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
        })
    }
}

/// C-FIND response. See PS3.7, Section 9.3.2.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFindRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    /// a data set accompanies every pending match
    pub data_set_present: bool,
    pub status: u16,
}

impl CFindRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_FIND_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CFindRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            data_set_present: data_set_present(cs),
            status: cs.require_u16(tags::STATUS)?,
        })
    }
}

/// C-MOVE request. See PS3.7, Section 9.3.4.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMoveRq {
    pub message_id: u16,
    pub priority: Priority,
    pub affected_sop_class_uid: String,
    pub move_destination: String,
}

impl CMoveRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_MOVE_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::PRIORITY, self.priority as u16);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, DATA_SET_PRESENT);
        cs.put_str(tags::MOVE_DESTINATION, &*self.move_destination);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CMoveRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            priority: read_priority(cs)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            move_destination: cs.require_str(tags::MOVE_DESTINATION)?.to_string(),
        })
    }
}

/// C-MOVE response. See PS3.7, Section 9.3.4.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMoveRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub data_set_present: bool,
    pub status: u16,
    pub number_of_remaining_sub_operations: u16,
    pub number_of_completed_sub_operations: u16,
    pub number_of_failed_sub_operations: u16,
    pub number_of_warning_sub_operations: u16,
}

impl CMoveRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_MOVE_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs.put_u16(
            tags::NUMBER_OF_REMAINING_SUBOPERATIONS,
            self.number_of_remaining_sub_operations,
        );
        cs.put_u16(
            tags::NUMBER_OF_COMPLETED_SUBOPERATIONS,
            self.number_of_completed_sub_operations,
        );
        cs.put_u16(
            tags::NUMBER_OF_FAILED_SUBOPERATIONS,
            self.number_of_failed_sub_operations,
        );
        cs.put_u16(
            tags::NUMBER_OF_WARNING_SUBOPERATIONS,
            self.number_of_warning_sub_operations,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CMoveRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            data_set_present: data_set_present(cs),
            status: cs.require_u16(tags::STATUS)?,
            number_of_remaining_sub_operations: cs
                .get_u16(tags::NUMBER_OF_REMAINING_SUBOPERATIONS)
                .unwrap_or(0),
            number_of_completed_sub_operations: cs
                .get_u16(tags::NUMBER_OF_COMPLETED_SUBOPERATIONS)
                .unwrap_or(0),
            number_of_failed_sub_operations: cs
                .get_u16(tags::NUMBER_OF_FAILED_SUBOPERATIONS)
                .unwrap_or(0),
            number_of_warning_sub_operations: cs
                .get_u16(tags::NUMBER_OF_WARNING_SUBOPERATIONS)
                .unwrap_or(0),
        })
    }
}

/// C-ECHO request. See PS3.7, Section 9.3.5.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CEchoRq {
    pub message_id: u16,
}

impl CEchoRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, uids::VERIFICATION);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_ECHO_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CEchoRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
        })
    }
}

/// C-ECHO response. See PS3.7, Section 9.3.5.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CEchoRsp {
    pub message_id_being_responded_to: u16,
    pub status: u16,
}

impl CEchoRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, uids::VERIFICATION);
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_ECHO_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs.put_u16(tags::STATUS, self.status);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CEchoRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            status: cs.require_u16(tags::STATUS)?,
        })
    }
}

/// N-EVENT-REPORT request. See PS3.7, Section 10.3.1.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NEventReportRq {
    pub message_id: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub event_type_id: u16,
    pub data_set_present: bool,
}

impl NEventReportRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_EVENT_REPORT_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::EVENT_TYPE_ID, self.event_type_id);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NEventReportRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            event_type_id: cs.require_u16(tags::EVENT_TYPE_ID)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-EVENT-REPORT response. See PS3.7, Section 10.3.1.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NEventReportRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub event_type_id: u16,
    pub status: u16,
    pub data_set_present: bool,
}

impl NEventReportRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_EVENT_REPORT_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs.put_u16(tags::EVENT_TYPE_ID, self.event_type_id);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NEventReportRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            event_type_id: cs.require_u16(tags::EVENT_TYPE_ID)?,
            status: cs.require_u16(tags::STATUS)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-GET request. See PS3.7, Section 10.3.2.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NGetRq {
    pub message_id: u16,
    pub requested_sop_class_uid: String,
    pub requested_sop_instance_uid: String,
}

impl NGetRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_GET_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs.put_str(
            tags::REQUESTED_SOP_CLASS_UID,
            &*self.requested_sop_class_uid,
        );
        cs.put_str(
            tags::REQUESTED_SOP_INSTANCE_UID,
            &*self.requested_sop_instance_uid,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NGetRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            requested_sop_class_uid: cs.require_str(tags::REQUESTED_SOP_CLASS_UID)?.to_string(),
            requested_sop_instance_uid: cs
                .require_str(tags::REQUESTED_SOP_INSTANCE_UID)?
                .to_string(),
        })
    }
}

/// N-GET response. See PS3.7, Section 10.3.2.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NGetRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub status: u16,
    pub data_set_present: bool,
}

impl NGetRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_GET_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NGetRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            status: cs.require_u16(tags::STATUS)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-SET request. See PS3.7, Section 10.3.3.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NSetRq {
    pub message_id: u16,
    pub requested_sop_class_uid: String,
    pub requested_sop_instance_uid: String,
}

impl NSetRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_SET_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, DATA_SET_PRESENT);
        cs.put_str(
            tags::REQUESTED_SOP_CLASS_UID,
            &*self.requested_sop_class_uid,
        );
        cs.put_str(
            tags::REQUESTED_SOP_INSTANCE_UID,
            &*self.requested_sop_instance_uid,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NSetRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            requested_sop_class_uid: cs.require_str(tags::REQUESTED_SOP_CLASS_UID)?.to_string(),
            requested_sop_instance_uid: cs
                .require_str(tags::REQUESTED_SOP_INSTANCE_UID)?
                .to_string(),
        })
    }
}

/// N-SET response. See PS3.7, Section 10.3.3.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NSetRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub status: u16,
    pub data_set_present: bool,
}

impl NSetRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_SET_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NSetRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            status: cs.require_u16(tags::STATUS)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-ACTION request. See PS3.7, Section 10.3.4.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NActionRq {
    pub message_id: u16,
    pub requested_sop_class_uid: String,
    pub requested_sop_instance_uid: String,
    pub action_type_id: u16,
    pub data_set_present: bool,
}

impl NActionRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_ACTION_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_str(
            tags::REQUESTED_SOP_CLASS_UID,
            &*self.requested_sop_class_uid,
        );
        cs.put_str(
            tags::REQUESTED_SOP_INSTANCE_UID,
            &*self.requested_sop_instance_uid,
        );
        cs.put_u16(tags::ACTION_TYPE_ID, self.action_type_id);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NActionRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            requested_sop_class_uid: cs.require_str(tags::REQUESTED_SOP_CLASS_UID)?.to_string(),
            requested_sop_instance_uid: cs
                .require_str(tags::REQUESTED_SOP_INSTANCE_UID)?
                .to_string(),
            action_type_id: cs.require_u16(tags::ACTION_TYPE_ID)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-ACTION response. See PS3.7, Section 10.3.4.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NActionRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub action_type_id: u16,
    pub status: u16,
    pub data_set_present: bool,
}

impl NActionRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_ACTION_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs.put_u16(tags::ACTION_TYPE_ID, self.action_type_id);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NActionRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            action_type_id: cs.require_u16(tags::ACTION_TYPE_ID)?,
            status: cs.require_u16(tags::STATUS)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-CREATE request. See PS3.7, Section 10.3.5.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NCreateRq {
    pub message_id: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub data_set_present: bool,
}

impl NCreateRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_CREATE_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NCreateRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-CREATE response. See PS3.7, Section 10.3.5.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NCreateRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub status: u16,
    pub data_set_present: bool,
}

impl NCreateRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_CREATE_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(
            tags::COMMAND_DATA_SET_TYPE,
            data_set_type_of(self.data_set_present),
        );
        cs.put_u16(tags::STATUS, self.status);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NCreateRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            status: cs.require_u16(tags::STATUS)?,
            data_set_present: data_set_present(cs),
        })
    }
}

/// N-DELETE request. See PS3.7, Section 10.3.6.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NDeleteRq {
    pub message_id: u16,
    pub requested_sop_class_uid: String,
    pub requested_sop_instance_uid: String,
}

impl NDeleteRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_DELETE_RQ as u16);
        cs.put_u16(tags::MESSAGE_ID, self.message_id);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs.put_str(
            tags::REQUESTED_SOP_CLASS_UID,
            &*self.requested_sop_class_uid,
        );
        cs.put_str(
            tags::REQUESTED_SOP_INSTANCE_UID,
            &*self.requested_sop_instance_uid,
        );
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NDeleteRq {
            message_id: cs.require_u16(tags::MESSAGE_ID)?,
            requested_sop_class_uid: cs.require_str(tags::REQUESTED_SOP_CLASS_UID)?.to_string(),
            requested_sop_instance_uid: cs
                .require_str(tags::REQUESTED_SOP_INSTANCE_UID)?
                .to_string(),
        })
    }
}

/// N-DELETE response. See PS3.7, Section 10.3.6.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NDeleteRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub status: u16,
}

impl NDeleteRsp {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, &*self.affected_sop_class_uid);
        cs.put_str(
            tags::AFFECTED_SOP_INSTANCE_UID,
            &*self.affected_sop_instance_uid,
        );
        cs.put_u16(tags::COMMAND_FIELD, CommandField::N_DELETE_RSP as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs.put_u16(tags::STATUS, self.status);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(NDeleteRsp {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
            affected_sop_class_uid: cs.require_str(tags::AFFECTED_SOP_CLASS_UID)?.to_string(),
            affected_sop_instance_uid: cs
                .require_str(tags::AFFECTED_SOP_INSTANCE_UID)?
                .to_string(),
            status: cs.require_u16(tags::STATUS)?,
        })
    }
}

/// C-CANCEL request. See PS3.7, Section 9.3.2.3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CCancelRq {
    pub message_id_being_responded_to: u16,
}

impl CCancelRq {
    fn to_command_set(&self) -> CommandSet {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, CommandField::C_CANCEL_RQ as u16);
        cs.put_u16(
            tags::MESSAGE_ID_BEING_RESPONDED_TO,
            self.message_id_being_responded_to,
        );
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, NO_DATA_SET);
        cs
    }

    fn from_command_set(cs: &CommandSet) -> Result<Self> {
        Ok(CCancelRq {
            message_id_being_responded_to: cs.require_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO)?,
        })
    }
}

/// Any DIMSE message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimse {
    CStoreRq(CStoreRq),
    CStoreRsp(CStoreRsp),
    CGetRq(CGetRq),
    CGetRsp(CGetRsp),
    CFindRq(CFindRq),
    CFindRsp(CFindRsp),
    CMoveRq(CMoveRq),
    CMoveRsp(CMoveRsp),
    CEchoRq(CEchoRq),
    CEchoRsp(CEchoRsp),
    NEventReportRq(NEventReportRq),
    NEventReportRsp(NEventReportRsp),
    NGetRq(NGetRq),
    NGetRsp(NGetRsp),
    NSetRq(NSetRq),
    NSetRsp(NSetRsp),
    NActionRq(NActionRq),
    NActionRsp(NActionRsp),
    NCreateRq(NCreateRq),
    NCreateRsp(NCreateRsp),
    NDeleteRq(NDeleteRq),
    NDeleteRsp(NDeleteRsp),
    CCancelRq(CCancelRq),
}

impl Dimse {
    /// The command field code of this message.
    pub fn command_field(&self) -> CommandField {
        match self {
            Dimse::CStoreRq(_) => CommandField::C_STORE_RQ,
            Dimse::CStoreRsp(_) => CommandField::C_STORE_RSP,
            Dimse::CGetRq(_) => CommandField::C_GET_RQ,
            Dimse::CGetRsp(_) => CommandField::C_GET_RSP,
            Dimse::CFindRq(_) => CommandField::C_FIND_RQ,
            Dimse::CFindRsp(_) => CommandField::C_FIND_RSP,
            Dimse::CMoveRq(_) => CommandField::C_MOVE_RQ,
            Dimse::CMoveRsp(_) => CommandField::C_MOVE_RSP,
            Dimse::CEchoRq(_) => CommandField::C_ECHO_RQ,
            Dimse::CEchoRsp(_) => CommandField::C_ECHO_RSP,
            Dimse::NEventReportRq(_) => CommandField::N_EVENT_REPORT_RQ,
            Dimse::NEventReportRsp(_) => CommandField::N_EVENT_REPORT_RSP,
            Dimse::NGetRq(_) => CommandField::N_GET_RQ,
            Dimse::NGetRsp(_) => CommandField::N_GET_RSP,
            Dimse::NSetRq(_) => CommandField::N_SET_RQ,
            Dimse::NSetRsp(_) => CommandField::N_SET_RSP,
            Dimse::NActionRq(_) => CommandField::N_ACTION_RQ,
            Dimse::NActionRsp(_) => CommandField::N_ACTION_RSP,
            Dimse::NCreateRq(_) => CommandField::N_CREATE_RQ,
            Dimse::NCreateRsp(_) => CommandField::N_CREATE_RSP,
            Dimse::NDeleteRq(_) => CommandField::N_DELETE_RQ,
            Dimse::NDeleteRsp(_) => CommandField::N_DELETE_RSP,
            Dimse::CCancelRq(_) => CommandField::C_CANCEL_RQ,
        }
    }

    /// Whether a data set accompanies this message on the wire.
    pub fn has_data_set(&self) -> bool {
        match self {
            Dimse::CStoreRq(_)
            | Dimse::CGetRq(_)
            | Dimse::CFindRq(_)
            | Dimse::CMoveRq(_)
            | Dimse::NSetRq(_) => true,
            Dimse::CStoreRsp(_)
            | Dimse::CEchoRq(_)
            | Dimse::CEchoRsp(_)
            | Dimse::NGetRq(_)
            | Dimse::NDeleteRq(_)
            | Dimse::NDeleteRsp(_)
            | Dimse::CCancelRq(_) => false,
            Dimse::CGetRsp(msg) => msg.data_set_present,
            Dimse::CFindRsp(msg) => msg.data_set_present,
            Dimse::CMoveRsp(msg) => msg.data_set_present,
            Dimse::NEventReportRq(msg) => msg.data_set_present,
            Dimse::NEventReportRsp(msg) => msg.data_set_present,
            Dimse::NGetRsp(msg) => msg.data_set_present,
            Dimse::NSetRsp(msg) => msg.data_set_present,
            Dimse::NActionRq(msg) => msg.data_set_present,
            Dimse::NActionRsp(msg) => msg.data_set_present,
            Dimse::NCreateRq(msg) => msg.data_set_present,
            Dimse::NCreateRsp(msg) => msg.data_set_present,
        }
    }

    /// Project this message onto its command set.
    pub fn to_command_set(&self) -> CommandSet {
        match self {
            Dimse::CStoreRq(msg) => msg.to_command_set(),
            Dimse::CStoreRsp(msg) => msg.to_command_set(),
            Dimse::CGetRq(msg) => msg.to_command_set(),
            Dimse::CGetRsp(msg) => msg.to_command_set(),
            Dimse::CFindRq(msg) => msg.to_command_set(),
            Dimse::CFindRsp(msg) => msg.to_command_set(),
            Dimse::CMoveRq(msg) => msg.to_command_set(),
            Dimse::CMoveRsp(msg) => msg.to_command_set(),
            Dimse::CEchoRq(msg) => msg.to_command_set(),
            Dimse::CEchoRsp(msg) => msg.to_command_set(),
            Dimse::NEventReportRq(msg) => msg.to_command_set(),
            Dimse::NEventReportRsp(msg) => msg.to_command_set(),
            Dimse::NGetRq(msg) => msg.to_command_set(),
            Dimse::NGetRsp(msg) => msg.to_command_set(),
            Dimse::NSetRq(msg) => msg.to_command_set(),
            Dimse::NSetRsp(msg) => msg.to_command_set(),
            Dimse::NActionRq(msg) => msg.to_command_set(),
            Dimse::NActionRsp(msg) => msg.to_command_set(),
            Dimse::NCreateRq(msg) => msg.to_command_set(),
            Dimse::NCreateRsp(msg) => msg.to_command_set(),
            Dimse::NDeleteRq(msg) => msg.to_command_set(),
            Dimse::NDeleteRsp(msg) => msg.to_command_set(),
            Dimse::CCancelRq(msg) => msg.to_command_set(),
        }
    }

    /// Rebuild the typed message from a decoded command set,
    /// dispatching on its command field.
    pub fn from_command_set(cs: &CommandSet) -> Result<Dimse> {
        let value = cs.require_u16(tags::COMMAND_FIELD)?;
        let command_field =
            CommandField::from_u16(value).ok_or_else(|| UnknownCommandFieldSnafu { value }.build())?;
        Ok(match command_field {
            CommandField::C_STORE_RQ => Dimse::CStoreRq(CStoreRq::from_command_set(cs)?),
            CommandField::C_STORE_RSP => Dimse::CStoreRsp(CStoreRsp::from_command_set(cs)?),
            CommandField::C_GET_RQ => Dimse::CGetRq(CGetRq::from_command_set(cs)?),
            CommandField::C_GET_RSP => Dimse::CGetRsp(CGetRsp::from_command_set(cs)?),
            CommandField::C_FIND_RQ => Dimse::CFindRq(CFindRq::from_command_set(cs)?),
            CommandField::C_FIND_RSP => Dimse::CFindRsp(CFindRsp::from_command_set(cs)?),
            CommandField::C_MOVE_RQ => Dimse::CMoveRq(CMoveRq::from_command_set(cs)?),
            CommandField::C_MOVE_RSP => Dimse::CMoveRsp(CMoveRsp::from_command_set(cs)?),
            CommandField::C_ECHO_RQ => Dimse::CEchoRq(CEchoRq::from_command_set(cs)?),
            CommandField::C_ECHO_RSP => Dimse::CEchoRsp(CEchoRsp::from_command_set(cs)?),
            CommandField::N_EVENT_REPORT_RQ => {
                Dimse::NEventReportRq(NEventReportRq::from_command_set(cs)?)
            }
            CommandField::N_EVENT_REPORT_RSP => {
                Dimse::NEventReportRsp(NEventReportRsp::from_command_set(cs)?)
            }
            CommandField::N_GET_RQ => Dimse::NGetRq(NGetRq::from_command_set(cs)?),
            CommandField::N_GET_RSP => Dimse::NGetRsp(NGetRsp::from_command_set(cs)?),
            CommandField::N_SET_RQ => Dimse::NSetRq(NSetRq::from_command_set(cs)?),
            CommandField::N_SET_RSP => Dimse::NSetRsp(NSetRsp::from_command_set(cs)?),
            CommandField::N_ACTION_RQ => Dimse::NActionRq(NActionRq::from_command_set(cs)?),
            CommandField::N_ACTION_RSP => Dimse::NActionRsp(NActionRsp::from_command_set(cs)?),
            CommandField::N_CREATE_RQ => Dimse::NCreateRq(NCreateRq::from_command_set(cs)?),
            CommandField::N_CREATE_RSP => Dimse::NCreateRsp(NCreateRsp::from_command_set(cs)?),
            CommandField::N_DELETE_RQ => Dimse::NDeleteRq(NDeleteRq::from_command_set(cs)?),
            CommandField::N_DELETE_RSP => Dimse::NDeleteRsp(NDeleteRsp::from_command_set(cs)?),
            CommandField::C_CANCEL_RQ => Dimse::CCancelRq(CCancelRq::from_command_set(cs)?),
        })
    }
}
