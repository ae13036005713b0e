//! The DIMSE command set:
//! the group 0000H data set carried in command PDVs.
//!
//! Command sets are always encoded in implicit VR little endian,
//! regardless of the transfer syntax negotiated for the data set,
//! and start with a computed `CommandGroupLength` element.
//! The element dictionary here is the command subset of PS3.7, Annex E.

use byteordered::byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::io::{Cursor, Read, Write};

/// The command element tags (group 0000H) of PS3.7, Table E.1-1.
pub mod tags {
    pub const COMMAND_GROUP_LENGTH: u32 = 0x0000_0000;
    pub const AFFECTED_SOP_CLASS_UID: u32 = 0x0000_0002;
    pub const REQUESTED_SOP_CLASS_UID: u32 = 0x0000_0003;
    pub const COMMAND_FIELD: u32 = 0x0000_0100;
    pub const MESSAGE_ID: u32 = 0x0000_0110;
    pub const MESSAGE_ID_BEING_RESPONDED_TO: u32 = 0x0000_0120;
    pub const MOVE_DESTINATION: u32 = 0x0000_0600;
    pub const PRIORITY: u32 = 0x0000_0700;
    pub const COMMAND_DATA_SET_TYPE: u32 = 0x0000_0800;
    pub const STATUS: u32 = 0x0000_0900;
    pub const OFFENDING_ELEMENT: u32 = 0x0000_0901;
    pub const ERROR_COMMENT: u32 = 0x0000_0902;
    pub const ERROR_ID: u32 = 0x0000_0903;
    pub const AFFECTED_SOP_INSTANCE_UID: u32 = 0x0000_1000;
    pub const REQUESTED_SOP_INSTANCE_UID: u32 = 0x0000_1001;
    pub const EVENT_TYPE_ID: u32 = 0x0000_1002;
    pub const ATTRIBUTE_IDENTIFIER_LIST: u32 = 0x0000_1005;
    pub const ACTION_TYPE_ID: u32 = 0x0000_1008;
    pub const NUMBER_OF_REMAINING_SUBOPERATIONS: u32 = 0x0000_1020;
    pub const NUMBER_OF_COMPLETED_SUBOPERATIONS: u32 = 0x0000_1021;
    pub const NUMBER_OF_FAILED_SUBOPERATIONS: u32 = 0x0000_1022;
    pub const NUMBER_OF_WARNING_SUBOPERATIONS: u32 = 0x0000_1023;
    pub const MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE: u32 = 0x0000_1030;
    pub const MOVE_ORIGINATOR_MESSAGE_ID: u32 = 0x0000_1031;
}

/// The value representation of a command element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vr {
    /// unsigned long (32-bit)
    Ul,
    /// unique identifier, NUL padded
    Ui,
    /// unsigned short (16-bit)
    Us,
    /// application entity title, space padded
    Ae,
    /// attribute tag list
    At,
    /// long string, space padded
    Lo,
}

/// The command element dictionary: tag, VR and keyword.
static DICTIONARY: [(u32, Vr, &str); 24] = [
    (tags::COMMAND_GROUP_LENGTH, Vr::Ul, "CommandGroupLength"),
    (tags::AFFECTED_SOP_CLASS_UID, Vr::Ui, "AffectedSOPClassUID"),
    (tags::REQUESTED_SOP_CLASS_UID, Vr::Ui, "RequestedSOPClassUID"),
    (tags::COMMAND_FIELD, Vr::Us, "CommandField"),
    (tags::MESSAGE_ID, Vr::Us, "MessageID"),
    (
        tags::MESSAGE_ID_BEING_RESPONDED_TO,
        Vr::Us,
        "MessageIDBeingRespondedTo",
    ),
    (tags::MOVE_DESTINATION, Vr::Ae, "MoveDestination"),
    (tags::PRIORITY, Vr::Us, "Priority"),
    (tags::COMMAND_DATA_SET_TYPE, Vr::Us, "CommandDataSetType"),
    (tags::STATUS, Vr::Us, "Status"),
    (tags::OFFENDING_ELEMENT, Vr::At, "OffendingElement"),
    (tags::ERROR_COMMENT, Vr::Lo, "ErrorComment"),
    (tags::ERROR_ID, Vr::Us, "ErrorID"),
    (
        tags::AFFECTED_SOP_INSTANCE_UID,
        Vr::Ui,
        "AffectedSOPInstanceUID",
    ),
    (
        tags::REQUESTED_SOP_INSTANCE_UID,
        Vr::Ui,
        "RequestedSOPInstanceUID",
    ),
    (tags::EVENT_TYPE_ID, Vr::Us, "EventTypeID"),
    (
        tags::ATTRIBUTE_IDENTIFIER_LIST,
        Vr::At,
        "AttributeIdentifierList",
    ),
    (tags::ACTION_TYPE_ID, Vr::Us, "ActionTypeID"),
    (
        tags::NUMBER_OF_REMAINING_SUBOPERATIONS,
        Vr::Us,
        "NumberOfRemainingSuboperations",
    ),
    (
        tags::NUMBER_OF_COMPLETED_SUBOPERATIONS,
        Vr::Us,
        "NumberOfCompletedSuboperations",
    ),
    (
        tags::NUMBER_OF_FAILED_SUBOPERATIONS,
        Vr::Us,
        "NumberOfFailedSuboperations",
    ),
    (
        tags::NUMBER_OF_WARNING_SUBOPERATIONS,
        Vr::Us,
        "NumberOfWarningSuboperations",
    ),
    (
        tags::MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE,
        Vr::Ae,
        "MoveOriginatorApplicationEntityTitle",
    ),
    (
        tags::MOVE_ORIGINATOR_MESSAGE_ID,
        Vr::Us,
        "MoveOriginatorMessageID",
    ),
];

fn vr_of(tag: u32) -> Option<Vr> {
    DICTIONARY
        .iter()
        .find(|(t, _, _)| *t == tag)
        .map(|(_, vr, _)| *vr)
}

/// The keyword of a command element tag, for error messages.
pub fn keyword_of(tag: u32) -> Option<&'static str> {
    DICTIONARY
        .iter()
        .find(|(t, _, _)| *t == tag)
        .map(|(_, _, keyword)| *keyword)
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DecodeError {
    #[snafu(display("Could not read command element header"))]
    ReadElementHeader {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not read value of command element {:#010x}", tag))]
    ReadElementValue {
        tag: u32,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Invalid length {} for command element {:#010x}",
        length,
        tag
    ))]
    InvalidValueLength {
        tag: u32,
        length: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("Command element {:#010x} is not valid text", tag))]
    DecodeText {
        tag: u32,
        source: std::str::Utf8Error,
        backtrace: Backtrace,
    },
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ProjectError {
    #[snafu(display("Missing command element {:#010x} ({})", tag, keyword_of(*tag).unwrap_or("?")))]
    MissingField { tag: u32, backtrace: Backtrace },

    #[snafu(display("Command element {:#010x} has an unexpected value type", tag))]
    WrongValueType { tag: u32, backtrace: Backtrace },
}

/// A typed command element value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U16(u16),
    U32(u32),
    Str(String),
    /// an attribute tag list or an element of unknown VR, kept raw
    Bytes(Vec<u8>),
}

/// An ordered set of group 0000H command elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    elements: Vec<(u32, Value)>,
}

impl CommandSet {
    pub fn new() -> Self {
        CommandSet::default()
    }

    /// The elements of this command set, in order.
    pub fn elements(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.elements.iter().map(|(tag, value)| (*tag, value))
    }

    fn get(&self, tag: u32) -> Option<&Value> {
        self.elements
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, value)| value)
    }

    pub fn put_u16(&mut self, tag: u32, value: u16) {
        self.elements.push((tag, Value::U16(value)));
    }

    pub fn put_u32(&mut self, tag: u32, value: u32) {
        self.elements.push((tag, Value::U32(value)));
    }

    pub fn put_str<T>(&mut self, tag: u32, value: T)
    where
        T: Into<String>,
    {
        self.elements.push((tag, Value::Str(value.into())));
    }

    pub fn get_u16(&self, tag: u32) -> Option<u16> {
        match self.get(tag) {
            Some(Value::U16(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_u32(&self, tag: u32) -> Option<u32> {
        match self.get(tag) {
            Some(Value::U32(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_str(&self, tag: u32) -> Option<&str> {
        match self.get(tag) {
            Some(Value::Str(value)) => Some(value),
            _ => None,
        }
    }

    pub fn require_u16(&self, tag: u32) -> Result<u16, ProjectError> {
        match self.get(tag).context(MissingFieldSnafu { tag })? {
            Value::U16(value) => Ok(*value),
            _ => WrongValueTypeSnafu { tag }.fail(),
        }
    }

    pub fn require_str(&self, tag: u32) -> Result<&str, ProjectError> {
        match self.get(tag).context(MissingFieldSnafu { tag })? {
            Value::Str(value) => Ok(value),
            _ => WrongValueTypeSnafu { tag }.fail(),
        }
    }

    /// Encode the command set as implicit VR little endian bytes,
    /// prepended with a `CommandGroupLength` element
    /// whose value is the encoded length of everything after it.
    pub fn pack(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (tag, value) in &self.elements {
            write_element(&mut body, *tag, value);
        }
        let mut out = Vec::with_capacity(body.len() + 12);
        write_element(
            &mut out,
            tags::COMMAND_GROUP_LENGTH,
            &Value::U32(body.len() as u32),
        );
        out.extend(body);
        out
    }

    /// Decode a command set from implicit VR little endian bytes.
    ///
    /// A leading `CommandGroupLength` element is consumed and discarded;
    /// its absence is tolerated.
    pub fn unpack(bytes: &[u8]) -> Result<CommandSet, DecodeError> {
        let mut cursor = Cursor::new(bytes);
        let mut elements = Vec::new();

        while cursor.position() < bytes.len() as u64 {
            let group = cursor
                .read_u16::<LittleEndian>()
                .context(ReadElementHeaderSnafu)?;
            let element = cursor
                .read_u16::<LittleEndian>()
                .context(ReadElementHeaderSnafu)?;
            let tag = (u32::from(group) << 16) | u32::from(element);
            let length = cursor
                .read_u32::<LittleEndian>()
                .context(ReadElementHeaderSnafu)?;
            ensure!(
                length != 0xFFFF_FFFF
                    && u64::from(length) <= bytes.len() as u64 - cursor.position(),
                InvalidValueLengthSnafu { tag, length }
            );

            let mut data = vec![0; length as usize];
            cursor
                .read_exact(&mut data)
                .context(ReadElementValueSnafu { tag })?;

            if tag == tags::COMMAND_GROUP_LENGTH {
                continue;
            }

            let value = match vr_of(tag) {
                Some(Vr::Us) => {
                    ensure!(length == 2, InvalidValueLengthSnafu { tag, length });
                    Value::U16(u16::from_le_bytes([data[0], data[1]]))
                }
                Some(Vr::Ul) => {
                    ensure!(length == 4, InvalidValueLengthSnafu { tag, length });
                    Value::U32(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
                }
                Some(Vr::Ui) | Some(Vr::Ae) | Some(Vr::Lo) => Value::Str(
                    std::str::from_utf8(&data)
                        .context(DecodeTextSnafu { tag })?
                        .trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
                        .to_string(),
                ),
                Some(Vr::At) | None => Value::Bytes(data),
            };
            elements.push((tag, value));
        }

        Ok(CommandSet { elements })
    }
}

fn write_element(out: &mut Vec<u8>, tag: u32, value: &Value) {
    // implicit VR little endian: tag, 32-bit length, then the value,
    // padded to even length
    let bytes = match value {
        Value::U16(value) => value.to_le_bytes().to_vec(),
        Value::U32(value) => value.to_le_bytes().to_vec(),
        Value::Str(value) => {
            let mut bytes = value.as_bytes().to_vec();
            if bytes.len() % 2 != 0 {
                // UIDs pad with NUL, text values with space
                let pad = match vr_of(tag) {
                    Some(Vr::Ui) => b'\0',
                    _ => b' ',
                };
                bytes.push(pad);
            }
            bytes
        }
        Value::Bytes(value) => {
            let mut bytes = value.clone();
            if bytes.len() % 2 != 0 {
                bytes.push(0);
            }
            bytes
        }
    };
    // infallible: writing to a Vec
    let _ = out.write_u16::<LittleEndian>((tag >> 16) as u16);
    let _ = out.write_u16::<LittleEndian>(tag as u16);
    let _ = out.write_u32::<LittleEndian>(bytes.len() as u32);
    let _ = out.write_all(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_prepends_the_group_length() {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, 0x0030);
        cs.put_u16(tags::MESSAGE_ID, 7);
        let bytes = cs.pack();

        // group length element header: (0000,0000) UL, length 4
        assert_eq!(&bytes[0..8], &[0, 0, 0, 0, 4, 0, 0, 0]);
        // value counts the two 10-byte elements that follow
        assert_eq!(&bytes[8..12], &20u32.to_le_bytes());
        assert_eq!(bytes.len(), 12 + 20);
    }

    #[test]
    fn unpack_tolerates_a_missing_group_length() {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, 0x0030);
        let packed = cs.pack();

        // strip the group length element (12 bytes)
        let decoded = CommandSet::unpack(&packed[12..]).unwrap();
        assert_eq!(decoded.get_u16(tags::COMMAND_FIELD), Some(0x0030));
    }

    #[test]
    fn string_values_are_padded_to_even_length_and_trimmed_back() {
        let mut cs = CommandSet::new();
        // odd length UID
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, "1.2.840.10008.1.1");
        // odd length AE title
        cs.put_str(tags::MOVE_DESTINATION, "AET");
        let bytes = cs.pack();
        assert_eq!(bytes.len() % 2, 0);

        let decoded = CommandSet::unpack(&bytes).unwrap();
        assert_eq!(
            decoded.get_str(tags::AFFECTED_SOP_CLASS_UID),
            Some("1.2.840.10008.1.1")
        );
        assert_eq!(decoded.get_str(tags::MOVE_DESTINATION), Some("AET"));
    }

    #[test]
    fn roundtrip_preserves_all_typed_values() {
        let mut cs = CommandSet::new();
        cs.put_str(tags::AFFECTED_SOP_CLASS_UID, "1.2.840.10008.5.1.4.1.1.7");
        cs.put_u16(tags::COMMAND_FIELD, 0x0001);
        cs.put_u16(tags::MESSAGE_ID, 42);
        cs.put_u16(tags::PRIORITY, 2);
        cs.put_u16(tags::COMMAND_DATA_SET_TYPE, 0x0001);
        cs.put_str(tags::AFFECTED_SOP_INSTANCE_UID, "1.2.3.4.5.6");

        let decoded = CommandSet::unpack(&cs.pack()).unwrap();
        assert_eq!(decoded, cs);
    }

    #[test]
    fn truncated_element_is_an_error() {
        let mut cs = CommandSet::new();
        cs.put_u16(tags::COMMAND_FIELD, 0x0030);
        let bytes = cs.pack();
        assert!(CommandSet::unpack(&bytes[..bytes.len() - 1]).is_err());
    }
}
