//! PDU reader module
use crate::pdu::*;
use byteordered::byteorder::{BigEndian, ReadBytesExt};
use bytes::{Buf, BytesMut};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::io::{Cursor, Read};
use tracing::warn;

/// The default maximum PDU size,
/// advertised in the maximum length sub-item on association negotiation
pub const DEFAULT_MAX_PDU: u32 = 65_536;

/// The minimum PDU size,
/// as specified by the standard
pub const MINIMUM_PDU_SIZE: u32 = 4_096;

/// The maximum PDU size,
/// as specified by the standard
pub const MAXIMUM_PDU_SIZE: u32 = 131_072;

/// The length of the PDU header in bytes,
/// comprising the PDU type (1 byte),
/// reserved byte (1 byte),
/// and PDU length (4 bytes).
pub const PDU_HEADER_SIZE: u32 = 6;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    #[snafu(display("Invalid max PDU length {}", max_pdu_length))]
    InvalidMaxPdu {
        max_pdu_length: u32,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not read PDU item"))]
    ReadPduItem {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not read PDU field `{}`", field))]
    ReadPduField {
        field: &'static str,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Invalid item length {} (must be >=2)", length))]
    InvalidItemLength { length: u32 },

    #[snafu(display("Could not read {} reserved bytes", bytes))]
    ReadReserved {
        bytes: u32,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "Incoming pdu was too large: length {}, maximum is {}",
        pdu_length,
        max_pdu_length
    ))]
    PduTooLarge {
        pdu_length: u32,
        max_pdu_length: u32,
        backtrace: Backtrace,
    },
    #[snafu(display("PDU contained an invalid value {:?}", var_item))]
    InvalidPduVariable {
        var_item: PduVariableItem,
        backtrace: Backtrace,
    },
    #[snafu(display("Protocol version {:#06x} does not have bit 0 set", protocol_version))]
    InvalidProtocolVersion {
        protocol_version: u16,
        backtrace: Backtrace,
    },
    #[snafu(display("PDU length mismatch, {} bytes left over", bytes))]
    PduLengthMismatch { bytes: u64, backtrace: Backtrace },
    #[snafu(display("Multiple transfer syntaxes were accepted"))]
    MultipleTransferSyntaxesAccepted { backtrace: Backtrace },
    #[snafu(display("Invalid reject source or reason"))]
    InvalidRejectSourceOrReason { backtrace: Backtrace },
    #[snafu(display("Invalid abort service provider"))]
    InvalidAbortSourceOrReason { backtrace: Backtrace },
    #[snafu(display("Invalid presentation context result reason"))]
    InvalidPresentationContextResultReason { backtrace: Backtrace },
    #[snafu(display("invalid transfer syntax sub-item"))]
    InvalidTransferSyntaxSubItem { backtrace: Backtrace },
    #[snafu(display("unknown presentation context sub-item"))]
    UnknownPresentationContextSubItem { backtrace: Backtrace },
    #[snafu(display("Could not decode text field `{}`", field))]
    DecodeText {
        field: &'static str,
        source: std::str::Utf8Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Missing application context name"))]
    MissingApplicationContextName { backtrace: Backtrace },
    #[snafu(display("Missing abstract syntax"))]
    MissingAbstractSyntax { backtrace: Backtrace },
    #[snafu(display("Missing transfer syntax"))]
    MissingTransferSyntax { backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, ReadError>;

/// Try to read one PDU from the front of `buffer`.
///
/// Returns `Ok(None)` while the buffer holds less than one whole frame
/// (6-byte header plus declared length);
/// in that case the buffer is left untouched
/// and the caller is expected to append more bytes as they arrive
/// and call again.
/// On success, exactly one frame is split off the front of the buffer.
///
/// When `strict` is false,
/// PDUs longer than `max_pdu_length` are tolerated
/// up to the absolute limit of the protocol.
pub fn read_pdu(buffer: &mut BytesMut, max_pdu_length: u32, strict: bool) -> Result<Option<Pdu>> {
    ensure!(
        (MINIMUM_PDU_SIZE..=MAXIMUM_PDU_SIZE).contains(&max_pdu_length),
        InvalidMaxPduSnafu { max_pdu_length }
    );

    // Check for full PDU header
    if buffer.len() < PDU_HEADER_SIZE as usize {
        return Ok(None);
    }
    let pdu_type = buffer[0];
    let pdu_length = u32::from_be_bytes([buffer[2], buffer[3], buffer[4], buffer[5]]);

    // Check max_pdu_length
    if strict {
        ensure!(
            pdu_length <= max_pdu_length,
            PduTooLargeSnafu {
                pdu_length,
                max_pdu_length
            }
        );
    } else {
        ensure!(
            pdu_length <= MAXIMUM_PDU_SIZE,
            PduTooLargeSnafu {
                pdu_length,
                max_pdu_length: MAXIMUM_PDU_SIZE
            }
        );
        if pdu_length > max_pdu_length {
            warn!(
                "Incoming pdu was too large: length {}, maximum is {}",
                pdu_length, max_pdu_length
            );
        }
    }

    if buffer.len() < PDU_HEADER_SIZE as usize + pdu_length as usize {
        return Ok(None);
    }

    let mut frame = buffer.split_to(PDU_HEADER_SIZE as usize + pdu_length as usize);
    frame.advance(PDU_HEADER_SIZE as usize);
    let mut cursor = Cursor::new(&frame[..]);

    match pdu_type {
        0x01 => {
            // A-ASSOCIATE-RQ PDU Structure

            let mut application_context_name: Option<String> = None;
            let mut presentation_contexts = vec![];
            let mut user_variables = vec![];

            // 7-8 - Protocol-version - One bit per supported version of the
            // DICOM UL protocol. This is Version 1 and shall be identified
            // with bit 0 set.
            let protocol_version = cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                field: "Protocol-version",
            })?;
            ensure!(
                protocol_version & 0x0001 != 0,
                InvalidProtocolVersionSnafu { protocol_version }
            );

            // 9-10 - Reserved - Sent with a value 0000H but not tested.
            cursor
                .read_u16::<BigEndian>()
                .context(ReadReservedSnafu { bytes: 2_u32 })?;

            // 11-26 - Called-AE-title - Destination DICOM Application Name,
            // 16 characters with non-significant leading and trailing spaces.
            let called_ae_title = read_ae_title(&mut cursor, "Called-AE-title")?;

            // 27-42 - Calling-AE-title - Source DICOM Application Name,
            // encoded like the called AE title.
            let calling_ae_title = read_ae_title(&mut cursor, "Calling-AE-title")?;

            // 43-74 - Reserved - Sent with a value 00H for all bytes
            // but not tested.
            skip(&mut cursor, 32).context(ReadReservedSnafu { bytes: 32_u32 })?;

            // 75-xxx - Variable items - One Application Context Item,
            // one or more Presentation Context Items
            // and one User Information Item.
            while cursor.position() < cursor.get_ref().len() as u64 {
                match read_pdu_variable(&mut cursor)? {
                    PduVariableItem::ApplicationContext(val) => {
                        application_context_name = Some(val);
                    }
                    PduVariableItem::PresentationContextProposed(val) => {
                        presentation_contexts.push(val);
                    }
                    PduVariableItem::UserVariables(val) => {
                        user_variables = val;
                    }
                    var_item => {
                        return InvalidPduVariableSnafu { var_item }.fail();
                    }
                }
            }

            Ok(Some(Pdu::AssociationRQ(AssociationRQ {
                protocol_version,
                application_context_name: application_context_name
                    .context(MissingApplicationContextNameSnafu)?,
                called_ae_title,
                calling_ae_title,
                presentation_contexts,
                user_variables,
            })))
        }
        0x02 => {
            // A-ASSOCIATE-AC PDU Structure

            let mut application_context_name: Option<String> = None;
            let mut presentation_contexts = vec![];
            let mut user_variables = vec![];

            // 7-8 - Protocol-version
            let protocol_version = cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                field: "Protocol-version",
            })?;
            ensure!(
                protocol_version & 0x0001 != 0,
                InvalidProtocolVersionSnafu { protocol_version }
            );

            // 9-10 - Reserved
            cursor
                .read_u16::<BigEndian>()
                .context(ReadReservedSnafu { bytes: 2_u32 })?;

            // 11-26 - Reserved - Identical to the called AE title of the
            // A-ASSOCIATE-RQ, but not tested on receipt.
            let called_ae_title = read_ae_title(&mut cursor, "Called-AE-title")?;

            // 27-42 - Reserved - Identical to the calling AE title of the
            // A-ASSOCIATE-RQ, but not tested on receipt.
            let calling_ae_title = read_ae_title(&mut cursor, "Calling-AE-title")?;

            // 43-74 - Reserved
            skip(&mut cursor, 32).context(ReadReservedSnafu { bytes: 32_u32 })?;

            // 75-xxx - Variable items - One Application Context Item,
            // one or more Presentation Context Result Items
            // and one User Information Item.
            while cursor.position() < cursor.get_ref().len() as u64 {
                match read_pdu_variable(&mut cursor)? {
                    PduVariableItem::ApplicationContext(val) => {
                        application_context_name = Some(val);
                    }
                    PduVariableItem::PresentationContextResult(val) => {
                        presentation_contexts.push(val);
                    }
                    PduVariableItem::UserVariables(val) => {
                        user_variables = val;
                    }
                    var_item => {
                        return InvalidPduVariableSnafu { var_item }.fail();
                    }
                }
            }

            Ok(Some(Pdu::AssociationAC(AssociationAC {
                protocol_version,
                application_context_name: application_context_name
                    .context(MissingApplicationContextNameSnafu)?,
                called_ae_title,
                calling_ae_title,
                presentation_contexts,
                user_variables,
            })))
        }
        0x03 => {
            // A-ASSOCIATE-RJ PDU Structure

            // 7 - Reserved
            cursor
                .read_u8()
                .context(ReadReservedSnafu { bytes: 1_u32 })?;

            // 8 - Result - 1 rejected-permanent, 2 rejected-transient
            let result = AssociationRJResult::from(
                cursor
                    .read_u8()
                    .context(ReadPduFieldSnafu { field: "Result" })?,
            )
            .context(InvalidRejectSourceOrReasonSnafu)?;

            // 9 - Source, 10 - Reason/Diag. - The reason values are scoped
            // by the source value (1 service-user, 2 service-provider ACSE,
            // 3 service-provider presentation).
            let source = AssociationRJSource::from(
                cursor
                    .read_u8()
                    .context(ReadPduFieldSnafu { field: "Source" })?,
                cursor.read_u8().context(ReadPduFieldSnafu {
                    field: "Reason/Diag.",
                })?,
            )
            .context(InvalidRejectSourceOrReasonSnafu)?;

            ensure_fully_consumed(&cursor)?;

            Ok(Some(Pdu::AssociationRJ(AssociationRJ { result, source })))
        }
        0x04 => {
            // P-DATA-TF PDU Structure

            // 7-xxx - One or more Presentation-data-value Items
            let mut values = vec![];
            while cursor.position() < cursor.get_ref().len() as u64 {
                // 1-4 - Item-length - Counts the presentation context
                // identifier and the presentation-data-value field.
                let item_length = cursor.read_u32::<BigEndian>().context(ReadPduFieldSnafu {
                    field: "Item-Length",
                })?;

                ensure!(
                    item_length >= 2,
                    InvalidItemLengthSnafu {
                        length: item_length
                    }
                );

                // 5 - Presentation-context-ID - Odd integers between 1 and 255.
                let presentation_context_id = cursor.read_u8().context(ReadPduFieldSnafu {
                    field: "Presentation-context-ID",
                })?;

                // 6 - Message control header: bit 0 set means command
                // fragment, bit 1 set means last fragment of its part.
                let header = cursor.read_u8().context(ReadPduFieldSnafu {
                    field: "Message Control Header",
                })?;

                let value_type = if header & 0x01 > 0 {
                    PDataValueType::Command
                } else {
                    PDataValueType::Data
                };
                let is_last = (header & 0x02) > 0;

                let data =
                    read_n(&mut cursor, (item_length - 2) as usize).context(ReadPduFieldSnafu {
                        field: "Presentation-data-value",
                    })?;

                values.push(PDataValue {
                    presentation_context_id,
                    value_type,
                    is_last,
                    data,
                })
            }

            Ok(Some(Pdu::PData { data: values }))
        }
        0x05 => {
            // A-RELEASE-RQ PDU Structure

            // 7-10 - Reserved
            skip(&mut cursor, 4).context(ReadReservedSnafu { bytes: 4_u32 })?;
            ensure_fully_consumed(&cursor)?;

            Ok(Some(Pdu::ReleaseRQ))
        }
        0x06 => {
            // A-RELEASE-RP PDU Structure

            // 7-10 - Reserved
            skip(&mut cursor, 4).context(ReadReservedSnafu { bytes: 4_u32 })?;
            ensure_fully_consumed(&cursor)?;

            Ok(Some(Pdu::ReleaseRP))
        }
        0x07 => {
            // A-ABORT PDU Structure

            // 7 - Reserved, 8 - Reserved
            let mut buf = [0u8; 2];
            cursor
                .read_exact(&mut buf)
                .context(ReadReservedSnafu { bytes: 2_u32 })?;

            // 9 - Source - 0 service-user, 2 service-provider.
            // 10 - Reason/Diag - Only significant for provider aborts.
            let source = AbortRQSource::from(
                cursor
                    .read_u8()
                    .context(ReadPduFieldSnafu { field: "Source" })?,
                cursor.read_u8().context(ReadPduFieldSnafu {
                    field: "Reason/Diag",
                })?,
            )
            .context(InvalidAbortSourceOrReasonSnafu)?;

            ensure_fully_consumed(&cursor)?;

            Ok(Some(Pdu::AbortRQ { source }))
        }
        _ => Ok(Some(Pdu::Unknown {
            pdu_type,
            data: frame[..].to_vec(),
        })),
    }
}

fn read_n<R>(reader: &mut R, bytes_to_read: usize) -> std::io::Result<Vec<u8>>
where
    R: Read,
{
    let mut result = Vec::with_capacity(bytes_to_read.min(MAXIMUM_PDU_SIZE as usize));
    reader.take(bytes_to_read as u64).read_to_end(&mut result)?;
    if result.len() < bytes_to_read {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    Ok(result)
}

fn skip(cursor: &mut Cursor<&[u8]>, bytes: u64) -> std::io::Result<()> {
    if cursor.position() + bytes > cursor.get_ref().len() as u64 {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    cursor.set_position(cursor.position() + bytes);
    Ok(())
}

fn read_ae_title(cursor: &mut Cursor<&[u8]>, field: &'static str) -> Result<String> {
    let mut ae_bytes = [0; 16];
    cursor
        .read_exact(&mut ae_bytes)
        .context(ReadPduFieldSnafu { field })?;
    Ok(std::str::from_utf8(&ae_bytes)
        .context(DecodeTextSnafu { field })?
        .trim()
        .to_string())
}

fn read_string<R>(reader: &mut R, field: &'static str, length: usize) -> Result<String>
where
    R: Read,
{
    let bytes = read_n(reader, length).context(ReadPduFieldSnafu { field })?;
    Ok(std::str::from_utf8(&bytes)
        .context(DecodeTextSnafu { field })?
        .trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string())
}

fn ensure_fully_consumed(cursor: &Cursor<&[u8]>) -> Result<()> {
    let bytes = cursor.get_ref().len() as u64 - cursor.position();
    ensure!(bytes == 0, PduLengthMismatchSnafu { bytes });
    Ok(())
}

fn read_pdu_variable(cursor: &mut Cursor<&[u8]>) -> Result<PduVariableItem> {
    // 1 - Item-type - XXH
    let item_type = cursor
        .read_u8()
        .context(ReadPduFieldSnafu { field: "Item-type" })?;

    // 2 - Reserved
    cursor
        .read_u8()
        .context(ReadReservedSnafu { bytes: 1_u32 })?;

    // 3-4 - Item-length
    let item_length = cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
        field: "Item-length",
    })?;

    let bytes = read_n(cursor, item_length as usize).context(ReadPduItemSnafu)?;
    let mut cursor = Cursor::new(&bytes[..]);

    match item_type {
        0x10 => {
            // Application Context Item Structure

            // 5-xxx - Application-context-name, encoded as a UID.
            let val = read_string(&mut cursor, "Application-context-name", bytes.len())?;
            Ok(PduVariableItem::ApplicationContext(val))
        }
        0x20 => {
            // Presentation Context Item Structure (proposed)

            let mut abstract_syntax: Option<String> = None;
            let mut transfer_syntaxes = vec![];

            // 5 - Presentation-context-ID - Odd integers between 1 and 255.
            let presentation_context_id = cursor.read_u8().context(ReadPduFieldSnafu {
                field: "Presentation-context-ID",
            })?;

            // 6-8 - Reserved
            skip(&mut cursor, 3).context(ReadReservedSnafu { bytes: 3_u32 })?;

            // 9-xxx - One Abstract Syntax sub-item followed by
            // one or more Transfer Syntax sub-items.
            while cursor.position() < cursor.get_ref().len() as u64 {
                // 1 - Item-type - XXH
                let item_type = cursor
                    .read_u8()
                    .context(ReadPduFieldSnafu { field: "Item-type" })?;

                // 2 - Reserved
                cursor
                    .read_u8()
                    .context(ReadReservedSnafu { bytes: 1_u32 })?;

                // 3-4 - Item-length
                let item_length = cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                    field: "Item-length",
                })?;

                match item_type {
                    0x30 => {
                        // Abstract Syntax Sub-Item Structure
                        abstract_syntax = Some(read_string(
                            &mut cursor,
                            "Abstract-syntax-name",
                            item_length as usize,
                        )?);
                    }
                    0x40 => {
                        // Transfer Syntax Sub-Item Structure
                        transfer_syntaxes.push(read_string(
                            &mut cursor,
                            "Transfer-syntax-name",
                            item_length as usize,
                        )?);
                    }
                    _ => {
                        return UnknownPresentationContextSubItemSnafu.fail();
                    }
                }
            }

            ensure!(
                !transfer_syntaxes.is_empty(),
                MissingTransferSyntaxSnafu
            );

            Ok(PduVariableItem::PresentationContextProposed(
                PresentationContextProposed {
                    id: presentation_context_id,
                    abstract_syntax: abstract_syntax.context(MissingAbstractSyntaxSnafu)?,
                    transfer_syntaxes,
                },
            ))
        }
        0x21 => {
            // Presentation Context Item Structure (result)

            let mut transfer_syntax: Option<String> = None;

            // 5 - Presentation-context-ID
            let presentation_context_id = cursor.read_u8().context(ReadPduFieldSnafu {
                field: "Presentation-context-ID",
            })?;

            // 6 - Reserved
            cursor
                .read_u8()
                .context(ReadReservedSnafu { bytes: 1_u32 })?;

            // 7 - Result/Reason - 0 acceptance, 1 user-rejection,
            // 2 no-reason, 3 abstract-syntax-not-supported,
            // 4 transfer-syntaxes-not-supported
            let reason = PresentationContextResultReason::from(cursor.read_u8().context(
                ReadPduFieldSnafu {
                    field: "Result/Reason",
                },
            )?)
            .context(InvalidPresentationContextResultReasonSnafu)?;

            // 8 - Reserved
            cursor
                .read_u8()
                .context(ReadReservedSnafu { bytes: 1_u32 })?;

            // 9-xxx - A single Transfer Syntax sub-item,
            // not significant unless the context was accepted.
            while cursor.position() < cursor.get_ref().len() as u64 {
                // 1 - Item-type - XXH
                let item_type = cursor
                    .read_u8()
                    .context(ReadPduFieldSnafu { field: "Item-type" })?;

                // 2 - Reserved
                cursor
                    .read_u8()
                    .context(ReadReservedSnafu { bytes: 1_u32 })?;

                // 3-4 - Item-length
                let item_length = cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                    field: "Item-length",
                })?;

                match item_type {
                    0x40 => {
                        // Transfer Syntax Sub-Item Structure
                        match transfer_syntax {
                            Some(_) => {
                                // Only one transfer syntax may be accepted.
                                return MultipleTransferSyntaxesAcceptedSnafu.fail();
                            }
                            None => {
                                transfer_syntax = Some(read_string(
                                    &mut cursor,
                                    "Transfer-syntax-name",
                                    item_length as usize,
                                )?);
                            }
                        }
                    }
                    _ => {
                        return InvalidTransferSyntaxSubItemSnafu.fail();
                    }
                }
            }

            Ok(PduVariableItem::PresentationContextResult(
                PresentationContextResult {
                    id: presentation_context_id,
                    reason,
                    transfer_syntax: transfer_syntax.context(MissingTransferSyntaxSnafu)?,
                },
            ))
        }
        0x50 => {
            // User Information Item Structure

            let mut user_variables = vec![];

            // 5-xxx - User-data sub-items, in the order given by the sender.
            while cursor.position() < cursor.get_ref().len() as u64 {
                // 1 - Item-type - XXH
                let item_type = cursor
                    .read_u8()
                    .context(ReadPduFieldSnafu { field: "Item-type" })?;

                // 2 - Reserved
                cursor
                    .read_u8()
                    .context(ReadReservedSnafu { bytes: 1_u32 })?;

                // 3-4 - Item-length
                let item_length = cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                    field: "Item-length",
                })?;

                match item_type {
                    0x51 => {
                        // Maximum Length Sub-Item Structure

                        // 5-8 - Maximum-length-received - The maximum length
                        // of P-DATA-TF PDUs the sender is willing to receive,
                        // 0 meaning no maximum length.
                        user_variables.push(UserVariableItem::MaxLength(
                            cursor.read_u32::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "Maximum-length-received",
                            })?,
                        ));
                    }
                    0x52 => {
                        // Implementation Class UID Sub-Item Structure
                        let implementation_class_uid = read_string(
                            &mut cursor,
                            "Implementation-class-uid",
                            item_length as usize,
                        )?;
                        user_variables.push(UserVariableItem::ImplementationClassUid(
                            implementation_class_uid,
                        ));
                    }
                    0x53 => {
                        // Asynchronous Operations Window Sub-Item Structure

                        // 5-6 - Maximum-number-operations-invoked
                        let max_operations_invoked =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "Maximum-number-operations-invoked",
                            })?;
                        // 7-8 - Maximum-number-operations-performed
                        let max_operations_performed =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "Maximum-number-operations-performed",
                            })?;
                        user_variables.push(UserVariableItem::AsyncOperationsWindow {
                            max_operations_invoked,
                            max_operations_performed,
                        });
                    }
                    0x54 => {
                        // SCP/SCU Role Selection Sub-Item Structure

                        // 5-6 - UID-length
                        let uid_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "UID-length",
                            })?;
                        // 7-xxx - SOP-class-uid
                        let sop_class_uid =
                            read_string(&mut cursor, "SOP-class-uid", uid_length as usize)?;
                        // xxx+1 - SCU-role, xxx+2 - SCP-role
                        let scu_role = cursor
                            .read_u8()
                            .context(ReadPduFieldSnafu { field: "SCU-role" })?;
                        let scp_role = cursor
                            .read_u8()
                            .context(ReadPduFieldSnafu { field: "SCP-role" })?;
                        user_variables.push(UserVariableItem::RoleSelection {
                            sop_class_uid,
                            scu_role,
                            scp_role,
                        });
                    }
                    0x55 => {
                        // Implementation Version Name Structure
                        let implementation_version_name = read_string(
                            &mut cursor,
                            "Implementation-version-name",
                            item_length as usize,
                        )?;
                        user_variables.push(UserVariableItem::ImplementationVersionName(
                            implementation_version_name,
                        ));
                    }
                    0x56 => {
                        // SOP Class Extended Negotiation Sub-Item

                        // 5-6 - SOP-class-uid-length
                        let sop_class_uid_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "SOP-class-uid-length",
                            })?;

                        // 7-xxx - SOP-class-uid
                        let sop_class_uid = read_string(
                            &mut cursor,
                            "SOP-class-uid",
                            sop_class_uid_length as usize,
                        )?;

                        // xxx-xxx - Service-class-application-information
                        let data_length = item_length
                            .saturating_sub(2)
                            .saturating_sub(sop_class_uid_length);
                        let data =
                            read_n(&mut cursor, data_length as usize).context(ReadPduFieldSnafu {
                                field: "Service-class-application-information",
                            })?;

                        user_variables.push(UserVariableItem::SopClassExtendedNegotiation(
                            sop_class_uid,
                            data,
                        ));
                    }
                    0x57 => {
                        // SOP Class Common Extended Negotiation Sub-Item

                        // 5-6 - SOP-class-uid-length, 7-xxx - SOP-class-uid
                        let uid_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "SOP-class-uid-length",
                            })?;
                        let sop_class_uid =
                            read_string(&mut cursor, "SOP-class-uid", uid_length as usize)?;

                        // Service-class-uid-length and Service-class-uid
                        let uid_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "Service-class-uid-length",
                            })?;
                        let service_class_uid =
                            read_string(&mut cursor, "Service-class-uid", uid_length as usize)?;

                        // Related-general-sop-class-identification,
                        // a length-prefixed sequence of length-prefixed UIDs
                        let related_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "Related-general-sop-class-identification-length",
                            })?;
                        let end = cursor.position() + u64::from(related_length);
                        let mut related_general_sop_class_uids = vec![];
                        while cursor.position() < end {
                            let uid_length =
                                cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                    field: "Related-general-sop-class-uid-length",
                                })?;
                            related_general_sop_class_uids.push(read_string(
                                &mut cursor,
                                "Related-general-sop-class-uid",
                                uid_length as usize,
                            )?);
                        }

                        user_variables.push(UserVariableItem::SopClassCommonExtendedNegotiation {
                            sop_class_uid,
                            service_class_uid,
                            related_general_sop_class_uids,
                        });
                    }
                    0x58 => {
                        // User Identity Negotiation

                        // 5 - User Identity Type
                        let user_identity_type = cursor.read_u8().context(ReadPduFieldSnafu {
                            field: "User-Identity-type",
                        })?;

                        // 6 - Positive-response-requested
                        let positive_response_requested =
                            cursor.read_u8().context(ReadPduFieldSnafu {
                                field: "User-Identity-positive-response-requested",
                            })?;

                        // 7-8 - Primary Field Length, 9-n - Primary Field
                        let primary_field_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "User-Identity-primary-field-length",
                            })?;
                        let primary_field = read_n(&mut cursor, primary_field_length as usize)
                            .context(ReadPduFieldSnafu {
                                field: "User-Identity-primary-field",
                            })?;

                        // n+1-n+2 - Secondary Field Length, n+3-m - Secondary
                        // Field. Only non-zero for username and password.
                        let secondary_field_length =
                            cursor.read_u16::<BigEndian>().context(ReadPduFieldSnafu {
                                field: "User-Identity-secondary-field-length",
                            })?;
                        let secondary_field = read_n(&mut cursor, secondary_field_length as usize)
                            .context(ReadPduFieldSnafu {
                                field: "User-Identity-secondary-field",
                            })?;

                        match UserIdentityType::from(user_identity_type) {
                            Some(user_identity_type) => {
                                user_variables.push(UserVariableItem::UserIdentity(
                                    UserIdentity::new(
                                        positive_response_requested == 1,
                                        user_identity_type,
                                        primary_field,
                                        secondary_field,
                                    ),
                                ));
                            }
                            None => {
                                warn!("Unknown User Identity Type code {}", user_identity_type);
                            }
                        }
                    }
                    _ => {
                        user_variables.push(UserVariableItem::Unknown(
                            item_type,
                            read_n(&mut cursor, item_length as usize)
                                .context(ReadPduFieldSnafu { field: "Unknown" })?,
                        ));
                    }
                }
            }

            Ok(PduVariableItem::UserVariables(user_variables))
        }
        _ => Ok(PduVariableItem::Unknown(item_type)),
    }
}
