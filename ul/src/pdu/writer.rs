//! PDU writer module
use crate::pdu::*;
use byteordered::byteorder::{BigEndian, WriteBytesExt};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::Write;

pub type Result<T> = std::result::Result<T, WriteError>;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    #[snafu(display("Could not write PDU field `{}`", field))]
    WriteField {
        field: &'static str,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not write {} reserved bytes", bytes))]
    WriteReserved {
        bytes: u32,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Could not write chunk `{}`", name))]
    WriteChunk {
        name: &'static str,
        #[snafu(source(from(WriteChunkError, Box::new)))]
        source: Box<WriteChunkError>,
    },
}

#[derive(Debug, Snafu)]
pub enum WriteChunkError {
    #[snafu(display("Failed to build chunk"))]
    BuildChunk {
        #[snafu(source(from(WriteError, Box::new)))]
        source: Box<WriteError>,
    },
    #[snafu(display("Failed to write chunk length"))]
    WriteLength {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write chunk data"))]
    WriteData {
        backtrace: Backtrace,
        source: std::io::Error,
    },
}

fn write_chunk_u32<F>(writer: &mut dyn Write, func: F) -> std::result::Result<(), WriteChunkError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut data = vec![];
    func(&mut data).context(BuildChunkSnafu)?;

    let length = data.len() as u32;
    writer
        .write_u32::<BigEndian>(length)
        .context(WriteLengthSnafu)?;

    writer.write_all(&data).context(WriteDataSnafu)?;

    Ok(())
}

fn write_chunk_u16<F>(writer: &mut dyn Write, func: F) -> std::result::Result<(), WriteChunkError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut data = vec![];
    func(&mut data).context(BuildChunkSnafu)?;

    let length = data.len() as u16;
    writer
        .write_u16::<BigEndian>(length)
        .context(WriteLengthSnafu)?;

    writer.write_all(&data).context(WriteDataSnafu)?;

    Ok(())
}

/// Write a PDU to the given writer as one whole frame.
///
/// Every length field of the frame is computed from the data,
/// never taken from the value.
pub fn write_pdu<W>(writer: &mut W, pdu: &Pdu) -> Result<()>
where
    W: Write,
{
    match pdu {
        Pdu::AssociationRQ(AssociationRQ {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_variables,
        }) => {
            // A-ASSOCIATE-RQ PDU Structure

            // 1 - PDU-type - 01H
            writer
                .write_u8(0x01)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7-8 - Protocol-version - Bit 0 identifies version 1.
                writer
                    .write_u16::<BigEndian>(*protocol_version)
                    .context(WriteFieldSnafu {
                        field: "Protocol-version",
                    })?;

                // 9-10 - Reserved
                writer
                    .write_u16::<BigEndian>(0x00)
                    .context(WriteReservedSnafu { bytes: 2_u32 })?;

                // 11-26 - Called-AE-title - 16 characters, space padded.
                write_ae_title(writer, called_ae_title, "Called-AE-title")?;

                // 27-42 - Calling-AE-title - 16 characters, space padded.
                write_ae_title(writer, calling_ae_title, "Calling-AE-title")?;

                // 43-74 - Reserved
                writer
                    .write_all(&[0; 32])
                    .context(WriteReservedSnafu { bytes: 32_u32 })?;

                // 75-xxx - Variable items
                write_pdu_variable_application_context_name(writer, application_context_name)?;

                for presentation_context in presentation_contexts {
                    write_pdu_variable_presentation_context_proposed(writer, presentation_context)?;
                }

                write_pdu_variable_user_variables(writer, user_variables)?;

                Ok(())
            })
            .context(WriteChunkSnafu {
                name: "A-ASSOCIATE-RQ",
            })?;

            Ok(())
        }
        Pdu::AssociationAC(AssociationAC {
            protocol_version,
            application_context_name,
            called_ae_title,
            calling_ae_title,
            presentation_contexts,
            user_variables,
        }) => {
            // A-ASSOCIATE-AC PDU Structure

            // 1 - PDU-type - 02H
            writer
                .write_u8(0x02)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7-8 - Protocol-version
                writer
                    .write_u16::<BigEndian>(*protocol_version)
                    .context(WriteFieldSnafu {
                        field: "Protocol-version",
                    })?;

                // 9-10 - Reserved
                writer
                    .write_u16::<BigEndian>(0x00)
                    .context(WriteReservedSnafu { bytes: 2_u32 })?;

                // 11-26 - Reserved - Echo of the called AE title.
                write_ae_title(writer, called_ae_title, "Called-AE-title")?;

                // 27-42 - Reserved - Echo of the calling AE title.
                write_ae_title(writer, calling_ae_title, "Calling-AE-title")?;

                // 43-74 - Reserved
                writer
                    .write_all(&[0; 32])
                    .context(WriteReservedSnafu { bytes: 32_u32 })?;

                // 75-xxx - Variable items
                write_pdu_variable_application_context_name(writer, application_context_name)?;

                for presentation_context in presentation_contexts {
                    write_pdu_variable_presentation_context_result(writer, presentation_context)?;
                }

                write_pdu_variable_user_variables(writer, user_variables)?;

                Ok(())
            })
            .context(WriteChunkSnafu {
                name: "A-ASSOCIATE-AC",
            })?;

            Ok(())
        }
        Pdu::AssociationRJ(AssociationRJ { result, source }) => {
            // A-ASSOCIATE-RJ PDU Structure

            // 1 - PDU-type - 03H
            writer
                .write_u8(0x03)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7 - Reserved
                writer
                    .write_u8(0x00)
                    .context(WriteReservedSnafu { bytes: 1_u32 })?;

                // 8 - Result - 1 rejected-permanent, 2 rejected-transient
                writer
                    .write_u8(match result {
                        AssociationRJResult::Permanent => 0x01,
                        AssociationRJResult::Transient => 0x02,
                    })
                    .context(WriteFieldSnafu { field: "Result" })?;

                // 9 - Source, 10 - Reason/Diag. - The reason values are
                // scoped by the source value.
                let source_word = match source {
                    AssociationRJSource::ServiceUser(reason) => {
                        let reason = match reason {
                            AssociationRJServiceUserReason::NoReasonGiven => 0x01,
                            AssociationRJServiceUserReason::ApplicationContextNameNotSupported => {
                                0x02
                            }
                            AssociationRJServiceUserReason::CallingAeTitleNotRecognized => 0x03,
                            AssociationRJServiceUserReason::CalledAeTitleNotRecognized => 0x07,
                            AssociationRJServiceUserReason::Reserved(data) => *data,
                        };
                        [0x01, reason]
                    }
                    AssociationRJSource::ServiceProviderAsce(reason) => {
                        let reason = match reason {
                            AssociationRJServiceProviderAsceReason::NoReasonGiven => 0x01,
                            AssociationRJServiceProviderAsceReason::ProtocolVersionNotSupported => {
                                0x02
                            }
                        };
                        [0x02, reason]
                    }
                    AssociationRJSource::ServiceProviderPresentation(reason) => {
                        let reason = match reason {
                            AssociationRJServiceProviderPresentationReason::TemporaryCongestion => {
                                0x01
                            }
                            AssociationRJServiceProviderPresentationReason::LocalLimitExceeded => {
                                0x02
                            }
                            AssociationRJServiceProviderPresentationReason::Reserved(data) => *data,
                        };
                        [0x03, reason]
                    }
                };
                writer.extend(source_word);

                Ok(())
            })
            .context(WriteChunkSnafu {
                name: "A-ASSOCIATE-RJ",
            })?;

            Ok(())
        }
        Pdu::PData { data } => {
            // P-DATA-TF PDU Structure

            // 1 - PDU-type - 04H
            writer
                .write_u8(0x04)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7-xxx - One or more Presentation-data-value Items
                for presentation_data_value in data {
                    write_chunk_u32(writer, |writer| {
                        // 5 - Presentation-context-ID
                        writer.push(presentation_data_value.presentation_context_id);

                        // 6 - Message control header: bit 0 set for command
                        // fragments, bit 1 set on the last fragment
                        // of its message part.
                        let mut message_header = 0x00;
                        if let PDataValueType::Command = presentation_data_value.value_type {
                            message_header |= 0x01;
                        }
                        if presentation_data_value.is_last {
                            message_header |= 0x02;
                        }
                        writer.push(message_header);

                        // Message fragment
                        writer.extend(&presentation_data_value.data);

                        Ok(())
                    })
                    .context(WriteChunkSnafu {
                        name: "Presentation-data-value item",
                    })?;
                }

                Ok(())
            })
            .context(WriteChunkSnafu { name: "P-DATA-TF" })?;

            Ok(())
        }
        Pdu::ReleaseRQ => {
            // A-RELEASE-RQ PDU Structure

            // 1 - PDU-type - 05H
            writer
                .write_u8(0x05)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7-10 - Reserved
                writer.extend([0u8; 4]);
                Ok(())
            })
            .context(WriteChunkSnafu {
                name: "A-RELEASE-RQ",
            })?;

            Ok(())
        }
        Pdu::ReleaseRP => {
            // A-RELEASE-RP PDU Structure

            // 1 - PDU-type - 06H
            writer
                .write_u8(0x06)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7-10 - Reserved
                writer.extend([0u8; 4]);
                Ok(())
            })
            .context(WriteChunkSnafu {
                name: "A-RELEASE-RP",
            })?;

            Ok(())
        }
        Pdu::AbortRQ { source } => {
            // A-ABORT PDU Structure

            // 1 - PDU-type - 07H
            writer
                .write_u8(0x07)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                // 7 - Reserved, 8 - Reserved
                writer.push(0);
                writer.push(0);

                // 9 - Source - 0 service-user, 2 service-provider.
                // 10 - Reason/Diag - Only significant for provider aborts;
                // sent as 00H otherwise.
                let (source, reason) = source.codes();
                writer.extend([source, reason]);

                Ok(())
            })
            .context(WriteChunkSnafu { name: "A-ABORT" })?;

            Ok(())
        }
        Pdu::Unknown { pdu_type, data } => {
            // 1 - PDU-type - XXH
            writer
                .write_u8(*pdu_type)
                .context(WriteFieldSnafu { field: "PDU-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u32(writer, |writer| {
                writer.extend(data);
                Ok(())
            })
            .context(WriteChunkSnafu { name: "Unknown" })?;

            Ok(())
        }
    }
}

fn write_ae_title(writer: &mut dyn Write, ae_title: &str, field: &'static str) -> Result<()> {
    let mut ae_title_bytes = ae_title.as_bytes().to_vec();
    ae_title_bytes.resize(16, b' ');
    writer
        .write_all(&ae_title_bytes)
        .context(WriteFieldSnafu { field })
}

fn write_pdu_variable_application_context_name(
    writer: &mut dyn Write,
    application_context_name: &str,
) -> Result<()> {
    // Application Context Item Structure

    // 1 - Item-type - 10H
    writer
        .write_u8(0x10)
        .context(WriteFieldSnafu { field: "Item-type" })?;

    // 2 - Reserved
    writer
        .write_u8(0x00)
        .context(WriteReservedSnafu { bytes: 1_u32 })?;

    write_chunk_u16(writer, |writer| {
        // 5-xxx - Application-context-name
        writer
            .write_all(application_context_name.as_bytes())
            .context(WriteFieldSnafu {
                field: "Application-context-name",
            })
    })
    .context(WriteChunkSnafu {
        name: "Application Context Item",
    })?;

    Ok(())
}

fn write_pdu_variable_presentation_context_proposed(
    writer: &mut dyn Write,
    presentation_context: &PresentationContextProposed,
) -> Result<()> {
    // Presentation Context Item Structure

    // 1 - Item-type - 20H
    writer
        .write_u8(0x20)
        .context(WriteFieldSnafu { field: "Item-type" })?;

    // 2 - Reserved
    writer
        .write_u8(0x00)
        .context(WriteReservedSnafu { bytes: 1_u32 })?;

    write_chunk_u16(writer, |writer| {
        // 5 - Presentation-context-ID
        writer
            .write_u8(presentation_context.id)
            .context(WriteFieldSnafu {
                field: "Presentation-context-ID",
            })?;

        // 6-8 - Reserved
        writer
            .write_all(&[0x00; 3])
            .context(WriteReservedSnafu { bytes: 3_u32 })?;

        // 9-xxx - One Abstract Syntax sub-item
        // followed by one or more Transfer Syntax sub-items.

        // 1 - Item-type - 30H
        writer
            .write_u8(0x30)
            .context(WriteFieldSnafu { field: "Item-type" })?;

        // 2 - Reserved
        writer
            .write_u8(0x00)
            .context(WriteReservedSnafu { bytes: 1_u32 })?;

        write_chunk_u16(writer, |writer| {
            // 5-xxx - Abstract-syntax-name
            writer
                .write_all(presentation_context.abstract_syntax.as_bytes())
                .context(WriteFieldSnafu {
                    field: "Abstract-syntax-name",
                })
        })
        .context(WriteChunkSnafu {
            name: "Abstract Syntax Sub-Item",
        })?;

        for transfer_syntax in &presentation_context.transfer_syntaxes {
            // 1 - Item-type - 40H
            writer
                .write_u8(0x40)
                .context(WriteFieldSnafu { field: "Item-type" })?;

            // 2 - Reserved
            writer
                .write_u8(0x00)
                .context(WriteReservedSnafu { bytes: 1_u32 })?;

            write_chunk_u16(writer, |writer| {
                // 5-xxx - Transfer-syntax-name
                writer
                    .write_all(transfer_syntax.as_bytes())
                    .context(WriteFieldSnafu {
                        field: "Transfer-syntax-name",
                    })
            })
            .context(WriteChunkSnafu {
                name: "Transfer Syntax Sub-Item",
            })?;
        }

        Ok(())
    })
    .context(WriteChunkSnafu {
        name: "Presentation Context Item",
    })?;

    Ok(())
}

fn write_pdu_variable_presentation_context_result(
    writer: &mut dyn Write,
    presentation_context: &PresentationContextResult,
) -> Result<()> {
    // Presentation Context Item Structure (result)

    // 1 - Item-type - 21H
    writer
        .write_u8(0x21)
        .context(WriteFieldSnafu { field: "Item-type" })?;

    // 2 - Reserved
    writer
        .write_u8(0x00)
        .context(WriteReservedSnafu { bytes: 1_u32 })?;

    write_chunk_u16(writer, |writer| {
        // 5 - Presentation-context-ID
        writer
            .write_u8(presentation_context.id)
            .context(WriteFieldSnafu {
                field: "Presentation-context-ID",
            })?;

        // 6 - Reserved
        writer
            .write_u8(0x00)
            .context(WriteReservedSnafu { bytes: 1_u32 })?;

        // 7 - Result/Reason
        writer
            .write_u8(match &presentation_context.reason {
                PresentationContextResultReason::Acceptance => 0,
                PresentationContextResultReason::UserRejection => 1,
                PresentationContextResultReason::NoReason => 2,
                PresentationContextResultReason::AbstractSyntaxNotSupported => 3,
                PresentationContextResultReason::TransferSyntaxesNotSupported => 4,
            })
            .context(WriteFieldSnafu {
                field: "Result/Reason",
            })?;

        // 8 - Reserved
        writer
            .write_u8(0x00)
            .context(WriteReservedSnafu { bytes: 1_u32 })?;

        // 9-xxx - A single Transfer Syntax sub-item.

        // 1 - Item-type - 40H
        writer
            .write_u8(0x40)
            .context(WriteFieldSnafu { field: "Item-type" })?;

        // 2 - Reserved
        writer
            .write_u8(0x00)
            .context(WriteReservedSnafu { bytes: 1_u32 })?;

        write_chunk_u16(writer, |writer| {
            // 5-xxx - Transfer-syntax-name
            writer
                .write_all(presentation_context.transfer_syntax.as_bytes())
                .context(WriteFieldSnafu {
                    field: "Transfer-syntax-name",
                })
        })
        .context(WriteChunkSnafu {
            name: "Transfer Syntax Sub-Item",
        })?;

        Ok(())
    })
    .context(WriteChunkSnafu {
        name: "Presentation Context Item",
    })
}

fn write_pdu_variable_user_variables(
    writer: &mut dyn Write,
    user_variables: &[UserVariableItem],
) -> Result<()> {
    if user_variables.is_empty() {
        return Ok(());
    }

    // User Information Item Structure

    // 1 - Item-type - 50H
    writer
        .write_u8(0x50)
        .context(WriteFieldSnafu { field: "Item-type" })?;

    // 2 - Reserved
    writer
        .write_u8(0x00)
        .context(WriteReservedSnafu { bytes: 1_u32 })?;

    write_chunk_u16(writer, |writer| {
        // 5-xxx - User-data sub-items, in order.
        for user_variable in user_variables {
            match user_variable {
                UserVariableItem::MaxLength(max_length) => {
                    // 1 - Item-type - 51H
                    writer
                        .write_u8(0x51)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        // 5-8 - Maximum-length-received
                        writer
                            .write_u32::<BigEndian>(*max_length)
                            .context(WriteFieldSnafu {
                                field: "Maximum-length-received",
                            })
                    })
                    .context(WriteChunkSnafu {
                        name: "Maximum-length-received",
                    })?;
                }
                UserVariableItem::ImplementationClassUid(implementation_class_uid) => {
                    // 1 - Item-type - 52H
                    writer
                        .write_u8(0x52)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        // 5-xxx - Implementation-class-uid
                        writer
                            .write_all(implementation_class_uid.as_bytes())
                            .context(WriteFieldSnafu {
                                field: "Implementation-class-uid",
                            })
                    })
                    .context(WriteChunkSnafu {
                        name: "Implementation-class-uid",
                    })?;
                }
                UserVariableItem::AsyncOperationsWindow {
                    max_operations_invoked,
                    max_operations_performed,
                } => {
                    // 1 - Item-type - 53H
                    writer
                        .write_u8(0x53)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        // 5-6 - Maximum-number-operations-invoked,
                        // 7-8 - Maximum-number-operations-performed
                        writer
                            .write_u16::<BigEndian>(*max_operations_invoked)
                            .context(WriteFieldSnafu {
                                field: "Maximum-number-operations-invoked",
                            })?;
                        writer
                            .write_u16::<BigEndian>(*max_operations_performed)
                            .context(WriteFieldSnafu {
                                field: "Maximum-number-operations-performed",
                            })
                    })
                    .context(WriteChunkSnafu {
                        name: "Asynchronous Operations Window",
                    })?;
                }
                UserVariableItem::RoleSelection {
                    sop_class_uid,
                    scu_role,
                    scp_role,
                } => {
                    // 1 - Item-type - 54H
                    writer
                        .write_u8(0x54)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        // 5-6 - UID-length, 7-xxx - SOP-class-uid
                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(sop_class_uid.as_bytes())
                                .context(WriteFieldSnafu {
                                    field: "SOP-class-uid",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "SOP-class-uid",
                        })?;

                        // SCU-role and SCP-role
                        writer
                            .write_u8(*scu_role)
                            .context(WriteFieldSnafu { field: "SCU-role" })?;
                        writer
                            .write_u8(*scp_role)
                            .context(WriteFieldSnafu { field: "SCP-role" })
                    })
                    .context(WriteChunkSnafu {
                        name: "SCP/SCU Role Selection",
                    })?;
                }
                UserVariableItem::ImplementationVersionName(implementation_version_name) => {
                    // 1 - Item-type - 55H
                    writer
                        .write_u8(0x55)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        // 5-xxx - Implementation-version-name
                        writer
                            .write_all(implementation_version_name.as_bytes())
                            .context(WriteFieldSnafu {
                                field: "Implementation-version-name",
                            })
                    })
                    .context(WriteChunkSnafu {
                        name: "Implementation-version-name",
                    })?;
                }
                UserVariableItem::SopClassExtendedNegotiation(sop_class_uid, data) => {
                    // 1 - Item-type - 56H
                    writer
                        .write_u8(0x56)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        // 5-6 - SOP-class-uid-length, 7-xxx - SOP-class-uid
                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(sop_class_uid.as_bytes())
                                .context(WriteFieldSnafu {
                                    field: "SOP-class-uid",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "SOP-class-uid",
                        })?;

                        // xxx-xxx - Service-class-application-information
                        writer.write_all(data).context(WriteFieldSnafu {
                            field: "Service-class-application-information",
                        })
                    })
                    .context(WriteChunkSnafu {
                        name: "SOP Class Extended Negotiation",
                    })?;
                }
                UserVariableItem::SopClassCommonExtendedNegotiation {
                    sop_class_uid,
                    service_class_uid,
                    related_general_sop_class_uids,
                } => {
                    // 1 - Item-type - 57H
                    writer
                        .write_u8(0x57)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(sop_class_uid.as_bytes())
                                .context(WriteFieldSnafu {
                                    field: "SOP-class-uid",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "SOP-class-uid",
                        })?;

                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(service_class_uid.as_bytes())
                                .context(WriteFieldSnafu {
                                    field: "Service-class-uid",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "Service-class-uid",
                        })?;

                        // Related-general-sop-class-identification,
                        // a length-prefixed sequence of length-prefixed UIDs
                        write_chunk_u16(writer, |writer| {
                            for uid in related_general_sop_class_uids {
                                write_chunk_u16(writer, |writer| {
                                    writer.write_all(uid.as_bytes()).context(WriteFieldSnafu {
                                        field: "Related-general-sop-class-uid",
                                    })
                                })
                                .context(WriteChunkSnafu {
                                    name: "Related-general-sop-class-uid",
                                })?;
                            }
                            Ok(())
                        })
                        .context(WriteChunkSnafu {
                            name: "Related-general-sop-class-identification",
                        })
                    })
                    .context(WriteChunkSnafu {
                        name: "SOP Class Common Extended Negotiation",
                    })?;
                }
                UserVariableItem::UserIdentity(user_identity) => {
                    // 1 - Item-type - 58H
                    writer
                        .write_u8(0x58)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    // 3-4 - Item-length
                    write_chunk_u16(writer, |writer| {
                        // 5 - User-Identity-Type
                        writer
                            .write_u8(user_identity.identity_type().to_u8())
                            .context(WriteFieldSnafu {
                                field: "User-Identity-Type",
                            })?;

                        // 6 - Positive-response-requested
                        writer
                            .write_u8(u8::from(user_identity.positive_response_requested()))
                            .context(WriteFieldSnafu {
                                field: "Positive-response-requested",
                            })?;

                        // 7-8 - Primary-field-length, 9-n - Primary-field
                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(user_identity.primary_field())
                                .context(WriteFieldSnafu {
                                    field: "Primary-field",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "Primary-field",
                        })?;

                        // n+1-n+2 - Secondary-field-length, n+3-m - Secondary-field
                        write_chunk_u16(writer, |writer| {
                            writer
                                .write_all(user_identity.secondary_field())
                                .context(WriteFieldSnafu {
                                    field: "Secondary-field",
                                })
                        })
                        .context(WriteChunkSnafu {
                            name: "Secondary-field",
                        })
                    })
                    .context(WriteChunkSnafu {
                        name: "User Identity",
                    })?;
                }
                UserVariableItem::Unknown(item_type, data) => {
                    writer
                        .write_u8(*item_type)
                        .context(WriteFieldSnafu { field: "Item-type" })?;
                    writer
                        .write_u8(0x00)
                        .context(WriteReservedSnafu { bytes: 1_u32 })?;

                    write_chunk_u16(writer, |writer| {
                        writer.write_all(data).context(WriteFieldSnafu {
                            field: "Unknown Data",
                        })
                    })
                    .context(WriteChunkSnafu { name: "Unknown" })?;
                }
            }
        }

        Ok(())
    })
    .context(WriteChunkSnafu { name: "User-data" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_write_chunks_with_preceding_u32_length() {
        let mut bytes = vec![0u8; 0];
        write_chunk_u32(&mut bytes, |writer| {
            writer
                .write_u8(0x02)
                .context(WriteFieldSnafu { field: "Field1" })?;
            write_chunk_u32(writer, |writer| {
                writer
                    .write_u8(0x03)
                    .context(WriteFieldSnafu { field: "Field2" })?;
                Ok(())
            })
            .context(WriteChunkSnafu { name: "Chunk2" })
        })
        .unwrap();

        assert_eq!(bytes.len(), 10);
        assert_eq!(bytes, &[0, 0, 0, 6, 2, 0, 0, 0, 1, 3]);
    }

    #[test]
    fn can_write_chunks_with_preceding_u16_length() {
        let mut bytes = vec![0u8; 0];
        write_chunk_u16(&mut bytes, |writer| {
            writer
                .write_u8(0x02)
                .context(WriteFieldSnafu { field: "Field1" })?;
            write_chunk_u16(writer, |writer| {
                writer
                    .write_u8(0x03)
                    .context(WriteFieldSnafu { field: "Field2" })?;
                Ok(())
            })
            .context(WriteChunkSnafu { name: "Chunk2" })
        })
        .unwrap();

        assert_eq!(bytes.len(), 6);
        assert_eq!(bytes, &[0, 4, 2, 0, 1, 3]);
    }

    #[test]
    fn write_abort_rq() {
        let mut out = vec![];

        // abort by request of the service user
        let pdu = Pdu::AbortRQ {
            source: AbortRQSource::ServiceUser,
        };
        write_pdu(&mut out, &pdu).unwrap();
        assert_eq!(
            &out,
            &[
                // code 7 + reserved byte
                0x07, 0x00, //
                // PDU length: 4 bytes
                0x00, 0x00, 0x00, 0x04, //
                // reserved 2 bytes + source: service user (0) + reason (0)
                0x00, 0x00, 0x00, 0x00,
            ]
        );
        out.clear();

        // abort by request of the service provider
        let pdu = Pdu::AbortRQ {
            source: AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::InvalidPduParameter,
            ),
        };
        write_pdu(&mut out, &pdu).unwrap();
        assert_eq!(
            &out,
            &[
                // code 7 + reserved byte
                0x07, 0x00, //
                // PDU length: 4 bytes
                0x00, 0x00, 0x00, 0x04, //
                // reserved 2 bytes
                0x00, 0x00, //
                // source: service provider (2), invalid parameter value (6)
                0x02, 0x06,
            ]
        );
    }
}
