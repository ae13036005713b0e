use crate::pdu::*;
use bytes::BytesMut;
use matches::assert_matches;
use rstest::rstest;

fn encode(pdu: &Pdu) -> Vec<u8> {
    let mut bytes = vec![];
    write_pdu(&mut bytes, pdu).unwrap();
    bytes
}

/// Write the PDU out, read it back in
/// and check both value and byte stream stability.
fn roundtrip(pdu: &Pdu) {
    let bytes = encode(pdu);
    let mut buffer = BytesMut::from(&bytes[..]);
    let decoded = read_pdu(&mut buffer, MAXIMUM_PDU_SIZE, true)
        .unwrap()
        .expect("a whole PDU was available");
    assert!(buffer.is_empty(), "reader must consume exactly one frame");
    assert_eq!(&decoded, pdu);
    assert_eq!(encode(&decoded), bytes);
}

fn sample_associate_rq() -> Pdu {
    Pdu::AssociationRQ(AssociationRQ {
        protocol_version: 1,
        calling_ae_title: "SCU-AE".to_string(),
        called_ae_title: "SCP-AE".to_string(),
        application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
        presentation_contexts: vec![
            PresentationContextProposed {
                id: 1,
                abstract_syntax: "1.2.840.10008.1.1".to_string(),
                transfer_syntaxes: vec![
                    "1.2.840.10008.1.2".to_string(),
                    "1.2.840.10008.1.2.1".to_string(),
                ],
            },
            PresentationContextProposed {
                id: 3,
                abstract_syntax: "1.2.840.10008.5.1.4.1.1.7".to_string(),
                transfer_syntaxes: vec!["1.2.840.10008.1.2.1".to_string()],
            },
        ],
        user_variables: vec![
            UserVariableItem::MaxLength(16384),
            UserVariableItem::ImplementationClassUid("1.2.3.4.5".to_string()),
            UserVariableItem::ImplementationVersionName("ferrodicom 0.1".to_string()),
        ],
    })
}

fn sample_associate_ac() -> Pdu {
    Pdu::AssociationAC(AssociationAC {
        protocol_version: 1,
        calling_ae_title: "SCU-AE".to_string(),
        called_ae_title: "SCP-AE".to_string(),
        application_context_name: "1.2.840.10008.3.1.1.1".to_string(),
        presentation_contexts: vec![
            PresentationContextResult {
                id: 1,
                reason: PresentationContextResultReason::Acceptance,
                transfer_syntax: "1.2.840.10008.1.2".to_string(),
            },
            PresentationContextResult {
                id: 3,
                reason: PresentationContextResultReason::AbstractSyntaxNotSupported,
                transfer_syntax: "1.2.840.10008.1.2".to_string(),
            },
        ],
        user_variables: vec![
            UserVariableItem::MaxLength(0),
            UserVariableItem::ImplementationClassUid("1.2.3.4.5".to_string()),
            UserVariableItem::ImplementationVersionName("ferrodicom 0.1".to_string()),
        ],
    })
}

#[test]
fn can_read_write_associate_rq() {
    roundtrip(&sample_associate_rq());
}

#[test]
fn can_read_write_associate_ac() {
    roundtrip(&sample_associate_ac());
}

#[test]
fn can_read_write_all_user_information_sub_items() {
    let mut pdu = sample_associate_rq();
    if let Pdu::AssociationRQ(AssociationRQ { user_variables, .. }) = &mut pdu {
        user_variables.extend([
            UserVariableItem::AsyncOperationsWindow {
                max_operations_invoked: 4,
                max_operations_performed: 1,
            },
            UserVariableItem::RoleSelection {
                sop_class_uid: "1.2.840.10008.5.1.4.1.1.7".to_string(),
                scu_role: 1,
                scp_role: 0,
            },
            UserVariableItem::SopClassExtendedNegotiation(
                "1.2.840.10008.5.1.4.1.2.2.1".to_string(),
                vec![0x01, 0x00],
            ),
            UserVariableItem::SopClassCommonExtendedNegotiation {
                sop_class_uid: "1.2.840.10008.5.1.4.1.1.88.40".to_string(),
                service_class_uid: "1.2.840.10008.4.2".to_string(),
                related_general_sop_class_uids: vec![
                    "1.2.840.10008.5.1.4.1.1.88.22".to_string(),
                ],
            },
            UserVariableItem::UserIdentity(UserIdentity::new(
                true,
                UserIdentityType::UsernameAndPassword,
                b"caesar".to_vec(),
                b"rubicon".to_vec(),
            )),
            UserVariableItem::Unknown(0x77, vec![1, 2, 3]),
        ]);
    }
    roundtrip(&pdu);
}

#[test]
fn can_read_write_associate_rj() {
    roundtrip(&Pdu::AssociationRJ(AssociationRJ {
        result: AssociationRJResult::Permanent,
        source: AssociationRJSource::ServiceUser(
            AssociationRJServiceUserReason::CalledAeTitleNotRecognized,
        ),
    }));
    roundtrip(&Pdu::AssociationRJ(AssociationRJ {
        result: AssociationRJResult::Transient,
        source: AssociationRJSource::ServiceProviderPresentation(
            AssociationRJServiceProviderPresentationReason::LocalLimitExceeded,
        ),
    }));
}

#[test]
fn can_read_write_pdata() {
    roundtrip(&Pdu::PData {
        data: vec![PDataValue {
            presentation_context_id: 3,
            value_type: PDataValueType::Command,
            is_last: true,
            data: vec![0, 0, 0, 0],
        }],
    });
    roundtrip(&Pdu::PData {
        data: vec![
            PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Command,
                is_last: true,
                data: vec![8; 58],
            },
            PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Data,
                is_last: false,
                data: vec![55; 20],
            },
        ],
    });
}

#[test]
fn can_read_write_release_and_abort() {
    roundtrip(&Pdu::ReleaseRQ);
    roundtrip(&Pdu::ReleaseRP);
    roundtrip(&Pdu::AbortRQ {
        source: AbortRQSource::ServiceUser,
    });
    roundtrip(&Pdu::AbortRQ {
        source: AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::UnexpectedPdu),
    });
}

#[test]
fn can_read_write_unknown_pdu_type() {
    roundtrip(&Pdu::Unknown {
        pdu_type: 0x09,
        data: vec![0xAA, 0xBB, 0xCC],
    });
}

#[test]
fn release_rq_is_bit_exact() {
    assert_eq!(
        encode(&Pdu::ReleaseRQ),
        vec![0x05, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn association_rj_is_bit_exact() {
    let rj = Pdu::AssociationRJ(AssociationRJ {
        result: AssociationRJResult::Permanent,
        source: AssociationRJSource::ServiceUser(
            AssociationRJServiceUserReason::CalledAeTitleNotRecognized,
        ),
    });
    assert_eq!(
        encode(&rj),
        vec![
            // code 3 + reserved byte
            0x03, 0x00, //
            // PDU length: 4 bytes
            0x00, 0x00, 0x00, 0x04, //
            // reserved, permanent (1), service user (1), called AE title (7)
            0x00, 0x01, 0x01, 0x07,
        ]
    );
}

#[test]
fn associate_rq_length_field_accounts_for_fixed_fields_and_items() {
    let bytes = encode(&sample_associate_rq());
    let declared = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
    assert_eq!(bytes.len(), PDU_HEADER_SIZE as usize + declared as usize);
    // protocol version + reserved + both AE titles + 32 reserved bytes
    assert!(declared >= 68);
}

#[test]
fn reader_waits_for_a_whole_frame() {
    let bytes = encode(&sample_associate_rq());
    for cut in [0, 1, 5, 6, bytes.len() - 1] {
        let mut buffer = BytesMut::from(&bytes[..cut]);
        assert_matches!(read_pdu(&mut buffer, DEFAULT_MAX_PDU, true), Ok(None));
        // a partial frame is never consumed
        assert_eq!(buffer.len(), cut);
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(7)]
#[case(16)]
#[case(251)]
fn fragmented_delivery_is_invariant(#[case] chunk_size: usize) {
    let pdu = sample_associate_rq();
    let bytes = encode(&pdu);

    let mut buffer = BytesMut::new();
    let mut decoded = vec![];
    for chunk in bytes.chunks(chunk_size) {
        buffer.extend_from_slice(chunk);
        while let Some(pdu) = read_pdu(&mut buffer, DEFAULT_MAX_PDU, true).unwrap() {
            decoded.push(pdu);
        }
    }

    assert_eq!(decoded, vec![pdu]);
    assert!(buffer.is_empty());
}

#[test]
fn coalesced_frames_are_split() {
    let first = sample_associate_rq();
    let second = Pdu::ReleaseRQ;
    let mut bytes = encode(&first);
    bytes.extend(encode(&second));

    let mut buffer = BytesMut::from(&bytes[..]);
    assert_eq!(read_pdu(&mut buffer, DEFAULT_MAX_PDU, true).unwrap(), Some(first));
    assert_eq!(read_pdu(&mut buffer, DEFAULT_MAX_PDU, true).unwrap(), Some(second));
    assert_matches!(read_pdu(&mut buffer, DEFAULT_MAX_PDU, true), Ok(None));
}

#[test]
fn oversized_pdu_is_refused_in_strict_mode() {
    let pdu = Pdu::PData {
        data: vec![PDataValue {
            presentation_context_id: 1,
            value_type: PDataValueType::Data,
            is_last: true,
            data: vec![0; 6000],
        }],
    };
    let bytes = encode(&pdu);

    let mut buffer = BytesMut::from(&bytes[..]);
    assert_matches!(
        read_pdu(&mut buffer, MINIMUM_PDU_SIZE, true),
        Err(ReadError::PduTooLarge { .. })
    );

    // the same frame is tolerated when strict mode is off
    let mut buffer = BytesMut::from(&bytes[..]);
    assert_eq!(read_pdu(&mut buffer, MINIMUM_PDU_SIZE, false).unwrap(), Some(pdu));
}

#[test]
fn protocol_version_must_have_bit_0_set() {
    let mut bytes = encode(&sample_associate_rq());
    // patch the protocol version field to version bit 1 only
    bytes[6] = 0x00;
    bytes[7] = 0x02;
    let mut buffer = BytesMut::from(&bytes[..]);
    assert_matches!(
        read_pdu(&mut buffer, DEFAULT_MAX_PDU, true),
        Err(ReadError::InvalidProtocolVersion { .. })
    );
}

#[test]
fn truncated_item_is_a_decode_error() {
    let mut bytes = encode(&sample_associate_rq());
    // make the application context item declare more bytes than it has
    // (item starts right after the 68 fixed bytes and the 6 byte header)
    let item_length_offset = 6 + 68 + 2;
    bytes[item_length_offset] = 0xFF;
    let mut buffer = BytesMut::from(&bytes[..]);
    assert!(read_pdu(&mut buffer, DEFAULT_MAX_PDU, true).is_err());
}
