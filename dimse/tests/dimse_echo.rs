//! A full verification (C-ECHO) exchange between two services
//! wired back-to-back through their byte streams.

use ferrodicom_dimse::messages::{CEchoRq, CEchoRsp};
use ferrodicom_dimse::service::{DimseService, RawDataSetCodec, ServiceEvent, ServiceOutput};
use ferrodicom_dimse::Dimse;
use ferrodicom_ul::association::AssociationOptions;
use ferrodicom_ul::pdu::{write_pdu, PDataValue, PDataValueType, Pdu};
use ferrodicom_ul::uids::{IMPLICIT_VR_LITTLE_ENDIAN, VERIFICATION};

type Service = DimseService<RawDataSetCodec>;

fn echo_scu() -> Service {
    DimseService::new(
        AssociationOptions::new()
            .calling_ae_title("ECHO-SCU")
            .called_ae_title("ECHO-SCP")
            .with_abstract_syntax(VERIFICATION)
            .clear_transfer_syntaxes()
            .with_transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN),
        RawDataSetCodec,
    )
}

fn echo_scp() -> Service {
    DimseService::new(
        AssociationOptions::new()
            .calling_ae_title("ECHO-SCP")
            .with_abstract_syntax(VERIFICATION),
        RawDataSetCodec,
    )
}

/// Ship every PDU among `outputs` to `peer` as raw transport bytes.
fn deliver(
    outputs: &[ServiceOutput<Vec<u8>>],
    peer: &mut Service,
) -> Vec<ServiceOutput<Vec<u8>>> {
    let mut incoming = Vec::new();
    for output in outputs {
        if let ServiceOutput::SendPdu(pdu) = output {
            write_pdu(&mut incoming, pdu).unwrap();
        }
    }
    peer.handle_incoming_bytes(&incoming).unwrap()
}

fn events(outputs: &[ServiceOutput<Vec<u8>>]) -> Vec<&ServiceEvent<Vec<u8>>> {
    outputs
        .iter()
        .filter_map(|output| match output {
            ServiceOutput::Event(event) => Some(event),
            _ => None,
        })
        .collect()
}

/// Drive both services into data transfer and hand them back.
fn establish(mut scu: Service, mut scp: Service) -> (Service, Service) {
    scu.request_associate().unwrap();
    scp.transport_accepted().unwrap();
    let outputs = scu.transport_connected().unwrap();
    let outputs = deliver(&outputs, &mut scp);
    assert!(matches!(
        events(&outputs)[..],
        [ServiceEvent::AssociateRequested(_)]
    ));
    let outputs = scp.respond_accept().unwrap();
    let outputs = deliver(&outputs, &mut scu);
    assert!(matches!(
        events(&outputs)[..],
        [ServiceEvent::AssociateAccepted(_)]
    ));
    assert_eq!(scu.association().state().number(), 6);
    assert_eq!(scp.association().state().number(), 6);
    (scu, scp)
}

#[test]
fn c_echo_round_trip() {
    let (mut scu, mut scp) = establish(echo_scu(), echo_scp());

    // C-ECHO-RQ travels to the provider
    let outputs = scu
        .send_dimse(1, &Dimse::CEchoRq(CEchoRq { message_id: 7 }), None)
        .unwrap();
    let outputs = deliver(&outputs, &mut scp);
    match events(&outputs)[..] {
        [ServiceEvent::Dimse {
            presentation_context_id: 1,
            message: Dimse::CEchoRq(rq),
            data_set: None,
        }] => assert_eq!(rq.message_id, 7),
        ref other => panic!("expected a C-ECHO-RQ, got {:?}", other),
    }

    // and the response comes back
    let outputs = scp
        .send_dimse(
            1,
            &Dimse::CEchoRsp(CEchoRsp {
                message_id_being_responded_to: 7,
                status: 0,
            }),
            None,
        )
        .unwrap();
    let outputs = deliver(&outputs, &mut scu);
    match events(&outputs)[..] {
        [ServiceEvent::Dimse {
            presentation_context_id: 1,
            message: Dimse::CEchoRsp(rsp),
            data_set: None,
        }] => {
            assert_eq!(rsp.message_id_being_responded_to, 7);
            assert_eq!(rsp.status, 0);
        }
        ref other => panic!("expected a C-ECHO-RSP, got {:?}", other),
    }

    // graceful release
    let outputs = scu.request_release().unwrap();
    let outputs = deliver(&outputs, &mut scp);
    assert!(matches!(
        events(&outputs)[..],
        [ServiceEvent::ReleaseRequested]
    ));
    let outputs = scp.respond_release().unwrap();
    let outputs = deliver(&outputs, &mut scu);
    assert!(matches!(
        events(&outputs)[..],
        [ServiceEvent::ReleaseConfirmed]
    ));
    scp.transport_closed().unwrap();

    assert_eq!(scu.association().state().number(), 1);
    assert_eq!(scp.association().state().number(), 1);
}

#[test]
fn unsupported_abstract_syntax_is_refused_at_the_dimse_layer() {
    // the provider supports no abstract syntax at all
    let scp = DimseService::new(
        AssociationOptions::new().calling_ae_title("EMPTY-SCP"),
        RawDataSetCodec,
    );
    let (mut scu, mut scp) = establish(echo_scu(), scp);

    // the association stands, but the context was refused (reason 3)
    let accepted = scu.association().accepted_presentation_contexts();
    assert_eq!(accepted.len(), 1);
    assert!(!accepted[0].is_accepted());

    // the user layer refuses to send on the refused context
    assert!(scu
        .send_dimse(1, &Dimse::CEchoRq(CEchoRq { message_id: 1 }), None)
        .is_err());

    // a misbehaving peer pushing P-DATA anyway is answered
    // with an invalid-PDU-parameter abort
    let rogue = Pdu::PData {
        data: vec![PDataValue {
            presentation_context_id: 1,
            value_type: PDataValueType::Command,
            is_last: true,
            data: vec![0; 8],
        }],
    };
    let outputs = scp.handle_pdu(rogue).unwrap();
    let aborted = outputs.iter().any(|output| match output {
        ServiceOutput::SendPdu(Pdu::AbortRQ { source }) => source.codes() == (2, 6),
        _ => false,
    });
    assert!(aborted, "expected A-ABORT with reason 6, got {:?}", outputs);
    assert_eq!(scp.association().state().number(), 13);
}

#[test]
fn a_data_set_on_a_message_that_forbids_one_is_refused() {
    let (mut scu, _scp) = establish(echo_scu(), echo_scp());
    let data = vec![0u8; 16];
    assert!(scu
        .send_dimse(1, &Dimse::CEchoRq(CEchoRq { message_id: 2 }), Some(&data))
        .is_err());
}
