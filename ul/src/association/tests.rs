use super::machine::{self, Event, Next, State};
use super::*;
use crate::pdu::{
    AbortRQServiceProviderReason, AbortRQSource, AssociationAC, AssociationRJ,
    AssociationRJResult, AssociationRJServiceUserReason, AssociationRJSource, AssociationRQ,
    PDataValue, PDataValueType, Pdu, PresentationContextResult, PresentationContextResultReason,
    UserVariableItem,
};
use crate::uids::{IMPLICIT_VR_LITTLE_ENDIAN, VERIFICATION};
use matches::assert_matches;

fn requestor() -> Association {
    Association::new(
        AssociationOptions::new()
            .calling_ae_title("ECHO-SCU")
            .called_ae_title("MAIN-SCP")
            .with_abstract_syntax(VERIFICATION),
    )
}

fn acceptor() -> Association {
    Association::new(
        AssociationOptions::new()
            .calling_ae_title("MAIN-SCP")
            .with_abstract_syntax(VERIFICATION),
    )
}

fn sample_rq() -> AssociationRQ {
    AssociationRQ {
        protocol_version: 1,
        called_ae_title: "MAIN-SCP".to_string(),
        calling_ae_title: "ECHO-SCU".to_string(),
        application_context_name: crate::uids::APPLICATION_CONTEXT_NAME.to_string(),
        presentation_contexts: vec![crate::pdu::PresentationContextProposed {
            id: 1,
            abstract_syntax: VERIFICATION.to_string(),
            transfer_syntaxes: vec![IMPLICIT_VR_LITTLE_ENDIAN.to_string()],
        }],
        user_variables: vec![UserVariableItem::MaxLength(16384)],
    }
}

fn sample_ac() -> AssociationAC {
    AssociationAC {
        protocol_version: 1,
        called_ae_title: "MAIN-SCP".to_string(),
        calling_ae_title: "ECHO-SCU".to_string(),
        application_context_name: crate::uids::APPLICATION_CONTEXT_NAME.to_string(),
        presentation_contexts: vec![PresentationContextResult {
            id: 1,
            reason: PresentationContextResultReason::Acceptance,
            transfer_syntax: IMPLICIT_VR_LITTLE_ENDIAN.to_string(),
        }],
        user_variables: vec![UserVariableItem::MaxLength(16384)],
    }
}

fn sample_pdv() -> PDataValue {
    PDataValue {
        presentation_context_id: 1,
        value_type: PDataValueType::Command,
        is_last: true,
        data: vec![0; 10],
    }
}

fn sent_pdus(outputs: &[Output]) -> Vec<&Pdu> {
    outputs
        .iter()
        .filter_map(|output| match output {
            Output::SendPdu(pdu) => Some(pdu),
            _ => None,
        })
        .collect()
}

fn indications(outputs: &[Output]) -> Vec<&Indication> {
    outputs
        .iter()
        .filter_map(|output| match output {
            Output::Indication(indication) => Some(indication),
            _ => None,
        })
        .collect()
}

/// Drive a requestor into data transfer (Sta6).
fn established_requestor() -> Association {
    let mut assoc = requestor();
    assoc.request_associate().unwrap();
    assoc.transport_connected().unwrap();
    assoc.pdu_received(Pdu::AssociationAC(sample_ac())).unwrap();
    assert_eq!(assoc.state(), State::Sta6);
    assoc
}

/// Drive an acceptor into data transfer (Sta6).
fn established_acceptor() -> Association {
    let mut assoc = acceptor();
    assoc.transport_accepted().unwrap();
    assoc.pdu_received(Pdu::AssociationRQ(sample_rq())).unwrap();
    let accepted = vec![PresentationContextResult {
        id: 1,
        reason: PresentationContextResultReason::Acceptance,
        transfer_syntax: IMPLICIT_VR_LITTLE_ENDIAN.to_string(),
    }];
    assoc.respond_accept(accepted).unwrap();
    assert_eq!(assoc.state(), State::Sta6);
    assoc
}

#[test]
fn requestor_walks_through_a_clean_lifecycle() {
    let mut assoc = requestor();
    assert_eq!(assoc.state(), State::Sta1);

    let outputs = assoc.request_associate().unwrap();
    assert_eq!(outputs, vec![Output::ConnectTransport]);
    assert_eq!(assoc.state(), State::Sta4);

    let outputs = assoc.transport_connected().unwrap();
    assert_eq!(assoc.state(), State::Sta5);
    let pdus = sent_pdus(&outputs);
    assert_eq!(pdus.len(), 1);
    let rq = match pdus[0] {
        Pdu::AssociationRQ(rq) => rq,
        other => panic!("expected A-ASSOCIATE-RQ, got {:?}", other),
    };
    assert_eq!(rq.called_ae_title, "MAIN-SCP");
    assert_eq!(rq.calling_ae_title, "ECHO-SCU");
    assert_eq!(
        rq.application_context_name,
        crate::uids::APPLICATION_CONTEXT_NAME
    );
    // presentation context identifiers are odd
    assert_eq!(rq.presentation_contexts.len(), 1);
    assert_eq!(rq.presentation_contexts[0].id, 1);
    assert_eq!(rq.presentation_contexts[0].abstract_syntax, VERIFICATION);
    assert_eq!(rq.presentation_contexts[0].transfer_syntaxes.len(), 3);
    // default user information: max length, class UID, version name
    assert!(rq
        .user_variables
        .contains(&UserVariableItem::MaxLength(crate::pdu::DEFAULT_MAX_PDU)));
    assert!(rq.user_variables.iter().any(|v| matches!(
        v,
        UserVariableItem::ImplementationClassUid(_)
    )));
    assert!(rq.user_variables.iter().any(|v| matches!(
        v,
        UserVariableItem::ImplementationVersionName(_)
    )));

    let outputs = assoc.pdu_received(Pdu::AssociationAC(sample_ac())).unwrap();
    assert_eq!(assoc.state(), State::Sta6);
    assert_matches!(
        indications(&outputs)[..],
        [Indication::AssociateAccepted(_)]
    );
    assert_eq!(assoc.peer_max_pdu_length(), Some(16384));
    assert_eq!(
        assoc.accepted_transfer_syntax(1),
        Some(IMPLICIT_VR_LITTLE_ENDIAN)
    );

    // a few data exchanges
    let outputs = assoc.request_p_data(vec![sample_pdv()]).unwrap();
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::PData { .. }]);
    assert_eq!(assoc.state(), State::Sta6);
    let outputs = assoc
        .pdu_received(Pdu::PData {
            data: vec![sample_pdv()],
        })
        .unwrap();
    assert_matches!(indications(&outputs)[..], [Indication::PData(_)]);

    // graceful release
    let outputs = assoc.request_release().unwrap();
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::ReleaseRQ]);
    assert_eq!(assoc.state(), State::Sta7);

    let outputs = assoc.pdu_received(Pdu::ReleaseRP).unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert_matches!(indications(&outputs)[..], [Indication::ReleaseConfirmed]);
    assert!(outputs.contains(&Output::CloseTransport));
    assert!(!assoc.artim_is_running());
}

#[test]
fn acceptor_walks_through_a_clean_lifecycle() {
    let mut assoc = acceptor();

    let outputs = assoc.transport_accepted().unwrap();
    assert_eq!(assoc.state(), State::Sta2);
    assert_eq!(assoc.role(), Role::Acceptor);
    assert!(outputs.contains(&Output::StartArtim));
    assert!(assoc.artim_is_running());

    let outputs = assoc.pdu_received(Pdu::AssociationRQ(sample_rq())).unwrap();
    assert_eq!(assoc.state(), State::Sta3);
    assert!(outputs.contains(&Output::StopArtim));
    assert_matches!(indications(&outputs)[..], [Indication::Associate(_)]);
    assert_eq!(assoc.peer_max_pdu_length(), Some(16384));

    let accepted = vec![PresentationContextResult {
        id: 1,
        reason: PresentationContextResultReason::Acceptance,
        transfer_syntax: IMPLICIT_VR_LITTLE_ENDIAN.to_string(),
    }];
    let outputs = assoc.respond_accept(accepted).unwrap();
    assert_eq!(assoc.state(), State::Sta6);
    let pdus = sent_pdus(&outputs);
    let ac = match pdus[..] {
        [Pdu::AssociationAC(ac)] => ac,
        ref other => panic!("expected A-ASSOCIATE-AC, got {:?}", other),
    };
    // the acceptor echoes the AE titles it saw on the request
    assert_eq!(ac.called_ae_title, "MAIN-SCP");
    assert_eq!(ac.calling_ae_title, "ECHO-SCU");
    assert_eq!(ac.presentation_contexts.len(), 1);

    // peer requests release
    let outputs = assoc.pdu_received(Pdu::ReleaseRQ).unwrap();
    assert_eq!(assoc.state(), State::Sta8);
    assert_matches!(indications(&outputs)[..], [Indication::Release]);

    let outputs = assoc.respond_release().unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::ReleaseRP]);
    assert!(assoc.artim_is_running());

    let outputs = assoc.transport_closed().unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert!(outputs.contains(&Output::StopArtim));
    assert!(!assoc.artim_is_running());
}

#[test]
fn p_data_requests_are_allowed_while_awaiting_release_response() {
    let mut assoc = established_acceptor();
    assoc.pdu_received(Pdu::ReleaseRQ).unwrap();
    assert_eq!(assoc.state(), State::Sta8);

    // AR-7: outstanding responses may still be flushed
    let outputs = assoc.request_p_data(vec![sample_pdv()]).unwrap();
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::PData { .. }]);
    assert_eq!(assoc.state(), State::Sta8);
}

#[test]
fn artim_expiry_in_sta2_closes_the_transport_silently() {
    let mut assoc = acceptor();
    assoc.transport_accepted().unwrap();
    assert!(assoc.artim_is_running());

    let outputs = assoc.artim_expired().unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    // no bytes are written, the transport is just dropped
    assert!(sent_pdus(&outputs).is_empty());
    assert!(outputs.contains(&Output::CloseTransport));
    assert!(!assoc.artim_is_running());
}

#[test]
fn unacceptable_request_is_rejected_with_artim_armed() {
    let mut assoc = acceptor();
    assoc.transport_accepted().unwrap();

    let mut rq = sample_rq();
    rq.presentation_contexts.clear();
    let outputs = assoc.pdu_received(Pdu::AssociationRQ(rq)).unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::AssociationRJ(_)]);
    assert!(assoc.artim_is_running());
    // no associate indication reaches the application
    assert!(indications(&outputs).is_empty());
}

#[test]
fn a_custom_policy_controls_the_rejection() {
    struct CalledMustBeKnown;
    impl AcceptancePolicy for CalledMustBeKnown {
        fn evaluate(&self, request: &AssociationRQ) -> Result<(), AssociationRJ> {
            if request.called_ae_title == "MAIN-SCP" {
                Ok(())
            } else {
                Err(AssociationRJ {
                    result: AssociationRJResult::Permanent,
                    source: AssociationRJSource::ServiceUser(
                        AssociationRJServiceUserReason::CalledAeTitleNotRecognized,
                    ),
                })
            }
        }
    }

    let mut assoc =
        Association::with_policy(AssociationOptions::new(), CalledMustBeKnown);
    assoc.transport_accepted().unwrap();
    let mut rq = sample_rq();
    rq.called_ae_title = "NOBODY".to_string();
    let outputs = assoc.pdu_received(Pdu::AssociationRQ(rq)).unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    match sent_pdus(&outputs)[..] {
        [Pdu::AssociationRJ(rj)] => {
            assert_eq!(rj.result, AssociationRJResult::Permanent);
            assert_eq!(
                rj.source,
                AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::CalledAeTitleNotRecognized
                )
            );
        }
        ref other => panic!("expected A-ASSOCIATE-RJ, got {:?}", other),
    }
}

#[test]
fn local_rejection_is_sent_to_the_peer() {
    let mut assoc = acceptor();
    assoc.transport_accepted().unwrap();
    assoc.pdu_received(Pdu::AssociationRQ(sample_rq())).unwrap();
    assert_eq!(assoc.state(), State::Sta3);

    let outputs = assoc
        .respond_reject(
            AssociationRJResult::Permanent,
            AssociationRJSource::ServiceUser(AssociationRJServiceUserReason::NoReasonGiven),
        )
        .unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::AssociationRJ(_)]);
    assert!(assoc.artim_is_running());
}

#[test]
fn requestor_side_release_collision() {
    let mut assoc = established_requestor();
    assoc.request_release().unwrap();
    assert_eq!(assoc.state(), State::Sta7);

    // the peer asked for release at the same time
    let outputs = assoc.pdu_received(Pdu::ReleaseRQ).unwrap();
    assert_eq!(assoc.state(), State::Sta9);
    assert_matches!(indications(&outputs)[..], [Indication::ReleaseCollision]);

    let outputs = assoc.respond_release().unwrap();
    assert_eq!(assoc.state(), State::Sta11);
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::ReleaseRP]);

    let outputs = assoc.pdu_received(Pdu::ReleaseRP).unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert_matches!(indications(&outputs)[..], [Indication::ReleaseConfirmed]);
    assert!(!assoc.artim_is_running());
}

#[test]
fn acceptor_side_release_collision() {
    let mut assoc = established_acceptor();
    assoc.request_release().unwrap();
    assert_eq!(assoc.state(), State::Sta7);

    let outputs = assoc.pdu_received(Pdu::ReleaseRQ).unwrap();
    assert_eq!(assoc.state(), State::Sta10);
    assert_matches!(indications(&outputs)[..], [Indication::ReleaseCollision]);

    let outputs = assoc.pdu_received(Pdu::ReleaseRP).unwrap();
    assert_eq!(assoc.state(), State::Sta12);
    assert_matches!(indications(&outputs)[..], [Indication::ReleaseConfirmed]);

    let outputs = assoc.respond_release().unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    assert_matches!(sent_pdus(&outputs)[..], [Pdu::ReleaseRP]);
    assert!(assoc.artim_is_running());

    assoc.transport_closed().unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert!(!assoc.artim_is_running());
}

#[test]
fn peer_abort_surfaces_the_abort_indication() {
    let mut assoc = established_requestor();
    let outputs = assoc
        .pdu_received(Pdu::AbortRQ {
            source: AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::UnexpectedPdu),
        })
        .unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert_matches!(
        indications(&outputs)[..],
        [Indication::Abort {
            source: 2,
            reason: 2
        }]
    );
    assert!(outputs.contains(&Output::CloseTransport));
}

#[test]
fn service_user_abort_is_not_echoed() {
    let mut assoc = established_requestor();
    let outputs = assoc
        .pdu_received(Pdu::AbortRQ {
            source: AbortRQSource::ServiceUser,
        })
        .unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert_matches!(
        indications(&outputs)[..],
        [Indication::Abort {
            source: 0,
            reason: 0
        }]
    );
    assert!(sent_pdus(&outputs).is_empty());
    assert!(outputs.contains(&Output::CloseTransport));
}

#[test]
fn local_abort_sends_the_abort_pdu_and_arms_artim() {
    let mut assoc = established_requestor();
    let outputs = assoc
        .request_abort(AbortRQSource::ServiceProvider(
            AbortRQServiceProviderReason::InvalidPduParameter,
        ))
        .unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    match sent_pdus(&outputs)[..] {
        [Pdu::AbortRQ { source }] => assert_eq!(source.codes(), (2, 6)),
        ref other => panic!("expected A-ABORT, got {:?}", other),
    }
    assert!(assoc.artim_is_running());
}

#[test]
fn transport_loss_mid_association_is_a_provider_abort() {
    let mut assoc = established_requestor();
    let outputs = assoc.transport_closed().unwrap();
    assert_eq!(assoc.state(), State::Sta1);
    assert_matches!(
        indications(&outputs)[..],
        [Indication::Abort {
            source: 2,
            reason: 0
        }]
    );
    // the connection is already gone, nothing is written
    assert!(sent_pdus(&outputs).is_empty());
}

#[test]
fn unexpected_pdu_mid_association_aborts_with_artim() {
    let mut assoc = established_requestor();
    // an A-ASSOCIATE-AC is illegal in Sta6: AA-8
    let outputs = assoc.pdu_received(Pdu::AssociationAC(sample_ac())).unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    match sent_pdus(&outputs)[..] {
        [Pdu::AbortRQ { source }] => assert_eq!(source.codes(), (2, 0)),
        ref other => panic!("expected A-ABORT, got {:?}", other),
    }
    assert_matches!(
        indications(&outputs)[..],
        [Indication::Abort {
            source: 2,
            reason: 0
        }]
    );
    assert!(assoc.artim_is_running());
}

#[test]
fn unknown_pdu_type_is_the_unrecognized_pdu_event() {
    let mut assoc = acceptor();
    assoc.transport_accepted().unwrap();
    let outputs = assoc
        .pdu_received(Pdu::Unknown {
            pdu_type: 0xAA,
            data: vec![],
        })
        .unwrap();
    assert_eq!(assoc.state(), State::Sta13);
    // AA-1 with unrecognized-PDU reason
    match sent_pdus(&outputs)[..] {
        [Pdu::AbortRQ { source }] => assert_eq!(source.codes(), (2, 1)),
        ref other => panic!("expected A-ABORT, got {:?}", other),
    }
}

/// Inject one canned event of the given class.
fn inject(assoc: &mut Association, event: Event) -> Result<Vec<Output>> {
    match event {
        Event::AssociateRequest => assoc.request_associate(),
        Event::TransportConnectConfirm => assoc.transport_connected(),
        Event::AssociateAcReceived => assoc.pdu_received(Pdu::AssociationAC(sample_ac())),
        Event::AssociateRjReceived => assoc.pdu_received(Pdu::AssociationRJ(AssociationRJ {
            result: AssociationRJResult::Transient,
            source: AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::NoReasonGiven,
            ),
        })),
        Event::TransportConnectIndication => assoc.transport_accepted(),
        Event::AssociateRqReceived => assoc.pdu_received(Pdu::AssociationRQ(sample_rq())),
        Event::AssociateResponseAccept => assoc.respond_accept(vec![]),
        Event::AssociateResponseReject => assoc.respond_reject(
            AssociationRJResult::Transient,
            AssociationRJSource::ServiceUser(AssociationRJServiceUserReason::NoReasonGiven),
        ),
        Event::PDataRequest => assoc.request_p_data(vec![sample_pdv()]),
        Event::PDataTfReceived => assoc.pdu_received(Pdu::PData {
            data: vec![sample_pdv()],
        }),
        Event::ReleaseRequest => assoc.request_release(),
        Event::ReleaseRqReceived => assoc.pdu_received(Pdu::ReleaseRQ),
        Event::ReleaseRpReceived => assoc.pdu_received(Pdu::ReleaseRP),
        Event::ReleaseResponse => assoc.respond_release(),
        Event::AbortRequest => assoc.request_abort(AbortRQSource::ServiceUser),
        Event::AbortReceived => assoc.pdu_received(Pdu::AbortRQ {
            source: AbortRQSource::ServiceUser,
        }),
        Event::TransportClosed => assoc.transport_closed(),
        Event::ArtimExpired => assoc.artim_expired(),
        Event::InvalidPduReceived => assoc.unrecognized_or_invalid_pdu_received(),
    }
}

const ALL_STATES: [State; 13] = [
    State::Sta1,
    State::Sta2,
    State::Sta3,
    State::Sta4,
    State::Sta5,
    State::Sta6,
    State::Sta7,
    State::Sta8,
    State::Sta9,
    State::Sta10,
    State::Sta11,
    State::Sta12,
    State::Sta13,
];

/// Every cell of the transition table moves to exactly its next state;
/// every blank cell raises a fault and leaves the state untouched.
#[test]
fn the_whole_transition_table_is_honored() {
    for event in Event::ALL {
        for state in ALL_STATES {
            let mut assoc = requestor();
            assoc.force_state(state);
            assoc.force_role(Role::Requestor);

            match machine::lookup(event, state) {
                None => {
                    let err = inject(&mut assoc, event)
                        .expect_err("undefined cell must raise a fault");
                    assert_matches!(err, Error::InvalidState { .. });
                    assert_eq!(assoc.state(), state, "fault must not move the state");
                }
                Some((_, next)) => {
                    inject(&mut assoc, event).unwrap_or_else(|e| {
                        panic!("cell ({:?}, {}) must be accepted: {}", event, state, e)
                    });
                    let expected = match next {
                        Next::To(state) => state,
                        // the canned request proposes one context
                        // and the default policy accepts it
                        Next::OnAcceptance => State::Sta3,
                        // the role was forced to requestor
                        Next::OnRole => State::Sta9,
                    };
                    assert_eq!(
                        assoc.state(),
                        expected,
                        "cell ({:?}, {}) must move to {}",
                        event,
                        state,
                        expected
                    );
                }
            }
        }
    }
}

#[test]
fn release_collision_cell_follows_the_role() {
    let mut assoc = requestor();
    assoc.force_state(State::Sta7);
    assoc.force_role(Role::Acceptor);
    assoc.pdu_received(Pdu::ReleaseRQ).unwrap();
    assert_eq!(assoc.state(), State::Sta10);
}
