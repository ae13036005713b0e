//! DICOM association module.
//!
//! An [`Association`] owns the per-connection protocol state
//! and drives the upper layer state machine ([`machine`])
//! in response to injected events:
//! service primitives from the local user,
//! PDUs from the peer,
//! transport notifications
//! and ARTIM timer expiry.
//!
//! The association performs no I/O of its own.
//! Every injector returns the sequence of [`Output`] values
//! that the surrounding event loop must carry out, in order:
//! transport writes (one atomic write per [`Output::SendPdu`]),
//! transport teardown, timer arming
//! and indications for the application layer.
//! State is updated before the outputs are handed over,
//! so a half-performed output sequence never leaves
//! the machine behind its own transcript.

use std::borrow::Cow;
use std::time::Duration;

use snafu::{Backtrace, OptionExt, Snafu};
use tracing::debug;

use crate::pdu::{
    AbortRQServiceProviderReason, AbortRQSource, AssociationAC, AssociationRJ,
    AssociationRJResult, AssociationRJServiceUserReason, AssociationRJServiceProviderAsceReason,
    AssociationRJSource, AssociationRQ, PDataValue, Pdu, PresentationContextProposed,
    PresentationContextResult, UserVariableItem, DEFAULT_MAX_PDU,
};
use crate::uids;
use crate::{IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME};

pub mod machine;

use machine::{Action, Event, Next, State};

#[cfg(test)]
mod tests;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("event {:?} is not permitted in state {}", event, state))]
    InvalidState {
        event: Event,
        state: State,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The role of the local node in an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// this node requested the association
    Requestor,
    /// this node accepted the transport connection
    Acceptor,
}

/// A side effect requested by the state machine,
/// to be carried out by the surrounding event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// open a transport connection to the peer,
    /// reporting completion through
    /// [`transport_connected`](Association::transport_connected)
    ConnectTransport,
    /// write the whole encoded PDU to the transport in a single write
    SendPdu(Pdu),
    /// close the transport connection
    CloseTransport,
    /// start the ARTIM timer, cancelling a running one first;
    /// expiry is reported through
    /// [`artim_expired`](Association::artim_expired)
    StartArtim,
    /// cancel the ARTIM timer
    StopArtim,
    /// surface an indication to the application layer
    Indication(Indication),
}

/// An indication surfaced to the application layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Indication {
    /// a transport connection from a peer was accepted
    /// and an A-ASSOCIATE-RQ is awaited
    TransportAccepted,
    /// an acceptable association request arrived;
    /// the application decides with
    /// [`respond_accept`](Association::respond_accept) or
    /// [`respond_reject`](Association::respond_reject)
    Associate(AssociationRQ),
    /// the peer accepted our association request
    AssociateAccepted(AssociationAC),
    /// the peer rejected our association request
    AssociateRejected(AssociationRJ),
    /// presentation data arrived
    PData(Vec<PDataValue>),
    /// the peer requests release;
    /// the application answers with
    /// [`respond_release`](Association::respond_release)
    Release,
    /// both sides requested release simultaneously;
    /// the application answers with
    /// [`respond_release`](Association::respond_release)
    ReleaseCollision,
    /// the release handshake completed
    ReleaseConfirmed,
    /// the association was aborted;
    /// `source` and `reason` carry the A-ABORT byte codes,
    /// with provider-sourced values also standing in
    /// for transport-level A-P-ABORTs
    Abort { source: u8, reason: u8 },
}

/// The decision procedure applied to incoming association requests
/// when this node is the acceptor (action AE-6).
///
/// Returning `Err` makes the state machine
/// answer with the given A-ASSOCIATE-RJ
/// without consulting the application.
/// Returning `Ok(())` surfaces an [`Indication::Associate`]
/// so that the application can negotiate and respond.
pub trait AcceptancePolicy {
    fn evaluate(&self, request: &AssociationRQ) -> std::result::Result<(), AssociationRJ>;
}

/// The default acceptance policy:
/// any request proposing at least one presentation context is acceptable.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAny;

impl AcceptancePolicy for AcceptAny {
    fn evaluate(&self, request: &AssociationRQ) -> std::result::Result<(), AssociationRJ> {
        if request.presentation_contexts.is_empty() {
            Err(AssociationRJ {
                result: AssociationRJResult::Transient,
                source: AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::NoReasonGiven,
                ),
            })
        } else {
            Ok(())
        }
    }
}

/// Configuration for an [`Association`].
///
/// # Example
///
/// ```
/// # use ferrodicom_ul::association::AssociationOptions;
/// let options = AssociationOptions::new()
///     .calling_ae_title("THIS-SCU")
///     .called_ae_title("MAIN-STORAGE")
///     .with_abstract_syntax("1.2.840.10008.1.1");
/// ```
#[derive(Debug, Clone)]
pub struct AssociationOptions {
    /// the AE title of this node
    calling_ae_title: Cow<'static, str>,
    /// the AE title of the peer node
    called_ae_title: Cow<'static, str>,
    /// the application context name to propose
    application_context_name: Cow<'static, str>,
    /// the abstract syntaxes to propose, one presentation context each
    abstract_syntaxes: Vec<Cow<'static, str>>,
    /// the transfer syntaxes proposed with (and accepted for)
    /// every presentation context
    transfer_syntaxes: Vec<Cow<'static, str>>,
    /// the maximum PDU length this node is willing to receive
    max_pdu_length: u32,
    /// how long the ARTIM timer runs before expiring the association
    artim_timeout: Duration,
    /// whether to reject incoming PDUs larger than `max_pdu_length`
    strict: bool,
}

impl Default for AssociationOptions {
    fn default() -> Self {
        AssociationOptions {
            calling_ae_title: "THIS-AE".into(),
            called_ae_title: "ANY-SCP".into(),
            application_context_name: uids::APPLICATION_CONTEXT_NAME.into(),
            abstract_syntaxes: vec![],
            transfer_syntaxes: vec![
                uids::IMPLICIT_VR_LITTLE_ENDIAN.into(),
                uids::EXPLICIT_VR_LITTLE_ENDIAN.into(),
                uids::EXPLICIT_VR_BIG_ENDIAN.into(),
            ],
            max_pdu_length: DEFAULT_MAX_PDU,
            artim_timeout: Duration::from_secs(10),
            strict: true,
        }
    }
}

impl AssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the calling application entity title.
    pub fn calling_ae_title<T>(mut self, calling_ae_title: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.calling_ae_title = calling_ae_title.into();
        self
    }

    /// Override the called application entity title.
    pub fn called_ae_title<T>(mut self, called_ae_title: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.called_ae_title = called_ae_title.into();
        self
    }

    /// Add an abstract syntax to propose (as requestor)
    /// or to admit (as acceptor).
    pub fn with_abstract_syntax<T>(mut self, abstract_syntax: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.abstract_syntaxes.push(abstract_syntax.into());
        self
    }

    /// Replace the default transfer syntax list.
    pub fn clear_transfer_syntaxes(mut self) -> Self {
        self.transfer_syntaxes.clear();
        self
    }

    /// Add a transfer syntax to propose or admit.
    pub fn with_transfer_syntax<T>(mut self, transfer_syntax: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.transfer_syntaxes.push(transfer_syntax.into());
        self
    }

    /// Override the maximum PDU length advertised to the peer.
    pub fn max_pdu_length(mut self, value: u32) -> Self {
        self.max_pdu_length = value;
        self
    }

    /// Override the ARTIM timeout (default 10 seconds).
    pub fn artim_timeout(mut self, timeout: Duration) -> Self {
        self.artim_timeout = timeout;
        self
    }

    /// Override strict mode:
    /// whether to refuse PDUs larger than the advertised maximum.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The abstract syntaxes configured for this node.
    pub fn abstract_syntaxes(&self) -> &[Cow<'static, str>] {
        &self.abstract_syntaxes
    }

    /// The transfer syntaxes configured for this node.
    pub fn transfer_syntaxes(&self) -> &[Cow<'static, str>] {
        &self.transfer_syntaxes
    }

    /// The maximum PDU length this node advertises.
    pub fn max_pdu_length_value(&self) -> u32 {
        self.max_pdu_length
    }

    /// Whether oversized incoming PDUs are refused.
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Data carried by the event being injected,
/// consumed by the action it triggers.
enum EventInput {
    None,
    Rq(AssociationRQ),
    Ac(AssociationAC),
    Rj(AssociationRJ),
    Data(Vec<PDataValue>),
    Abort(AbortRQSource),
}

/// The state of one DICOM association over one transport connection.
///
/// Created in [`Sta1`](State::Sta1);
/// returns there when the connection is finally closed.
#[derive(Debug)]
pub struct Association<P = AcceptAny> {
    options: AssociationOptions,
    policy: P,
    role: Role,
    state: State,
    artim_running: bool,
    /// the presentation contexts proposed on this association
    /// (ours as requestor, the peer's as acceptor)
    requested_presentation_contexts: Vec<PresentationContextProposed>,
    /// the presentation context results settled for this association
    accepted_presentation_contexts: Vec<PresentationContextResult>,
    /// the user information sub-items settled for this association
    accepted_user_variables: Vec<UserVariableItem>,
    /// the maximum PDU length advertised by the peer, `None` for no limit
    peer_max_pdu_length: Option<u32>,
    /// effective AE titles (renegotiated from the RQ on the acceptor side)
    called_ae_title: String,
    calling_ae_title: String,
    application_context_name: String,
    /// the rejection to emit from AE-6 or AE-8
    reject: Option<AssociationRJ>,
}

impl Association<AcceptAny> {
    /// Create an idle association with the default acceptance policy.
    pub fn new(options: AssociationOptions) -> Self {
        Association::with_policy(options, AcceptAny)
    }
}

impl<P> Association<P>
where
    P: AcceptancePolicy,
{
    /// Create an idle association with the given acceptance policy.
    pub fn with_policy(options: AssociationOptions, policy: P) -> Self {
        let called_ae_title = options.called_ae_title.to_string();
        let calling_ae_title = options.calling_ae_title.to_string();
        let application_context_name = options.application_context_name.to_string();
        Association {
            options,
            policy,
            role: Role::Requestor,
            state: State::Sta1,
            artim_running: false,
            requested_presentation_contexts: vec![],
            accepted_presentation_contexts: vec![],
            accepted_user_variables: vec![],
            peer_max_pdu_length: None,
            called_ae_title,
            calling_ae_title,
            application_context_name,
            reject: None,
        }
    }

    /// The current state of the association state machine.
    pub fn state(&self) -> State {
        self.state
    }

    /// The role of this node on the association.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the ARTIM timer is currently expected to be running.
    pub fn artim_is_running(&self) -> bool {
        self.artim_running
    }

    /// The configured ARTIM timeout.
    pub fn artim_timeout(&self) -> Duration {
        self.options.artim_timeout
    }

    /// The configuration of this association.
    pub fn options(&self) -> &AssociationOptions {
        &self.options
    }

    /// The presentation contexts proposed on this association.
    pub fn requested_presentation_contexts(&self) -> &[PresentationContextProposed] {
        &self.requested_presentation_contexts
    }

    /// The presentation context results settled on this association.
    pub fn accepted_presentation_contexts(&self) -> &[PresentationContextResult] {
        &self.accepted_presentation_contexts
    }

    /// The user information sub-items settled on this association.
    pub fn accepted_user_variables(&self) -> &[UserVariableItem] {
        &self.accepted_user_variables
    }

    /// The maximum PDU length advertised by the peer,
    /// `None` meaning no limit.
    pub fn peer_max_pdu_length(&self) -> Option<u32> {
        self.peer_max_pdu_length
    }

    /// The transfer syntax accepted for the given presentation context,
    /// if the context was accepted at all.
    pub fn accepted_transfer_syntax(&self, presentation_context_id: u8) -> Option<&str> {
        self.accepted_presentation_contexts
            .iter()
            .find(|pc| pc.id == presentation_context_id && pc.is_accepted())
            .map(|pc| pc.transfer_syntax.as_str())
    }

    // --- event injectors ---

    /// A-ASSOCIATE request primitive:
    /// start establishing an association as the requestor.
    pub fn request_associate(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::AssociateRequest)?;
        self.role = Role::Requestor;
        self.perform(action, EventInput::None)
    }

    /// The transport connection requested by AE-1 completed.
    pub fn transport_connected(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::TransportConnectConfirm)?;
        self.perform(action, EventInput::None)
    }

    /// A transport connection from a peer was accepted.
    pub fn transport_accepted(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::TransportConnectIndication)?;
        self.role = Role::Acceptor;
        self.perform(action, EventInput::None)
    }

    /// A PDU arrived from the peer.
    pub fn pdu_received(&mut self, pdu: Pdu) -> Result<Vec<Output>> {
        debug!("received {}", pdu.short_description());
        match pdu {
            Pdu::AssociationRQ(rq) => self.a_associate_rq_received(rq),
            Pdu::AssociationAC(ac) => {
                let action = self.transition(Event::AssociateAcReceived)?;
                self.perform(action, EventInput::Ac(ac))
            }
            Pdu::AssociationRJ(rj) => {
                let action = self.transition(Event::AssociateRjReceived)?;
                self.perform(action, EventInput::Rj(rj))
            }
            Pdu::PData { data } => {
                let action = self.transition(Event::PDataTfReceived)?;
                self.perform(action, EventInput::Data(data))
            }
            Pdu::ReleaseRQ => {
                let action = self.transition(Event::ReleaseRqReceived)?;
                self.perform(action, EventInput::None)
            }
            Pdu::ReleaseRP => {
                let action = self.transition(Event::ReleaseRpReceived)?;
                self.perform(action, EventInput::None)
            }
            Pdu::AbortRQ { source } => {
                let action = self.transition(Event::AbortReceived)?;
                self.perform(action, EventInput::Abort(source))
            }
            Pdu::Unknown { pdu_type, .. } => {
                debug!("unrecognized PDU type {:#04x}", pdu_type);
                self.unrecognized_or_invalid_pdu_received()
            }
        }
    }

    /// The byte stream from the peer
    /// could not be decoded into a PDU.
    pub fn unrecognized_or_invalid_pdu_received(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::InvalidPduReceived)?;
        let source = AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::UnrecognizedPdu);
        self.perform(action, EventInput::Abort(source))
    }

    /// A-ASSOCIATE response primitive (accept):
    /// answer a pending [`Indication::Associate`]
    /// with the given presentation context results.
    pub fn respond_accept(
        &mut self,
        accepted: Vec<PresentationContextResult>,
    ) -> Result<Vec<Output>> {
        let action = self.transition(Event::AssociateResponseAccept)?;
        self.accepted_presentation_contexts = accepted;
        self.accepted_user_variables = self.default_user_variables();
        self.perform(action, EventInput::None)
    }

    /// A-ASSOCIATE response primitive (reject):
    /// answer a pending [`Indication::Associate`] with a rejection.
    pub fn respond_reject(
        &mut self,
        result: AssociationRJResult,
        source: AssociationRJSource,
    ) -> Result<Vec<Output>> {
        let action = self.transition(Event::AssociateResponseReject)?;
        self.reject = Some(AssociationRJ { result, source });
        self.perform(action, EventInput::None)
    }

    /// P-DATA request primitive: send presentation data values to the peer.
    pub fn request_p_data(&mut self, values: Vec<PDataValue>) -> Result<Vec<Output>> {
        let action = self.transition(Event::PDataRequest)?;
        self.perform(action, EventInput::Data(values))
    }

    /// A-RELEASE request primitive: begin the graceful release handshake.
    pub fn request_release(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::ReleaseRequest)?;
        self.perform(action, EventInput::None)
    }

    /// A-RELEASE response primitive:
    /// answer a pending [`Indication::Release`]
    /// or [`Indication::ReleaseCollision`].
    pub fn respond_release(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::ReleaseResponse)?;
        self.perform(action, EventInput::None)
    }

    /// A-ABORT request primitive: tear the association down.
    pub fn request_abort(&mut self, source: AbortRQSource) -> Result<Vec<Output>> {
        let action = self.transition(Event::AbortRequest)?;
        self.perform(action, EventInput::Abort(source))
    }

    /// The transport connection was closed.
    pub fn transport_closed(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::TransportClosed)?;
        self.perform(action, EventInput::None)
    }

    /// The ARTIM timer expired.
    ///
    /// Only valid in [`Sta2`](State::Sta2) and [`Sta13`](State::Sta13);
    /// anywhere else the expiry is a scheduling fault of the caller,
    /// since every transition out of those states cancels the timer.
    pub fn artim_expired(&mut self) -> Result<Vec<Output>> {
        let action = self.transition(Event::ArtimExpired)?;
        self.artim_running = false;
        self.perform(action, EventInput::None)
    }

    // --- the engine ---

    fn a_associate_rq_received(&mut self, rq: AssociationRQ) -> Result<Vec<Output>> {
        // AE-6 needs the acceptability verdict to resolve its next state,
        // so evaluate before transitioning.
        if let Some((_, Next::OnAcceptance)) =
            machine::lookup(Event::AssociateRqReceived, self.state)
        {
            self.role = Role::Acceptor;
            self.reject = self.policy.evaluate(&rq).err();
        }
        let action = self.transition(Event::AssociateRqReceived)?;
        self.perform(action, EventInput::Rq(rq))
    }

    /// Look up the transition for `event` in the current state,
    /// move to the next state and hand back the action to perform.
    fn transition(&mut self, event: Event) -> Result<Action> {
        let (action, next) = machine::lookup(event, self.state).context(InvalidStateSnafu {
            event,
            state: self.state,
        })?;
        let next = match next {
            Next::To(state) => state,
            Next::OnAcceptance => {
                if self.reject.is_none() {
                    State::Sta3
                } else {
                    State::Sta13
                }
            }
            Next::OnRole => match self.role {
                Role::Requestor => State::Sta9,
                Role::Acceptor => State::Sta10,
            },
        };
        debug!("{:?}: {} -> {} ({:?})", event, self.state, next, action);
        self.state = next;
        Ok(action)
    }

    /// Carry out one action of PS3.8, Tables 9-7 through 9-9.
    fn perform(&mut self, action: Action, input: EventInput) -> Result<Vec<Output>> {
        let mut out = Vec::new();
        match action {
            Action::Ae1 => {
                out.push(Output::ConnectTransport);
            }
            Action::Ae2 => {
                let rq = self.build_association_rq();
                self.requested_presentation_contexts = rq.presentation_contexts.clone();
                self.send(rq.into(), &mut out);
            }
            Action::Ae3 => {
                if let EventInput::Ac(ac) = input {
                    self.accepted_presentation_contexts = ac.presentation_contexts.clone();
                    self.accepted_user_variables = ac.user_variables.clone();
                    self.peer_max_pdu_length = max_length_of(&ac.user_variables);
                    self.indicate(Indication::AssociateAccepted(ac), &mut out);
                }
            }
            Action::Ae4 => {
                if let EventInput::Rj(rj) = input {
                    self.indicate(Indication::AssociateRejected(rj), &mut out);
                }
                out.push(Output::CloseTransport);
            }
            Action::Ae5 => {
                self.start_artim(&mut out);
                self.indicate(Indication::TransportAccepted, &mut out);
            }
            Action::Ae6 => {
                self.stop_artim(&mut out);
                if self.state == State::Sta3 {
                    if let EventInput::Rq(rq) = input {
                        self.requested_presentation_contexts = rq.presentation_contexts.clone();
                        self.peer_max_pdu_length = max_length_of(&rq.user_variables);
                        self.called_ae_title = rq.called_ae_title.clone();
                        self.calling_ae_title = rq.calling_ae_title.clone();
                        self.application_context_name = rq.application_context_name.clone();
                        self.indicate(Indication::Associate(rq), &mut out);
                    }
                } else {
                    let rj = self.reject_decision();
                    self.send(rj.into(), &mut out);
                    self.start_artim(&mut out);
                }
            }
            Action::Ae7 => {
                let ac = self.build_association_ac();
                self.send(ac.into(), &mut out);
            }
            Action::Ae8 => {
                let rj = self.reject_decision();
                self.send(rj.into(), &mut out);
                self.start_artim(&mut out);
            }
            Action::Dt1 | Action::Ar7 => {
                if let EventInput::Data(data) = input {
                    self.send(Pdu::PData { data }, &mut out);
                }
            }
            Action::Dt2 | Action::Ar6 => {
                if let EventInput::Data(data) = input {
                    self.indicate(Indication::PData(data), &mut out);
                }
            }
            Action::Ar1 => {
                self.send(Pdu::ReleaseRQ, &mut out);
            }
            Action::Ar2 => {
                self.indicate(Indication::Release, &mut out);
            }
            Action::Ar3 => {
                self.indicate(Indication::ReleaseConfirmed, &mut out);
                out.push(Output::CloseTransport);
            }
            Action::Ar4 => {
                self.send(Pdu::ReleaseRP, &mut out);
                self.start_artim(&mut out);
            }
            Action::Ar5 => {
                self.stop_artim(&mut out);
            }
            Action::Ar8 => {
                self.indicate(Indication::ReleaseCollision, &mut out);
            }
            Action::Ar9 => {
                self.send(Pdu::ReleaseRP, &mut out);
            }
            Action::Ar10 => {
                self.indicate(Indication::ReleaseConfirmed, &mut out);
            }
            Action::Aa1 => {
                let source = match input {
                    EventInput::Abort(source) => source,
                    _ => AbortRQSource::ServiceProvider(
                        AbortRQServiceProviderReason::UnexpectedPdu,
                    ),
                };
                self.send(Pdu::AbortRQ { source }, &mut out);
                self.start_artim(&mut out);
            }
            Action::Aa2 => {
                self.stop_artim(&mut out);
                out.push(Output::CloseTransport);
            }
            Action::Aa3 => {
                if let EventInput::Abort(source) = input {
                    let (source_code, reason) = source.codes();
                    self.indicate(
                        Indication::Abort {
                            source: source_code,
                            reason,
                        },
                        &mut out,
                    );
                    // a service-provider abort is echoed back before closing
                    if source_code != 0 {
                        self.send(Pdu::AbortRQ { source }, &mut out);
                    }
                }
                out.push(Output::CloseTransport);
            }
            Action::Aa4 => {
                self.indicate(Indication::Abort { source: 2, reason: 0 }, &mut out);
            }
            Action::Aa5 => {
                self.stop_artim(&mut out);
            }
            Action::Aa6 => {}
            Action::Aa7 => {
                self.send(
                    Pdu::AbortRQ {
                        source: AbortRQSource::ServiceUser,
                    },
                    &mut out,
                );
            }
            Action::Aa8 => {
                self.send(
                    Pdu::AbortRQ {
                        source: AbortRQSource::ServiceProvider(
                            AbortRQServiceProviderReason::ReasonNotSpecified,
                        ),
                    },
                    &mut out,
                );
                self.indicate(Indication::Abort { source: 2, reason: 0 }, &mut out);
                self.start_artim(&mut out);
            }
        }
        Ok(out)
    }

    // --- side effect helpers ---

    fn send(&self, pdu: Pdu, out: &mut Vec<Output>) {
        debug!("sending {}", pdu.short_description());
        out.push(Output::SendPdu(pdu));
    }

    fn indicate(&self, indication: Indication, out: &mut Vec<Output>) {
        out.push(Output::Indication(indication));
    }

    fn start_artim(&mut self, out: &mut Vec<Output>) {
        self.artim_running = true;
        out.push(Output::StartArtim);
    }

    fn stop_artim(&mut self, out: &mut Vec<Output>) {
        // cancelling a timer that is not running is a no-op
        if self.artim_running {
            self.artim_running = false;
            out.push(Output::StopArtim);
        }
    }

    // --- PDU construction ---

    fn default_user_variables(&self) -> Vec<UserVariableItem> {
        vec![
            UserVariableItem::MaxLength(self.options.max_pdu_length),
            UserVariableItem::ImplementationClassUid(IMPLEMENTATION_CLASS_UID.to_string()),
            UserVariableItem::ImplementationVersionName(IMPLEMENTATION_VERSION_NAME.to_string()),
        ]
    }

    fn build_association_rq(&self) -> AssociationRQ {
        let presentation_contexts = self
            .options
            .abstract_syntaxes
            .iter()
            .enumerate()
            .map(|(index, abstract_syntax)| PresentationContextProposed {
                // presentation context identifiers are odd
                id: (index * 2 + 1) as u8,
                abstract_syntax: abstract_syntax.to_string(),
                transfer_syntaxes: self
                    .options
                    .transfer_syntaxes
                    .iter()
                    .map(|ts| ts.to_string())
                    .collect(),
            })
            .collect();
        AssociationRQ {
            protocol_version: 1,
            called_ae_title: self.called_ae_title.clone(),
            calling_ae_title: self.calling_ae_title.clone(),
            application_context_name: self.application_context_name.clone(),
            presentation_contexts,
            user_variables: self.default_user_variables(),
        }
    }

    fn build_association_ac(&self) -> AssociationAC {
        AssociationAC {
            protocol_version: 1,
            called_ae_title: self.called_ae_title.clone(),
            calling_ae_title: self.calling_ae_title.clone(),
            application_context_name: self.application_context_name.clone(),
            presentation_contexts: self.accepted_presentation_contexts.clone(),
            user_variables: self.accepted_user_variables.clone(),
        }
    }

    fn reject_decision(&self) -> AssociationRJ {
        self.reject.unwrap_or(AssociationRJ {
            result: AssociationRJResult::Transient,
            source: AssociationRJSource::ServiceProviderAsce(
                AssociationRJServiceProviderAsceReason::NoReasonGiven,
            ),
        })
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: State) {
        self.state = state;
    }

    #[cfg(test)]
    pub(crate) fn force_role(&mut self, role: Role) {
        self.role = role;
    }
}

/// The maximum length advertised in a set of user information sub-items,
/// mapping both an absent sub-item and an explicit 0 to "no limit".
fn max_length_of(user_variables: &[UserVariableItem]) -> Option<u32> {
    user_variables
        .iter()
        .find_map(|variable| match variable {
            UserVariableItem::MaxLength(length) => Some(*length),
            _ => None,
        })
        .filter(|length| *length != 0)
}
