//! The DIMSE framing service:
//! packing messages into presentation data values on the send path,
//! reassembling and dispatching them on the receive path.
//!
//! A [`DimseService`] wraps an [`Association`]
//! and keeps its sans-I/O shape:
//! every call returns the [`ServiceOutput`] sequence
//! for the surrounding event loop to carry out.

use bytes::{Bytes, BytesMut};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use tracing::{debug, warn};

use ferrodicom_ul::association::{
    AcceptAny, AcceptancePolicy, Association, AssociationOptions, Indication, Output,
};
use ferrodicom_ul::pdu::{
    read_pdu, AbortRQServiceProviderReason, AbortRQSource, AssociationAC, AssociationRJ,
    AssociationRJResult, AssociationRJSource, AssociationRQ, PDataValue, PDataValueType, Pdu,
    PresentationContextResult, PresentationContextResultReason, MAXIMUM_PDU_SIZE,
    MINIMUM_PDU_SIZE,
};
use ferrodicom_ul::uids::transfer_syntax_flags;

use crate::commandset::CommandSet;
use crate::messages::Dimse;

/// The size of a presentation data value item header:
/// 4 bytes of item length, the presentation context identifier
/// and the message control header.
pub const PDV_HEADER_SIZE: u32 = 6;

/// The external data set codec collaborator.
///
/// The framing layer treats data sets as opaque values;
/// a codec turns them into bytes under the encoding flags
/// implied by the negotiated transfer syntax, and back.
pub trait DataSetCodec {
    type DataSet;
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode(
        &self,
        data_set: &Self::DataSet,
        implicit_vr: bool,
        little_endian: bool,
    ) -> Result<Vec<u8>, Self::Error>;

    fn decode(
        &self,
        bytes: &[u8],
        implicit_vr: bool,
        little_endian: bool,
    ) -> Result<Self::DataSet, Self::Error>;
}

/// A data set codec that hands the encoded bytes through unchanged,
/// for applications that treat data sets as blobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDataSetCodec;

impl DataSetCodec for RawDataSetCodec {
    type DataSet = Vec<u8>;
    type Error = std::convert::Infallible;

    fn encode(
        &self,
        data_set: &Vec<u8>,
        _implicit_vr: bool,
        _little_endian: bool,
    ) -> Result<Vec<u8>, Self::Error> {
        Ok(data_set.clone())
    }

    fn decode(
        &self,
        bytes: &[u8],
        _implicit_vr: bool,
        _little_endian: bool,
    ) -> Result<Vec<u8>, Self::Error> {
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("presentation context {} was not accepted on this association", id))]
    UnacceptedPresentationContext { id: u8, backtrace: Backtrace },

    #[snafu(display(
        "the message {} carry a data set",
        if *expects_data_set { "must" } else { "must not" }
    ))]
    DataSetMismatch {
        expects_data_set: bool,
        backtrace: Backtrace,
    },

    #[snafu(display("could not encode the data set"))]
    EncodeDataSet {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[snafu(display("peer maximum PDU length {} cannot fit any fragment", max))]
    MaxPduLengthTooSmall { max: u32, backtrace: Backtrace },

    #[snafu(display("association fault"))]
    Machine {
        #[snafu(backtrace)]
        source: ferrodicom_ul::association::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A side effect requested by the DIMSE service,
/// to be carried out by the surrounding event loop.
#[derive(Debug)]
pub enum ServiceOutput<D> {
    /// open a transport connection to the peer
    ConnectTransport,
    /// write the whole encoded PDU to the transport in a single write
    SendPdu(Pdu),
    /// close the transport connection
    CloseTransport,
    /// start the ARTIM timer, cancelling a running one first
    StartArtim,
    /// cancel the ARTIM timer
    StopArtim,
    /// surface an event to the application
    Event(ServiceEvent<D>),
}

/// An event surfaced to the application by the DIMSE service.
#[derive(Debug)]
pub enum ServiceEvent<D> {
    /// a transport connection from a peer was accepted
    TransportAccepted,
    /// an association request awaits
    /// [`respond_accept`](DimseService::respond_accept) or
    /// [`respond_reject`](DimseService::respond_reject)
    AssociateRequested(AssociationRQ),
    /// the peer accepted our association request
    AssociateAccepted(AssociationAC),
    /// the peer rejected our association request
    AssociateRejected(AssociationRJ),
    /// the peer requests release; answer with
    /// [`respond_release`](DimseService::respond_release)
    ReleaseRequested,
    /// both sides requested release simultaneously; answer with
    /// [`respond_release`](DimseService::respond_release)
    ReleaseCollision,
    /// the release handshake completed
    ReleaseConfirmed,
    /// the association was aborted
    Abort { source: u8, reason: u8 },
    /// a whole DIMSE message arrived
    Dimse {
        presentation_context_id: u8,
        message: Dimse,
        data_set: Option<D>,
    },
}

#[derive(Debug, Snafu)]
enum ReassemblyViolation {
    #[snafu(display(
        "interleaved presentation contexts {} and {} in one message",
        current,
        got
    ))]
    MixedPresentationContexts { current: u8, got: u8 },

    #[snafu(display("data fragment while reading a command"))]
    DataWhileCommand,

    #[snafu(display("command fragment while reading a data set"))]
    CommandWhileData,

    #[snafu(display("data fragments completed without a command"))]
    CommandMissing,

    #[snafu(display("could not decode the command set"))]
    CommandDecode {
        source: crate::commandset::DecodeError,
    },
}

/// A fully reassembled DIMSE message, before typing and data set decoding.
#[derive(Debug)]
struct AssembledMessage {
    presentation_context_id: u8,
    command: CommandSet,
    data: Option<Bytes>,
}

#[derive(Debug)]
enum Progress {
    Pending,
    Message(AssembledMessage),
}

/// Per-association DIMSE reassembly state.
///
/// Command fragments are collected until the last one arrives,
/// then data fragments if the command announces a data set.
/// All fragments of one message must share one presentation context.
#[derive(Debug)]
struct Reassembler {
    reading_command: bool,
    presentation_context_id: Option<u8>,
    command_buffer: BytesMut,
    data_buffer: BytesMut,
    command: Option<CommandSet>,
}

impl Default for Reassembler {
    fn default() -> Self {
        Reassembler {
            reading_command: true,
            presentation_context_id: None,
            command_buffer: BytesMut::new(),
            data_buffer: BytesMut::new(),
            command: None,
        }
    }
}

impl Reassembler {
    fn push(&mut self, pdv: &PDataValue) -> Result<Progress, ReassemblyViolation> {
        if let Some(current) = self.presentation_context_id {
            ensure!(
                pdv.presentation_context_id == current,
                MixedPresentationContextsSnafu {
                    current,
                    got: pdv.presentation_context_id,
                }
            );
        }
        self.presentation_context_id = Some(pdv.presentation_context_id);

        match (self.reading_command, pdv.value_type) {
            (true, PDataValueType::Command) => {
                self.command_buffer.extend_from_slice(&pdv.data);
                if !pdv.is_last {
                    return Ok(Progress::Pending);
                }
                let command =
                    CommandSet::unpack(&self.command_buffer).context(CommandDecodeSnafu)?;
                self.command_buffer.clear();
                if command.get_u16(crate::commandset::tags::COMMAND_DATA_SET_TYPE)
                    == Some(crate::messages::NO_DATA_SET)
                {
                    let presentation_context_id = pdv.presentation_context_id;
                    self.reset();
                    Ok(Progress::Message(AssembledMessage {
                        presentation_context_id,
                        command,
                        data: None,
                    }))
                } else {
                    self.command = Some(command);
                    self.reading_command = false;
                    Ok(Progress::Pending)
                }
            }
            (true, PDataValueType::Data) => DataWhileCommandSnafu.fail(),
            (false, PDataValueType::Data) => {
                self.data_buffer.extend_from_slice(&pdv.data);
                if !pdv.is_last {
                    return Ok(Progress::Pending);
                }
                let Some(command) = self.command.take() else {
                    return CommandMissingSnafu.fail();
                };
                let presentation_context_id = pdv.presentation_context_id;
                let data = self.data_buffer.split().freeze();
                self.reset();
                Ok(Progress::Message(AssembledMessage {
                    presentation_context_id,
                    command,
                    data: Some(data),
                }))
            }
            (false, PDataValueType::Command) => CommandWhileDataSnafu.fail(),
        }
    }

    fn reset(&mut self) {
        self.reading_command = true;
        self.presentation_context_id = None;
        self.command_buffer.clear();
        self.data_buffer.clear();
        self.command = None;
    }
}

/// A DIMSE message service over one association.
#[derive(Debug)]
pub struct DimseService<C, P = AcceptAny>
where
    C: DataSetCodec,
{
    association: Association<P>,
    codec: C,
    reassembler: Reassembler,
    read_buffer: BytesMut,
}

impl<C> DimseService<C, AcceptAny>
where
    C: DataSetCodec,
{
    /// Create a service over a fresh association
    /// with the default acceptance policy.
    pub fn new(options: AssociationOptions, codec: C) -> Self {
        DimseService {
            association: Association::new(options),
            codec,
            reassembler: Reassembler::default(),
            read_buffer: BytesMut::new(),
        }
    }
}

impl<C, P> DimseService<C, P>
where
    C: DataSetCodec,
    P: AcceptancePolicy,
{
    /// Create a service over a fresh association
    /// with the given acceptance policy.
    pub fn with_policy(options: AssociationOptions, codec: C, policy: P) -> Self {
        DimseService {
            association: Association::with_policy(options, policy),
            codec,
            reassembler: Reassembler::default(),
            read_buffer: BytesMut::new(),
        }
    }

    /// The underlying association.
    pub fn association(&self) -> &Association<P> {
        &self.association
    }

    // --- service primitives, passed through to the association ---

    pub fn request_associate(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.request_associate().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn transport_connected(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.transport_connected().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn transport_accepted(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.transport_accepted().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn transport_closed(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.transport_closed().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn artim_expired(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.artim_expired().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn request_release(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.request_release().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn respond_release(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.respond_release().context(MachineSnafu)?;
        self.process(outputs)
    }

    pub fn request_abort(&mut self, source: AbortRQSource) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self
            .association
            .request_abort(source)
            .context(MachineSnafu)?;
        self.process(outputs)
    }

    /// Accept a pending association request,
    /// negotiating the presentation contexts
    /// against the configured abstract and transfer syntaxes.
    pub fn respond_accept(&mut self) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let accepted = self.negotiate_presentation_contexts();
        self.respond_accept_with(accepted)
    }

    /// Accept a pending association request
    /// with an explicit presentation context result list.
    pub fn respond_accept_with(
        &mut self,
        accepted: Vec<PresentationContextResult>,
    ) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self
            .association
            .respond_accept(accepted)
            .context(MachineSnafu)?;
        self.process(outputs)
    }

    /// Reject a pending association request.
    pub fn respond_reject(
        &mut self,
        result: AssociationRJResult,
        source: AssociationRJSource,
    ) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self
            .association
            .respond_reject(result, source)
            .context(MachineSnafu)?;
        self.process(outputs)
    }

    // --- inbound path ---

    /// Feed raw transport bytes into the service.
    ///
    /// Frames may arrive arbitrarily fragmented or coalesced;
    /// undecodable input raises the invalid-PDU event on the association.
    pub fn handle_incoming_bytes(&mut self, bytes: &[u8]) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        self.read_buffer.extend_from_slice(bytes);
        let mut out = Vec::new();
        loop {
            // an advertised maximum of 0 means no limit;
            // otherwise tolerate at least the protocol minimum
            // on the read side
            let advertised = self.association.options().max_pdu_length_value();
            let max_pdu_length = if advertised == 0 {
                MAXIMUM_PDU_SIZE
            } else {
                advertised.max(MINIMUM_PDU_SIZE)
            };
            let strict = self.association.options().is_strict();
            match read_pdu(&mut self.read_buffer, max_pdu_length, strict) {
                Ok(Some(pdu)) => out.extend(self.handle_pdu(pdu)?),
                Ok(None) => break,
                Err(e) => {
                    warn!("invalid PDU from peer: {}", e);
                    let outputs = self
                        .association
                        .unrecognized_or_invalid_pdu_received()
                        .context(MachineSnafu)?;
                    out.extend(self.process(outputs)?);
                    // nothing past a framing error can be trusted
                    self.read_buffer.clear();
                    break;
                }
            }
        }
        Ok(out)
    }

    /// Feed one decoded PDU into the service.
    pub fn handle_pdu(&mut self, pdu: Pdu) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let outputs = self.association.pdu_received(pdu).context(MachineSnafu)?;
        self.process(outputs)
    }

    // --- outbound DIMSE path ---

    /// Send a DIMSE message, with its data set when it carries one,
    /// over the given presentation context.
    ///
    /// The command set is encoded in implicit VR little endian
    /// and the data set under the transfer syntax
    /// accepted for the presentation context;
    /// both are fragmented so that no emitted P-DATA-TF PDU
    /// declares a length above the peer's advertised maximum.
    pub fn send_dimse(
        &mut self,
        presentation_context_id: u8,
        message: &Dimse,
        data_set: Option<&C::DataSet>,
    ) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let transfer_syntax = self
            .association
            .accepted_transfer_syntax(presentation_context_id)
            .context(UnacceptedPresentationContextSnafu {
                id: presentation_context_id,
            })?;
        let (implicit_vr, little_endian) = transfer_syntax_flags(transfer_syntax);

        ensure!(
            message.has_data_set() == data_set.is_some(),
            DataSetMismatchSnafu {
                expects_data_set: message.has_data_set(),
            }
        );

        debug!(
            "sending DIMSE {:?} on presentation context {}",
            message.command_field(),
            presentation_context_id
        );

        let command_bytes = message.to_command_set().pack();
        let data_bytes = match data_set {
            Some(data_set) => Some(
                self.codec
                    .encode(data_set, implicit_vr, little_endian)
                    .map_err(|e| Error::EncodeDataSet {
                        source: Box::new(e),
                    })?,
            ),
            None => None,
        };

        let peer_max = self.association.peer_max_pdu_length();
        let mut raw = Vec::new();
        if whole_message_fits(peer_max, &command_bytes, data_bytes.as_deref()) {
            // one P-DATA-TF with the command PDV and the data set PDV
            let mut values = vec![PDataValue {
                presentation_context_id,
                value_type: PDataValueType::Command,
                is_last: true,
                data: command_bytes,
            }];
            if let Some(data) = data_bytes {
                values.push(PDataValue {
                    presentation_context_id,
                    value_type: PDataValueType::Data,
                    is_last: true,
                    data,
                });
            }
            raw.extend(self.association.request_p_data(values).context(MachineSnafu)?);
        } else {
            // peer_max is present here, or the whole message would fit
            let max = peer_max.unwrap_or(u32::MAX);
            let budget = fragment_budget(max)?;
            self.send_fragments(
                presentation_context_id,
                PDataValueType::Command,
                &command_bytes,
                budget,
                &mut raw,
            )?;
            if let Some(data) = data_bytes {
                self.send_fragments(
                    presentation_context_id,
                    PDataValueType::Data,
                    &data,
                    budget,
                    &mut raw,
                )?;
            }
        }
        self.process(raw)
    }

    fn send_fragments(
        &mut self,
        presentation_context_id: u8,
        value_type: PDataValueType,
        payload: &[u8],
        budget: u32,
        raw: &mut Vec<Output>,
    ) -> Result<()> {
        let chunks = payload.chunks(budget as usize);
        let count = chunks.len();
        for (index, chunk) in chunks.enumerate() {
            let values = vec![PDataValue {
                presentation_context_id,
                value_type,
                is_last: index + 1 == count,
                data: chunk.to_vec(),
            }];
            raw.extend(self.association.request_p_data(values).context(MachineSnafu)?);
        }
        Ok(())
    }

    /// The default acceptor-side negotiation:
    /// reject contexts whose abstract syntax is not configured,
    /// otherwise accept the first offered transfer syntax
    /// that this node admits.
    pub fn negotiate_presentation_contexts(&self) -> Vec<PresentationContextResult> {
        let options = self.association.options();
        self.association
            .requested_presentation_contexts()
            .iter()
            .map(|pc| {
                let fallback_ts = pc.transfer_syntaxes.first().cloned().unwrap_or_default();
                if !options
                    .abstract_syntaxes()
                    .iter()
                    .any(|a| a.as_ref() == pc.abstract_syntax)
                {
                    PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::AbstractSyntaxNotSupported,
                        transfer_syntax: fallback_ts,
                    }
                } else if let Some(ts) = pc.transfer_syntaxes.iter().find(|ts| {
                    options
                        .transfer_syntaxes()
                        .iter()
                        .any(|t| t.as_ref() == ts.as_str())
                }) {
                    PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::Acceptance,
                        transfer_syntax: ts.clone(),
                    }
                } else {
                    PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::TransferSyntaxesNotSupported,
                        transfer_syntax: fallback_ts,
                    }
                }
            })
            .collect()
    }

    // --- plumbing ---

    /// Map raw association outputs into service outputs,
    /// running inbound presentation data through reassembly.
    fn process(&mut self, outputs: Vec<Output>) -> Result<Vec<ServiceOutput<C::DataSet>>> {
        let mut out = Vec::new();
        for output in outputs {
            match output {
                Output::ConnectTransport => out.push(ServiceOutput::ConnectTransport),
                Output::SendPdu(pdu) => out.push(ServiceOutput::SendPdu(pdu)),
                Output::CloseTransport => out.push(ServiceOutput::CloseTransport),
                Output::StartArtim => out.push(ServiceOutput::StartArtim),
                Output::StopArtim => out.push(ServiceOutput::StopArtim),
                Output::Indication(indication) => match indication {
                    Indication::PData(values) => self.receive_pdvs(values, &mut out)?,
                    Indication::TransportAccepted => {
                        out.push(ServiceOutput::Event(ServiceEvent::TransportAccepted))
                    }
                    Indication::Associate(rq) => {
                        out.push(ServiceOutput::Event(ServiceEvent::AssociateRequested(rq)))
                    }
                    Indication::AssociateAccepted(ac) => {
                        out.push(ServiceOutput::Event(ServiceEvent::AssociateAccepted(ac)))
                    }
                    Indication::AssociateRejected(rj) => {
                        out.push(ServiceOutput::Event(ServiceEvent::AssociateRejected(rj)))
                    }
                    Indication::Release => {
                        out.push(ServiceOutput::Event(ServiceEvent::ReleaseRequested))
                    }
                    Indication::ReleaseCollision => {
                        out.push(ServiceOutput::Event(ServiceEvent::ReleaseCollision))
                    }
                    Indication::ReleaseConfirmed => {
                        out.push(ServiceOutput::Event(ServiceEvent::ReleaseConfirmed))
                    }
                    Indication::Abort { source, reason } => {
                        out.push(ServiceOutput::Event(ServiceEvent::Abort { source, reason }))
                    }
                },
            }
        }
        Ok(out)
    }

    fn receive_pdvs(
        &mut self,
        values: Vec<PDataValue>,
        out: &mut Vec<ServiceOutput<C::DataSet>>,
    ) -> Result<()> {
        for pdv in values {
            // every fragment must travel on an accepted presentation context
            let Some(transfer_syntax) = self
                .association
                .accepted_transfer_syntax(pdv.presentation_context_id)
            else {
                warn!(
                    "PDV on unaccepted presentation context {}",
                    pdv.presentation_context_id
                );
                return self.abort_invalid(out);
            };
            let (implicit_vr, little_endian) = transfer_syntax_flags(transfer_syntax);

            match self.reassembler.push(&pdv) {
                Err(violation) => {
                    warn!("DIMSE reassembly violation: {}", violation);
                    return self.abort_invalid(out);
                }
                Ok(Progress::Pending) => {}
                Ok(Progress::Message(assembled)) => {
                    let message = match Dimse::from_command_set(&assembled.command) {
                        Ok(message) => message,
                        Err(e) => {
                            warn!("malformed DIMSE command set: {}", e);
                            return self.abort_invalid(out);
                        }
                    };
                    let data_set = match assembled.data {
                        None => None,
                        Some(bytes) => {
                            match self.codec.decode(&bytes, implicit_vr, little_endian) {
                                Ok(data_set) => Some(data_set),
                                Err(e) => {
                                    warn!("could not decode the data set: {}", e);
                                    return self.abort_invalid(out);
                                }
                            }
                        }
                    };
                    debug!(
                        "DIMSE {:?} received on presentation context {}",
                        message.command_field(),
                        assembled.presentation_context_id
                    );
                    out.push(ServiceOutput::Event(ServiceEvent::Dimse {
                        presentation_context_id: assembled.presentation_context_id,
                        message,
                        data_set,
                    }));
                }
            }
        }
        Ok(())
    }

    /// The association is corrupted at the DIMSE level:
    /// abort with an invalid-PDU-parameter diagnostic.
    fn abort_invalid(&mut self, out: &mut Vec<ServiceOutput<C::DataSet>>) -> Result<()> {
        self.reassembler.reset();
        let outputs = self
            .association
            .request_abort(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::InvalidPduParameter,
            ))
            .context(MachineSnafu)?;
        for output in outputs {
            match output {
                Output::SendPdu(pdu) => out.push(ServiceOutput::SendPdu(pdu)),
                Output::CloseTransport => out.push(ServiceOutput::CloseTransport),
                Output::StartArtim => out.push(ServiceOutput::StartArtim),
                Output::StopArtim => out.push(ServiceOutput::StopArtim),
                Output::ConnectTransport | Output::Indication(_) => {}
            }
        }
        Ok(())
    }
}

/// Whether the command and optional data set
/// fit in a single P-DATA-TF PDU under the peer's maximum.
fn whole_message_fits(peer_max: Option<u32>, command: &[u8], data: Option<&[u8]>) -> bool {
    match peer_max {
        None => true,
        Some(max) => {
            let total = PDV_HEADER_SIZE as usize
                + command.len()
                + data.map(|d| PDV_HEADER_SIZE as usize + d.len()).unwrap_or(0);
            max as usize >= total
        }
    }
}

/// The largest even fragment payload
/// that keeps the PDU length field within the peer's maximum.
fn fragment_budget(max: u32) -> Result<u32> {
    let budget = max.saturating_sub(PDV_HEADER_SIZE) & !1;
    ensure!(budget >= 2, MaxPduLengthTooSmallSnafu { max });
    Ok(budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_budget_is_the_largest_even_fit() {
        assert_eq!(fragment_budget(64).unwrap(), 58);
        assert_eq!(fragment_budget(65).unwrap(), 58);
        assert_eq!(fragment_budget(14).unwrap(), 8);
        assert!(matches!(
            fragment_budget(7),
            Err(Error::MaxPduLengthTooSmall { .. })
        ));
    }

    #[test]
    fn reassembler_collects_command_then_data() {
        let mut reassembler = Reassembler::default();
        let mut cs = CommandSet::new();
        cs.put_u16(crate::commandset::tags::COMMAND_FIELD, 0x0001);
        cs.put_u16(
            crate::commandset::tags::COMMAND_DATA_SET_TYPE,
            crate::messages::DATA_SET_PRESENT,
        );
        let packed = cs.pack();

        let (head, tail) = packed.split_at(packed.len() / 2);
        let progress = reassembler
            .push(&PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Command,
                is_last: false,
                data: head.to_vec(),
            })
            .unwrap();
        assert!(matches!(progress, Progress::Pending));
        let progress = reassembler
            .push(&PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Command,
                is_last: true,
                data: tail.to_vec(),
            })
            .unwrap();
        // the command announces a data set, so the message is not done yet
        assert!(matches!(progress, Progress::Pending));

        let progress = reassembler
            .push(&PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Data,
                is_last: true,
                data: vec![1, 2, 3, 4],
            })
            .unwrap();
        match progress {
            Progress::Message(assembled) => {
                assert_eq!(assembled.presentation_context_id, 1);
                assert_eq!(assembled.data.as_deref(), Some(&[1, 2, 3, 4][..]));
            }
            other => panic!("expected a whole message, got {:?}", other),
        }
    }

    #[test]
    fn reassembler_refuses_interleaved_contexts() {
        let mut reassembler = Reassembler::default();
        reassembler
            .push(&PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Command,
                is_last: false,
                data: vec![0; 4],
            })
            .unwrap();
        let violation = reassembler
            .push(&PDataValue {
                presentation_context_id: 3,
                value_type: PDataValueType::Command,
                is_last: true,
                data: vec![0; 4],
            })
            .unwrap_err();
        assert!(matches!(
            violation,
            ReassemblyViolation::MixedPresentationContexts { current: 1, got: 3 }
        ));
    }

    #[test]
    fn reassembler_refuses_interleaved_kinds() {
        let mut reassembler = Reassembler::default();
        let violation = reassembler
            .push(&PDataValue {
                presentation_context_id: 1,
                value_type: PDataValueType::Data,
                is_last: true,
                data: vec![0; 4],
            })
            .unwrap_err();
        assert!(matches!(violation, ReassemblyViolation::DataWhileCommand));
    }
}
