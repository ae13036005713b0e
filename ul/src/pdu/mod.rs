//! Protocol data unit (PDU) data structures.
//!
//! The types in this module form a strictly hierarchical tree:
//! a [`Pdu`] owns its items, and items own their sub-items.
//! Reading and writing them from/to a byte stream
//! is the job of the [`reader`] and [`writer`] modules.

/// A presentation context as proposed in an A-ASSOCIATE-RQ:
/// one abstract syntax with one or more transfer syntax candidates.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct PresentationContextProposed {
    /// the presentation context identifier, an odd integer between 1 and 255
    pub id: u8,
    /// the abstract syntax UID
    pub abstract_syntax: String,
    /// the candidate transfer syntax UIDs, in order of preference
    pub transfer_syntaxes: Vec<String>,
}

/// The outcome for a single presentation context,
/// as carried in an A-ASSOCIATE-AC.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct PresentationContextResult {
    /// the presentation context identifier echoed from the proposal
    pub id: u8,
    /// the result/reason field
    pub reason: PresentationContextResultReason,
    /// the single accepted transfer syntax UID
    /// (not significant unless `reason` is `Acceptance`)
    pub transfer_syntax: String,
}

impl PresentationContextResult {
    /// Whether this context was accepted by the peer.
    pub fn is_accepted(&self) -> bool {
        self.reason == PresentationContextResultReason::Acceptance
    }
}

/// The reason field of a presentation context result.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum PresentationContextResultReason {
    Acceptance = 0,
    UserRejection = 1,
    NoReason = 2,
    AbstractSyntaxNotSupported = 3,
    TransferSyntaxesNotSupported = 4,
}

impl PresentationContextResultReason {
    pub(crate) fn from(reason: u8) -> Option<Self> {
        match reason {
            0 => Some(PresentationContextResultReason::Acceptance),
            1 => Some(PresentationContextResultReason::UserRejection),
            2 => Some(PresentationContextResultReason::NoReason),
            3 => Some(PresentationContextResultReason::AbstractSyntaxNotSupported),
            4 => Some(PresentationContextResultReason::TransferSyntaxesNotSupported),
            _ => None,
        }
    }
}

/// The result field of an A-ASSOCIATE-RJ.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJResult {
    Permanent = 1,
    Transient = 2,
}

impl AssociationRJResult {
    pub(crate) fn from(result: u8) -> Option<Self> {
        match result {
            1 => Some(AssociationRJResult::Permanent),
            2 => Some(AssociationRJResult::Transient),
            _ => None,
        }
    }
}

/// The source (and per-source reason) of an A-ASSOCIATE-RJ.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJSource {
    /// DICOM UL service-user
    ServiceUser(AssociationRJServiceUserReason),
    /// DICOM UL service-provider (ACSE related function)
    ServiceProviderAsce(AssociationRJServiceProviderAsceReason),
    /// DICOM UL service-provider (presentation related function)
    ServiceProviderPresentation(AssociationRJServiceProviderPresentationReason),
}

impl AssociationRJSource {
    pub(crate) fn from(source: u8, reason: u8) -> Option<Self> {
        match (source, reason) {
            (1, 1) => Some(AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::NoReasonGiven,
            )),
            (1, 2) => Some(AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
            )),
            (1, 3) => Some(AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::CallingAeTitleNotRecognized,
            )),
            (1, 7) => Some(AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::CalledAeTitleNotRecognized,
            )),
            (1, x @ 4..=6) | (1, x @ 8..=10) => Some(AssociationRJSource::ServiceUser(
                AssociationRJServiceUserReason::Reserved(x),
            )),
            (2, 1) => Some(AssociationRJSource::ServiceProviderAsce(
                AssociationRJServiceProviderAsceReason::NoReasonGiven,
            )),
            (2, 2) => Some(AssociationRJSource::ServiceProviderAsce(
                AssociationRJServiceProviderAsceReason::ProtocolVersionNotSupported,
            )),
            (3, 1) => Some(AssociationRJSource::ServiceProviderPresentation(
                AssociationRJServiceProviderPresentationReason::TemporaryCongestion,
            )),
            (3, 2) => Some(AssociationRJSource::ServiceProviderPresentation(
                AssociationRJServiceProviderPresentationReason::LocalLimitExceeded,
            )),
            (3, x @ 0) | (3, x @ 3..=7) => Some(AssociationRJSource::ServiceProviderPresentation(
                AssociationRJServiceProviderPresentationReason::Reserved(x),
            )),
            _ => None,
        }
    }
}

/// Rejection reasons attributed to the UL service-user.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJServiceUserReason {
    NoReasonGiven,
    ApplicationContextNameNotSupported,
    CallingAeTitleNotRecognized,
    CalledAeTitleNotRecognized,
    Reserved(u8),
}

/// Rejection reasons attributed to the ACSE-related service-provider.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJServiceProviderAsceReason {
    NoReasonGiven,
    ProtocolVersionNotSupported,
}

/// Rejection reasons attributed to the presentation-related service-provider.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AssociationRJServiceProviderPresentationReason {
    TemporaryCongestion,
    LocalLimitExceeded,
    Reserved(u8),
}

/// A single presentation data value (PDV) fragment.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct PDataValue {
    /// the presentation context this fragment travels on
    pub presentation_context_id: u8,
    /// whether the fragment carries command or data set bytes
    pub value_type: PDataValueType,
    /// whether this is the last fragment of its message part
    pub is_last: bool,
    /// the fragment payload
    pub data: Vec<u8>,
}

/// The kind of content of a PDV fragment (message control header bit 0).
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum PDataValueType {
    Command,
    Data,
}

/// The source (and provider reason) of an A-ABORT.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AbortRQSource {
    /// DICOM UL service-user initiated abort
    ServiceUser,
    /// DICOM UL service-provider initiated abort
    ServiceProvider(AbortRQServiceProviderReason),
    Reserved,
}

impl AbortRQSource {
    pub(crate) fn from(source: u8, reason: u8) -> Option<Self> {
        match (source, reason) {
            (0, _) => Some(AbortRQSource::ServiceUser),
            (1, _) => Some(AbortRQSource::Reserved),
            (2, 0) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::ReasonNotSpecified,
            )),
            (2, 1) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::UnrecognizedPdu,
            )),
            (2, 2) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::UnexpectedPdu,
            )),
            (2, 3) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::Reserved,
            )),
            (2, 4) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::UnrecognizedPduParameter,
            )),
            (2, 5) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::UnexpectedPduParameter,
            )),
            (2, 6) => Some(AbortRQSource::ServiceProvider(
                AbortRQServiceProviderReason::InvalidPduParameter,
            )),
            _ => None,
        }
    }

    /// The raw `(source, reason/diag)` byte pair of this abort source.
    pub fn codes(&self) -> (u8, u8) {
        match self {
            AbortRQSource::ServiceUser => (0, 0),
            AbortRQSource::Reserved => (1, 0),
            AbortRQSource::ServiceProvider(reason) => {
                let reason = match reason {
                    AbortRQServiceProviderReason::ReasonNotSpecified => 0,
                    AbortRQServiceProviderReason::UnrecognizedPdu => 1,
                    AbortRQServiceProviderReason::UnexpectedPdu => 2,
                    AbortRQServiceProviderReason::Reserved => 3,
                    AbortRQServiceProviderReason::UnrecognizedPduParameter => 4,
                    AbortRQServiceProviderReason::UnexpectedPduParameter => 5,
                    AbortRQServiceProviderReason::InvalidPduParameter => 6,
                };
                (2, reason)
            }
        }
    }
}

/// Abort reasons attributed to the UL service-provider.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum AbortRQServiceProviderReason {
    ReasonNotSpecified,
    UnrecognizedPdu,
    UnexpectedPdu,
    Reserved,
    UnrecognizedPduParameter,
    UnexpectedPduParameter,
    InvalidPduParameter,
}

/// An intermediate representation of a variable item
/// found in an association PDU.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum PduVariableItem {
    Unknown(u8),
    ApplicationContext(String),
    PresentationContextProposed(PresentationContextProposed),
    PresentationContextResult(PresentationContextResult),
    UserVariables(Vec<UserVariableItem>),
}

/// A user information sub-item.
///
/// Only [`MaxLength`](UserVariableItem::MaxLength) carries semantics
/// that the association machinery acts upon;
/// every other sub-item is parsed and preserved verbatim
/// for the application to inspect.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum UserVariableItem {
    /// the maximum PDU length that the sender is willing to receive,
    /// 0 meaning no limit (sub-item 51H)
    MaxLength(u32),
    /// the implementation class UID of the sender (sub-item 52H)
    ImplementationClassUid(String),
    /// the implementation version name of the sender (sub-item 55H)
    ImplementationVersionName(String),
    /// the asynchronous operations window (sub-item 53H)
    AsyncOperationsWindow {
        max_operations_invoked: u16,
        max_operations_performed: u16,
    },
    /// SCP/SCU role selection for one SOP class (sub-item 54H)
    RoleSelection {
        sop_class_uid: String,
        scu_role: u8,
        scp_role: u8,
    },
    /// SOP class extended negotiation:
    /// SOP class UID and opaque service-class application information
    /// (sub-item 56H)
    SopClassExtendedNegotiation(String, Vec<u8>),
    /// SOP class common extended negotiation (sub-item 57H)
    SopClassCommonExtendedNegotiation {
        sop_class_uid: String,
        service_class_uid: String,
        related_general_sop_class_uids: Vec<String>,
    },
    /// user identity negotiation (sub-item 58H)
    UserIdentity(UserIdentity),
    /// any other sub-item, kept byte-exact
    Unknown(u8, Vec<u8>),
}

/// The form of identity carried in a user identity sub-item.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum UserIdentityType {
    Username = 1,
    UsernameAndPassword = 2,
    KerberosServiceTicket = 3,
    SamlAssertion = 4,
    Jwt = 5,
}

impl UserIdentityType {
    pub(crate) fn from(value: u8) -> Option<Self> {
        match value {
            1 => Some(UserIdentityType::Username),
            2 => Some(UserIdentityType::UsernameAndPassword),
            3 => Some(UserIdentityType::KerberosServiceTicket),
            4 => Some(UserIdentityType::SamlAssertion),
            5 => Some(UserIdentityType::Jwt),
            _ => None,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }
}

/// The contents of a user identity negotiation sub-item.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct UserIdentity {
    positive_response_requested: bool,
    identity_type: UserIdentityType,
    primary_field: Vec<u8>,
    secondary_field: Vec<u8>,
}

impl UserIdentity {
    pub fn new(
        positive_response_requested: bool,
        identity_type: UserIdentityType,
        primary_field: Vec<u8>,
        secondary_field: Vec<u8>,
    ) -> Self {
        UserIdentity {
            positive_response_requested,
            identity_type,
            primary_field,
            secondary_field,
        }
    }

    pub fn positive_response_requested(&self) -> bool {
        self.positive_response_requested
    }

    pub fn identity_type(&self) -> UserIdentityType {
        self.identity_type
    }

    pub fn primary_field(&self) -> &[u8] {
        &self.primary_field
    }

    pub fn secondary_field(&self) -> &[u8] {
        &self.secondary_field
    }
}

/// An A-ASSOCIATE-RQ PDU.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AssociationRQ {
    /// protocol version bit field (bit 0 identifies version 1)
    pub protocol_version: u16,
    /// the application entity title of the intended receiver
    pub called_ae_title: String,
    /// the application entity title of the requestor
    pub calling_ae_title: String,
    /// the application context name proposed for the association
    pub application_context_name: String,
    /// the proposed presentation contexts
    pub presentation_contexts: Vec<PresentationContextProposed>,
    /// the user information sub-items
    pub user_variables: Vec<UserVariableItem>,
}

/// An A-ASSOCIATE-AC PDU.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AssociationAC {
    /// protocol version bit field (bit 0 identifies version 1)
    pub protocol_version: u16,
    /// AE title echoed from the request; not significant on receipt
    pub called_ae_title: String,
    /// AE title echoed from the request; not significant on receipt
    pub calling_ae_title: String,
    /// the application context name agreed upon
    pub application_context_name: String,
    /// the presentation context results, one per proposed context
    pub presentation_contexts: Vec<PresentationContextResult>,
    /// the user information sub-items
    pub user_variables: Vec<UserVariableItem>,
}

/// An A-ASSOCIATE-RJ PDU.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub struct AssociationRJ {
    /// whether the rejection is permanent or transient
    pub result: AssociationRJResult,
    /// who rejected the association, and why
    pub source: AssociationRJSource,
}

/// A DICOM upper layer protocol data unit.
#[derive(Clone, Eq, PartialEq, PartialOrd, Hash, Debug)]
pub enum Pdu {
    /// an unrecognized top-level PDU type octet, payload kept verbatim
    Unknown { pdu_type: u8, data: Vec<u8> },
    /// A-ASSOCIATE-RQ (type 01H)
    AssociationRQ(AssociationRQ),
    /// A-ASSOCIATE-AC (type 02H)
    AssociationAC(AssociationAC),
    /// A-ASSOCIATE-RJ (type 03H)
    AssociationRJ(AssociationRJ),
    /// P-DATA-TF (type 04H)
    PData { data: Vec<PDataValue> },
    /// A-RELEASE-RQ (type 05H)
    ReleaseRQ,
    /// A-RELEASE-RP (type 06H)
    ReleaseRP,
    /// A-ABORT (type 07H)
    AbortRQ { source: AbortRQSource },
}

impl Pdu {
    /// A short human readable name for the PDU kind, for logging.
    pub fn short_description(&self) -> &'static str {
        match self {
            Pdu::Unknown { .. } => "Unknown",
            Pdu::AssociationRQ { .. } => "A-ASSOCIATE-RQ",
            Pdu::AssociationAC { .. } => "A-ASSOCIATE-AC",
            Pdu::AssociationRJ { .. } => "A-ASSOCIATE-RJ",
            Pdu::PData { .. } => "P-DATA-TF",
            Pdu::ReleaseRQ => "A-RELEASE-RQ",
            Pdu::ReleaseRP => "A-RELEASE-RP",
            Pdu::AbortRQ { .. } => "A-ABORT",
        }
    }
}

impl From<AssociationRQ> for Pdu {
    fn from(value: AssociationRQ) -> Self {
        Pdu::AssociationRQ(value)
    }
}

impl From<AssociationAC> for Pdu {
    fn from(value: AssociationAC) -> Self {
        Pdu::AssociationAC(value)
    }
}

impl From<AssociationRJ> for Pdu {
    fn from(value: AssociationRJ) -> Self {
        Pdu::AssociationRJ(value)
    }
}

mod reader;
mod writer;

pub use reader::{
    read_pdu, ReadError, DEFAULT_MAX_PDU, MAXIMUM_PDU_SIZE, MINIMUM_PDU_SIZE, PDU_HEADER_SIZE,
};
pub use writer::{write_pdu, WriteChunkError, WriteError};

#[cfg(test)]
mod test;
