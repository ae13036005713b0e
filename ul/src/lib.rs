//! This crate contains the types and methods needed
//! to talk to DICOM nodes over the upper layer protocol.
//!
//! - The [`pdu`] module
//!   provides the data structures representing _protocol data units_,
//!   together with a frame reader and writer
//!   that cut and emit whole PDUs on a byte stream.
//! - The [`association`] module
//!   implements the upper layer association state machine,
//!   driving association establishment, data transfer,
//!   graceful release and abortive teardown
//!   as a per-connection reactor without I/O of its own.
//! - The [`uids`] module
//!   is the read-only registry of the UIDs
//!   that the protocol machinery relies on.
//!
//! DIMSE message assembly on top of this protocol layer
//! is provided separately by the `ferrodicom-dimse` crate.

pub mod association;
pub mod pdu;
pub mod uids;

/// The implementation class UID generically referring to this stack.
///
/// Generated as per the standard, part 5, section B.2.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.137712480719600495753757750347362112493";

/// The implementation version name generically referring to this stack.
pub const IMPLEMENTATION_VERSION_NAME: &str = "ferrodicom 0.1";

// re-exports

pub use association::{
    AcceptancePolicy, AcceptAny, Association, AssociationOptions, Indication, Output, Role,
};
pub use pdu::read_pdu;
pub use pdu::write_pdu;
pub use pdu::Pdu;
