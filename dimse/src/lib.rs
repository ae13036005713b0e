//! DICOM message service element (DIMSE) support
//! on top of the `ferrodicom-ul` upper layer protocol.
//!
//! - The [`commandset`] module encodes and decodes
//!   the group 0000H command sets exchanged in command PDVs.
//! - The [`messages`] module is the catalogue of the DIMSE messages
//!   (C-STORE, C-FIND, C-MOVE, C-GET, C-ECHO, C-CANCEL
//!   and the normalized N-services),
//!   each projecting to and from its command set.
//! - The [`service`] module packs outgoing messages
//!   into presentation data values under the peer's maximum PDU length,
//!   reassembles incoming ones
//!   and dispatches them as typed events.
//!
//! Data sets are opaque to this crate:
//! they cross the [`service::DataSetCodec`] boundary as application values
//! and are encoded under the flags implied
//! by the negotiated transfer syntax.

pub mod commandset;
pub mod messages;
pub mod service;

pub use commandset::CommandSet;
pub use messages::{CommandField, Dimse, Priority};
pub use service::{DataSetCodec, DimseService, RawDataSetCodec, ServiceEvent, ServiceOutput};
