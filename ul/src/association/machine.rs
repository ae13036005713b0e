//! The upper layer protocol state machine,
//! as one table-driven lookup.
//!
//! The table transcribes PS3.8, Section 9.2.3, Table 9-10:
//! one row per event, one column per state,
//! each defined cell holding the action to perform
//! and the state to move to.
//! Cells left blank in the standard are `None` here;
//! hitting one is a programming error of the local user,
//! not a protocol error.

use std::fmt;

/// A state of the association state machine (PS3.8, Table 9-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    /// idle, no association and no transport connection
    Sta1 = 1,
    /// transport connection open, awaiting A-ASSOCIATE-RQ PDU
    Sta2 = 2,
    /// awaiting local A-ASSOCIATE response primitive
    Sta3 = 3,
    /// awaiting transport connection opening to complete
    Sta4 = 4,
    /// awaiting A-ASSOCIATE-AC or A-ASSOCIATE-RJ PDU
    Sta5 = 5,
    /// association established and ready for data transfer
    Sta6 = 6,
    /// awaiting A-RELEASE-RP PDU
    Sta7 = 7,
    /// awaiting local A-RELEASE response primitive
    Sta8 = 8,
    /// release collision requestor side: awaiting A-RELEASE response
    Sta9 = 9,
    /// release collision acceptor side: awaiting A-RELEASE-RP PDU
    Sta10 = 10,
    /// release collision requestor side: awaiting A-RELEASE-RP PDU
    Sta11 = 11,
    /// release collision acceptor side: awaiting A-RELEASE response
    Sta12 = 12,
    /// awaiting transport connection close
    Sta13 = 13,
}

impl State {
    /// The state number as used in the standard (1 through 13).
    pub fn number(self) -> u8 {
        self as u8
    }

    fn column(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sta{}", self.number())
    }
}

/// The event classes driving the state machine (PS3.8, Table 9-10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A-ASSOCIATE request primitive from the local user
    AssociateRequest,
    /// transport connection opening completed
    TransportConnectConfirm,
    /// A-ASSOCIATE-AC PDU received
    AssociateAcReceived,
    /// A-ASSOCIATE-RJ PDU received
    AssociateRjReceived,
    /// transport connection accepted from a peer
    TransportConnectIndication,
    /// A-ASSOCIATE-RQ PDU received
    AssociateRqReceived,
    /// A-ASSOCIATE response primitive (accept) from the local user
    AssociateResponseAccept,
    /// A-ASSOCIATE response primitive (reject) from the local user
    AssociateResponseReject,
    /// P-DATA request primitive from the local user
    PDataRequest,
    /// P-DATA-TF PDU received
    PDataTfReceived,
    /// A-RELEASE request primitive from the local user
    ReleaseRequest,
    /// A-RELEASE-RQ PDU received
    ReleaseRqReceived,
    /// A-RELEASE-RP PDU received
    ReleaseRpReceived,
    /// A-RELEASE response primitive from the local user
    ReleaseResponse,
    /// A-ABORT request primitive from the local user
    AbortRequest,
    /// A-ABORT PDU received
    AbortReceived,
    /// transport connection closed by the peer or the network
    TransportClosed,
    /// the ARTIM timer expired
    ArtimExpired,
    /// an unrecognized or structurally invalid PDU arrived
    InvalidPduReceived,
}

impl Event {
    fn row(self) -> usize {
        match self {
            Event::AssociateRequest => 0,
            Event::TransportConnectConfirm => 1,
            Event::AssociateAcReceived => 2,
            Event::AssociateRjReceived => 3,
            Event::TransportConnectIndication => 4,
            Event::AssociateRqReceived => 5,
            Event::AssociateResponseAccept => 6,
            Event::AssociateResponseReject => 7,
            Event::PDataRequest => 8,
            Event::PDataTfReceived => 9,
            Event::ReleaseRequest => 10,
            Event::ReleaseRqReceived => 11,
            Event::ReleaseRpReceived => 12,
            Event::ReleaseResponse => 13,
            Event::AbortRequest => 14,
            Event::AbortReceived => 15,
            Event::TransportClosed => 16,
            Event::ArtimExpired => 17,
            Event::InvalidPduReceived => 18,
        }
    }

    /// All event classes, in table row order.
    pub const ALL: [Event; 19] = [
        Event::AssociateRequest,
        Event::TransportConnectConfirm,
        Event::AssociateAcReceived,
        Event::AssociateRjReceived,
        Event::TransportConnectIndication,
        Event::AssociateRqReceived,
        Event::AssociateResponseAccept,
        Event::AssociateResponseReject,
        Event::PDataRequest,
        Event::PDataTfReceived,
        Event::ReleaseRequest,
        Event::ReleaseRqReceived,
        Event::ReleaseRpReceived,
        Event::ReleaseResponse,
        Event::AbortRequest,
        Event::AbortReceived,
        Event::TransportClosed,
        Event::ArtimExpired,
        Event::InvalidPduReceived,
    ];
}

/// The actions of the state machine (PS3.8, Tables 9-7 through 9-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// issue a transport connect request to the local transport service
    Ae1,
    /// send A-ASSOCIATE-RQ PDU
    Ae2,
    /// issue an A-ASSOCIATE confirmation (accept) primitive
    Ae3,
    /// issue an A-ASSOCIATE confirmation (reject) primitive
    /// and close the transport connection
    Ae4,
    /// issue a transport connection response primitive and start ARTIM
    Ae5,
    /// stop ARTIM; if the request is acceptable,
    /// issue an A-ASSOCIATE indication primitive,
    /// otherwise send A-ASSOCIATE-RJ PDU and start ARTIM
    Ae6,
    /// send A-ASSOCIATE-AC PDU
    Ae7,
    /// send A-ASSOCIATE-RJ PDU and start ARTIM
    Ae8,
    /// send P-DATA-TF PDU
    Dt1,
    /// issue a P-DATA indication primitive
    Dt2,
    /// send A-RELEASE-RQ PDU
    Ar1,
    /// issue an A-RELEASE indication primitive
    Ar2,
    /// issue an A-RELEASE confirmation primitive
    /// and close the transport connection
    Ar3,
    /// send A-RELEASE-RP PDU and start ARTIM
    Ar4,
    /// stop ARTIM
    Ar5,
    /// issue a P-DATA indication primitive
    Ar6,
    /// send P-DATA-TF PDU
    Ar7,
    /// issue an A-RELEASE indication primitive (release collision)
    Ar8,
    /// send A-RELEASE-RP PDU
    Ar9,
    /// issue an A-RELEASE confirmation primitive
    Ar10,
    /// send A-ABORT PDU and start (or restart) ARTIM
    Aa1,
    /// stop ARTIM if running and close the transport connection
    Aa2,
    /// issue an A-ABORT or A-P-ABORT indication
    /// and close the transport connection
    Aa3,
    /// issue an A-P-ABORT indication primitive
    Aa4,
    /// stop ARTIM
    Aa5,
    /// ignore the event
    Aa6,
    /// send A-ABORT PDU
    Aa7,
    /// send A-ABORT PDU, issue an A-P-ABORT indication and start ARTIM
    Aa8,
}

/// How the next state of a transition is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// move to the given state
    To(State),
    /// AE-6: [`Sta3`](State::Sta3) if the association request is acceptable,
    /// [`Sta13`](State::Sta13) otherwise
    OnAcceptance,
    /// AR-8: [`Sta9`](State::Sta9) on the association requestor,
    /// [`Sta10`](State::Sta10) on the acceptor
    OnRole,
}

type Cell = Option<(Action, Next)>;

const fn t(action: Action, state: State) -> Cell {
    Some((action, Next::To(state)))
}

const __: Cell = None;

use Action::*;
use State::*;

/// PS3.8, Table 9-10. Columns are Sta1 through Sta13.
#[rustfmt::skip]
static TABLE: [[Cell; 13]; 19] = [
    // A-ASSOCIATE request (local user)
    [t(Ae1, Sta4), __, __, __, __, __, __, __, __, __, __, __, __],
    // transport connect confirmation
    [__, __, __, t(Ae2, Sta5), __, __, __, __, __, __, __, __, __],
    // A-ASSOCIATE-AC PDU received
    [__, t(Aa1, Sta13), t(Aa8, Sta13), __, t(Ae3, Sta6), t(Aa8, Sta13), t(Aa8, Sta13),
        t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa6, Sta13)],
    // A-ASSOCIATE-RJ PDU received
    [__, t(Aa1, Sta13), t(Aa8, Sta13), __, t(Ae4, Sta1), t(Aa8, Sta13), t(Aa8, Sta13),
        t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa6, Sta13)],
    // transport connect indication
    [t(Ae5, Sta2), __, __, __, __, __, __, __, __, __, __, __, __],
    // A-ASSOCIATE-RQ PDU received
    [__, Some((Ae6, Next::OnAcceptance)), t(Aa8, Sta13), __, t(Aa8, Sta13), t(Aa8, Sta13),
        t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13),
        t(Aa7, Sta13)],
    // A-ASSOCIATE response accept (local user)
    [__, __, t(Ae7, Sta6), __, __, __, __, __, __, __, __, __, __],
    // A-ASSOCIATE response reject (local user)
    [__, __, t(Ae8, Sta13), __, __, __, __, __, __, __, __, __, __],
    // P-DATA request (local user)
    [__, __, __, __, __, t(Dt1, Sta6), __, t(Ar7, Sta8), __, __, __, __, __],
    // P-DATA-TF PDU received
    [__, t(Aa1, Sta13), t(Aa8, Sta13), __, t(Aa8, Sta13), t(Dt2, Sta6), t(Ar6, Sta7),
        t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa6, Sta13)],
    // A-RELEASE request (local user)
    [__, __, __, __, __, t(Ar1, Sta7), __, __, __, __, __, __, __],
    // A-RELEASE-RQ PDU received
    [__, t(Aa1, Sta13), t(Aa8, Sta13), __, t(Aa8, Sta13), t(Ar2, Sta8),
        Some((Ar8, Next::OnRole)), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13),
        t(Aa8, Sta13), t(Aa6, Sta13)],
    // A-RELEASE-RP PDU received
    [__, t(Aa1, Sta13), t(Aa8, Sta13), __, t(Aa8, Sta13), t(Aa8, Sta13), t(Ar3, Sta1),
        t(Aa8, Sta13), t(Aa8, Sta13), t(Ar10, Sta12), t(Ar3, Sta1), t(Aa8, Sta13), t(Aa6, Sta13)],
    // A-RELEASE response (local user)
    [__, __, __, __, __, __, __, t(Ar4, Sta13), t(Ar9, Sta11), __, __, t(Ar4, Sta13), __],
    // A-ABORT request (local user)
    [__, __, t(Aa1, Sta13), t(Aa2, Sta1), t(Aa1, Sta13), t(Aa1, Sta13), t(Aa1, Sta13),
        t(Aa1, Sta13), t(Aa1, Sta13), t(Aa1, Sta13), t(Aa1, Sta13), t(Aa1, Sta13), __],
    // A-ABORT PDU received
    [__, t(Aa2, Sta1), t(Aa3, Sta1), __, t(Aa3, Sta1), t(Aa3, Sta1), t(Aa3, Sta1),
        t(Aa3, Sta1), t(Aa3, Sta1), t(Aa3, Sta1), t(Aa3, Sta1), t(Aa3, Sta1), t(Aa2, Sta1)],
    // transport connection closed
    [t(Aa6, Sta1), t(Aa5, Sta1), t(Aa4, Sta1), t(Aa4, Sta1), t(Aa4, Sta1), t(Aa4, Sta1),
        t(Aa4, Sta1), t(Aa4, Sta1), t(Aa4, Sta1), t(Aa4, Sta1), t(Aa4, Sta1), t(Aa4, Sta1),
        t(Ar5, Sta1)],
    // ARTIM timer expired
    [__, t(Aa2, Sta1), __, __, __, __, __, __, __, __, __, __, t(Aa2, Sta1)],
    // unrecognized or invalid PDU received
    [__, t(Aa1, Sta13), t(Aa8, Sta13), __, t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13),
        t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa8, Sta13), t(Aa7, Sta13)],
];

/// Look up the transition for an event arriving in a state.
///
/// `None` means the event is not defined for the state
/// and injecting it is a local fault.
pub fn lookup(event: Event, state: State) -> Cell {
    TABLE[event.row()][state.column()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_primitives_have_narrow_rows() {
        // local association request is only valid in idle
        for state in [Sta2, Sta3, Sta5, Sta6, Sta13] {
            assert_eq!(lookup(Event::AssociateRequest, state), None);
        }
        assert_eq!(lookup(Event::AssociateRequest, Sta1), t(Ae1, Sta4));

        // P-DATA requests only while data transfer is possible
        assert_eq!(lookup(Event::PDataRequest, Sta6), t(Dt1, Sta6));
        assert_eq!(lookup(Event::PDataRequest, Sta8), t(Ar7, Sta8));
        assert_eq!(lookup(Event::PDataRequest, Sta7), None);
    }

    #[test]
    fn artim_expiry_is_only_defined_while_waiting() {
        for state in [Sta1, Sta3, Sta4, Sta5, Sta6, Sta7, Sta8, Sta9, Sta10, Sta11, Sta12] {
            assert_eq!(lookup(Event::ArtimExpired, state), None);
        }
        assert_eq!(lookup(Event::ArtimExpired, Sta2), t(Aa2, Sta1));
        assert_eq!(lookup(Event::ArtimExpired, Sta13), t(Aa2, Sta1));
    }

    #[test]
    fn conditional_cells() {
        assert_eq!(
            lookup(Event::AssociateRqReceived, Sta2),
            Some((Ae6, Next::OnAcceptance))
        );
        assert_eq!(
            lookup(Event::ReleaseRqReceived, Sta7),
            Some((Ar8, Next::OnRole))
        );
    }

    #[test]
    fn transport_closure_always_returns_to_idle() {
        for state in [
            Sta1, Sta2, Sta3, Sta4, Sta5, Sta6, Sta7, Sta8, Sta9, Sta10, Sta11, Sta12, Sta13,
        ] {
            let (_, next) = lookup(Event::TransportClosed, state).unwrap();
            assert_eq!(next, Next::To(Sta1));
        }
    }
}
