//! Session establishment state machine shared by both gateway sessions.

use tracing::{debug, warn};

use crate::core::types::{DisconnectReason, OrderIdentity, SessionState};

/// Front/session id pair assigned by a successful login. Invalidated as a
/// whole on disconnect so no half-stale identity can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    pub front_id: i32,
    pub session_id: i32,
}

/// One live session: establishment state, identity and the monotonic
/// request/order-ref counters.
///
/// The counters survive disconnects - values are strictly increasing for
/// the lifetime of the gateway and never reused, so identities from
/// different login sessions cannot collide even across reconnects.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    identity: Option<SessionIdentity>,
    request_id: i32,
    order_ref: i32,
    settlement_confirmed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            identity: None,
            request_id: 0,
            order_ref: 0,
            settlement_confirmed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live identity, or `None` between disconnect and the next
    /// successful login.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity
    }

    pub fn next_request_id(&mut self) -> i32 {
        self.request_id += 1;
        self.request_id
    }

    pub fn next_order_ref(&mut self) -> i32 {
        self.order_ref += 1;
        self.order_ref
    }

    /// Build an order identity from the live session. Refuses when the
    /// identity is stale.
    pub fn order_identity(&self, order_ref: i32) -> Option<OrderIdentity> {
        self.identity
            .map(|id| OrderIdentity::new(id.front_id, id.session_id, order_ref))
    }

    /// `Disconnected -> Connecting`. Returns false when a connection attempt
    /// is already underway or established.
    pub fn begin_connect(&mut self) -> bool {
        if self.state == SessionState::Disconnected {
            self.transition(SessionState::Connecting);
            true
        } else {
            false
        }
    }

    /// Transport reported the front connection is up.
    pub fn on_connected(&mut self) {
        self.transition(SessionState::Connected);
    }

    /// Transport reported the front connection dropped. Identity becomes
    /// stale, the settlement latch resets, counters are preserved.
    pub fn on_disconnected(&mut self, reason: DisconnectReason) {
        warn!(%reason, previous_state = %self.state, "front connection lost");
        self.identity = None;
        self.settlement_confirmed = false;
        self.transition(SessionState::Disconnected);
    }

    /// `Connected -> Authenticating`. Returns false (no request should be
    /// sent) when authentication has already completed for this connection.
    pub fn begin_authenticate(&mut self) -> bool {
        if self.state.is_authenticated() {
            debug!(state = %self.state, "already authenticated, skipping");
            return false;
        }
        self.transition(SessionState::Authenticating);
        true
    }

    /// A non-authorized (code 63) or otherwise failed authentication drops
    /// back to `Connected` for caller-driven retry.
    pub fn authenticate_failed(&mut self) {
        self.transition(SessionState::Connected);
    }

    /// `-> AwaitingLogin`. Returns false when already logged in.
    pub fn begin_login(&mut self) -> bool {
        if self.state.is_logged_in() {
            debug!(state = %self.state, "already logged in, skipping");
            return false;
        }
        self.transition(SessionState::AwaitingLogin);
        true
    }

    /// Successful login: capture the new identity, `-> LoggedIn`.
    pub fn login_succeeded(&mut self, front_id: i32, session_id: i32) {
        self.identity = Some(SessionIdentity {
            front_id,
            session_id,
        });
        self.transition(SessionState::LoggedIn);
    }

    pub fn login_failed(&mut self) {
        self.transition(SessionState::Connected);
    }

    /// `LoggedIn -> SettlementPending`.
    pub fn begin_settlement(&mut self) {
        self.transition(SessionState::SettlementPending);
    }

    /// Final successful settlement confirmation: `-> Ready`. Latches - a
    /// session confirms settlement at most once; repeats are ignored.
    pub fn settlement_confirmed(&mut self) -> bool {
        if self.settlement_confirmed {
            return false;
        }
        self.settlement_confirmed = true;
        self.transition(SessionState::Ready);
        true
    }

    /// Failed settlement confirmation. Demotes the session only when the
    /// caller configured that behavior; by default the login stays alive.
    pub fn settlement_failed(&mut self, reset_login: bool) {
        if reset_login {
            self.transition(SessionState::Connected);
        }
    }

    /// Market data sessions have no settlement step: login lands directly
    /// in `Ready`.
    pub fn mark_ready(&mut self) {
        self.transition(SessionState::Ready);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "session state transition");
            self.state = next;
        }
    }
}
