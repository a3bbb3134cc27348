//! In-memory backend.

use crate::error::{ClientError, Result};
use crate::providers::Backend;
use crate::types::{Event, IdentityAssertion, ResourceId, Session, Ticket};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// A request the mock backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `GET /events`
    ListEvents,
    /// `GET /tickets/user/{user_id}`
    ListTickets {
        /// Requested user.
        user_id: ResourceId,
    },
    /// `POST /auth/google`
    Authenticate {
        /// Email of the asserted identity.
        email: String,
    },
    /// `POST /tickets/purchase`
    Purchase {
        /// Buyer.
        user_id: ResourceId,
        /// Event.
        event_id: ResourceId,
    },
    /// `POST /tickets/cancel`
    Cancel {
        /// Owner.
        user_id: ResourceId,
        /// Ticket.
        ticket_id: ResourceId,
    },
}

#[derive(Debug)]
struct Inventory {
    events: Vec<Event>,
    tickets: HashMap<ResourceId, Vec<Ticket>>,
    ticket_events: HashMap<ResourceId, ResourceId>,
    issued: u32,
    login: Result<Session>,
    purchase_outcomes: VecDeque<Result<()>>,
    cancel_outcomes: VecDeque<Result<()>>,
    list_failure: Option<ClientError>,
    calls: Vec<BackendCall>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            tickets: HashMap::new(),
            ticket_events: HashMap::new(),
            issued: 0,
            login: Err(ClientError::Rejected {
                reason: Some("Unknown identity".to_string()),
            }),
            purchase_outcomes: VecDeque::new(),
            cancel_outcomes: VecDeque::new(),
            list_failure: None,
            calls: Vec::new(),
        }
    }
}

/// Backend double that behaves like the real one on the happy path.
///
/// A successful purchase takes a seat from the event and issues a ticket to
/// the buyer; a successful cancel gives the seat back. Scripted failures
/// (`fail_next_purchase`, `fail_next_cancel`) are consumed one per request.
/// Every request is recorded.
///
/// Clones share the same inventory.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inventory: Arc<Mutex<Inventory>>,
    purchase_gate: Option<Arc<Semaphore>>,
}

impl MockBackend {
    /// Empty backend that rejects every login.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inventory(&self) -> MutexGuard<'_, Inventory> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the catalog.
    #[must_use]
    pub fn with_events(self, events: Vec<Event>) -> Self {
        self.inventory().events = events;
        self
    }

    /// Seed a user's tickets.
    #[must_use]
    pub fn with_tickets(self, user_id: impl Into<ResourceId>, tickets: Vec<Ticket>) -> Self {
        self.inventory().tickets.insert(user_id.into(), tickets);
        self
    }

    /// Answer logins with `session`.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        self.inventory().login = Ok(session);
        self
    }

    /// Answer logins with `success: false`.
    #[must_use]
    pub fn rejecting_logins(self, reason: Option<&str>) -> Self {
        self.inventory().login = Err(ClientError::Rejected {
            reason: reason.map(ToString::to_string),
        });
        self
    }

    /// Make purchases wait until [`MockBackend::release_purchase`] is called.
    #[must_use]
    pub fn holding_purchases(mut self) -> Self {
        self.purchase_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held purchase through.
    pub fn release_purchase(&self) {
        if let Some(gate) = &self.purchase_gate {
            gate.add_permits(1);
        }
    }

    /// Script the outcome of the next purchase.
    pub fn fail_next_purchase(&self, error: ClientError) {
        self.inventory().purchase_outcomes.push_back(Err(error));
    }

    /// Fail every listing request from now on with `error`.
    pub fn fail_listings(&self, error: ClientError) {
        self.inventory().list_failure = Some(error);
    }

    /// Script the outcome of the next cancellation.
    pub fn fail_next_cancel(&self, error: ClientError) {
        self.inventory().cancel_outcomes.push_back(Err(error));
    }

    /// Every request so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.inventory().calls.clone()
    }

    fn count(&self, matches: impl Fn(&BackendCall) -> bool) -> usize {
        self.inventory().calls.iter().filter(|call| matches(call)).count()
    }

    /// Number of `GET /events` requests.
    #[must_use]
    pub fn event_list_calls(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::ListEvents))
    }

    /// Number of `GET /tickets/user/{id}` requests.
    #[must_use]
    pub fn ticket_list_calls(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::ListTickets { .. }))
    }

    /// Number of purchase requests.
    #[must_use]
    pub fn purchase_calls(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Purchase { .. }))
    }

    /// Number of cancel requests.
    #[must_use]
    pub fn cancel_calls(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Cancel { .. }))
    }

    /// Current state of an event.
    #[must_use]
    pub fn event(&self, event_id: &ResourceId) -> Option<Event> {
        self.inventory()
            .events
            .iter()
            .find(|event| &event.id == event_id)
            .cloned()
    }

    fn settle_purchase(&self, user_id: &ResourceId, event_id: &ResourceId) -> Result<()> {
        let mut inventory = self.inventory();
        if let Some(outcome) = inventory.purchase_outcomes.pop_front() {
            outcome?;
        }

        let Some(event) = inventory.events.iter_mut().find(|e| &e.id == event_id) else {
            return Err(ClientError::Rejected {
                reason: Some("Event not found".to_string()),
            });
        };
        if event.available_tickets == 0 {
            return Err(ClientError::Rejected {
                reason: Some("Sold out".to_string()),
            });
        }
        event.available_tickets -= 1;
        let name = event.name.clone();
        let venue = event.venue.clone();
        let date = event.date;

        inventory.issued += 1;
        let ticket_id = ResourceId::new(format!("tkt-{}", inventory.issued));
        let mut ticket = crate::mocks::sample_ticket(ticket_id.as_str());
        ticket.user_id = Some(user_id.clone());
        ticket.event = Some(crate::types::TicketEvent {
            name,
            date,
            venue,
        });

        inventory
            .ticket_events
            .insert(ticket_id, event_id.clone());
        inventory
            .tickets
            .entry(user_id.clone())
            .or_default()
            .push(ticket);
        Ok(())
    }

    fn settle_cancel(&self, user_id: &ResourceId, ticket_id: &ResourceId) -> Result<()> {
        let mut inventory = self.inventory();
        if let Some(outcome) = inventory.cancel_outcomes.pop_front() {
            outcome?;
        }

        let owned = inventory
            .tickets
            .get_mut(user_id)
            .and_then(|tickets| {
                let index = tickets.iter().position(|t| &t.id == ticket_id)?;
                Some(tickets.remove(index))
            });
        if owned.is_none() {
            return Err(ClientError::Rejected {
                reason: Some("Ticket not found".to_string()),
            });
        }

        if let Some(event_id) = inventory.ticket_events.remove(ticket_id) {
            if let Some(event) = inventory.events.iter_mut().find(|e| e.id == event_id) {
                event.available_tickets += 1;
            }
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let mut inventory = self.inventory();
        inventory.calls.push(BackendCall::ListEvents);
        let result = match &inventory.list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(inventory.events.clone()),
        };
        drop(inventory);

        async move { result }
    }

    fn list_tickets(
        &self,
        user_id: &ResourceId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let mut inventory = self.inventory();
        inventory.calls.push(BackendCall::ListTickets {
            user_id: user_id.clone(),
        });
        let result = match &inventory.list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(inventory.tickets.get(user_id).cloned().unwrap_or_default()),
        };
        drop(inventory);

        async move { result }
    }

    fn authenticate(
        &self,
        identity: &IdentityAssertion,
    ) -> impl Future<Output = Result<Session>> + Send {
        let mut inventory = self.inventory();
        inventory.calls.push(BackendCall::Authenticate {
            email: identity.email.clone(),
        });
        let result = inventory.login.clone();
        drop(inventory);

        async move { result }
    }

    fn purchase(
        &self,
        user_id: &ResourceId,
        event_id: &ResourceId,
    ) -> impl Future<Output = Result<()>> + Send {
        self.inventory().calls.push(BackendCall::Purchase {
            user_id: user_id.clone(),
            event_id: event_id.clone(),
        });
        let backend = self.clone();
        let user_id = user_id.clone();
        let event_id = event_id.clone();

        async move {
            if let Some(gate) = &backend.purchase_gate {
                match gate.acquire().await {
                    Ok(permit) => permit.forget(),
                    Err(_) => return Err(ClientError::Transport("gate closed".to_string())),
                }
            }
            backend.settle_purchase(&user_id, &event_id)
        }
    }

    fn cancel(
        &self,
        user_id: &ResourceId,
        ticket_id: &ResourceId,
    ) -> impl Future<Output = Result<()>> + Send {
        self.inventory().calls.push(BackendCall::Cancel {
            user_id: user_id.clone(),
            ticket_id: ticket_id.clone(),
        });
        let result = self.settle_cancel(user_id, ticket_id);

        async move { result }
    }
}
