//! Passenger requests and their lifecycle
//!
//! Requests live in a `RequestBook` owned by the controller that admitted
//! them. Everything outside the controller refers to them by `RequestId`.

use log::warn;
use std::collections::BTreeMap;

use super::error::RequestError;
use super::types::{Direction, Floor, RequestId, Tick};

/// Where a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Placed at a floor before boarding, with the desired travel direction
    HallCall { floor: Floor, direction: Direction },
    /// Placed inside the car, destination only
    CarCall { floor: Floor },
}

/// Lifecycle of a request. Variants are declared in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestState {
    Created,
    Queued,
    Assigned,
    Serving,
    Completed,
    Cancelled,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Cancelled)
    }

    /// The next state along the normal path, if any
    pub fn next(self) -> Option<RequestState> {
        match self {
            RequestState::Created => Some(RequestState::Queued),
            RequestState::Queued => Some(RequestState::Assigned),
            RequestState::Assigned => Some(RequestState::Serving),
            RequestState::Serving => Some(RequestState::Completed),
            RequestState::Completed | RequestState::Cancelled => None,
        }
    }

    pub fn can_transition_to(self, to: RequestState) -> bool {
        if to == RequestState::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

/// A hall call or car call with its lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: RequestId,
    kind: RequestKind,
    state: RequestState,
    created_tick: Tick,
    /// Tick the request reached a terminal state
    finished_tick: Option<Tick>,
}

impl Request {
    pub fn new(id: RequestId, kind: RequestKind, tick: Tick) -> Self {
        Self {
            id,
            kind,
            state: RequestState::Created,
            created_tick: tick,
            finished_tick: None,
        }
    }

    pub fn hall_call(id: RequestId, floor: Floor, direction: Direction, tick: Tick) -> Self {
        Self::new(id, RequestKind::HallCall { floor, direction }, tick)
    }

    pub fn car_call(id: RequestId, floor: Floor, tick: Tick) -> Self {
        Self::new(id, RequestKind::CarCall { floor }, tick)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn created_tick(&self) -> Tick {
        self.created_tick
    }

    pub fn finished_tick(&self) -> Option<Tick> {
        self.finished_tick
    }

    pub fn floor(&self) -> Floor {
        match self.kind {
            RequestKind::HallCall { floor, .. } | RequestKind::CarCall { floor } => floor,
        }
    }

    /// Requested travel direction; `None` for car calls
    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            RequestKind::HallCall { direction, .. } => Some(direction),
            RequestKind::CarCall { .. } => None,
        }
    }

    /// Ticks from creation to completion, for completed requests
    pub fn wait_ticks(&self) -> Option<Tick> {
        match (self.state, self.finished_tick) {
            (RequestState::Completed, Some(done)) => Some(done.saturating_sub(self.created_tick)),
            _ => None,
        }
    }

    /// Whether stopping at `floor` while travelling `direction` serves this
    /// request. Car calls ignore direction; so does an undecided sweep.
    pub fn is_served_by(&self, floor: Floor, direction: Direction) -> bool {
        if self.floor() != floor {
            return false;
        }
        match self.direction() {
            None => true,
            Some(wanted) => direction == Direction::Idle || wanted == direction,
        }
    }

    /// Take exactly one lifecycle step
    pub fn transition(&mut self, to: RequestState, tick: Tick) -> Result<(), RequestError> {
        if !self.state.can_transition_to(to) {
            return Err(RequestError {
                id: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        if to.is_terminal() {
            self.finished_tick = Some(tick);
        }
        Ok(())
    }

    /// Walk forward through every intermediate state up to `target`.
    /// Already being in `target` is not an error.
    pub fn advance_to(&mut self, target: RequestState, tick: Tick) -> Result<(), RequestError> {
        if self.state == target {
            return Ok(());
        }
        if target == RequestState::Cancelled {
            return self.transition(target, tick);
        }
        let error = RequestError {
            id: self.id,
            from: self.state,
            to: target,
        };
        if self.state.is_terminal() || self.state > target {
            return Err(error);
        }
        while self.state != target {
            let next = self.state.next().ok_or(error)?;
            self.transition(next, tick)?;
        }
        Ok(())
    }
}

/// Arena of requests keyed by id, owned by a single controller
#[derive(Debug, Clone)]
pub struct RequestBook {
    /// Non-terminal requests
    active: BTreeMap<RequestId, Request>,
    /// Completed and cancelled requests, in the order they finished
    retired: Vec<Request>,
    next_id: u64,
}

impl Default for RequestBook {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBook {
    pub fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            retired: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve a fresh id
    pub fn allocate_id(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Accept a freshly created request and queue it
    pub fn admit(&mut self, mut request: Request, tick: Tick) -> Option<RequestId> {
        let id = request.id();
        if self.get(id).is_some() {
            warn!("Refusing request {}: id already tracked", id);
            return None;
        }
        if let Err(e) = request.transition(RequestState::Queued, tick) {
            warn!("Refusing request {}: {}", id, e);
            return None;
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.active.insert(id, request);
        Some(id)
    }

    /// Cancel a non-terminal request. Unknown or finished ids return false.
    pub fn cancel(&mut self, id: RequestId, tick: Tick) -> bool {
        let Some(mut request) = self.active.remove(&id) else {
            return false;
        };
        if let Err(e) = request.transition(RequestState::Cancelled, tick) {
            warn!("{}", e);
            self.active.insert(id, request);
            return false;
        }
        self.retired.push(request);
        true
    }

    /// Cancel every active request, returning how many were cancelled
    pub fn cancel_all(&mut self, tick: Tick) -> usize {
        let ids: Vec<RequestId> = self.active.keys().copied().collect();
        ids.into_iter().filter(|id| self.cancel(*id, tick)).count()
    }

    /// Move an active request forward to `target`. Requests already at or
    /// past `target` are left alone.
    pub fn advance(&mut self, id: RequestId, target: RequestState, tick: Tick) {
        if let Some(request) = self.active.get_mut(&id) {
            if request.state() >= target {
                return;
            }
            if let Err(e) = request.advance_to(target, tick) {
                warn!("{}", e);
            }
        }
    }

    /// Move every active request matching `predicate` forward to `target`
    pub fn advance_matching(
        &mut self,
        target: RequestState,
        tick: Tick,
        predicate: impl Fn(&Request) -> bool,
    ) -> Vec<RequestId> {
        let ids = self.ids_matching(predicate);
        for id in &ids {
            self.advance(*id, target, tick);
        }
        ids
    }

    /// Complete and retire every active request matching `predicate`
    pub fn complete_matching(
        &mut self,
        tick: Tick,
        predicate: impl Fn(&Request) -> bool,
    ) -> Vec<RequestId> {
        let ids = self.ids_matching(predicate);
        for id in &ids {
            let Some(mut request) = self.active.remove(id) else {
                continue;
            };
            match request.advance_to(RequestState::Completed, tick) {
                Ok(()) => self.retired.push(request),
                Err(e) => {
                    warn!("{}", e);
                    self.active.insert(*id, request);
                }
            }
        }
        ids
    }

    pub fn ids_matching(&self, predicate: impl Fn(&Request) -> bool) -> Vec<RequestId> {
        self.active
            .values()
            .filter(|r| predicate(r))
            .map(Request::id)
            .collect()
    }

    /// Look up a request whether active or retired
    pub fn get(&self, id: RequestId) -> Option<&Request> {
        self.active
            .get(&id)
            .or_else(|| self.retired.iter().find(|r| r.id() == id))
    }

    /// Active requests in id order
    pub fn active(&self) -> impl Iterator<Item = &Request> {
        self.active.values()
    }

    pub fn retired(&self) -> &[Request] {
        &self.retired
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }
}
