//! Trip entry form controller.
//!
//! # Responsibility
//! - Hold one mutable draft plus its derived validity flag.
//! - Reject unusable cost input at the edge instead of storing it.
//! - Persist the draft through the repository only when it is valid.
//!
//! # Invariants
//! - `is_valid` always equals `draft.is_valid()` after any draft change.
//! - `save`/`save_changes` never touch the repository for an invalid draft.
//! - Saving does not clear the draft.

use crate::model::trip::{Trip, TripDraft, TripId};
use crate::repo::trips_repository::TripsRepository;
use crate::store::StoreResult;
use log::debug;

/// Renderable form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFormState {
    pub draft: TripDraft,
    pub is_valid: bool,
}

impl TripFormState {
    fn from_draft(draft: TripDraft) -> Self {
        let is_valid = draft.is_valid();
        Self { draft, is_valid }
    }
}

/// Partial draft update; `None` fields keep their current value.
///
/// `cost` is raw field text and is parsed on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripDraftPatch {
    pub id: Option<TripId>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub fare_class: Option<String>,
    pub cost: Option<String>,
}

impl TripDraftPatch {
    pub fn id(mut self, id: TripId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn fare_class(mut self, fare_class: impl Into<String>) -> Self {
        self.fare_class = Some(fare_class.into());
        self
    }

    pub fn cost(mut self, cost: impl Into<String>) -> Self {
        self.cost = Some(cost.into());
        self
    }

    fn apply(self, draft: &mut TripDraft) {
        if let Some(id) = self.id {
            draft.id = id;
        }
        if let Some(origin) = self.origin {
            draft.origin = origin;
        }
        if let Some(destination) = self.destination {
            draft.destination = destination;
        }
        if let Some(fare_class) = self.fare_class {
            draft.fare_class = fare_class;
        }
        if let Some(raw) = self.cost {
            match parse_cost_input(&raw) {
                Some(cost) => draft.cost = cost,
                None => debug!("event=draft_update module=form status=rejected field=cost"),
            }
        }
    }
}

/// Parses cost field text into a non-negative amount.
///
/// Returns `None` for empty, negative, fractional or non-numeric input.
pub fn parse_cost_input(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Form controller for creating or editing one trip.
pub struct TripEntryForm<R: TripsRepository> {
    repo: R,
    state: TripFormState,
}

impl<R: TripsRepository> TripEntryForm<R> {
    /// Starts with an empty, invalid draft.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: TripFormState::default(),
        }
    }

    /// Starts with `trip` loaded for editing.
    pub fn for_trip(repo: R, trip: &Trip) -> Self {
        Self {
            repo,
            state: TripFormState::from_draft(TripDraft::from(trip)),
        }
    }

    pub fn state(&self) -> &TripFormState {
        &self.state
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Merges `patch` over the draft and recomputes validity.
    pub fn update_draft(&mut self, patch: TripDraftPatch) -> &TripFormState {
        let mut draft = self.state.draft.clone();
        patch.apply(&mut draft);
        self.state = TripFormState::from_draft(draft);
        &self.state
    }

    /// Replaces the whole draft and recomputes validity.
    pub fn replace_draft(&mut self, draft: TripDraft) -> &TripFormState {
        self.state = TripFormState::from_draft(draft);
        &self.state
    }

    /// Inserts the draft when valid.
    ///
    /// Returns `Ok(None)` without touching the repository when the draft is
    /// invalid. Storage faults propagate unchanged.
    pub async fn save(&self) -> StoreResult<Option<TripId>> {
        if let Err(reason) = self.state.draft.validate() {
            debug!("event=trip_save module=form status=skipped reason={reason:?}");
            return Ok(None);
        }
        let id = self.repo.insert_trip(&self.state.draft.to_trip()).await?;
        Ok(Some(id))
    }

    /// Updates the stored trip with the draft's id when valid.
    ///
    /// Returns `Ok(None)` for an invalid draft, otherwise the rows changed.
    pub async fn save_changes(&self) -> StoreResult<Option<usize>> {
        if let Err(reason) = self.state.draft.validate() {
            debug!("event=trip_save_changes module=form status=skipped reason={reason:?}");
            return Ok(None);
        }
        let changed = self.repo.update_trip(&self.state.draft.to_trip()).await?;
        Ok(Some(changed))
    }
}
