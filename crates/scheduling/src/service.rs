use crate::error::ServiceError;
use crate::guard;
use crate::lifecycle::Lifecycle;
use crate::resource::{Params, Resource};
use core_types::{
    Entity, Filter, Schedule, Shift, ShiftTemplate, ShiftType, Team, TeamMember, User, Value,
};
use database::{Store, StoreTx};
use pagination::{Page, PageLimits, PageRequest};
use serde::Serialize;
use tracing::{info, instrument, warn};
use validation::Validate;

/// A schedule with its shifts, in start-time order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub shifts: Vec<Shift>,
}

/// One weekday of a template with its shift type resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDay {
    pub weekday: &'static str,
    pub shift_type: Option<ShiftType>,
}

/// A template with its seven days resolved, Monday first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: ShiftTemplate,
    pub days: Vec<TemplateDay>,
}

/// A team with the users pointing at it and its membership records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub users: Vec<User>,
    pub members: Vec<TeamMember>,
}

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn ensure_valid<E: Entity + Validate>(record: &E) -> Result<(), ServiceError> {
    let outcome = record.validate();
    if outcome.valid {
        return Ok(());
    }
    let messages = outcome.messages();
    warn!(entity = %E::KIND, first = ?messages.first(), "validation rejected record");
    Err(ServiceError::Validation { messages })
}

/// Validated CRUD over every scheduling collection.
///
/// Every write validates first and then runs in its own transaction; deletes
/// go through the dependency guard.
#[derive(Debug, Clone)]
pub struct Scheduling<S> {
    store: S,
    limits: PageLimits,
}

impl<S: Store> Scheduling<S> {
    pub fn new(store: S, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    pub fn lifecycle(&self) -> Lifecycle<S> {
        Lifecycle::new(self.store.clone())
    }

    /// Fails with `StoreUnavailable` when the store cannot be reached.
    pub async fn health(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }

    /// One page of a collection in its stable order.
    #[instrument(skip(self, params), fields(entity = R::KIND.label()))]
    pub async fn list<R: Resource>(&self, params: &Params) -> Result<Page<R>, ServiceError> {
        let request = PageRequest::from_params(params, &self.limits);
        let filter = R::list_filter(params);
        let (rows, total) = self
            .store
            .find::<R>(&filter, &R::default_sort(), Some(request.window()))
            .await?;
        Ok(Page::new(rows, total, &request))
    }

    #[instrument(skip(self), fields(entity = R::KIND.label()))]
    pub async fn get<R: Resource>(&self, id: i64) -> Result<R, ServiceError> {
        Ok(self.store.find_by_id::<R>(id).await?)
    }

    #[instrument(skip(self, draft), fields(entity = R::KIND.label()))]
    pub async fn create<R: Resource>(&self, draft: R::Draft) -> Result<R, ServiceError> {
        let record = R::from_draft(draft);
        ensure_valid(&record)?;

        let mut tx = self.store.begin().await?;
        let created = tx.insert(record).await?;
        tx.commit().await?;

        info!(id = created.id(), "record created");
        Ok(created)
    }

    /// Applies a partial update. The merged record must pass validation as a whole.
    #[instrument(skip(self, patch), fields(entity = R::KIND.label()))]
    pub async fn update<R: Resource>(&self, id: i64, patch: R::Patch) -> Result<R, ServiceError> {
        let mut tx = self.store.begin().await?;
        let mut record = tx.lock::<R>(id).await?;
        record.apply_patch(patch);
        ensure_valid(&record)?;

        let updated = tx.update(record).await?;
        tx.commit().await?;

        info!(id, "record updated");
        Ok(updated)
    }

    /// Soft-deletes a record that nothing live references.
    #[instrument(skip(self), fields(entity = R::KIND.label()))]
    pub async fn delete<R: Resource>(&self, id: i64) -> Result<(), ServiceError> {
        guard::guarded_delete::<S, R>(&self.store, id).await
    }

    /// A schedule preloaded with its shifts.
    #[instrument(skip(self))]
    pub async fn schedule_detail(&self, id: i64) -> Result<ScheduleDetail, ServiceError> {
        let schedule = self.store.find_by_id::<Schedule>(id).await?;
        let filter = Filter::new().eq("schedule_id", Value::id(id));
        let (shifts, _) = self
            .store
            .find::<Shift>(&filter, &Shift::default_sort(), None)
            .await?;
        Ok(ScheduleDetail { schedule, shifts })
    }

    /// A template preloaded with the shift type of each weekday.
    #[instrument(skip(self))]
    pub async fn template_detail(&self, id: i64) -> Result<TemplateDetail, ServiceError> {
        let template = self.store.find_by_id::<ShiftTemplate>(id).await?;
        let mut days = Vec::with_capacity(WEEKDAYS.len());
        for (weekday, shift_type_id) in WEEKDAYS.into_iter().zip(template.days()) {
            let shift_type = match shift_type_id {
                Some(shift_type_id) => {
                    Some(self.store.find_by_id::<ShiftType>(shift_type_id).await?)
                }
                None => None,
            };
            days.push(TemplateDay {
                weekday,
                shift_type,
            });
        }
        Ok(TemplateDetail { template, days })
    }

    /// A team preloaded with its users and memberships.
    #[instrument(skip(self))]
    pub async fn team_detail(&self, id: i64) -> Result<TeamDetail, ServiceError> {
        let team = self.store.find_by_id::<Team>(id).await?;
        let by_team = Filter::new().eq("team_id", Value::id(id));
        let (users, _) = self
            .store
            .find::<User>(&by_team, &User::default_sort(), None)
            .await?;
        let (members, _) = self
            .store
            .find::<TeamMember>(&by_team, &TeamMember::default_sort(), None)
            .await?;
        Ok(TeamDetail {
            team,
            users,
            members,
        })
    }
}
