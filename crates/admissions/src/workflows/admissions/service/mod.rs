//! Admissions commands and queries.
//!
//! Every operation takes the calling [`Actor`], consults the access guard before touching
//! an entity, and drives status changes through the lifecycle transition function.

mod applications;
mod documents;
mod interviews;
mod staff;
mod students;
mod users;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use validator::Validate;

use super::access::{can_access, has_unconditional, Action, Actor, Resource, ResourceKind};
use super::clock::{Clock, SystemClock};
use super::credentials::{Argon2PasswordHasher, PasswordHasher, TokenService};
use super::domain::{Application, Document, Interview, UserId};
use super::error::{AdmissionsError, StoreResultExt};
use super::numbering::{ApplicationNumberGenerator, RandomApplicationNumbers};
use super::policy::AdmissionsPolicy;
use super::repository::AdmissionsStore;
use super::requests;

/// Service composing the store, access guard, and lifecycle rules.
pub struct AdmissionsService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    numbers: Arc<dyn ApplicationNumberGenerator>,
    passwords: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    policy: AdmissionsPolicy,
}

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    pub fn new(store: Arc<S>, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            numbers: Arc::new(RandomApplicationNumbers),
            passwords: Arc::new(Argon2PasswordHasher),
            tokens,
            policy: AdmissionsPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_numbers(mut self, numbers: Arc<dyn ApplicationNumberGenerator>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_passwords(mut self, passwords: Arc<dyn PasswordHasher>) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn with_policy(mut self, policy: AdmissionsPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> &AdmissionsPolicy {
        &self.policy
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Access facts for an application or anything hanging off it. The interviewer is
    /// resolved through the staff record's linked login.
    fn application_resource(
        &self,
        kind: ResourceKind,
        application: &Application,
        operation: &str,
    ) -> Result<Resource, AdmissionsError> {
        let interviewer = match self
            .store
            .interview_by_application(&application.id)
            .or_fail(operation)?
        {
            Some(interview) => self.interviewer_login(&interview, operation)?,
            None => None,
        };
        Ok(Resource::application_scoped(
            kind,
            application.submitted_by,
            interviewer,
        ))
    }

    fn interview_resource(
        &self,
        interview: &Interview,
        operation: &str,
    ) -> Result<Resource, AdmissionsError> {
        let owner = self
            .store
            .application(&interview.application_id)
            .or_fail(operation)?
            .map(|application| application.submitted_by)
            .ok_or_else(|| AdmissionsError::NotFound("Application not found".to_string()))?;
        Ok(Resource::application_scoped(
            ResourceKind::Interview,
            owner,
            self.interviewer_login(interview, operation)?,
        ))
    }

    fn document_resource(
        &self,
        document: &Document,
        operation: &str,
    ) -> Result<Resource, AdmissionsError> {
        let application = self
            .store
            .application(&document.application_id)
            .or_fail(operation)?
            .ok_or_else(|| AdmissionsError::NotFound("Application not found".to_string()))?;
        self.application_resource(ResourceKind::Document, &application, operation)
    }

    fn interviewer_login(
        &self,
        interview: &Interview,
        operation: &str,
    ) -> Result<Option<UserId>, AdmissionsError> {
        Ok(self
            .store
            .staff(&interview.interviewer_id)
            .or_fail(operation)?
            .and_then(|staff| staff.user_id))
    }
}

/// Resolves a looked-up entity against the access table.
///
/// A caller without unconditional reach over `kind` gets the same `Unauthorized` for a
/// missing entity as for one they may not touch.
fn guard<T>(
    actor: &Actor,
    kind: ResourceKind,
    action: Action,
    found: Option<T>,
    denied: &str,
    resource: impl FnOnce(&T) -> Result<Resource, AdmissionsError>,
) -> Result<T, AdmissionsError> {
    let Some(entity) = found else {
        return Err(if has_unconditional(actor.role, kind, action) {
            AdmissionsError::NotFound(format!("{} not found", kind.label()))
        } else {
            AdmissionsError::unauthorized(denied)
        });
    };
    if can_access(actor, &resource(&entity)?, action) {
        Ok(entity)
    } else {
        Err(AdmissionsError::unauthorized(denied))
    }
}

fn validated<T: Validate>(request: &T) -> Result<(), AdmissionsError> {
    match request.validate() {
        Ok(()) => Ok(()),
        Err(errors) => AdmissionsError::from_violations(requests::messages(&errors)),
    }
}
