use chrono::Datelike;
use tracing::info;

use super::{guard, validated, AdmissionsService};
use crate::workflows::admissions::access::{
    has_unconditional, Action, Actor, Resource, ResourceKind,
};
use crate::workflows::admissions::domain::{Staff, StaffId, StaffStatus};
use crate::workflows::admissions::eligibility::age_on;
use crate::workflows::admissions::error::{AdmissionsError, StoreResultExt};
use crate::workflows::admissions::repository::AdmissionsStore;
use crate::workflows::admissions::requests::{CreateStaffRequest, UpdateStaffStatusRequest};

const NO_ACCESS: &str = "You do not have access to this staff record";

fn staff_number(year: i32, sequence: usize) -> String {
    format!("STF-{year}-{sequence:04}")
}

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    pub fn create_staff(
        &self,
        actor: &Actor,
        request: CreateStaffRequest,
    ) -> Result<Staff, AdmissionsError> {
        const OP: &str = "creating staff";
        if !has_unconditional(actor.role, ResourceKind::Staff, Action::Edit) {
            return Err(AdmissionsError::unauthorized(
                "Only school administrators can create staff",
            ));
        }
        validated(&request)?;

        let age = age_on(request.date_of_birth, self.today());
        if !(self.policy.minimum_staff_age..=self.policy.maximum_staff_age).contains(&age) {
            return Err(AdmissionsError::invalid(format!(
                "Staff must be between {} and {} years old",
                self.policy.minimum_staff_age, self.policy.maximum_staff_age
            )));
        }

        let email = request.email.trim().to_lowercase();
        if self.store.staff_by_email(&email).or_fail(OP)?.is_some() {
            return Err(AdmissionsError::Conflict(
                "Staff with this email already exists".to_string(),
            ));
        }
        if let Some(user_id) = request.user_id {
            if self.store.user(&user_id).or_fail(OP)?.is_none() {
                return Err(AdmissionsError::NotFound(
                    "Linked user account not found".to_string(),
                ));
            }
            if self.store.staff_by_user(&user_id).or_fail(OP)?.is_some() {
                return Err(AdmissionsError::Conflict(
                    "User account is already linked to a staff record".to_string(),
                ));
            }
        }

        let now = self.now();
        let sequence = self.store.staff_count().or_fail(OP)? + 1;
        let staff = Staff {
            id: StaffId::new(),
            user_id: request.user_id,
            staff_number: staff_number(now.year(), sequence),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            middle_name: request.middle_name,
            email,
            phone_number: request.phone_number,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            staff_type: request.staff_type,
            department: request.department,
            qualification: request.qualification,
            employment_date: request.employment_date,
            status: StaffStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let staff = self.store.insert_staff(staff).or_fail(OP)?;
        info!(staff_id = %staff.id, staff_number = %staff.staff_number, "staff created");
        Ok(staff)
    }

    pub fn update_staff_status(
        &self,
        actor: &Actor,
        id: StaffId,
        request: UpdateStaffStatusRequest,
    ) -> Result<Staff, AdmissionsError> {
        const OP: &str = "updating staff status";
        let found = self.store.staff(&id).or_fail(OP)?;
        let mut staff = guard(
            actor,
            ResourceKind::Staff,
            Action::Edit,
            found,
            "Only school administrators can change staff status",
            |staff| Ok(Resource::staff(staff.staff_type)),
        )?;

        if staff.status == request.status {
            return Err(AdmissionsError::InvalidState(format!(
                "Staff is already {}",
                staff.status.label()
            )));
        }
        let previous = staff.status;
        staff.status = request.status;
        staff.updated_at = self.now();

        self.store.update_staff(staff.clone()).or_fail(OP)?;
        info!(
            staff_id = %staff.id,
            from = previous.label(),
            to = staff.status.label(),
            "staff status changed"
        );
        Ok(staff)
    }

    pub fn staff_member(&self, actor: &Actor, id: StaffId) -> Result<Staff, AdmissionsError> {
        let found = self.store.staff(&id).or_fail("loading staff")?;
        guard(
            actor,
            ResourceKind::Staff,
            Action::View,
            found,
            NO_ACCESS,
            |staff| Ok(Resource::staff(staff.staff_type)),
        )
    }
}
