use tracing::{info, warn};

use super::{guard, validated, AdmissionsService};
use crate::workflows::admissions::access::{Action, Actor, Resource, ResourceKind};
use crate::workflows::admissions::domain::{
    Student, StudentId, StudentStatus, UserId, UserRole, UserStatus,
};
use crate::workflows::admissions::eligibility::age_on;
use crate::workflows::admissions::error::{AdmissionsError, StoreResultExt};
use crate::workflows::admissions::repository::AdmissionsStore;
use crate::workflows::admissions::requests::{
    CreateStudentRequest, StudentSearch, UpdateStudentRequest,
};
use crate::workflows::admissions::views::{Page, StudentView};

const NOT_YOURS: &str = "Student not found or does not belong to you";
const DEFAULT_NATIONALITY: &str = "Nigerian";

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    /// Adds a student profile under the calling parent's account.
    pub fn create_student(
        &self,
        actor: &Actor,
        request: CreateStudentRequest,
    ) -> Result<StudentView, AdmissionsError> {
        const OP: &str = "creating student";
        if actor.role != UserRole::Parent {
            return Err(AdmissionsError::unauthorized(
                "Only parents can create student profiles",
            ));
        }
        validated(&request)?;

        let parent = self
            .store
            .user(&actor.user_id)
            .or_fail(OP)?
            .ok_or_else(|| AdmissionsError::NotFound("Parent account not found".to_string()))?;
        if parent.status != UserStatus::Active {
            return Err(AdmissionsError::InvalidState(
                "Parent account must be active to add students".to_string(),
            ));
        }

        self.ensure_student_contact_available(
            request.email.as_deref(),
            request.phone_number.as_deref(),
            None,
            OP,
        )?;

        let today = self.today();
        let age = age_on(request.date_of_birth, today);
        if age < self.policy.minimum_student_age {
            return Err(AdmissionsError::invalid(format!(
                "Student must be at least {} years old",
                self.policy.minimum_student_age
            )));
        }
        if age > self.policy.student_age_warning {
            warn!(age, parent_id = %actor.user_id, "student is older than the usual intake age");
        }

        let now = self.now();
        let student = Student {
            id: StudentId::new(),
            parent_user_id: actor.user_id,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            middle_name: request.middle_name,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            religion: request.religion,
            email: request.email.map(|email| email.trim().to_lowercase()),
            phone_number: request.phone_number,
            address: request.address,
            previous_school: request.previous_school,
            previous_class: request.previous_class,
            state_of_origin: request.state_of_origin,
            lga: request.lga,
            nationality: request
                .nationality
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NATIONALITY.to_string()),
            selected_stream: request.selected_stream,
            status: StudentStatus::Prospective,
            father: request.father,
            mother: request.mother,
            guardian: request.guardian,
            admission_number: None,
            created_at: now,
            updated_at: now,
        };

        let student = self.store.insert_student(student).or_fail(OP)?;
        info!(student_id = %student.id, parent_id = %actor.user_id, "student created");
        Ok(StudentView { student, age })
    }

    pub fn update_student(
        &self,
        actor: &Actor,
        id: StudentId,
        request: UpdateStudentRequest,
    ) -> Result<StudentView, AdmissionsError> {
        const OP: &str = "updating student";
        validated(&request)?;

        let found = self.store.student(&id).or_fail(OP)?;
        let mut student = guard(
            actor,
            ResourceKind::Student,
            Action::Edit,
            found,
            NOT_YOURS,
            |student| Ok(Resource::student(student.parent_user_id)),
        )?;

        let email = request.email.map(|email| email.trim().to_lowercase());
        self.ensure_student_contact_available(
            email.as_deref(),
            request.phone_number.as_deref(),
            Some(student.id),
            OP,
        )?;

        if let Some(first_name) = request.first_name {
            student.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            student.last_name = last_name.trim().to_string();
        }
        if request.middle_name.is_some() {
            student.middle_name = request.middle_name;
        }
        if request.religion.is_some() {
            student.religion = request.religion;
        }
        if email.is_some() {
            student.email = email;
        }
        if request.phone_number.is_some() {
            student.phone_number = request.phone_number;
        }
        if !request.address.is_empty() {
            student.address = request.address.merged_onto(&student.address);
        }
        if request.previous_school.is_some() {
            student.previous_school = request.previous_school;
        }
        if request.previous_class.is_some() {
            student.previous_class = request.previous_class;
        }
        if request.selected_stream.is_some() {
            student.selected_stream = request.selected_stream;
        }
        if request.father.is_some() {
            student.father = request.father;
        }
        if request.mother.is_some() {
            student.mother = request.mother;
        }
        if request.guardian.is_some() {
            student.guardian = request.guardian;
        }
        student.updated_at = self.now();

        self.store.update_student(student.clone()).or_fail(OP)?;
        info!(student_id = %student.id, "student updated");
        Ok(self.student_view(student))
    }

    pub fn student(&self, actor: &Actor, id: StudentId) -> Result<StudentView, AdmissionsError> {
        let found = self.store.student(&id).or_fail("loading student")?;
        let student = guard(
            actor,
            ResourceKind::Student,
            Action::View,
            found,
            NOT_YOURS,
            |student| Ok(Resource::student(student.parent_user_id)),
        )?;
        Ok(self.student_view(student))
    }

    /// Paged search across all students. Admissions staff only.
    pub fn students(
        &self,
        actor: &Actor,
        query: StudentSearch,
    ) -> Result<Page<StudentView>, AdmissionsError> {
        if !actor.role.is_admissions_staff() {
            return Err(AdmissionsError::unauthorized(
                "Only admissions staff can search students",
            ));
        }
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());
        let matches = self
            .store
            .search_students(search)
            .or_fail("searching students")?
            .into_iter()
            .map(|student| self.student_view(student))
            .collect();
        Ok(Page::slice(
            matches,
            query.page.unwrap_or(1),
            self.policy.page_size(query.page_size),
        ))
    }

    pub fn students_by_parent(
        &self,
        actor: &Actor,
        parent: UserId,
    ) -> Result<Vec<StudentView>, AdmissionsError> {
        if actor.user_id != parent && !actor.role.is_admissions_staff() {
            return Err(AdmissionsError::unauthorized(
                "You can only view your own students",
            ));
        }
        Ok(self
            .store
            .students_by_parent(&parent)
            .or_fail("loading students")?
            .into_iter()
            .map(|student| self.student_view(student))
            .collect())
    }

    fn student_view(&self, student: Student) -> StudentView {
        let age = age_on(student.date_of_birth, self.today());
        StudentView { student, age }
    }

    /// Student email and phone are unique across student profiles. `current` skips the
    /// profile being edited.
    fn ensure_student_contact_available(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
        current: Option<StudentId>,
        operation: &str,
    ) -> Result<(), AdmissionsError> {
        let taken = |other: Option<Student>| other.is_some_and(|s| Some(s.id) != current);
        if let Some(email) = email {
            if taken(self.store.student_by_email(email).or_fail(operation)?) {
                return Err(AdmissionsError::Conflict(
                    "A student with this email already exists".to_string(),
                ));
            }
        }
        if let Some(phone_number) = phone_number {
            if taken(self.store.student_by_phone(phone_number).or_fail(operation)?) {
                return Err(AdmissionsError::Conflict(
                    "A student with this phone number already exists".to_string(),
                ));
            }
        }
        Ok(())
    }
}
