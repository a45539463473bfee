use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime};

use super::documents::DocumentRuleError;
use super::domain::{
    Application, ApplicationId, ApplicationStatus, Document, DocumentId, Interview, InterviewId,
    InterviewStatus, Staff, StaffId, StaffStatus, StaffType, Student, StudentId, User, UserId,
};
use super::repository::{
    ApplicationRepository, DocumentRepository, InterviewRepository, RepositoryError,
    StaffRepository, StudentRepository, UserRepository,
};
use super::scheduling::slot_is_taken;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    students: HashMap<StudentId, Student>,
    applications: HashMap<ApplicationId, Application>,
    documents: HashMap<DocumentId, Document>,
    interviews: HashMap<InterviewId, Interview>,
    staff: HashMap<StaffId, Staff>,
}

/// Process-local store. Every call takes the same lock, so multi-table writes are atomic.
#[derive(Default, Clone)]
pub struct InMemoryAdmissionsStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAdmissionsStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

impl UserRepository for InMemoryAdmissionsStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| same_text(&u.email, &user.email)) {
            return Err(RepositoryError::Conflict(
                "Email address is already registered".to_string(),
            ));
        }
        if tables
            .users
            .values()
            .any(|u| u.phone_number == user.phone_number)
        {
            return Err(RepositoryError::Conflict(
                "Phone number is already registered".to_string(),
            ));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables()?.users.get(id).cloned())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| same_text(&u.email, email))
            .cloned())
    }

    fn user_by_phone(&self, phone_number: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    fn user_by_verification_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email_verification_token.as_deref() == Some(token))
            .cloned())
    }
}

impl StudentRepository for InMemoryAdmissionsStore {
    fn insert_student(&self, student: Student) -> Result<Student, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.students.contains_key(&student.id) {
            return Err(RepositoryError::Conflict(
                "Student already exists".to_string(),
            ));
        }
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    fn update_student(&self, student: Student) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.students.get_mut(&student.id) {
            Some(slot) => {
                *slot = student;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        Ok(self.tables()?.students.get(id).cloned())
    }

    fn student_by_email(&self, email: &str) -> Result<Option<Student>, RepositoryError> {
        Ok(self
            .tables()?
            .students
            .values()
            .find(|s| s.email.as_deref().is_some_and(|e| same_text(e, email)))
            .cloned())
    }

    fn student_by_phone(&self, phone_number: &str) -> Result<Option<Student>, RepositoryError> {
        Ok(self
            .tables()?
            .students
            .values()
            .find(|s| s.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }

    fn students_by_parent(&self, parent: &UserId) -> Result<Vec<Student>, RepositoryError> {
        let students = self
            .tables()?
            .students
            .values()
            .filter(|s| s.parent_user_id == *parent)
            .cloned()
            .collect();
        Ok(sorted_by(students, |s: &Student| s.created_at))
    }

    fn search_students(&self, search: Option<&str>) -> Result<Vec<Student>, RepositoryError> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let students = self
            .tables()?
            .students
            .values()
            .filter(|s| match &needle {
                None => true,
                Some(needle) => [
                    Some(s.first_name.as_str()),
                    Some(s.last_name.as_str()),
                    s.email.as_deref(),
                    s.phone_number.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            })
            .cloned()
            .collect();
        Ok(sorted_by(students, |s: &Student| {
            (s.last_name.clone(), s.first_name.clone())
        }))
    }
}

impl ApplicationRepository for InMemoryAdmissionsStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.tables()?;
        if application.status.is_active()
            && tables
                .applications
                .values()
                .any(|a| a.student_id == application.student_id && a.status.is_active())
        {
            return Err(RepositoryError::Conflict(
                "Student already has an active application".to_string(),
            ));
        }
        if tables
            .applications
            .values()
            .any(|a| a.application_number == application.application_number)
        {
            return Err(RepositoryError::Conflict(
                "Application number already issued".to_string(),
            ));
        }
        tables
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.applications.get_mut(&application.id) {
            Some(slot) => {
                *slot = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.tables()?.applications.get(id).cloned())
    }

    fn application_by_number(
        &self,
        number: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .find(|a| a.application_number == number)
            .cloned())
    }

    fn applications_by_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let applications = self
            .tables()?
            .applications
            .values()
            .filter(|a| a.student_id == *student)
            .cloned()
            .collect();
        Ok(sorted_by(applications, |a: &Application| a.created_at))
    }

    fn applications_by_parent(
        &self,
        parent: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let applications = self
            .tables()?
            .applications
            .values()
            .filter(|a| a.submitted_by == *parent)
            .cloned()
            .collect();
        Ok(sorted_by(applications, |a: &Application| {
            std::cmp::Reverse(a.created_at)
        }))
    }
}

impl DocumentRepository for InMemoryAdmissionsStore {
    fn insert_document(&self, document: Document) -> Result<Document, RepositoryError> {
        let mut tables = self.tables()?;
        if tables
            .documents
            .values()
            .any(|d| d.file_name == document.file_name)
        {
            return Err(RepositoryError::Conflict(
                DocumentRuleError::DuplicateFileName.to_string(),
            ));
        }
        if tables.documents.values().any(|d| {
            d.application_id == document.application_id
                && d.document_type == document.document_type
        }) {
            return Err(RepositoryError::Conflict(
                DocumentRuleError::DuplicateDocumentType(document.document_type).to_string(),
            ));
        }
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    fn update_document(&self, document: Document) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.documents.get_mut(&document.id) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn document(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError> {
        Ok(self.tables()?.documents.get(id).cloned())
    }

    fn document_by_file_name(
        &self,
        file_name: &str,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(self
            .tables()?
            .documents
            .values()
            .find(|d| d.file_name == file_name)
            .cloned())
    }

    fn documents_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let documents = self
            .tables()?
            .documents
            .values()
            .filter(|d| d.application_id == *application)
            .cloned()
            .collect();
        Ok(sorted_by(documents, |d: &Document| d.uploaded_at))
    }
}

impl InterviewRepository for InMemoryAdmissionsStore {
    fn interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Ok(self.tables()?.interviews.get(id).cloned())
    }

    fn interview_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Interview>, RepositoryError> {
        Ok(self
            .tables()?
            .interviews
            .values()
            .find(|i| i.application_id == *application)
            .cloned())
    }

    fn scheduled_interviews(
        &self,
        interviewer: Option<&StaffId>,
    ) -> Result<Vec<Interview>, RepositoryError> {
        let interviews = self
            .tables()?
            .interviews
            .values()
            .filter(|i| i.status == InterviewStatus::Scheduled)
            .filter(|i| interviewer.map_or(true, |id| i.interviewer_id == *id))
            .cloned()
            .collect();
        Ok(sorted_by(interviews, |i: &Interview| i.scheduled_at()))
    }

    fn slot_taken(
        &self,
        interviewer: &StaffId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<bool, RepositoryError> {
        let tables = self.tables()?;
        Ok(slot_is_taken(
            tables.interviews.values(),
            *interviewer,
            date,
            time,
        ))
    }

    fn schedule(
        &self,
        interview: Interview,
        application: Application,
    ) -> Result<Interview, RepositoryError> {
        let mut tables = self.tables()?;
        if slot_is_taken(
            tables.interviews.values(),
            interview.interviewer_id,
            interview.scheduled_date,
            interview.scheduled_time,
        ) {
            return Err(RepositoryError::Conflict(
                "Interviewer already has an interview scheduled at this time".to_string(),
            ));
        }
        if tables
            .interviews
            .values()
            .any(|i| i.application_id == interview.application_id)
        {
            return Err(RepositoryError::Conflict(
                "An interview already exists for this application".to_string(),
            ));
        }
        match tables.applications.get(&application.id) {
            Some(stored) if stored.status == ApplicationStatus::UnderReview => {}
            Some(_) => {
                return Err(RepositoryError::Conflict(
                    "Application changed while the interview was being scheduled".to_string(),
                ))
            }
            None => return Err(RepositoryError::NotFound),
        }

        tables.applications.insert(application.id, application);
        tables.interviews.insert(interview.id, interview.clone());
        Ok(interview)
    }

    fn complete(
        &self,
        interview: Interview,
        application: Application,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.interviews.get(&interview.id) {
            Some(stored) if stored.status == InterviewStatus::Scheduled => {}
            Some(_) => {
                return Err(RepositoryError::Conflict(
                    "Interview was completed while the outcome was being recorded".to_string(),
                ))
            }
            None => return Err(RepositoryError::NotFound),
        }
        match tables.applications.get(&application.id) {
            Some(stored) if stored.status == ApplicationStatus::InterviewScheduled => {}
            Some(_) => {
                return Err(RepositoryError::Conflict(
                    "Application changed while the interview outcome was being recorded"
                        .to_string(),
                ))
            }
            None => return Err(RepositoryError::NotFound),
        }
        tables.applications.insert(application.id, application);
        tables.interviews.insert(interview.id, interview);
        Ok(())
    }
}

impl StaffRepository for InMemoryAdmissionsStore {
    fn insert_staff(&self, staff: Staff) -> Result<Staff, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.staff.values().any(|s| same_text(&s.email, &staff.email)) {
            return Err(RepositoryError::Conflict(
                "Staff with this email already exists".to_string(),
            ));
        }
        if staff.user_id.is_some() && tables.staff.values().any(|s| s.user_id == staff.user_id) {
            return Err(RepositoryError::Conflict(
                "User account is already linked to a staff record".to_string(),
            ));
        }
        if tables.staff.values().any(|s| s.staff_number == staff.staff_number) {
            return Err(RepositoryError::Conflict(
                "Staff number has already been issued".to_string(),
            ));
        }
        tables.staff.insert(staff.id, staff.clone());
        Ok(staff)
    }

    fn update_staff(&self, staff: Staff) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.staff.get_mut(&staff.id) {
            Some(slot) => {
                *slot = staff;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn staff(&self, id: &StaffId) -> Result<Option<Staff>, RepositoryError> {
        Ok(self.tables()?.staff.get(id).cloned())
    }

    fn staff_by_user(&self, user: &UserId) -> Result<Option<Staff>, RepositoryError> {
        Ok(self
            .tables()?
            .staff
            .values()
            .find(|s| s.user_id.as_ref() == Some(user))
            .cloned())
    }

    fn staff_by_email(&self, email: &str) -> Result<Option<Staff>, RepositoryError> {
        Ok(self
            .tables()?
            .staff
            .values()
            .find(|s| same_text(&s.email, email))
            .cloned())
    }

    fn active_teaching_staff(&self) -> Result<Vec<Staff>, RepositoryError> {
        let staff = self
            .tables()?
            .staff
            .values()
            .filter(|s| s.status == StaffStatus::Active && s.staff_type == StaffType::Teaching)
            .cloned()
            .collect();
        Ok(sorted_by(staff, |s: &Staff| s.full_name()))
    }

    fn staff_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.tables()?.staff.len())
    }
}
