//! Role capability table and the per-entity access predicate.
//!
//! Each role maps to a [`Capabilities`] value listing, for every entity kind, how far a view,
//! edit, or review action reaches. [`can_access`] combines that table with the facts about a
//! concrete entity (owner, assigned interviewer, staff type).

use serde::{Deserialize, Serialize};

use super::domain::{StaffType, UserId, UserRole};

/// The authenticated caller of a command or query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Application,
    Document,
    Student,
    Staff,
    Interview,
}

impl ResourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Application => "Application",
            ResourceKind::Document => "Document",
            ResourceKind::Student => "Student",
            ResourceKind::Staff => "Staff",
            ResourceKind::Interview => "Interview",
        }
    }
}

/// `View` reads, `Edit` is an owner-side change (submit, upload, update, conduct),
/// `Review` is an administrative change (advance, schedule, verify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    View,
    Edit,
    Review,
}

/// Reach of a grant over entities of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    None,
    /// The caller owns the entity (submitted the application, parents the student).
    Owned,
    /// The caller is the interviewer assigned to the related interview.
    Assigned,
    /// Only teaching staff records.
    TeachingOnly,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub view: Scope,
    pub edit: Scope,
    pub review: Scope,
}

impl Grant {
    const NONE: Grant = Grant::new(Scope::None, Scope::None, Scope::None);
    const FULL: Grant = Grant::new(Scope::All, Scope::All, Scope::All);

    const fn new(view: Scope, edit: Scope, review: Scope) -> Self {
        Self { view, edit, review }
    }

    pub const fn scope(&self, action: Action) -> Scope {
        match action {
            Action::View => self.view,
            Action::Edit => self.edit,
            Action::Review => self.review,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub application: Grant,
    pub document: Grant,
    pub student: Grant,
    pub staff: Grant,
    pub interview: Grant,
}

impl Capabilities {
    pub const fn grant(&self, kind: ResourceKind) -> Grant {
        match kind {
            ResourceKind::Application => self.application,
            ResourceKind::Document => self.document,
            ResourceKind::Student => self.student,
            ResourceKind::Staff => self.staff,
            ResourceKind::Interview => self.interview,
        }
    }
}

impl UserRole {
    pub const fn capabilities(self) -> Capabilities {
        use Scope::{All, Assigned, None, Owned, TeachingOnly};

        match self {
            UserRole::SuperAdmin | UserRole::SchoolAdmin => Capabilities {
                application: Grant::FULL,
                document: Grant::FULL,
                student: Grant::new(All, None, None),
                staff: Grant::FULL,
                interview: Grant::new(All, Assigned, All),
            },
            UserRole::AdmissionOfficer => Capabilities {
                application: Grant::new(All, None, All),
                document: Grant::new(All, None, All),
                student: Grant::new(All, None, None),
                staff: Grant::new(TeachingOnly, None, None),
                interview: Grant::new(All, Assigned, All),
            },
            UserRole::Teacher => Capabilities {
                application: Grant::new(Assigned, None, None),
                document: Grant::new(Assigned, None, None),
                student: Grant::new(All, None, None),
                staff: Grant::new(TeachingOnly, None, None),
                interview: Grant::new(Assigned, Assigned, None),
            },
            UserRole::Parent => Capabilities {
                application: Grant::new(Owned, Owned, None),
                document: Grant::new(Owned, Owned, None),
                student: Grant::new(Owned, Owned, None),
                staff: Grant::NONE,
                interview: Grant::new(Owned, None, None),
            },
            UserRole::Student => Capabilities {
                application: Grant::NONE,
                document: Grant::NONE,
                student: Grant::NONE,
                staff: Grant::NONE,
                interview: Grant::NONE,
            },
        }
    }
}

/// Facts about an entity the guard needs to decide access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub owner: Option<UserId>,
    pub assignee: Option<UserId>,
    pub staff_type: Option<StaffType>,
}

impl Resource {
    /// An application, its documents, or its interview. `interviewer` is the assigned
    /// interviewer's login, when one exists.
    pub const fn application_scoped(
        kind: ResourceKind,
        owner: UserId,
        interviewer: Option<UserId>,
    ) -> Self {
        Self {
            kind,
            owner: Some(owner),
            assignee: interviewer,
            staff_type: None,
        }
    }

    pub const fn student(parent: UserId) -> Self {
        Self {
            kind: ResourceKind::Student,
            owner: Some(parent),
            assignee: None,
            staff_type: None,
        }
    }

    pub const fn staff(staff_type: StaffType) -> Self {
        Self {
            kind: ResourceKind::Staff,
            owner: None,
            assignee: None,
            staff_type: Some(staff_type),
        }
    }
}

impl Scope {
    fn permits(self, actor: &Actor, resource: &Resource) -> bool {
        match self {
            Scope::None => false,
            Scope::Owned => resource.owner == Some(actor.user_id),
            Scope::Assigned => resource.assignee == Some(actor.user_id),
            Scope::TeachingOnly => resource.staff_type == Some(StaffType::Teaching),
            Scope::All => true,
        }
    }
}

pub fn can_access(actor: &Actor, resource: &Resource, action: Action) -> bool {
    actor
        .role
        .capabilities()
        .grant(resource.kind)
        .scope(action)
        .permits(actor, resource)
}

/// Whether the role reaches every entity of `kind`, found or not. Roles without this see a
/// missing entity exactly as they see someone else's.
pub fn has_unconditional(role: UserRole, kind: ResourceKind, action: Action) -> bool {
    role.capabilities().grant(kind).scope(action) == Scope::All
}

/// Whether the role can perform `action` on at least some entities of `kind`.
pub fn has_any(role: UserRole, kind: ResourceKind, action: Action) -> bool {
    role.capabilities().grant(kind).scope(action) != Scope::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> Actor {
        Actor::new(UserId::new(), role)
    }

    #[test]
    fn parents_only_reach_their_own_applications() {
        let parent = actor(UserRole::Parent);
        let own = Resource::application_scoped(ResourceKind::Application, parent.user_id, None);
        let other = Resource::application_scoped(ResourceKind::Application, UserId::new(), None);

        assert!(can_access(&parent, &own, Action::View));
        assert!(can_access(&parent, &own, Action::Edit));
        assert!(!can_access(&parent, &own, Action::Review));
        assert!(!can_access(&parent, &other, Action::View));
    }

    #[test]
    fn teachers_see_assigned_applications_and_interviews() {
        let teacher = actor(UserRole::Teacher);
        let assigned = Resource::application_scoped(
            ResourceKind::Interview,
            UserId::new(),
            Some(teacher.user_id),
        );
        let elsewhere =
            Resource::application_scoped(ResourceKind::Interview, UserId::new(), None);

        assert!(can_access(&teacher, &assigned, Action::View));
        assert!(can_access(&teacher, &assigned, Action::Edit));
        assert!(!can_access(&teacher, &elsewhere, Action::View));
    }

    #[test]
    fn staff_roles_conduct_only_interviews_assigned_to_them() {
        for role in [
            UserRole::SuperAdmin,
            UserRole::SchoolAdmin,
            UserRole::AdmissionOfficer,
        ] {
            let caller = actor(role);
            let elsewhere = Resource::application_scoped(
                ResourceKind::Interview,
                UserId::new(),
                Some(UserId::new()),
            );
            let assigned = Resource::application_scoped(
                ResourceKind::Interview,
                UserId::new(),
                Some(caller.user_id),
            );
            assert!(can_access(&caller, &elsewhere, Action::View));
            assert!(can_access(&caller, &elsewhere, Action::Review));
            assert!(!can_access(&caller, &elsewhere, Action::Edit));
            assert!(can_access(&caller, &assigned, Action::Edit));
            assert!(!has_unconditional(role, ResourceKind::Interview, Action::Edit));
        }
    }

    #[test]
    fn staff_visibility_depends_on_type_for_officers_and_teachers() {
        let teaching = Resource::staff(StaffType::Teaching);
        let admin_staff = Resource::staff(StaffType::Administrative);

        for role in [UserRole::AdmissionOfficer, UserRole::Teacher] {
            let caller = actor(role);
            assert!(can_access(&caller, &teaching, Action::View));
            assert!(!can_access(&caller, &admin_staff, Action::View));
        }
        let school_admin = actor(UserRole::SchoolAdmin);
        assert!(can_access(&school_admin, &admin_staff, Action::Edit));
        assert!(!can_access(&actor(UserRole::Parent), &teaching, Action::View));
    }

    #[test]
    fn only_the_owning_parent_edits_a_student() {
        let parent = actor(UserRole::Parent);
        let student = Resource::student(parent.user_id);
        assert!(can_access(&parent, &student, Action::Edit));
        for role in [UserRole::SuperAdmin, UserRole::AdmissionOfficer, UserRole::Teacher] {
            assert!(can_access(&actor(role), &student, Action::View));
            assert!(!can_access(&actor(role), &student, Action::Edit));
        }
    }

    #[test]
    fn student_accounts_reach_nothing() {
        let caller = actor(UserRole::Student);
        for kind in [
            ResourceKind::Application,
            ResourceKind::Document,
            ResourceKind::Student,
            ResourceKind::Staff,
            ResourceKind::Interview,
        ] {
            for action in [Action::View, Action::Edit, Action::Review] {
                assert!(!has_any(caller.role, kind, action));
            }
        }
    }

    #[test]
    fn unconditional_access_is_limited_to_all_scopes() {
        assert!(has_unconditional(
            UserRole::AdmissionOfficer,
            ResourceKind::Application,
            Action::View
        ));
        assert!(!has_unconditional(
            UserRole::Parent,
            ResourceKind::Application,
            Action::View
        ));
        assert!(!has_unconditional(
            UserRole::Teacher,
            ResourceKind::Staff,
            Action::View
        ));
    }
}
