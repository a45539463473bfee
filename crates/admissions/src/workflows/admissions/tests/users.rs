use chrono::Duration;

use super::common::*;
use crate::workflows::admissions::domain::{UserRole, UserStatus};
use crate::workflows::admissions::repository::UserRepository;
use crate::workflows::admissions::requests::LoginRequest;

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn registration_stays_pending_until_the_email_is_verified() {
    let h = harness();
    let registration = h
        .service
        .register_user(register_request("Amaka@Example.NG", "08031234567"))
        .expect("registration succeeds");

    assert_eq!(registration.user.email, "amaka@example.ng");
    assert_eq!(registration.user.status, UserStatus::PendingVerification);
    assert!(!registration.user.is_email_verified);
    assert_eq!(registration.verification_expires_at, start() + Duration::days(7));

    let verified = h
        .service
        .verify_email(&registration.verification_token)
        .expect("token accepted");
    assert_eq!(verified.status, UserStatus::Active);
    assert!(verified.is_email_verified);

    let stored = h
        .store
        .user(&verified.id)
        .expect("store reachable")
        .expect("user stored");
    assert!(stored.email_verification_token.is_none());

    let (message, _) = expect_validation(h.service.verify_email(&registration.verification_token));
    assert_eq!(message, "Invalid or expired verification token");
}

#[test]
fn verification_tokens_expire_after_seven_days() {
    let h = harness();
    let registration = h
        .service
        .register_user(register_request("late@example.ng", "08031234568"))
        .expect("registration succeeds");

    h.clock.advance(Duration::days(7) + Duration::minutes(1));
    let (message, _) = expect_validation(h.service.verify_email(&registration.verification_token));
    assert_eq!(message, "Invalid or expired verification token");
}

#[test]
fn duplicate_contacts_are_rejected() {
    let h = harness();
    h.service
        .register_user(register_request("dup@example.ng", "08031230000"))
        .expect("first registration");

    let message = expect_conflict(
        h.service
            .register_user(register_request("DUP@example.ng", "08031230001")),
    );
    assert_eq!(message, "Email address is already registered");

    let message = expect_conflict(
        h.service
            .register_user(register_request("other@example.ng", "08031230000")),
    );
    assert_eq!(message, "Phone number is already registered");
}

#[test]
fn staff_roles_cannot_self_register() {
    let h = harness();
    let mut request = register_request("officer@example.ng", "08031234569");
    request.role = UserRole::AdmissionOfficer;

    let (message, errors) = expect_validation(h.service.register_user(request));
    assert_eq!(message, "Only Parent or Student accounts can self-register");
    assert_eq!(errors.len(), 1);
}

#[test]
fn login_issues_a_token_that_authenticates_until_expiry() {
    let h = harness();
    h.service
        .register_user(register_request("mum@example.ng", "08031234570"))
        .expect("registration succeeds");

    let response = h
        .service
        .login(login("MUM@example.ng", PASSWORD), Some("10.0.0.7".to_string()))
        .expect("pending accounts may log in");
    assert_eq!(response.role, UserRole::Parent);
    assert_eq!(response.full_name, "Chiamaka Okeke");
    assert_eq!(response.token_expiry, start() + Duration::minutes(60));

    let stored = h
        .store
        .user(&response.user_id)
        .expect("store reachable")
        .expect("user stored");
    assert_eq!(stored.last_login_at, Some(start()));
    assert_eq!(stored.last_login_ip.as_deref(), Some("10.0.0.7"));

    let actor = h.service.authenticate(&response.token).expect("token valid");
    assert_eq!(actor.user_id, response.user_id);
    assert_eq!(actor.role, UserRole::Parent);

    h.clock.advance(Duration::minutes(61));
    let message = expect_unauthorized(h.service.authenticate(&response.token));
    assert_eq!(message, "Invalid or expired token");
}

#[test]
fn garbage_tokens_are_rejected() {
    let h = harness();
    let message = expect_unauthorized(h.service.authenticate("not-a-jwt"));
    assert_eq!(message, "Invalid or expired token");
}

#[test]
fn unknown_email_and_wrong_password_look_the_same() {
    let h = harness();
    h.service
        .register_user(register_request("same@example.ng", "08031234571"))
        .expect("registration succeeds");

    let unknown = expect_unauthorized(h.service.login(login("nobody@example.ng", PASSWORD), None));
    let wrong = expect_unauthorized(h.service.login(login("same@example.ng", "Wrong1234"), None));
    assert_eq!(unknown, "Invalid email or password");
    assert_eq!(unknown, wrong);
}

#[test]
fn fifth_failure_locks_the_account_for_thirty_minutes() {
    let h = harness();
    let registration = h
        .service
        .register_user(register_request("locked@example.ng", "08031234572"))
        .expect("registration succeeds");

    for _ in 0..5 {
        expect_unauthorized(h.service.login(login("locked@example.ng", "Wrong1234"), None));
    }
    let stored = h
        .store
        .user(&registration.user.id)
        .expect("store reachable")
        .expect("user stored");
    assert_eq!(stored.status, UserStatus::Locked);
    assert_eq!(stored.failed_login_attempts, 5);

    let message = expect_invalid_state(h.service.login(login("locked@example.ng", PASSWORD), None));
    assert_eq!(message, "Account locked until 09:30");

    h.clock.advance(Duration::minutes(31));
    let response = h
        .service
        .login(login("locked@example.ng", PASSWORD), None)
        .expect("lockout expired");
    assert_eq!(response.status, UserStatus::Active);

    let stored = h
        .store
        .user(&registration.user.id)
        .expect("store reachable")
        .expect("user stored");
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(stored.lockout_end.is_none());
}

#[test]
fn suspended_accounts_cannot_log_in_or_use_old_tokens() {
    let h = harness();
    let parent = h.parent();
    let mut user = h
        .store
        .user(&parent.user_id)
        .expect("store reachable")
        .expect("user stored");
    let response = h
        .service
        .login(login(&user.email, PASSWORD), None)
        .expect("active account logs in");

    user.status = UserStatus::Suspended;
    h.store.update_user(user.clone()).expect("update stored");

    let message = expect_invalid_state(h.service.login(login(&user.email, PASSWORD), None));
    assert_eq!(message, "Account is inactive. Please contact support.");
    let message = expect_unauthorized(h.service.authenticate(&response.token));
    assert_eq!(message, "Account is inactive. Please contact support.");
}

#[test]
fn profile_lists_a_parents_students_with_ages() {
    let h = harness();
    let parent = h.parent();
    h.student_of(&parent, 12);
    h.student_of(&parent, 14);

    let profile = h.service.user_profile(&parent).expect("profile loads");
    assert_eq!(profile.user.role, UserRole::Parent);
    let mut ages: Vec<i32> = profile.students.iter().map(|s| s.age).collect();
    ages.sort_unstable();
    assert_eq!(ages, vec![12, 14]);

    let admin = h.admin();
    let profile = h.service.user_profile(&admin).expect("profile loads");
    assert!(profile.students.is_empty());
}

#[test]
fn provisioned_accounts_are_active_immediately() {
    let h = harness();
    let officer = h.provision(UserRole::AdmissionOfficer);
    let stored = h
        .store
        .user(&officer.user_id)
        .expect("store reachable")
        .expect("user stored");
    assert_eq!(stored.status, UserStatus::Active);
    assert!(stored.is_email_verified);
    assert!(stored.email_verification_token.is_none());
}
