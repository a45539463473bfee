use chrono::Duration;
use tracing::{debug, error, info, warn};

use super::{validated, AdmissionsService};
use crate::workflows::admissions::access::Actor;
use crate::workflows::admissions::credentials::verification_token;
use crate::workflows::admissions::domain::{User, UserId, UserRole, UserStatus};
use crate::workflows::admissions::eligibility::age_on;
use crate::workflows::admissions::error::{AdmissionsError, StoreResultExt};
use crate::workflows::admissions::repository::AdmissionsStore;
use crate::workflows::admissions::requests::{
    LoginRequest, ProvisionUserRequest, RegisterUserRequest,
};
use crate::workflows::admissions::views::{
    LoginResponse, Registration, StudentSummary, UserProfile, UserView,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INACTIVE_ACCOUNT: &str = "Account is inactive. Please contact support.";
const INVALID_TOKEN: &str = "Invalid or expired token";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    /// Self-service sign-up for parents and students. The account stays pending until the
    /// emailed token is redeemed through [`AdmissionsService::verify_email`].
    pub fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<Registration, AdmissionsError> {
        const OP: &str = "registering user";
        AdmissionsError::from_violations(request.violations())?;

        let email = normalize_email(&request.email);
        self.ensure_contact_available(&email, &request.phone_number, OP)?;
        let password_hash = self.hash_password(&request.password, OP)?;

        let now = self.now();
        let token = verification_token();
        let expires_at = now + Duration::days(self.policy.verification_token_days);
        let user = User {
            id: UserId::new(),
            email,
            phone_number: request.phone_number,
            password_hash,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            middle_name: request.middle_name,
            role: request.role,
            status: UserStatus::PendingVerification,
            state_of_origin: request.state_of_origin,
            lga: request.lga,
            is_email_verified: false,
            email_verified_at: None,
            email_verification_token: Some(token.clone()),
            email_verification_token_expires_at: Some(expires_at),
            last_login_at: None,
            last_login_ip: None,
            failed_login_attempts: 0,
            lockout_end: None,
            created_at: now,
            updated_at: now,
        };

        let user = self.store.insert_user(user).or_fail(OP)?;
        info!(user_id = %user.id, role = user.role.label(), "user registered");

        Ok(Registration {
            user: UserView::from(&user),
            verification_token: token,
            verification_expires_at: expires_at,
        })
    }

    /// Creates an active, verified account with any role. Meant for operator bootstrap, not
    /// for public exposure.
    pub fn provision_user(
        &self,
        request: ProvisionUserRequest,
    ) -> Result<UserView, AdmissionsError> {
        const OP: &str = "provisioning user";
        validated(&request)?;

        let email = normalize_email(&request.email);
        self.ensure_contact_available(&email, &request.phone_number, OP)?;
        let password_hash = self.hash_password(&request.password, OP)?;

        let now = self.now();
        let user = User {
            id: UserId::new(),
            email,
            phone_number: request.phone_number,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            middle_name: None,
            role: request.role,
            status: UserStatus::Active,
            state_of_origin: None,
            lga: None,
            is_email_verified: true,
            email_verified_at: Some(now),
            email_verification_token: None,
            email_verification_token_expires_at: None,
            last_login_at: None,
            last_login_ip: None,
            failed_login_attempts: 0,
            lockout_end: None,
            created_at: now,
            updated_at: now,
        };

        let user = self.store.insert_user(user).or_fail(OP)?;
        info!(user_id = %user.id, role = user.role.label(), "user provisioned");
        Ok(UserView::from(&user))
    }

    pub fn verify_email(&self, token: &str) -> Result<UserView, AdmissionsError> {
        const OP: &str = "verifying email";
        let invalid = || AdmissionsError::invalid("Invalid or expired verification token");

        let mut user = self
            .store
            .user_by_verification_token(token)
            .or_fail(OP)?
            .ok_or_else(invalid)?;

        let now = self.now();
        if user
            .email_verification_token_expires_at
            .is_some_and(|expires_at| expires_at < now)
        {
            return Err(invalid());
        }

        user.is_email_verified = true;
        user.email_verified_at = Some(now);
        user.email_verification_token = None;
        user.email_verification_token_expires_at = None;
        if user.status == UserStatus::PendingVerification {
            user.status = UserStatus::Active;
        }
        user.updated_at = now;

        self.store.update_user(user.clone()).or_fail(OP)?;
        info!(user_id = %user.id, "email verified");
        Ok(UserView::from(&user))
    }

    pub fn login(
        &self,
        request: LoginRequest,
        ip_address: Option<String>,
    ) -> Result<LoginResponse, AdmissionsError> {
        const OP: &str = "logging in";
        validated(&request)?;

        let mut user = self
            .store
            .user_by_email(&normalize_email(&request.email))
            .or_fail(OP)?
            .ok_or_else(|| AdmissionsError::unauthorized(INVALID_CREDENTIALS))?;

        let now = self.now();
        match user.status {
            UserStatus::Inactive | UserStatus::Suspended => {
                return Err(AdmissionsError::InvalidState(INACTIVE_ACCOUNT.to_string()));
            }
            UserStatus::Locked => match user.lockout_end {
                Some(until) if until > now => {
                    return Err(AdmissionsError::InvalidState(format!(
                        "Account locked until {}",
                        until.format("%H:%M")
                    )));
                }
                _ => {
                    user.status = UserStatus::Active;
                    user.lockout_end = None;
                    user.failed_login_attempts = 0;
                }
            },
            UserStatus::Active | UserStatus::PendingVerification => {}
        }

        if !self
            .passwords
            .verify_password(&request.password, &user.password_hash)
        {
            user.failed_login_attempts += 1;
            if user.failed_login_attempts >= self.policy.max_failed_logins {
                user.status = UserStatus::Locked;
                user.lockout_end = Some(now + Duration::minutes(self.policy.lockout_minutes));
                warn!(
                    user_id = %user.id,
                    attempts = user.failed_login_attempts,
                    "account locked after repeated login failures"
                );
            }
            user.updated_at = now;
            self.store.update_user(user).or_fail(OP)?;
            return Err(AdmissionsError::unauthorized(INVALID_CREDENTIALS));
        }

        user.failed_login_attempts = 0;
        user.lockout_end = None;
        user.last_login_at = Some(now);
        user.last_login_ip = ip_address;
        user.updated_at = now;

        let issued = self.tokens.generate_token(&user, now).map_err(|err| {
            error!(user_id = %user.id, error = %err, "failed to issue access token");
            AdmissionsError::Unexpected(format!("An error occurred while {OP}"))
        })?;
        self.store.update_user(user.clone()).or_fail(OP)?;
        info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            user_id: user.id,
            email: user.email.clone(),
            full_name: user.full_name(),
            token: issued.token,
            token_expiry: issued.expires_at,
            role: user.role,
            status: user.status,
        })
    }

    /// Resolves a bearer token into the acting user.
    pub fn authenticate(&self, token: &str) -> Result<Actor, AdmissionsError> {
        const OP: &str = "authenticating";
        let claims = self
            .tokens
            .validate_token(token, self.now())
            .map_err(|err| {
                debug!(error = %err, "access token rejected");
                AdmissionsError::unauthorized(INVALID_TOKEN)
            })?;

        let user = self
            .store
            .user(&claims.sub)
            .or_fail(OP)?
            .ok_or_else(|| AdmissionsError::unauthorized(INVALID_TOKEN))?;
        if matches!(user.status, UserStatus::Inactive | UserStatus::Suspended) {
            return Err(AdmissionsError::unauthorized(INACTIVE_ACCOUNT));
        }
        Ok(Actor::new(user.id, user.role))
    }

    pub fn user_profile(&self, actor: &Actor) -> Result<UserProfile, AdmissionsError> {
        const OP: &str = "loading profile";
        let user = self
            .store
            .user(&actor.user_id)
            .or_fail(OP)?
            .ok_or_else(|| AdmissionsError::NotFound("User not found".to_string()))?;

        let students = if user.role == UserRole::Parent {
            let today = self.today();
            self.store
                .students_by_parent(&user.id)
                .or_fail(OP)?
                .iter()
                .map(|student| StudentSummary::new(student, age_on(student.date_of_birth, today)))
                .collect()
        } else {
            Vec::new()
        };

        Ok(UserProfile {
            user: UserView::from(&user),
            students,
        })
    }

    fn ensure_contact_available(
        &self,
        email: &str,
        phone_number: &str,
        operation: &str,
    ) -> Result<(), AdmissionsError> {
        if self.store.user_by_email(email).or_fail(operation)?.is_some() {
            return Err(AdmissionsError::Conflict(
                "Email address is already registered".to_string(),
            ));
        }
        if self
            .store
            .user_by_phone(phone_number)
            .or_fail(operation)?
            .is_some()
        {
            return Err(AdmissionsError::Conflict(
                "Phone number is already registered".to_string(),
            ));
        }
        Ok(())
    }

    fn hash_password(&self, password: &str, operation: &str) -> Result<String, AdmissionsError> {
        self.passwords.hash_password(password).map_err(|err| {
            error!(error = %err, "password hashing failed");
            AdmissionsError::Unexpected(format!("An error occurred while {operation}"))
        })
    }
}
