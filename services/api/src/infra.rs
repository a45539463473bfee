use admissions::config::{AuthConfig, BootstrapAdmin};
use admissions::workflows::admissions::requests::ProvisionUserRequest;
use admissions::workflows::admissions::views::UserView;
use admissions::workflows::admissions::{
    AdmissionsError, AdmissionsService, InMemoryAdmissionsStore, JwtTokenService, UserRole,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type Admissions = AdmissionsService<InMemoryAdmissionsStore>;

/// Placeholder contact for the bootstrap administrator; operators update it after first login.
const BOOTSTRAP_PHONE: &str = "08000000000";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_service(auth: &AuthConfig) -> Admissions {
    AdmissionsService::new(
        Arc::new(InMemoryAdmissionsStore::default()),
        Arc::new(JwtTokenService::new(&auth.jwt)),
    )
}

pub(crate) fn provision_bootstrap_admin(
    service: &Admissions,
    admin: &BootstrapAdmin,
) -> Result<UserView, AdmissionsError> {
    service.provision_user(ProvisionUserRequest {
        email: admin.email.clone(),
        phone_number: BOOTSTRAP_PHONE.to_string(),
        password: admin.password.clone(),
        first_name: "School".to_string(),
        last_name: "Administrator".to_string(),
        role: UserRole::SchoolAdmin,
    })
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admissions::workflows::admissions::{JwtSettings, UserStatus};

    fn auth() -> AuthConfig {
        AuthConfig {
            jwt: JwtSettings {
                secret: "api-test-secret-long-enough-for-hs256".to_string(),
                issuer: "AdmissionsService".to_string(),
                audience: "AdmissionsClient".to_string(),
                expiry_minutes: 30,
            },
        }
    }

    #[test]
    fn bootstrap_admin_is_active_and_can_sign_in() {
        let service = build_service(&auth());
        let admin = provision_bootstrap_admin(
            &service,
            &BootstrapAdmin {
                email: "Registrar@School.ng".to_string(),
                password: "Registrar2025".to_string(),
            },
        )
        .expect("admin provisioned");

        assert_eq!(admin.email, "registrar@school.ng");
        assert_eq!(admin.role, UserRole::SchoolAdmin);
        assert_eq!(admin.status, UserStatus::Active);
    }

    #[test]
    fn weak_bootstrap_password_is_refused() {
        let service = build_service(&auth());
        let result = provision_bootstrap_admin(
            &service,
            &BootstrapAdmin {
                email: "registrar@school.ng".to_string(),
                password: "password".to_string(),
            },
        );
        assert!(matches!(result, Err(AdmissionsError::ValidationFailed { .. })));
    }

    #[test]
    fn dates_parse_from_iso_strings() {
        assert_eq!(
            parse_date(" 2025-09-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"))
        );
        assert!(parse_date("01/09/2025").is_err());
    }
}
