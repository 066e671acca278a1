use crate::config::Config;
use crate::model::employee::AccessLevel;
use crate::model::request::RequestStatus;
use crate::models::{Claims, TokenType};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::str::FromStr;

/// Authenticated caller, extracted from the Authorization header.
/// Both `Bearer <token>` and `JWT <token>` schemes are accepted.
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    /// Built-in elevated-privilege flag, distinct from access level.
    pub is_staff: bool,
    pub access_level: Option<AccessLevel>,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("JWT "))
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match bearer_token(req) {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        if data.claims.token_type != TokenType::Access {
            return ready(Err(ErrorUnauthorized("Not an access token")));
        }

        let access_level = match data.claims.access_level.as_deref() {
            Some(raw) => match AccessLevel::from_str(raw) {
                Ok(level) => Some(level),
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid access level"))),
            },
            None => None,
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            is_staff: data.claims.is_staff,
            access_level,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    /// Staff OR a linked employee record at Admin/Manager level.
    pub fn is_privileged(&self) -> bool {
        self.is_staff || self.access_level.map(AccessLevel::is_privileged).unwrap_or(false)
    }

    /// Mutating half of the admin-or-read-only rule.
    pub fn require_staff(&self) -> actix_web::Result<()> {
        if self.is_staff {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn require_privileged(&self) -> actix_web::Result<()> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin/Manager only"))
        }
    }

    pub fn owns_employee(&self, employee_id: &str) -> bool {
        self.employee_id.as_deref() == Some(employee_id)
    }

    /// Object rule for reading a single request: privileged callers see
    /// everything, owners see their own records at any status.
    pub fn can_view_request(&self, owner: &str) -> bool {
        self.is_privileged() || self.owns_employee(owner)
    }

    /// Object rule for deleting a request: owners only while it is still
    /// Pending; privileged callers pass here and hit the terminal-state
    /// guard in the handler instead.
    pub fn can_delete_request(&self, owner: &str, status: RequestStatus) -> bool {
        if self.is_privileged() {
            return true;
        }
        self.owns_employee(owner) && status == RequestStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{TokenIdentity, generate_access_token, generate_refresh_token};
    use actix_web::test::TestRequest;

    fn test_config() -> Config {
        Config {
            database_url: "mysql://unused".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 3600,
            refresh_token_ttl: 3600,
            rate_login_per_min: 60,
            rate_register_per_min: 60,
            rate_refresh_per_min: 60,
            rate_protected_per_min: 60,
            api_prefix: "/api/v1".into(),
        }
    }

    fn caller(is_staff: bool, level: Option<AccessLevel>, employee: Option<&str>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "u".into(),
            is_staff,
            access_level: level,
            employee_id: employee.map(str::to_string),
        }
    }

    #[test]
    fn staff_and_managers_are_privileged() {
        assert!(caller(true, None, None).is_privileged());
        assert!(caller(false, Some(AccessLevel::Admin), None).is_privileged());
        assert!(caller(false, Some(AccessLevel::Manager), None).is_privileged());
        assert!(!caller(false, Some(AccessLevel::Employee), None).is_privileged());
        assert!(!caller(false, None, None).is_privileged());
    }

    #[test]
    fn non_staff_cannot_pass_staff_gate() {
        assert!(caller(false, Some(AccessLevel::Manager), None).require_staff().is_err());
        assert!(caller(true, None, None).require_staff().is_ok());
    }

    #[test]
    fn owner_can_view_but_not_always_delete() {
        let owner = caller(false, Some(AccessLevel::Employee), Some("AAAA00000001"));

        assert!(owner.can_view_request("AAAA00000001"));
        assert!(!owner.can_view_request("BBBB00000002"));

        assert!(owner.can_delete_request("AAAA00000001", RequestStatus::Pending));
        assert!(!owner.can_delete_request("AAAA00000001", RequestStatus::Approved));
        assert!(!owner.can_delete_request("BBBB00000002", RequestStatus::Pending));
    }

    #[test]
    fn privileged_caller_passes_object_checks() {
        let manager = caller(false, Some(AccessLevel::Manager), Some("CCCC00000003"));
        assert!(manager.can_view_request("AAAA00000001"));
        assert!(manager.can_delete_request("AAAA00000001", RequestStatus::Approved));
    }

    fn identity() -> TokenIdentity {
        TokenIdentity {
            user_id: 9,
            username: "jdoe".into(),
            is_staff: false,
            employee_id: Some("4F2A9C01BD37".into()),
            access_level: Some("Employee".into()),
        }
    }

    #[actix_web::test]
    async fn extractor_accepts_bearer_and_jwt_schemes() {
        let config = test_config();
        let token = generate_access_token(&identity(), &config.jwt_secret, 3600);

        for scheme in ["Bearer", "JWT"] {
            let req = TestRequest::default()
                .app_data(Data::new(config.clone()))
                .insert_header(("Authorization", format!("{scheme} {token}")))
                .to_http_request();

            let user = AuthUser::from_request(&req, &mut Payload::None)
                .await
                .unwrap();
            assert_eq!(user.user_id, 9);
            assert_eq!(user.access_level, Some(AccessLevel::Employee));
        }
    }

    #[actix_web::test]
    async fn extractor_rejects_missing_and_refresh_tokens() {
        let config = test_config();

        let req = TestRequest::default()
            .app_data(Data::new(config.clone()))
            .to_http_request();
        assert!(AuthUser::from_request(&req, &mut Payload::None).await.is_err());

        let (refresh, _) = generate_refresh_token(&identity(), &config.jwt_secret, 3600);
        let req = TestRequest::default()
            .app_data(Data::new(config))
            .insert_header(("Authorization", format!("Bearer {refresh}")))
            .to_http_request();
        assert!(AuthUser::from_request(&req, &mut Payload::None).await.is_err());
    }
}
