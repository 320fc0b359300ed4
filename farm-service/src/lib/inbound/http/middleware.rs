use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::farmer::models::FarmerId;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated farmer in request extensions
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedFarmer {
    pub farmer_id: FarmerId,
}

/// Why a request was turned away by the token gate.
///
/// Missing tokens answer 401; anything presented but not trusted answers 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    Missing,
    Malformed(String),
    Invalid(String),
}

impl TokenRejection {
    fn kind(&self) -> &'static str {
        match self {
            TokenRejection::Missing => "missing",
            TokenRejection::Malformed(_) => "malformed",
            TokenRejection::Invalid(_) => "invalid",
        }
    }
}

impl IntoResponse for TokenRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            TokenRejection::Missing => (StatusCode::UNAUTHORIZED, "No token provided"),
            TokenRejection::Malformed(_) | TokenRejection::Invalid(_) => {
                (StatusCode::FORBIDDEN, "Token not valid")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Middleware that validates the bearer token and adds the farmer to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, TokenRejection> {
    let farmer_id = verify_bearer(&state.authenticator, req.headers()).map_err(|rejection| {
        match &rejection {
            TokenRejection::Missing => {
                tracing::debug!(kind = rejection.kind(), "Request without bearer token")
            }
            TokenRejection::Malformed(reason) | TokenRejection::Invalid(reason) => {
                tracing::warn!(kind = rejection.kind(), reason = %reason, "Bearer token rejected")
            }
        }
        rejection
    })?;

    req.extensions_mut()
        .insert(AuthenticatedFarmer { farmer_id });

    Ok(next.run(req).await)
}

/// Resolve the `Authorization: Bearer <token>` header to a trusted farmer id.
pub fn verify_bearer(
    authenticator: &Authenticator,
    headers: &HeaderMap,
) -> Result<FarmerId, TokenRejection> {
    let token = extract_token_from_header(headers)?;

    let claims: auth::Claims = authenticator.validate_token(token).map_err(|e| {
        if e.is_malformed() {
            TokenRejection::Malformed(e.to_string())
        } else {
            TokenRejection::Invalid(e.to_string())
        }
    })?;

    let subject = claims
        .sub
        .ok_or_else(|| TokenRejection::Malformed("missing 'sub' claim".to_string()))?;

    FarmerId::from_string(&subject).map_err(|e| TokenRejection::Malformed(e.to_string()))
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, TokenRejection> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(TokenRejection::Missing)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(TokenRejection::Missing)
            } else {
                Ok(token)
            }
        }
        // Other schemes (e.g. `Basic`) carry no bearer token: 401, not 403.
        _ => Err(TokenRejection::Missing),
    }
}

#[cfg(test)]
mod tests {
    use auth::Claims;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn headers(authorization: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_valid_token_resolves_farmer() {
        let authenticator = Authenticator::new(SECRET);
        let farmer_id = FarmerId::new();
        let token = authenticator
            .generate_token(&Claims::for_user(farmer_id, "ravi".to_string(), 1))
            .unwrap();

        let resolved = verify_bearer(&authenticator, &headers(Some(&format!("Bearer {token}"))));
        assert_eq!(resolved, Ok(farmer_id));
    }

    #[test]
    fn test_missing_header() {
        let authenticator = Authenticator::new(SECRET);

        assert_eq!(
            verify_bearer(&authenticator, &headers(None)),
            Err(TokenRejection::Missing)
        );
        assert_eq!(
            verify_bearer(&authenticator, &headers(Some("Bearer "))),
            Err(TokenRejection::Missing)
        );
        assert_eq!(
            verify_bearer(&authenticator, &headers(Some("Basic cmF2aTpwdw=="))),
            Err(TokenRejection::Missing)
        );
    }

    #[test]
    fn test_unparseable_token_is_malformed() {
        let authenticator = Authenticator::new(SECRET);

        let result = verify_bearer(&authenticator, &headers(Some("Bearer abc")));
        assert!(matches!(result, Err(TokenRejection::Malformed(_))));
    }

    #[test]
    fn test_forged_and_expired_tokens_are_invalid() {
        let authenticator = Authenticator::new(SECRET);
        let forger = Authenticator::new(b"another_secret_key_at_least_32_bytes");

        let forged = forger
            .generate_token(&Claims::for_user(FarmerId::new(), "ravi".to_string(), 1))
            .unwrap();
        let result = verify_bearer(&authenticator, &headers(Some(&format!("Bearer {forged}"))));
        assert!(matches!(result, Err(TokenRejection::Invalid(_))));

        let expired = authenticator
            .generate_token(&Claims::for_user_at(
                FarmerId::new(),
                "ravi".to_string(),
                Utc::now() - Duration::minutes(61),
                Duration::hours(1),
            ))
            .unwrap();
        let result = verify_bearer(&authenticator, &headers(Some(&format!("Bearer {expired}"))));
        assert!(matches!(result, Err(TokenRejection::Invalid(_))));
    }

    #[test]
    fn test_non_uuid_subject_is_malformed() {
        let authenticator = Authenticator::new(SECRET);
        let token = authenticator
            .generate_token(&Claims::for_user("not-a-uuid", "ravi".to_string(), 1))
            .unwrap();

        let result = verify_bearer(&authenticator, &headers(Some(&format!("Bearer {token}"))));
        assert!(matches!(result, Err(TokenRejection::Malformed(_))));
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            TokenRejection::Missing.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            TokenRejection::Malformed("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            TokenRejection::Invalid("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
