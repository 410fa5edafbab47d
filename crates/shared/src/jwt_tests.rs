//! Unit tests for JWT functionality and identity resolution.

#[cfg(test)]
mod tests {
    use crate::auth::{Claims, IdentityResolver};
    use crate::jwt::{JwtConfig, JwtError, JwtService};
    use crate::types::OwnerId;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret-key-for-testing";

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: SECRET.to_string(),
            access_token_expires_minutes: 15,
        })
    }

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let owner = OwnerId::from("u1");
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(&owner, expires_at);

        assert_eq!(claims.sub, "u1");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.owner_id(), owner);
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = create_test_service();
        let owner = OwnerId::from("auth0|abc123");

        let token = service.generate_access_token(&owner).unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "auth0|abc123");
    }

    #[test]
    fn test_resolve_owner_returns_subject() {
        let service = create_test_service();
        let owner = OwnerId::from("u1");
        let token = service.generate_access_token(&owner).unwrap();

        assert_eq!(service.resolve_owner(&token).unwrap(), owner);
    }

    #[test]
    fn test_resolve_owner_rejects_garbage() {
        let service = create_test_service();
        let result = service.resolve_owner("invalid.token.here");
        assert!(matches!(result, Err(JwtError::DecodingError(_))));
    }

    #[test]
    fn test_resolve_owner_rejects_foreign_signature() {
        let service = create_test_service();
        let other = JwtService::new(JwtConfig {
            secret: "some-other-secret".to_string(),
            access_token_expires_minutes: 15,
        });
        let token = other.generate_access_token(&OwnerId::from("u1")).unwrap();

        assert!(service.resolve_owner(&token).is_err());
    }

    #[test]
    fn test_resolve_owner_rejects_expired_token() {
        let service = create_test_service();
        let claims = Claims {
            sub: "u1".to_string(),
            iat: (Utc::now() - Duration::hours(2)).timestamp(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.resolve_owner(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_resolve_owner_rejects_empty_subject() {
        let service = create_test_service();
        let token = service.generate_access_token(&OwnerId::from("")).unwrap();

        assert!(matches!(service.resolve_owner(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_access_token_expires_in() {
        assert_eq!(create_test_service().access_token_expires_in(), 900);
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", create_test_service());
        assert!(debug.contains("[hidden]"));
        assert!(!debug.contains(SECRET));
    }
}
