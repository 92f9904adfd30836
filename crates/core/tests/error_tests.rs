// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_sync_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn validation() {
        let err = CoreError::Validation("Portfolio name must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Portfolio name must not be empty"
        );
    }

    #[test]
    fn auth() {
        let err = CoreError::Auth("Incorrect username or password".into());
        assert_eq!(
            err.to_string(),
            "Authentication failed: Incorrect username or password"
        );
    }

    #[test]
    fn request_with_status() {
        let err = CoreError::request("get portfolio", 404, "Portfolio not found");
        assert_eq!(
            err.to_string(),
            "get portfolio request failed (HTTP 404): Portfolio not found"
        );
    }

    #[test]
    fn request_without_response() {
        let err = CoreError::Request {
            operation: "list portfolios".into(),
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "list portfolios request failed (no response): connection refused"
        );
    }

    #[test]
    fn load_names_the_portfolio() {
        let err = CoreError::Load {
            id: 42,
            reason: "timeout".into(),
        };
        assert_eq!(err.to_string(), "Failed to load portfolio 42: timeout");
    }

    #[test]
    fn storage() {
        let err = CoreError::Storage("disk full".into());
        assert_eq!(err.to_string(), "Token storage error: disk full");
    }

    #[test]
    fn network_and_deserialization() {
        assert_eq!(
            CoreError::Network("dns".into()).to_string(),
            "Network error: dns"
        );
        assert_eq!(
            CoreError::Deserialization("eof".into()).to_string(),
            "Deserialization error: eof"
        );
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

mod helpers {
    use super::*;

    #[test]
    fn only_auth_is_auth() {
        assert!(CoreError::Auth("x".into()).is_auth());
        assert!(!CoreError::Validation("x".into()).is_auth());
        assert!(!CoreError::request("update portfolio", 403, "x").is_auth());
    }

    #[test]
    fn status_is_exposed_for_requests_only() {
        assert_eq!(CoreError::request("delete", 500, "boom").status(), Some(500));
        assert_eq!(
            CoreError::Request {
                operation: "delete".into(),
                status: None,
                message: "offline".into(),
            }
            .status(),
            None
        );
        assert_eq!(CoreError::Network("x".into()).status(), None);
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let core_err: CoreError = io_err.into();
        match &core_err {
            CoreError::Storage(msg) => assert!(msg.contains("access denied")),
            other => panic!("Expected Storage, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let result: Result<String, _> = serde_json::from_str("{{invalid json");
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Deserialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn question_mark_propagates() {
        fn parse(raw: &str) -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str(raw)?)
        }
        assert!(parse("{}").is_ok());
        assert!(matches!(parse("nope"), Err(CoreError::Deserialization(_))));
    }
}

// ── std::error::Error ───────────────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn boxes_as_dyn_error() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            Box::new(CoreError::Auth("expired".into()));
        assert_eq!(err.to_string(), "Authentication failed: expired");
    }
}
