use rusty_library_circulation::application::LibraryError;
use rusty_library_circulation::domain::{Book, LoanStatus, LoanView};
use rusty_library_circulation::ports::{FailureKind, GatewayEnvelope, GatewayError};

#[test]
fn test_success_envelope_decodes_data() {
    let json = r#"{
        "success": true,
        "data": {
            "loan_id": "6f1c2a4e-8d7b-4f1e-9a3c-2b5d7e9f1a3c",
            "book_id": "0b8e6a2d-4c1f-4e7a-8b3d-5f9a1c2e4b6d",
            "borrower_id": "3e5a7c9b-1d2f-4a6b-8c0e-2f4a6b8c0d1e",
            "loan_date": "2025-03-01T10:00:00Z",
            "due_date": "2025-03-15T10:00:00Z",
            "return_date": null,
            "version": 2,
            "created_by": "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d",
            "status": "Overdue"
        }
    }"#;

    let envelope: GatewayEnvelope<LoanView> = serde_json::from_str(json).unwrap();
    let view = envelope.into_result().unwrap();

    assert_eq!(view.status, LoanStatus::Overdue);
    assert_eq!(view.loan.version.value(), 2);
    assert!(view.loan.return_date.is_none());
}

#[test]
fn test_success_envelope_decodes_book() {
    // 書誌情報はフラットに並ぶ
    let json = r#"{
        "success": true,
        "data": {
            "book_id": "0b8e6a2d-4c1f-4e7a-8b3d-5f9a1c2e4b6d",
            "title": "The Dispossessed",
            "author": "Ursula K. Le Guin",
            "year": 1974,
            "genre": "Science Fiction",
            "total_copies": 3,
            "version": 4,
            "created_by": "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d",
            "created_at": "2025-01-10T09:00:00Z",
            "updated_at": "2025-02-01T12:30:00Z"
        },
        "message": null
    }"#;

    let envelope: GatewayEnvelope<Book> = serde_json::from_str(json).unwrap();
    let book = envelope.into_result().unwrap();

    assert_eq!(book.details.title, "The Dispossessed");
    assert_eq!(book.details.year, 1974);
    assert_eq!(book.details.total_copies, 3);
    assert_eq!(book.version.value(), 4);
    assert!(book.updated_at > book.created_at);
}

#[test]
fn test_success_envelope_decodes_book_list() {
    let json = r#"{"success": true, "data": []}"#;

    let envelope: GatewayEnvelope<Vec<Book>> = serde_json::from_str(json).unwrap();

    assert!(envelope.into_result().unwrap().is_empty());
}

#[test]
fn test_failure_envelopes_map_to_error_kinds() {
    let cases = [
        (r#"{"success": false, "failure": "authentication"}"#, "auth"),
        (
            r#"{"success": false, "failure": "authorization", "message": "librarians only"}"#,
            "forbidden",
        ),
        (
            r#"{"success": false, "failure": "validation", "message": "title is required"}"#,
            "validation",
        ),
        (r#"{"success": false, "failure": "conflict", "message": "stale"}"#, "conflict"),
        (r#"{"success": false, "failure": "not_found", "message": "book"}"#, "not_found"),
        (r#"{"success": false, "message": "502 Bad Gateway"}"#, "transport"),
    ];

    for (json, expected) in cases {
        let envelope: GatewayEnvelope<Book> = serde_json::from_str(json).unwrap();
        let err = envelope.into_result().unwrap_err();
        let matched = match (&err, expected) {
            (GatewayError::Unauthenticated, "auth") => true,
            (GatewayError::Forbidden(m), "forbidden") => m == "librarians only",
            (GatewayError::Validation(m), "validation") => m == "title is required",
            (GatewayError::Conflict(_), "conflict") => true,
            (GatewayError::NotFound(_), "not_found") => true,
            (GatewayError::Transport(_), "transport") => true,
            _ => false,
        };
        assert!(matched, "{} decoded as {:?}", json, err);
    }
}

#[test]
fn test_success_without_data_is_transport_failure() {
    let envelope: GatewayEnvelope<Book> = serde_json::from_str(r#"{"success": true}"#).unwrap();
    let err: LibraryError = envelope.into_result().unwrap_err().into();
    assert!(matches!(err, LibraryError::Gateway(_)));
}

#[test]
fn test_error_round_trips_through_envelope() {
    let envelope: GatewayEnvelope<Book> =
        GatewayEnvelope::from(&GatewayError::Conflict("book changed".to_string()));
    assert_eq!(envelope.failure, Some(FailureKind::Conflict));

    let json = serde_json::to_string(&envelope).unwrap();
    let decoded: GatewayEnvelope<Book> = serde_json::from_str(&json).unwrap();
    assert!(matches!(
        decoded.into_result(),
        Err(GatewayError::Conflict(_))
    ));
}
