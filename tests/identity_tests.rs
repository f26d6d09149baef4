//! Identity gate tests
//!
//! Credential validation against seeded users and the session token
//! round trip carrying tenant claims.

use std::sync::Arc;

use tempfile::TempDir;

use cardtrace::api::IdentityGate;
use cardtrace::storage::SeaOrmStorage;
use cardtrace::utils::password::hash_password;

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let td = TempDir::new().unwrap();
    let path = td.path().join("identity_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url).await.unwrap();
    (Arc::new(storage), td)
}

#[tokio::test]
async fn test_authenticate_valid_credentials() {
    let (storage, _td) = create_temp_storage().await;
    let org_id = storage.insert_organization("Acme Cards").await.unwrap();
    let password_hash = hash_password("hunter2_secure").unwrap();
    let user_id = storage
        .insert_user(org_id, "ana@acme.test", &password_hash, "Ana Díaz", "admin")
        .await
        .unwrap();

    let gate = IdentityGate::new(storage);
    let principal = gate
        .authenticate("ana@acme.test", "hunter2_secure")
        .await
        .unwrap();

    assert_eq!(principal.user_id, user_id);
    assert_eq!(principal.organization_id, org_id);
    assert_eq!(principal.organization_name, "Acme Cards");
    assert_eq!(principal.role, "admin");
}

#[tokio::test]
async fn test_authenticate_wrong_password() {
    let (storage, _td) = create_temp_storage().await;
    let org_id = storage.insert_organization("Acme Cards").await.unwrap();
    let password_hash = hash_password("correct_password").unwrap();
    storage
        .insert_user(org_id, "ana@acme.test", &password_hash, "Ana Díaz", "admin")
        .await
        .unwrap();

    let gate = IdentityGate::new(storage);
    let result = gate.authenticate("ana@acme.test", "wrong_password").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_authenticate_unknown_email_same_error_shape() {
    let (storage, _td) = create_temp_storage().await;
    let org_id = storage.insert_organization("Acme Cards").await.unwrap();
    let password_hash = hash_password("correct_password").unwrap();
    storage
        .insert_user(org_id, "ana@acme.test", &password_hash, "Ana Díaz", "admin")
        .await
        .unwrap();

    let gate = IdentityGate::new(storage);

    let unknown = gate
        .authenticate("nobody@acme.test", "correct_password")
        .await
        .unwrap_err();
    let wrong = gate
        .authenticate("ana@acme.test", "wrong_password")
        .await
        .unwrap_err();

    // both failures look identical to the caller
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn test_session_token_round_trip() {
    let (storage, _td) = create_temp_storage().await;
    let org_id = storage.insert_organization("Acme Cards").await.unwrap();
    let password_hash = hash_password("hunter2_secure").unwrap();
    storage
        .insert_user(org_id, "ana@acme.test", &password_hash, "Ana Díaz", "member")
        .await
        .unwrap();

    let gate = IdentityGate::new(storage);
    let principal = gate
        .authenticate("ana@acme.test", "hunter2_secure")
        .await
        .unwrap();

    let token = gate.issue_session(&principal).unwrap();
    let restored = gate.verify(&token).unwrap();

    assert_eq!(restored, principal);
}

#[tokio::test]
async fn test_verify_rejects_garbage_token() {
    let (storage, _td) = create_temp_storage().await;
    let gate = IdentityGate::new(storage);

    assert!(gate.verify("not.a.token").is_err());
    assert!(gate.verify("").is_err());
}
