use matricula::matricula_core::{BcryptHasher, PasswordHasher, hash_password, verify_password};

#[test]
fn test_hash_password_success() {
    let password = "testpassword123";
    let hash = hash_password(password).unwrap();

    assert!(!hash.is_empty());
    assert_ne!(hash, password);
}

#[test]
fn test_verify_password_correct() {
    let hash = hash_password("correctpassword").unwrap();
    assert!(verify_password("correctpassword", &hash).unwrap());
}

#[test]
fn test_verify_password_incorrect() {
    let hash = hash_password("correctpassword").unwrap();
    assert!(!verify_password("wrongpassword", &hash).unwrap());
}

#[test]
fn test_verify_password_malformed_hash_errors() {
    assert!(verify_password("password", "not-a-bcrypt-hash").is_err());
}

#[test]
fn test_same_password_hashes_differ() {
    let hasher = BcryptHasher::new(4);
    let first = hasher.hash("student123").unwrap();
    let second = hasher.hash("student123").unwrap();

    assert_ne!(first, second);
    assert!(hasher.verify("student123", &first).unwrap());
    assert!(hasher.verify("student123", &second).unwrap());
}

#[test]
fn test_hasher_cost_is_kept() {
    let hasher = BcryptHasher::new(5);
    assert_eq!(hasher.cost(), 5);
    let hash = hasher.hash("parent123").unwrap();
    assert!(hash.starts_with("$2b$05$"));
}
