use super::*;

#[test]
fn unauthenticated_maps_to_unauthenticated() {
    let err: SessionError = BackendError::Unauthenticated("expired".into()).into();
    assert_eq!(err, SessionError::Unauthenticated("expired".into()));
}

#[test]
fn invalid_credentials_outside_password_step_is_other() {
    let err: SessionError = BackendError::InvalidCredentials("Invalid credentials".into()).into();
    assert_eq!(err, SessionError::Other("Invalid credentials".into()));
}

#[test]
fn password_step_remaps_invalid_credentials() {
    let err = password_error(BackendError::InvalidCredentials("Invalid credentials. Please check".into()));
    assert_eq!(err, SessionError::WrongCurrentPassword);
    assert_eq!(err.to_string(), "Current password is incorrect");
}

#[test]
fn password_step_keeps_session_expiry_distinct() {
    let err = password_error(BackendError::Unauthenticated("no session".into()));
    assert_eq!(err, SessionError::Unauthenticated("no session".into()));
}

#[test]
fn session_creation_never_reports_expiry() {
    let msg = "Creation of a session is prohibited when a session is active.";
    assert_eq!(session_error(BackendError::Unauthenticated(msg.into())), SessionError::Other(msg.into()));
    assert_eq!(
        session_error(BackendError::InvalidCredentials("Invalid credentials".into())),
        SessionError::Other("Invalid credentials".into())
    );
}

#[test]
fn other_message_passes_through_verbatim() {
    let err: SessionError = BackendError::Other("rate limit exceeded".into()).into();
    assert_eq!(err.to_string(), "rate limit exceeded");
}

#[test]
fn configuration_missing_message() {
    assert_eq!(SessionError::ConfigurationMissing.to_string(), "Avatar bucket ID not configured");
}

#[test]
fn codes_are_distinct() {
    let codes = [
        SessionError::Unauthenticated(String::new()).code(),
        SessionError::WrongCurrentPassword.code(),
        SessionError::ConfigurationMissing.code(),
        SessionError::Other(String::new()).code(),
    ];
    for (i, a) in codes.iter().enumerate() {
        for b in &codes[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
