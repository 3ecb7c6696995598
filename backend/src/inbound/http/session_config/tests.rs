//! Unit tests for session configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use uuid::Uuid;

struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("kunda-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write key file");
        Self { path }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_vars(key: &TempKeyFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path_str()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_complete_configuration() {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let env = mock_env(release_vars(&key));

    let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
fn release_missing_cookie_secure_is_rejected() {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.remove(COOKIE_SECURE_ENV);

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(
        result,
        Err(SessionConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV
        })
    ));
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_invalid_cookie_secure_is_rejected(#[case] value: &str) {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(COOKIE_SECURE_ENV, value.to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(
        result,
        Err(SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        })
    ));
}

#[rstest]
fn release_short_key_is_rejected() {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN - 1);
    let result = session_settings_from_env(&mock_env(release_vars(&key)), BuildMode::Release);
    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length, .. }) if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_missing_key_file_is_rejected() {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(KEY_FILE_ENV, "/nonexistent/kunda/session_key".to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(result, Err(SessionConfigError::KeyRead { .. })));
}

#[rstest]
fn release_rejects_ephemeral_keys() {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(result, Err(SessionConfigError::EphemeralNotAllowed)));
}

#[rstest]
fn release_rejects_same_site_none_without_secure_cookie() {
    let key = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(result, Err(SessionConfigError::InsecureSameSiteNone)));
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let env = mock_env(HashMap::from([(
        KEY_FILE_ENV,
        "/nonexistent/kunda/session_key".to_owned(),
    )]));

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_tolerates_invalid_same_site() {
    let env = mock_env(HashMap::from([
        (KEY_FILE_ENV, "/nonexistent/kunda/session_key".to_owned()),
        (SAMESITE_ENV, "sometimes".to_owned()),
    ]));

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug fallback");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case("1", Some(true))]
#[case("Yes", Some(true))]
#[case(" n ", Some(false))]
#[case("FALSE", Some(false))]
#[case("2", None)]
fn parse_bool_accepts_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}
