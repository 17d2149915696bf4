use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_path(tag: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir().join(format!("story_submission_{tag}_{suffix}.toml"))
}

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_match_advertised_behavior() {
    let settings = Settings::default();
    assert_eq!(settings.submit_delay(), Duration::from_millis(1500));
    assert_eq!(settings.attachment_limit(), Some(10 * 1024 * 1024));
}

#[test]
fn disabling_enforcement_removes_limit() {
    let settings = Settings {
        enforce_attachment_size_limit: false,
        ..Settings::default()
    };
    assert_eq!(settings.attachment_limit(), None);
}

#[test]
fn missing_file_yields_defaults() {
    let path = temp_settings_path("missing");
    assert!(!path.exists());

    let settings = load_settings_from(&path);
    assert_eq!(settings.max_attachment_bytes, DEFAULT_MAX_ATTACHMENT_BYTES);
}

#[test]
fn reads_values_from_settings_file() {
    let path = temp_settings_path("file");
    fs::write(
        &path,
        "submit_delay_ms = 250\nmax_attachment_bytes = 2048\nenforce_attachment_size_limit = false\n",
    )
    .expect("write settings");

    let raw = fs::read_to_string(&path).expect("read back");
    let file_cfg = toml::from_str::<FileSettings>(&raw).expect("parse");
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, file_cfg);

    assert_eq!(settings.submit_delay_ms, 250);
    assert_eq!(settings.max_attachment_bytes, 2048);
    assert!(!settings.enforce_attachment_size_limit);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let file_cfg = toml::from_str::<FileSettings>("submit_delay_ms = 10\n").expect("parse");
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, file_cfg);

    assert_eq!(settings.submit_delay_ms, 10);
    assert_eq!(settings.max_attachment_bytes, DEFAULT_MAX_ATTACHMENT_BYTES);
    assert!(settings.enforce_attachment_size_limit);
}

#[test]
fn malformed_file_is_ignored() {
    let path = temp_settings_path("malformed");
    fs::write(&path, "submit_delay_ms = \"soon\"").expect("write settings");

    let settings = load_settings_from(&path);
    assert_eq!(settings.max_attachment_bytes, DEFAULT_MAX_ATTACHMENT_BYTES);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn app_prefixed_env_var_wins_over_plain_one() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("SUBMIT_DELAY_MS", "100"),
            ("APP__SUBMIT_DELAY_MS", "200"),
            ("APP__MAX_ATTACHMENT_BYTES", "4096"),
            ("APP__ENFORCE_ATTACHMENT_SIZE_LIMIT", "false"),
        ]),
    );

    assert_eq!(settings.submit_delay_ms, 200);
    assert_eq!(settings.max_attachment_bytes, 4096);
    assert!(!settings.enforce_attachment_size_limit);
}

#[test]
fn unparsable_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("APP__SUBMIT_DELAY_MS", "later"),
            ("APP__ENFORCE_ATTACHMENT_SIZE_LIMIT", "maybe"),
        ]),
    );
    assert_eq!(settings, Settings::default());
}
