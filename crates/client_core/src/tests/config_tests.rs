use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn default_endpoint_resolves_against_page_origin() {
    let settings = FetcherSettings::default();
    assert_eq!(
        settings.endpoint_url().expect("url").as_str(),
        "http://127.0.0.1:5000/api/message"
    );
    assert_eq!(settings.timeout(), None);
}

#[test]
fn absolute_cluster_endpoint_ignores_page_origin() {
    let settings = FetcherSettings {
        endpoint: "http://backend-service:5000/api/message".into(),
        page_origin: "https://frontend.example".into(),
        ..FetcherSettings::default()
    };
    assert_eq!(
        settings.endpoint_url().expect("url").as_str(),
        "http://backend-service:5000/api/message"
    );
}

#[test]
fn endpoint_address_parses_paths_and_urls() {
    assert_eq!(
        "/api/message".parse::<EndpointAddress>().expect("path"),
        EndpointAddress::Path("/api/message".into())
    );
    assert!(matches!(
        " https://api.example/v1/message ".parse::<EndpointAddress>(),
        Ok(EndpointAddress::Absolute(_))
    ));
}

#[test]
fn endpoint_address_rejects_unusable_values() {
    assert!("".parse::<EndpointAddress>().is_err());
    assert!("api/message".parse::<EndpointAddress>().is_err());
    assert!("backend-service:5000/api/message"
        .parse::<EndpointAddress>()
        .is_err());
    assert!("ftp://files.example/message".parse::<EndpointAddress>().is_err());
}

#[test]
fn path_endpoint_replaces_page_origin_path() {
    let origin = Url::parse("http://frontend.local:8080/app/index.html").expect("origin");
    let url = EndpointAddress::Path("/api/message".into())
        .resolve(&origin)
        .expect("resolve");
    assert_eq!(url.as_str(), "http://frontend.local:8080/api/message");
}

#[test]
fn invalid_page_origin_is_reported() {
    let settings = FetcherSettings {
        page_origin: "not a url".into(),
        ..FetcherSettings::default()
    };
    let err = settings.endpoint_url().expect_err("must fail");
    assert!(err.to_string().contains("invalid page origin"));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = FetcherSettings::default();
    apply_file(
        &mut settings,
        r#"
endpoint = "http://backend-service:5000/api/message"
timeout_secs = 5
display_id = "greeting"
"#,
    )
    .expect("apply file");

    assert_eq!(settings.endpoint, "http://backend-service:5000/api/message");
    assert_eq!(settings.timeout(), Some(Duration::from_secs(5)));
    assert_eq!(settings.binding().display, ElementId::new("greeting"));
    assert_eq!(settings.binding().trigger, ElementId::new(FETCH_BUTTON_ID));
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = FetcherSettings::default();
    assert!(apply_file(&mut settings, "endpont = \"/api/message\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = FetcherSettings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("FETCHER_ENDPOINT", "/plain"),
            ("APP__ENDPOINT", "/prefixed"),
            ("FETCHER_PAGE_ORIGIN", "http://frontend:80"),
            ("APP__TIMEOUT_SECS", "30"),
        ]),
    )
    .expect("apply env");

    assert_eq!(settings.endpoint, "/prefixed");
    assert_eq!(
        settings.endpoint_url().expect("url").as_str(),
        "http://frontend/prefixed"
    );
    assert_eq!(settings.timeout_secs, Some(30));
}

#[test]
fn non_numeric_timeout_env_is_an_error() {
    let mut settings = FetcherSettings::default();
    let err = apply_env(&mut settings, env_from(&[("APP__TIMEOUT_SECS", "soon")]))
        .expect_err("must fail");
    assert!(err.to_string().contains("APP__TIMEOUT_SECS"));
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    assert!(load_settings_with(Some(&missing), env_from(&[])).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cluster.toml");
    fs::write(&path, "page_origin = \"http://frontend-service:80\"\n").expect("write");

    let settings =
        load_settings_with(Some(&path), env_from(&[("APP__ENDPOINT", "/v2/message")]))
            .expect("load");
    assert_eq!(
        settings.endpoint_url().expect("url").as_str(),
        "http://frontend-service/v2/message"
    );
}

#[test]
fn deployment_variants_resolve_to_their_backends() {
    let deploy_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../deploy");
    let cases = [
        ("local.toml", "http://127.0.0.1:5000/api/message"),
        ("cluster.toml", "http://backend-service:5000/api/message"),
        ("proxied.toml", "http://frontend-service/api/message"),
    ];

    for (file, expected) in cases {
        let settings = load_settings_with(Some(&deploy_dir.join(file)), env_from(&[]))
            .unwrap_or_else(|err| panic!("{file}: {err:#}"));
        assert_eq!(settings.endpoint_url().expect("url").as_str(), expected, "{file}");
    }
}

#[test]
fn zero_timeout_means_no_timeout() {
    let mut settings = FetcherSettings::default();
    apply_file(&mut settings, "timeout_secs = 0\n").expect("apply file");
    assert_eq!(settings.timeout(), None);

    apply_env(&mut settings, env_from(&[("APP__TIMEOUT_SECS", "0")])).expect("apply env");
    assert_eq!(settings.timeout_secs, Some(0));
    assert_eq!(settings.timeout(), None);

    settings.timeout_secs = Some(2);
    assert_eq!(settings.timeout(), Some(Duration::from_secs(2)));
}
