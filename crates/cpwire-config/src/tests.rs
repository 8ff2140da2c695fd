//! Tests for client configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        solver = "/opt/cp/bin/cpsolver"
        solver_args = ["--quiet"]
        colors = "never"
        batch_results = "always"

        [parameters]
        time_limit = 30
        nb_workers = 4
        preset = "large"
        search_type = "fds_dual"
        random_seed = 7
        relative_gap_tolerance = 0.01
    "#;

    let config = ClientConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.solver.as_deref(), Some("/opt/cp/bin/cpsolver"));
    assert_eq!(config.solver_args, vec!["--quiet".to_string()]);
    assert!(config.print_log);
    assert_eq!(config.colors, ColorMode::Never);
    assert_eq!(config.batch_results, BatchMode::Always);
    assert_eq!(config.parameters.time_limit, Some(30.0));
    assert_eq!(config.parameters.nb_workers, Some(4));
    assert_eq!(config.parameters.preset, Some(Preset::Large));
    assert_eq!(config.parameters.search_type, Some(SearchType::FdsDual));
    assert_eq!(config.parameters.relative_gap_tolerance, Some(0.01));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        solver: wss://solver.example.com/run
        print_log: false
        parameters:
          time_limit: 2.5
          log_level: 1
    "#;

    let config = ClientConfig::from_yaml_str(yaml).unwrap();
    assert!(!config.print_log);
    assert_eq!(config.parameters.time_limit, Some(2.5));
    assert_eq!(config.parameters.log_level, Some(1));
    assert_eq!(
        config.resolve_with(|_| None, None),
        SolverLocation::Url("wss://solver.example.com/run".to_string())
    );
}

#[test]
fn test_empty_file_gives_defaults() {
    let config = ClientConfig::from_toml_str("").unwrap();
    assert_eq!(config, ClientConfig::default());
    assert!(config.print_log);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ClientConfig::load("/nonexistent/cpwire.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_parameters_wire_names() {
    let parameters = Parameters::new()
        .with_time_limit(10.0)
        .with_workers(2)
        .with_search_type(SearchType::Lns)
        .with_preset(Preset::Default)
        .with_random_seed(3)
        .with_log_period(1.5)
        .with_verify_solutions(true)
        .with_absolute_gap_tolerance(0.5)
        .with_batch_results(true);

    let json = serde_json::to_value(&parameters).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "timeLimit": 10.0,
            "nbWorkers": 2,
            "searchType": "LNS",
            "preset": "Default",
            "randomSeed": 3,
            "logPeriod": 1.5,
            "verifySolutions": true,
            "absoluteGapTolerance": 0.5,
            "batchResults": true
        })
    );
}

#[test]
fn test_unset_parameters_are_omitted() {
    let json = serde_json::to_string(&Parameters::default()).unwrap();
    assert_eq!(json, "{}");
}

#[test]
fn test_builder() {
    let config = ClientConfig::new()
        .with_solver("./cpsolver")
        .with_solver_arg("--threads=2")
        .with_print_log(false)
        .with_colors(ColorMode::Always)
        .with_batch_results(BatchMode::Never)
        .with_parameters(Parameters::new().with_fail_limit(1000).with_solution_limit(5));

    assert_eq!(config.solver_args.len(), 1);
    assert!(!config.print_log);
    assert_eq!(config.parameters.fail_limit, Some(1000));
    assert_eq!(config.parameters.solution_limit, Some(5));
}

#[test]
fn test_resolution_order() {
    let env = |name: &str| (name == SOLVER_ENV).then(|| "/from/env".to_string());
    let companion = Some(PathBuf::from("/install/bin/cpsolver"));

    let explicit = ClientConfig::new().with_solver("/explicit");
    assert_eq!(
        explicit.resolve_with(env, companion.clone()),
        SolverLocation::Executable(PathBuf::from("/explicit"))
    );

    let config = ClientConfig::new();
    assert_eq!(
        config.resolve_with(env, companion.clone()),
        SolverLocation::Executable(PathBuf::from("/from/env"))
    );
    assert_eq!(
        config.resolve_with(|_| None, companion),
        SolverLocation::Executable(PathBuf::from("/install/bin/cpsolver"))
    );
    assert_eq!(
        config.resolve_with(|_| None, None),
        SolverLocation::Executable(PathBuf::from(DEFAULT_SOLVER))
    );
}

#[test]
fn test_empty_env_value_is_skipped() {
    let config = ClientConfig::new();
    assert_eq!(
        config.resolve_with(|_| Some(String::new()), None),
        SolverLocation::Executable(PathBuf::from(DEFAULT_SOLVER))
    );
}

#[test]
fn test_location_parsing() {
    for url in [
        "ws://host:1/x",
        "wss://host/x",
        "http://host/x",
        "HTTPS://host/x",
    ] {
        assert!(SolverLocation::parse(url).is_remote(), "{url}");
    }
    assert_eq!(
        SolverLocation::parse("bin/wss-solver"),
        SolverLocation::Executable(PathBuf::from("bin/wss-solver"))
    );
}

#[test]
fn test_validation() {
    assert!(ClientConfig::default().validate().is_ok());
    assert!(ClientConfig::new().with_solver("  ").validate().is_err());

    let bad = [
        Parameters::new().with_time_limit(-1.0),
        Parameters::new().with_time_limit(f64::NAN),
        Parameters::new().with_workers(0),
        Parameters::new().with_log_level(9),
        Parameters::new().with_relative_gap_tolerance(f64::INFINITY),
    ];
    for parameters in bad {
        let err = ClientConfig::new()
            .with_parameters(parameters)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

#[test]
fn test_mode_resolution() {
    assert!(BatchMode::Auto.resolve(false));
    assert!(!BatchMode::Auto.resolve(true));
    assert!(BatchMode::Always.resolve(true));
    assert!(!BatchMode::Never.resolve(false));

    assert!(ColorMode::Auto.enabled(true));
    assert!(!ColorMode::Auto.enabled(false));
    assert!(ColorMode::Always.enabled(false));
}
