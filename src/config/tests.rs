use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.bind_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_cover_local_development() {
    let raw = RawSettings::default();
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.bind_addr.to_string(), "127.0.0.1:8000");
    assert_eq!(settings.exports.retention, Duration::from_secs(30 * 60));
    assert_eq!(
        settings.convert.max_content_bytes.get(),
        DEFAULT_MAX_CONTENT_BYTES
    );
    assert_eq!(settings.pdf.chromium_path, PathBuf::from("chromium"));
}

#[test]
fn content_limit_can_be_overridden_via_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        convert_max_content_bytes: Some(1_572_864),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.convert.max_content_bytes.get(), 1_572_864);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["torchio"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_convert_arguments() {
    let args = CliArgs::parse_from([
        "torchio",
        "convert",
        "--format",
        "pdf",
        "--output",
        "/tmp/report.pdf",
        "--title",
        "Weekly Report",
        "--pdf-chromium-path",
        "/usr/bin/chromium",
        "/tmp/report.md",
    ]);

    match args.command.expect("convert command") {
        Command::Convert(convert) => {
            assert_eq!(convert.format, "pdf");
            assert_eq!(
                convert.output.as_deref(),
                Some(std::path::Path::new("/tmp/report.pdf"))
            );
            assert_eq!(convert.title.as_deref(), Some("Weekly Report"));
            assert_eq!(
                convert.pdf.chromium_path.as_deref(),
                Some(std::path::Path::new("/usr/bin/chromium"))
            );
            assert_eq!(convert.input, std::path::Path::new("/tmp/report.md"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "torchio",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--exports-root",
        "/var/lib/torchio/exports",
        "--exports-retention-minutes",
        "5",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.exports_root.as_deref(),
                Some(std::path::Path::new("/var/lib/torchio/exports"))
            );
            assert_eq!(serve.overrides.exports_retention_minutes, Some(5));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn sweep_schedule_must_parse() {
    let mut raw = RawSettings::default();
    raw.exports.sweep_schedule = Some("not a cron line".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid schedule");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "exports.sweep_schedule",
            ..
        }
    ));
}

#[test]
fn zero_retention_is_rejected() {
    let mut raw = RawSettings::default();
    raw.exports.retention_minutes = Some(0);

    let err = Settings::from_raw(raw).expect_err("invalid retention");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "exports.retention_minutes",
            ..
        }
    ));
}
