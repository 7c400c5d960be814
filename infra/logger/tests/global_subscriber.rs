use dhub_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn console_logger_is_installed_once_per_process() {
    let logger = Logger::builder()
        .name("dhub-console")
        .ansi(false)
        .level(LevelFilter::WARN)
        .init()
        .expect("first init should succeed");
    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");

    let err = Logger::builder()
        .name("dhub-console-again")
        .init()
        .expect_err("second init should fail");
    assert!(matches!(err, LoggerError::Subscriber { .. }), "unexpected error: {err}");
}
