//! Process transport tests driven by small shell scripts.

use std::path::Path;
use std::time::Duration;

use super::*;

fn sh(script: &str) -> Connection {
    ProcessTransport::spawn(Path::new("/bin/sh"), &["-c".to_string(), script.to_string()])
        .unwrap()
}

/// Collects events up to and including the close event.
async fn drain(connection: &mut Connection) -> (Vec<String>, Vec<String>, Result<(), TransportError>) {
    let mut lines = Vec::new();
    let mut stderr = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), connection.events.recv())
            .await
            .expect("transport did not close in time")
            .expect("event channel ended without a close event");
        match event {
            TransportEvent::Line(line) => lines.push(line),
            TransportEvent::Stderr(line) => stderr.push(line),
            TransportEvent::Closed(result) => return (lines, stderr, result),
        }
    }
}

#[tokio::test]
async fn test_lines_arrive_in_order() {
    let mut connection = sh(r#"printf 'one\ntwo\nthr'; printf 'ee\nfour'"#);
    let (lines, stderr, result) = drain(&mut connection).await;
    assert_eq!(lines, vec!["one", "two", "three", "four"]);
    assert!(stderr.is_empty());
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_stdin_round_trip_and_close() {
    let mut connection = sh("cat");
    connection.transport.send(r#"{"msg":"handshake"}"#);
    connection.transport.send(r#"{"msg":"stop","reason":"done"}"#);
    connection.transport.close();
    connection.transport.close();
    connection.transport.send("dropped after close");

    let (lines, _, result) = drain(&mut connection).await;
    assert_eq!(
        lines,
        vec![r#"{"msg":"handshake"}"#, r#"{"msg":"stop","reason":"done"}"#]
    );
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_stderr_is_separate() {
    let mut connection = sh("echo 'note' >&2; echo '{}'");
    let (lines, stderr, result) = drain(&mut connection).await;
    assert_eq!(lines, vec!["{}"]);
    assert_eq!(stderr, vec!["note"]);
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_failed_exit_is_an_error() {
    let mut connection = sh("echo partial; exit 3");
    let (lines, _, result) = drain(&mut connection).await;
    assert_eq!(lines, vec!["partial"]);
    match result {
        Err(TransportError::ProcessExited(status)) => assert_eq!(status.code(), Some(3)),
        other => panic!("expected ProcessExited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_kill_stops_the_process() {
    let mut connection = sh("sleep 30");
    connection.transport.kill();
    connection.transport.kill();
    let (lines, _, result) = drain(&mut connection).await;
    assert!(lines.is_empty());
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_missing_executable() {
    let err = ProcessTransport::spawn(Path::new("/nonexistent/cpsolver"), &[]).unwrap_err();
    match err {
        TransportError::Spawn { program, .. } => assert_eq!(program, "/nonexistent/cpsolver"),
        other => panic!("expected Spawn, got {other:?}"),
    }
}

#[tokio::test]
async fn test_default_connector_spawns_executables() {
    let location = SolverLocation::Executable("/bin/sh".into());
    let args = vec!["-c".to_string(), "echo ready".to_string()];
    let mut connection = DefaultConnector.connect(&location, &args).unwrap();
    let (lines, _, result) = drain(&mut connection).await;
    assert_eq!(lines, vec!["ready"]);
    assert!(result.is_ok());
}
