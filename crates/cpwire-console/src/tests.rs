use super::*;

fn visitor(event: &str) -> EventVisitor {
    EventVisitor {
        event: Some(event.to_string()),
        ..EventVisitor::default()
    }
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_number(1234567.0), "1,234,567");
    assert_eq!(format_number(-42.0), "-42");
    assert_eq!(format_number(2.5), "2.5");
}

#[test]
fn test_seconds_formatting() {
    assert_eq!(format_seconds(0.25), "250ms");
    assert_eq!(format_seconds(2.0), "2.00s");
    assert_eq!(format_seconds(125.0), "2m 5s");
}

#[test]
fn test_solve_start_line() {
    let mut v = visitor("solve_start");
    v.node_count = Some(1500);
    v.ref_count = Some(12);
    v.constraint_count = Some(48);
    v.time_limit = Some(30.0);
    let line = format_event(&v, Level::INFO);
    assert!(line.contains("1,500"));
    assert!(line.contains("nodes"));
    assert!(line.contains("30"));
}

#[test]
fn test_solve_end_status() {
    let mut v = visitor("solve_end");
    v.solution_count = Some(3);
    v.proof = Some(true);
    v.objective = Some(17.0);
    let text = format_event(&v, Level::INFO);
    assert!(text.contains("OPTIMAL SOLUTION FOUND"));
    assert!(text.contains("17"));

    v.solution_count = Some(0);
    assert_eq!(solve_status(&v).0, "INFEASIBLE (proven)");
    v.proof = Some(false);
    assert_eq!(solve_status(&v), ("NO SOLUTION FOUND", false));
}

#[test]
fn test_propagation_end() {
    let mut v = visitor("solve_end");
    v.command = Some("propagate".to_string());
    v.infeasible = Some(true);
    assert!(format_event(&v, Level::INFO).contains("infeasible"));
}

#[test]
fn test_invalid_solution_is_flagged() {
    let mut v = visitor("solution");
    v.objective = Some(9.0);
    v.valid = Some(false);
    assert!(format_event(&v, Level::INFO).contains("INVALID"));
}

#[test]
fn test_quiet_events() {
    assert!(format_event(&visitor("command_sent"), Level::DEBUG).is_empty());

    let mut closed = visitor("transport_closed");
    closed.ok = Some(true);
    assert!(format_event(&closed, Level::DEBUG).is_empty());
    closed.ok = Some(false);
    closed.error = Some("pipe closed".to_string());
    assert!(format_event(&closed, Level::INFO).contains("pipe closed"));
}
