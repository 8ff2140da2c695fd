//! Colorful console output for solver sessions.
//!
//! Provides a custom `tracing` layer that renders session lifecycle events
//! with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (solve start/end, handshake, solutions, bounds)
//! - **DEBUG**: Transport and command details

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[cfg(test)]
mod tests;

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SOLVE_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "cpwire_session=info,cpwire=info";

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and sets up tracing.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SessionConsoleLayer)
            .try_init();
    });
}

// Marks the start of solving for elapsed time tracking.
fn mark_solve_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SOLVE_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since solve start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SOLVE_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
                         _
  ___ _ ____      _(_)_ __ ___
 / __| '_ \ \ /\ / / | '__/ _ \
| (__| |_) \ V  V /| | | |  __/
 \___| .__/ \_/\_/ |_|_|  \___|
     |_|
"#;

    let version_line = format!("        v{} - Constraint Solver Client\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats session events with colors.
pub struct SessionConsoleLayer;

impl<S: Subscriber> Layer<S> for SessionConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("cpwire_session") && !target.starts_with("cpwire::") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    command: Option<String>,
    solver: Option<String>,
    version: Option<String>,
    error: Option<String>,
    node_count: Option<u64>,
    ref_count: Option<u64>,
    constraint_count: Option<u64>,
    solution_count: Option<u64>,
    length: Option<u64>,
    time_limit: Option<f64>,
    objective: Option<f64>,
    lower_bound: Option<f64>,
    value: Option<f64>,
    solve_time: Option<f64>,
    duration: Option<f64>,
    proof: Option<bool>,
    valid: Option<bool>,
    infeasible: Option<bool>,
    ok: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.record_str(field, s.trim_matches('"'));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "node_count" => self.node_count = Some(value),
            "ref_count" => self.ref_count = Some(value),
            "constraint_count" => self.constraint_count = Some(value),
            "solution_count" => self.solution_count = Some(value),
            "length" => self.length = Some(value),
            _ => self.record_f64(field, value as f64),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match u64::try_from(value) {
            Ok(count) => self.record_u64(field, count),
            Err(_) => self.record_f64(field, value as f64),
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "time_limit" => self.time_limit = Some(value),
            "objective" => self.objective = Some(value),
            "lower_bound" => self.lower_bound = Some(value),
            "value" => self.value = Some(value),
            "solve_time" => self.solve_time = Some(value),
            "duration" => self.duration = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "proof" => self.proof = Some(value),
            "valid" => self.valid = Some(value),
            "infeasible" => self.infeasible = Some(value),
            "ok" => self.ok = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "command" => self.command = Some(value.to_string()),
            "solver" => self.solver = Some(value.to_string()),
            "version" => self.version = Some(value.to_string()),
            "error" => self.error = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "solve_start" => format_solve_start(v),
        "handshake" => format_handshake(v),
        "solution" => format_solution(v),
        "lower_bound" => format_lower_bound(v),
        "solve_end" => format_solve_end(v),
        "transport_closed" => format_transport_closed(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    let command = v.command.as_deref().unwrap_or("solve");

    let mut output = format!(
        "{} {} {} │ {} nodes │ {} refs │ {} constraints",
        format_elapsed(),
        "▶".bright_green().bold(),
        command.white().bold(),
        count(v.node_count).bright_yellow(),
        count(v.ref_count).bright_yellow(),
        count(v.constraint_count).bright_yellow(),
    );

    if let Some(limit) = v.time_limit {
        output.push_str(&format!(" │ {}s limit", format_number(limit).bright_yellow()));
    }
    if let Some(solver) = &v.solver {
        output.push_str(&format!(" │ {}", solver.bright_black()));
    }

    output
}

fn format_handshake(v: &EventVisitor) -> String {
    format!(
        "{} {} Connected │ {} {}",
        format_elapsed(),
        "⇄".bright_blue(),
        v.solver.as_deref().unwrap_or("unknown").white().bold(),
        v.version.as_deref().unwrap_or("").bright_black()
    )
}

fn format_solution(v: &EventVisitor) -> String {
    let objective = v
        .objective
        .map(format_number)
        .unwrap_or_else(|| "-".to_string());

    let mut output = format!(
        "{} {} Solution │ objective {} │ at {}",
        format_elapsed(),
        "★".bright_yellow(),
        objective.bright_green().bold(),
        format_seconds(v.solve_time.unwrap_or(0.0)).yellow(),
    );
    if v.valid == Some(false) {
        output.push_str(&format!(" │ {}", "INVALID".bright_red().bold()));
    }
    output
}

fn format_lower_bound(v: &EventVisitor) -> String {
    format!(
        "{} {} Lower bound │ {} │ at {}",
        format_elapsed(),
        "↓".bright_magenta(),
        format_number(v.value.unwrap_or(0.0)).bright_magenta().bold(),
        format_seconds(v.solve_time.unwrap_or(0.0)).yellow(),
    )
}

fn format_transport_closed(v: &EventVisitor, level: Level) -> String {
    if v.ok != Some(false) || level > Level::INFO {
        return String::new();
    }
    format!(
        "{} {} Connection lost │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        v.error.as_deref().unwrap_or("unknown error").bright_red()
    )
}

/// Outcome classification shown in the summary box.
fn solve_status(v: &EventVisitor) -> (&'static str, bool) {
    let found = v.solution_count.unwrap_or(0) > 0;
    match (found, v.proof.unwrap_or(false)) {
        (true, true) => ("OPTIMAL SOLUTION FOUND", true),
        (true, false) => ("FEASIBLE SOLUTION FOUND", true),
        (false, true) => ("INFEASIBLE (proven)", false),
        (false, false) => ("NO SOLUTION FOUND", false),
    }
}

fn format_solve_end(v: &EventVisitor) -> String {
    match v.command.as_deref() {
        Some("propagate") => {
            let status = if v.infeasible == Some(true) {
                "infeasible".bright_red().bold().to_string()
            } else {
                "consistent".bright_green().bold().to_string()
            };
            return format!(
                "{} {} Propagation complete │ {}",
                format_elapsed(),
                "■".bright_cyan().bold(),
                status
            );
        }
        Some("toText") => {
            return format!(
                "{} {} Text export complete │ {} bytes",
                format_elapsed(),
                "■".bright_cyan().bold(),
                count(v.length).bright_yellow()
            );
        }
        _ => {}
    }

    let (status_text, success) = solve_status(v);
    let objective = v
        .objective
        .map(format_number)
        .unwrap_or_else(|| "N/A".to_string());
    let bound = v
        .lower_bound
        .map(format_number)
        .unwrap_or_else(|| "N/A".to_string());

    let mut output = format!(
        "{} {} Solving complete │ {} solutions │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v.solution_count).white(),
        format_seconds(v.duration.unwrap_or(0.0)).yellow()
    );

    // Summary box
    output.push_str("\n\n");
    output.push_str(
        &"╔══════════════════════════════════════════════════════════╗"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(status_text.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let status_colored = if success {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.bright_red().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(
        &"╠══════════════════════════════════════════════════════════╣"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    for (label, value) in [("Objective:", objective), ("Lower bound:", bound)] {
        output.push_str(&format!(
            "{}  {:<18}{:>36}  {}",
            "║".bright_cyan(),
            label,
            value,
            "║".bright_cyan()
        ));
        output.push('\n');
    }

    output.push_str(
        &"╚══════════════════════════════════════════════════════════╝"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output
}

fn format_seconds(secs: f64) -> String {
    if secs < 1.0 {
        format!("{}ms", (secs * 1000.0).round() as u64)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let whole = secs as u64;
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

/// Integral values print with thousands separators, others as decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        let integral = value as i64;
        let digits = integral.unsigned_abs().to_formatted_string(&Locale::en);
        if integral < 0 {
            format!("-{digits}")
        } else {
            digits
        }
    } else {
        format!("{value}")
    }
}
