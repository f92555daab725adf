use std::io::{self, Write};

use restnow_core::{format_clock, parse_duration, Config, CycleDurations};

const DEFAULT_WORK: &str = "25m";
const DEFAULT_REST: &str = "5m";

pub fn run(work: Option<String>, rest: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let durations = match (work, rest) {
        (Some(work), Some(rest)) => CycleDurations::new(parse_duration(&work)?, parse_duration(&rest)?)?,
        (None, None) => prompt_durations()?,
        _ => return Err("--work and --rest must be given together".into()),
    };

    let mut config = Config::load()?;
    config.set_durations(durations);
    config.save()?;
    println!(
        "saved: work {} / rest {}",
        format_clock(durations.work_secs()),
        format_clock(durations.rest_secs())
    );
    Ok(())
}

/// Ask for both durations on stdin, offering the stored values (or 25m/5m)
/// as defaults.
pub fn prompt_durations() -> Result<CycleDurations, Box<dyn std::error::Error>> {
    let stored = Config::load_or_default().durations();
    let work_default = stored
        .map(|d| format!("{}s", d.work_secs()))
        .unwrap_or_else(|| DEFAULT_WORK.to_string());
    let rest_default = stored
        .map(|d| format!("{}s", d.rest_secs()))
        .unwrap_or_else(|| DEFAULT_REST.to_string());

    let work = ask("Work duration", &work_default)?;
    let rest = ask("Rest duration", &rest_default)?;
    Ok(CycleDurations::new(work, rest)?)
}

fn ask(label: &str, default: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    loop {
        print!("{label} [{default}]: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Err("setup cancelled".into());
        }
        let text = match line.trim() {
            "" => default,
            text => text,
        };
        match parse_duration(text) {
            Ok(0) => eprintln!("duration must be greater than zero"),
            Ok(secs) => return Ok(secs),
            Err(e) => eprintln!("{e}"),
        }
    }
}
