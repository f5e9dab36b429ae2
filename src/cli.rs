use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use crate::config::{bind_addr_from_env, RallyConfig};
use crate::data::hero::HeroCatalog;
use crate::data::loader::{catalog_path_from_env, load_catalog_from_env, read_catalog};
use crate::data::validate::{validate_catalog, ValidationSeverity};
use crate::rally::{
    compute, prompt_for, render_result, RallyResult, Roster, RosterSpec, SelectionSession,
};
use crate::server::{self, AppContext};

const USAGE: &str = "usage: bearhunt <serve|heroes|calculate|rally|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Heroes,
    Calculate,
    Rally,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("heroes") => Some(Command::Heroes),
        Some("calculate") => Some(Command::Calculate),
        Some("rally") => Some(Command::Rally),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Heroes) => handle_heroes(),
        Some(Command::Calculate) => handle_calculate(args),
        Some(Command::Rally) => handle_rally(),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn load_environment() -> Option<(HeroCatalog, RallyConfig)> {
    let catalog = match load_catalog_from_env() {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("failed to load hero catalog: {err}");
            return None;
        }
    };
    match RallyConfig::from_env() {
        Ok(config) => Some((catalog, config)),
        Err(err) => {
            eprintln!("failed to load rally config: {err}");
            None
        }
    }
}

fn handle_serve() -> i32 {
    let Some((catalog, config)) = load_environment() else {
        return 1;
    };
    let bind_addr = bind_addr_from_env();
    let context = AppContext::new(catalog, config);
    match server::run_server(&bind_addr, &context) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_heroes() -> i32 {
    let Some((catalog, _)) = load_environment() else {
        return 1;
    };
    match serde_json::to_string_pretty(&catalog) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize catalog: {err}");
            1
        }
    }
}

fn handle_calculate(args: &[String]) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: bearhunt calculate <roster.yaml|roster.json> [--text]");
        return 2;
    };
    let as_text = args.iter().any(|arg| arg == "--text");
    let Some((catalog, config)) = load_environment() else {
        return 1;
    };

    let spec = match read_roster_spec(path) {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("failed to read roster '{path}': {err}");
            return 1;
        }
    };
    let result = Roster::from_spec(&catalog, config.joiner_skill_rule, &spec)
        .and_then(|roster| compute(&catalog, &config, &roster));
    let result = match result {
        Ok(result) => result,
        Err(err) => {
            eprintln!("calculation failed: {err}");
            return 1;
        }
    };

    if as_text {
        println!("{}", render_result(&result));
        return 0;
    }
    match serde_json::to_string_pretty(&result) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize rally result: {err}");
            1
        }
    }
}

fn handle_rally() -> i32 {
    let Some((catalog, config)) = load_environment() else {
        return 1;
    };
    let mut session = SelectionSession::new(Arc::new(catalog), config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match run_interactive(&mut session, stdin.lock(), &mut stdout) {
        Ok(Some(_)) => 0,
        Ok(None) => 1,
        Err(err) => {
            eprintln!("rally aborted: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let (label, loaded) = match args.get(2).cloned().or_else(catalog_path_from_env) {
        Some(path) => {
            let loaded = read_catalog(&path);
            (path, loaded)
        }
        None => ("built-in catalog".to_string(), HeroCatalog::builtin()),
    };
    let catalog = match loaded {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    let report = validate_catalog(&catalog);
    for diagnostic in &report.diagnostics {
        if diagnostic.severity == ValidationSeverity::Error {
            eprintln!("- {diagnostic}");
        } else {
            println!("- {diagnostic}");
        }
    }
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.errors().count());
        1
    } else {
        println!("validation passed: {label}");
        0
    }
}

/// `.json` files are JSON, everything else YAML.
pub fn read_roster_spec(
    path: impl AsRef<Path>,
) -> Result<RosterSpec, Box<dyn std::error::Error + Send + Sync>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let spec = if is_json {
        serde_json::from_str(&raw)?
    } else {
        serde_yaml::from_str(&raw)?
    };
    Ok(spec)
}

/// Drive a session from line input. Numbers pick the listed option, other
/// text is matched against option ids; `back`, `reset` and `quit` are
/// commands. Returns the result once the rally is complete, or `None` when
/// the input ends or the user quits.
pub fn run_interactive<R, W>(
    session: &mut SelectionSession,
    input: R,
    output: &mut W,
) -> io::Result<Option<RallyResult>>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        if session.is_finalized() {
            let outcome = session
                .finalize()
                .and_then(|roster| compute(session.catalog(), session.config(), &roster));
            return match outcome {
                Ok(result) => {
                    writeln!(output, "{}", render_result(&result))?;
                    Ok(Some(result))
                }
                Err(err) => {
                    writeln!(output, "error: {err}")?;
                    Ok(None)
                }
            };
        }

        let prompt = prompt_for(session);
        writeln!(output, "== {} ==", prompt.title)?;
        writeln!(output, "{}", prompt.description)?;
        for (index, option) in prompt.options.iter().enumerate() {
            writeln!(
                output,
                "  {:>2}) {} - {}",
                index + 1,
                option.label,
                option.description
            )?;
        }
        write!(output, "{}> ", prompt.placeholder)?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(None);
        };
        let choice = line.trim();
        let outcome = match choice.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "q" | "exit" => return Ok(None),
            "back" => session.step_back(),
            "reset" => Ok(session.reset()),
            _ => {
                let option_id = choice
                    .parse::<usize>()
                    .ok()
                    .and_then(|number| number.checked_sub(1))
                    .and_then(|index| prompt.options.get(index))
                    .map_or(choice, |option| option.id.as_str());
                session.choose(option_id)
            }
        };
        if let Err(err) = outcome {
            writeln!(output, "error: {err}")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SelectionSession {
        let catalog = HeroCatalog::builtin().expect("built-in catalog should load");
        SelectionSession::new(Arc::new(catalog), RallyConfig::default())
    }

    #[test]
    fn interactive_flow_accepts_numbers_names_and_back() {
        let mut session = session();
        // Chenko, Stand of Arms L5, then back/redo, one joiner: Amadeus L4.
        let input = "Chenko\n1\n5\nback\n5\n1\namadeus\n4\n";
        let mut output = Vec::new();

        let result = run_interactive(&mut session, input.as_bytes(), &mut output)
            .expect("io should succeed")
            .expect("rally should complete");

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].entry.percent, 25);
        assert_eq!(result.entries[1].entry.skill, "Battle Ready");
        assert_eq!(result.entries[1].entry.percent, 20);
        let printed = String::from_utf8_lossy(&output);
        assert!(printed.contains("Total Rally Bonus: 50.0% (Good Setup)"));
        assert!(printed.contains("Multiplicative Stacking"));
    }

    #[test]
    fn interactive_flow_reports_bad_input_and_stops_at_eof() {
        let mut session = session();
        let mut output = Vec::new();
        let result = run_interactive(&mut session, "NotARealHero\n".as_bytes(), &mut output)
            .expect("io should succeed");

        assert!(result.is_none());
        let printed = String::from_utf8_lossy(&output);
        assert!(printed.contains("error: invalid selection 'NotARealHero'"));
    }
}
