//! Intent script parsing.
//!
//! One step per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! push region R1 North
//! filter metric=load range=7d
//! wait 300
//! browser-back
//! ```

use std::fmt;
use std::time::Duration;

use drill_model::{FilterPatch, ScopeLevel, ScopeRef, TimeRange, ViewMode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl ScriptError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A single replayable step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `push <level> <id> [label...]`
    Push(ScopeRef),
    Back,
    /// `jump <index>`
    Jump(usize),
    Reset,
    /// `filter key=value...`
    Filter(FilterPatch),
    /// `wait <ms>`: advance the clock, then let the timer fire.
    Wait(Duration),
    Flush,
    BrowserBack,
    BrowserForward,
    /// Tear the navigator down and mount a fresh one on the same history.
    Reload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(scope) => write!(f, "push {} {} {}", scope.level, scope.id, scope.label),
            Self::Back => f.write_str("back"),
            Self::Jump(index) => write!(f, "jump {index}"),
            Self::Reset => f.write_str("reset"),
            Self::Filter(patch) => {
                f.write_str("filter")?;
                if let Some(metric) = &patch.metric {
                    write!(f, " metric={metric}")?;
                }
                if let Some(range) = patch.range {
                    write!(f, " range={range}")?;
                }
                if let Some(view_mode) = patch.view_mode {
                    write!(f, " view={view_mode}")?;
                }
                if let Some(overlay) = &patch.overlay {
                    write!(f, " overlay={}", overlay.as_deref().unwrap_or(""))?;
                }
                Ok(())
            }
            Self::Wait(delay) => write!(f, "wait {}", delay.as_millis()),
            Self::Flush => f.write_str("flush"),
            Self::BrowserBack => f.write_str("browser-back"),
            Self::BrowserForward => f.write_str("browser-forward"),
            Self::Reload => f.write_str("reload"),
        }
    }
}

/// Parse a whole script.
pub fn parse_script(source: &str) -> Result<Vec<Step>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line_no = index + 1;
            let content = line.split_once('#').map_or(line, |(before, _)| before).trim();
            (!content.is_empty()).then(|| parse_step(line_no, content))
        })
        .collect()
}

fn parse_step(line: usize, content: &str) -> Result<Step, ScriptError> {
    let mut words = content.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ScriptError::new(line, "empty step"));
    };
    let rest: Vec<&str> = words.collect();
    let step = match command {
        "push" => {
            let [level, id, label @ ..] = rest.as_slice() else {
                return Err(ScriptError::new(line, "usage: push <level> <id> [label...]"));
            };
            let level: ScopeLevel = level
                .parse()
                .map_err(|error| ScriptError::new(line, format!("{error}")))?;
            let label = if label.is_empty() {
                (*id).to_string()
            } else {
                label.join(" ")
            };
            Step::Push(ScopeRef::new(level, *id, label))
        }
        "back" => no_args(line, command, &rest, Step::Back)?,
        "jump" => {
            let index = single_arg(line, command, &rest)?;
            let index = index
                .parse()
                .map_err(|_| ScriptError::new(line, format!("invalid index '{index}'")))?;
            Step::Jump(index)
        }
        "reset" => no_args(line, command, &rest, Step::Reset)?,
        "filter" => Step::Filter(parse_patch(line, &rest)?),
        "wait" => {
            let ms = single_arg(line, command, &rest)?;
            let ms: u64 = ms
                .parse()
                .map_err(|_| ScriptError::new(line, format!("invalid milliseconds '{ms}'")))?;
            Step::Wait(Duration::from_millis(ms))
        }
        "flush" => no_args(line, command, &rest, Step::Flush)?,
        "browser-back" => no_args(line, command, &rest, Step::BrowserBack)?,
        "browser-forward" => no_args(line, command, &rest, Step::BrowserForward)?,
        "reload" => no_args(line, command, &rest, Step::Reload)?,
        other => return Err(ScriptError::new(line, format!("unknown step '{other}'"))),
    };
    Ok(step)
}

fn no_args(line: usize, command: &str, rest: &[&str], step: Step) -> Result<Step, ScriptError> {
    if rest.is_empty() {
        Ok(step)
    } else {
        Err(ScriptError::new(line, format!("'{command}' takes no arguments")))
    }
}

fn single_arg<'a>(line: usize, command: &str, rest: &[&'a str]) -> Result<&'a str, ScriptError> {
    match rest {
        [arg] => Ok(*arg),
        _ => Err(ScriptError::new(line, format!("'{command}' takes one argument"))),
    }
}

fn parse_patch(line: usize, pairs: &[&str]) -> Result<FilterPatch, ScriptError> {
    if pairs.is_empty() {
        return Err(ScriptError::new(line, "usage: filter key=value..."));
    }
    let mut patch = FilterPatch::default();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ScriptError::new(line, format!("expected key=value, got '{pair}'")));
        };
        let next = match key {
            "metric" => FilterPatch::metric(value),
            "range" => FilterPatch::range(
                value
                    .parse::<TimeRange>()
                    .map_err(|error| ScriptError::new(line, error.to_string()))?,
            ),
            "view" => FilterPatch::view_mode(
                value
                    .parse::<ViewMode>()
                    .map_err(|error| ScriptError::new(line, error.to_string()))?,
            ),
            "overlay" => FilterPatch::overlay((!value.is_empty()).then(|| value.to_string())),
            other => {
                return Err(ScriptError::new(line, format!("unknown filter '{other}'")));
            }
        };
        patch = patch.merge(next);
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let steps = parse_script(
            "# drill down\n\
             push region R1 North Coast\n\
             push leaf L7\n\
             \n\
             filter metric=load range=7d overlay=\n\
             wait 300   # let the debounce fire\n\
             browser-back\n\
             jump 0\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Push(ScopeRef::new(ScopeLevel::Region, "R1", "North Coast")),
                Step::Push(ScopeRef::new(ScopeLevel::Leaf, "L7", "L7")),
                Step::Filter(
                    FilterPatch::metric("load")
                        .merge(FilterPatch::range(TimeRange::Week))
                        .merge(FilterPatch::overlay(None))
                ),
                Step::Wait(Duration::from_millis(300)),
                Step::BrowserBack,
                Step::Jump(0),
            ]
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let error = parse_script("back\nfly away\n").unwrap_err();
        assert_eq!(error.line, 2);
        assert!(error.message.contains("fly"));

        let error = parse_script("push planet X").unwrap_err();
        assert_eq!(error.line, 1);

        assert!(parse_script("filter range=forever").is_err());
        assert!(parse_script("filter metric").is_err());
        assert!(parse_script("back now").is_err());
        assert!(parse_script("wait soon").is_err());
    }

    #[test]
    fn test_step_display_reparses() {
        let source = "push sub_region S9 South\nfilter metric=load view=heat\nwait 250\nreload";
        let steps = parse_script(source).unwrap();
        let printed: Vec<String> = steps.iter().map(ToString::to_string).collect();
        assert_eq!(printed.join("\n"), source);
    }
}
