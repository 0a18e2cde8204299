// File: ./src/prompt.rs
// Interactive terminal prompt for unrecognized names.
use crate::resolve::{ConflictPrompt, Decision, DecisionOutcome, DecisionPrompt, Selection};
use std::io::{self, BufRead, Write};

/// Asks on `output`, reads answers from `input`. Generic so tests can drive it
/// with in-memory buffers.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// `None` on end of input.
    fn read_answer(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_menu(&mut self, request: &ConflictPrompt) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Unrecognized name '{}' on {} at {}.",
            request.token, request.date, request.time
        )?;
        print_section(&mut self.output, "Actors", 'a', &request.actors)?;
        print_section(&mut self.output, "Roles", 'r', &request.roles)?;
        print_section(&mut self.output, "Groups", 'g', &request.groups)?;
        writeln!(self.output, "  [f] Full cast")?;
        writeln!(self.output, "  [i] Ignore")?;
        writeln!(
            self.output,
            "One actor creates a role, two or more create a group (e.g. a1,a4)."
        )?;
        Ok(())
    }

    fn ask(&mut self, request: &ConflictPrompt) -> io::Result<Option<Decision>> {
        self.print_menu(request)?;
        let outcome = loop {
            let Some(answer) = self.read_answer("Selection: ")? else {
                return Ok(None);
            };
            match parse_selection(&answer, request).and_then(|s| {
                s.into_outcome().map_err(|e| e.to_string())
            }) {
                Ok(outcome) => break outcome,
                Err(msg) => writeln!(self.output, "{}", msg)?,
            }
        };

        let Some(answer) = self.read_answer(&format!(
            "Apply to every '{}' in this schedule? (y/N): ",
            request.token
        ))?
        else {
            return Ok(Some(Decision::once(outcome)));
        };
        Ok(Some(Decision {
            outcome,
            apply_to_all: answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"),
        }))
    }
}

impl<R: BufRead, W: Write> DecisionPrompt for TerminalPrompt<R, W> {
    fn decide(&mut self, request: &ConflictPrompt) -> Decision {
        match self.ask(request) {
            Ok(Some(decision)) => decision,
            Ok(None) => {
                log::warn!("No answer for '{}' (end of input), ignoring it", request.token);
                Decision::once(DecisionOutcome::Ignore)
            }
            Err(e) => {
                log::warn!("Prompt failed for '{}': {}, ignoring it", request.token, e);
                Decision::once(DecisionOutcome::Ignore)
            }
        }
    }
}

fn print_section<W: Write>(out: &mut W, title: &str, key: char, items: &[String]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", title)?;
    for (i, item) in items.iter().enumerate() {
        writeln!(out, "  [{}{}] {}", key, i + 1, item)?;
    }
    Ok(())
}

/// Turns "a1, a3" / "g2" / "f" / "i" into a raw selection.
pub fn parse_selection(answer: &str, request: &ConflictPrompt) -> Result<Selection, String> {
    let mut selection = Selection::default();
    let picks = answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    for pick in picks {
        let lower = pick.to_lowercase();
        match lower.as_str() {
            "f" => {
                selection.full_cast = true;
                continue;
            }
            "i" => {
                selection.ignore = true;
                continue;
            }
            _ => {}
        }

        let mut chars = lower.chars();
        let key = chars.next().unwrap_or_default();
        let list = match key {
            'a' => &request.actors,
            'r' => &request.roles,
            'g' => &request.groups,
            _ => return Err(format!("Unknown choice '{}'.", pick)),
        };
        let item = chars
            .as_str()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| list.get(idx))
            .ok_or_else(|| format!("No such entry '{}'.", pick))?;

        match key {
            'a' => selection.actors.push(item.clone()),
            'r' => selection.roles.push(item.clone()),
            _ => selection.groups.push(item.clone()),
        }
    }
    Ok(selection)
}
