//! Terminal prompts for tasks running in interactive mode.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::build::TaskError;

fn read_line(message: &str) -> Result<String, TaskError> {
  if !io::stdin().is_terminal() {
    return Err(TaskError::Failed(format!(
      "cannot prompt for input in non-interactive mode: {}",
      message.trim()
    )));
  }
  write!(io::stderr(), "{}", message)?;
  io::stderr().flush()?;

  let mut input = String::new();
  if io::stdin().lock().read_line(&mut input)? == 0 {
    return Err(TaskError::Cancelled);
  }
  Ok(input.trim().to_string())
}

/// Ask until a non-empty answer is given.
pub fn ask(description: &str) -> Result<String, TaskError> {
  loop {
    let answer = read_line(&format!("Please enter {}: ", description))?;
    if !answer.is_empty() {
      return Ok(answer);
    }
  }
}

/// An answer to a numbered-choice prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
  /// Zero-based index of the picked choice.
  Picked(usize),
  Quit,
}

fn parse_choice(answer: &str, count: usize) -> Option<Choice> {
  if answer.eq_ignore_ascii_case("q") {
    return Some(Choice::Quit);
  }
  match answer.parse::<usize>() {
    Ok(n) if (1..=count).contains(&n) => Some(Choice::Picked(n - 1)),
    _ => None,
  }
}

/// Offer numbered choices until a valid number or `q` is entered.
pub fn choose(message: &str, choices: &[&str]) -> Result<Choice, TaskError> {
  let mut text = format!("\n{}\n\n", message);
  for (i, choice) in choices.iter().enumerate() {
    text.push_str(&format!("({}) {}\n", i + 1, choice));
  }
  text.push_str(&format!("\nPlease enter 1-{} (or q to cancel): ", choices.len()));

  loop {
    if let Some(choice) = parse_choice(&read_line(&text)?, choices.len()) {
      return Ok(choice);
    }
  }
}
