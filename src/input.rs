use std::io;
use std::io::prelude::*;

use tracing::warn;

pub const DEFAULT_USER_ID: i32 = 1;

pub const PROMPT: &str = "Select user id (id from 1 - 50): ";

/// Outcome of asking the operator for a user id. Input which is not a number does not stop the
/// program, we continue with `DEFAULT_USER_ID` instead and remember what was typed.
#[derive(Debug, Clone, PartialEq)]
pub enum UserSelection {
    Parsed(i32),
    Fallback { input: String },
}

impl UserSelection {

    pub fn user_id(&self) -> i32 {
        match *self {
            UserSelection::Parsed(user_id) => user_id,
            UserSelection::Fallback { .. } => DEFAULT_USER_ID,
        }
    }

    pub fn is_fallback(&self) -> bool {
        match *self {
            UserSelection::Fallback { .. } => true,
            _ => false,
        }
    }
}

pub fn parse_user_selection(line: &str) -> UserSelection {
    match line.trim().parse::<i32>() {
        Ok(user_id) => UserSelection::Parsed(user_id),
        Err(_) => {
            warn!("'{}' is not a user id, falling back to user {}", line.trim(), DEFAULT_USER_ID);
            UserSelection::Fallback { input: line.trim().to_string() }
        }
    }
}

/// Prompts for a user id on `out` and reads the answer from `input`. A fallback is announced on
/// `out` as well, so that the operator knows whose recommendations follow.
pub fn prompt_user_selection<R, W>(input: &mut R, out: &mut W) -> io::Result<UserSelection>
    where R: BufRead, W: Write {

    writeln!(out, "{}", PROMPT)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let selection = parse_user_selection(&line);

    if selection.is_fallback() {
        writeln!(out, "Value is not number, falling back to user id {}", DEFAULT_USER_ID)?;
    }

    Ok(selection)
}
