//! Fully resolved command lines.

use std::fmt;

use serde::Serialize;

/// A program and its arguments, ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Build from a configured `[program, args...]` vector plus trailing arguments.
    ///
    /// Returns `None` when `base` is empty.
    pub fn from_base<I, S>(base: &[String], extra: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (program, leading) = base.split_first()?;
        let mut args = leading.to_vec();
        args.extend(extra.into_iter().map(Into::into));
        Some(Self {
            program: program.clone(),
            args,
        })
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
