//! `secretstore bank-login` — print selected characters of a password.
//!
//! Some banks ask for, say, the 2nd, 5th and 7th character of a password.
//! The secret is searched for a `pw:` field and the characters at the
//! requested 1-based positions are printed, separated by spaces.

use regex::Regex;
use zeroize::Zeroizing;

use crate::cli::{open_session, Cli};
use crate::errors::{Result, SecretStoreError};

/// Execute the `bank-login` command.
pub fn execute(cli: &Cli, label: &str, positions: &[usize]) -> Result<()> {
    let session = open_session(cli)?;

    let text = Zeroizing::new(session.read(label)?.ok_or_else(|| {
        SecretStoreError::CommandFailed(format!("no secret labelled '{label}'"))
    })?);

    let picked = pick_characters(&text, positions)?;
    println!("{}", picked.as_str());

    Ok(())
}

/// Characters of the `pw:` field at `positions` (1-based), space-separated.
pub fn pick_characters(text: &str, positions: &[usize]) -> Result<Zeroizing<String>> {
    let pattern = Regex::new(r"(?i)pw:\s*([a-zA-Z0-9_-]+)")
        .map_err(|e| SecretStoreError::CommandFailed(format!("pattern: {e}")))?;

    let field = pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| SecretStoreError::CommandFailed("secret has no 'pw:' field".into()))?;
    let chars: Vec<char> = field.as_str().chars().collect();

    let mut picked = Zeroizing::new(String::new());
    for &position in positions {
        let Some(c) = position.checked_sub(1).and_then(|i| chars.get(i)) else {
            return Err(SecretStoreError::CommandFailed(format!(
                "position {position} is out of range 1..={}",
                chars.len()
            )));
        };
        if !picked.is_empty() {
            picked.push(' ');
        }
        picked.push(*c);
    }
    Ok(picked)
}
