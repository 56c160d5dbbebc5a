use std::io::Write;

use crossterm::style::Stylize;
use eyre::Result;

use crate::models::Role;

pub fn heading(out: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(out, "{}", text.bold().cyan())?;
    Ok(())
}

pub fn error(out: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(out, "{}", text.red())?;
    Ok(())
}

pub fn hint(out: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(out, "{}", text.dark_grey())?;
    Ok(())
}

/// Printed before a request goes out, so it is flushed immediately.
pub fn status(out: &mut dyn Write, text: &str) -> Result<()> {
    writeln!(out, "{}", text.dark_grey().italic())?;
    out.flush()?;
    Ok(())
}

pub fn turn(out: &mut dyn Write, role: Role, content: &str) -> Result<()> {
    let speaker = match role {
        Role::User => "You".bold().green(),
        Role::Model => "Chef".bold().yellow(),
    };
    writeln!(out, "{}: {}", speaker, content)?;
    Ok(())
}
