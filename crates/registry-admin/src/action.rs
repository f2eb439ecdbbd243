//! One list-and-select flow shared by viewing, deleting and editing.

use anyhow::{anyhow, Result};
use registry_core::{EditField, LibraryRecord, LibraryStore};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    View,
    Delete,
    Edit { field: EditField, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Changed,
}

/// Run `action` against `target`, or against a library picked from a
/// numbered list read from `input` when no target is given.
pub fn run<R: BufRead, W: Write>(
    store: &mut LibraryStore,
    action: &Action,
    target: Option<&str>,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    let libraries = store.list_libraries();
    if libraries.is_empty() {
        writeln!(out, "No libraries available!")?;
        return Ok(Outcome::Unchanged);
    }

    match action {
        Action::View => {
            for library in &libraries {
                writeln!(out, "{library}")?;
            }
            return Ok(Outcome::Unchanged);
        }
        Action::Delete => {
            let name = resolve_target(target, &libraries, input, out)?;
            store.delete_library(&name)?;
            writeln!(out, "Deleted library '{name}'")?;
        }
        Action::Edit { field, value } => {
            let name = resolve_target(target, &libraries, input, out)?;
            store.edit_library(&name, *field, value)?;
            writeln!(out, "Updated {field} of '{name}' to '{value}'")?;
        }
    }
    Ok(Outcome::Changed)
}

fn resolve_target<R: BufRead, W: Write>(
    target: Option<&str>,
    libraries: &[LibraryRecord],
    input: &mut R,
    out: &mut W,
) -> Result<String> {
    match target {
        Some(name) => Ok(name.to_string()),
        None => select(libraries, input, out),
    }
}

fn select<R: BufRead, W: Write>(
    libraries: &[LibraryRecord],
    input: &mut R,
    out: &mut W,
) -> Result<String> {
    for (i, library) in libraries.iter().enumerate() {
        writeln!(out, "{:>3}. {library}", i + 1)?;
    }
    write!(out, "Select a library [1-{}]: ", libraries.len())?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(anyhow!("no library selected"));
    }
    let choice = line.trim();
    choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| libraries.get(i))
        .map(|library| library.name.clone())
        .ok_or_else(|| anyhow!("invalid selection '{choice}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn seeded() -> LibraryStore {
        let mut store = LibraryStore::new();
        store.add_library("Central", "Metropolis", "1 Main St").unwrap();
        store.add_library("Branch", "Gotham", "2 Oak Ave").unwrap();
        store
    }

    fn run_with(
        store: &mut LibraryStore,
        action: Action,
        target: Option<&str>,
        input: &str,
    ) -> (Result<Outcome>, String) {
        let mut out = Vec::new();
        let result = run(store, &action, target, &mut Cursor::new(input), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn empty_store_reports_nothing_to_do() {
        let mut store = LibraryStore::new();
        let (result, out) = run_with(&mut store, Action::Delete, None, "");
        assert_eq!(result.unwrap(), Outcome::Unchanged);
        assert_eq!(out, "No libraries available!\n");
    }

    #[test]
    fn view_lists_every_library() {
        let mut store = seeded();
        let (result, out) = run_with(&mut store, Action::View, None, "");
        assert_eq!(result.unwrap(), Outcome::Unchanged);
        assert_eq!(
            out,
            "Central - Metropolis, 1 Main St\nBranch - Gotham, 2 Oak Ave\n"
        );
    }

    #[test]
    fn delete_by_selection() {
        let mut store = seeded();
        let (result, out) = run_with(&mut store, Action::Delete, None, "2\n");
        assert_eq!(result.unwrap(), Outcome::Changed);
        assert!(out.contains("  2. Branch - Gotham, 2 Oak Ave"));
        assert!(out.ends_with("Deleted library 'Branch'\n"));
        assert!(store.get_library("Branch").is_none());
    }

    #[test]
    fn edit_named_target_skips_selection() {
        let mut store = seeded();
        let action = Action::Edit {
            field: EditField::City,
            value: "Star City".into(),
        };
        let (result, out) = run_with(&mut store, action, Some("Central"), "");
        assert_eq!(result.unwrap(), Outcome::Changed);
        assert_eq!(out, "Updated city of 'Central' to 'Star City'\n");
        assert_eq!(store.get_library("Central").unwrap().city, "Star City");
    }

    #[test]
    fn bad_selection_changes_nothing() {
        let mut store = seeded();
        for input in ["0\n", "3\n", "abc\n", ""] {
            let (result, _) = run_with(&mut store, Action::Delete, None, input);
            assert!(result.is_err(), "input {input:?} should be rejected");
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn store_errors_surface() {
        let mut store = seeded();
        let (result, _) = run_with(&mut store, Action::Delete, Some("Ghost"), "");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("'Ghost' not found"));
    }
}
