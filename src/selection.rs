use crate::store::{KeyValueStore, SELECTED_KEY};
use anyhow::{Context, Result};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a show name.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Blank input: nothing is fetched.
    Empty,
    Search(String),
}

/// Interprets the search box value.
pub fn submit(input: &str) -> Submission {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Submission::Empty
    } else {
        Submission::Search(trimmed.to_string())
    }
}

pub fn load_selected_key(store: &dyn KeyValueStore, seed: &str) -> String {
    store
        .get(SELECTED_KEY)
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| seed.to_string())
}

pub fn persist_selected_key(store: &dyn KeyValueStore, key: &str) -> Result<()> {
    store
        .set(SELECTED_KEY, key)
        .context("writing selected search key")
}

/// Looks up a preset button by name, ignoring case.
pub fn find_preset<'a>(presets: &'a [String], name: &str) -> Option<&'a str> {
    presets
        .iter()
        .find(|p| p.eq_ignore_ascii_case(name))
        .map(String::as_str)
}
