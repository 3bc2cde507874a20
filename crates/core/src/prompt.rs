//! Interactive prompting seam
//!
//! The resolver and the provisioner never touch the terminal directly. They
//! ask a [`Prompter`] and receive plain answers, and every numbered menu maps
//! its selected index onto a closed action enum.

use crate::error::{Error, Result};

/// Source of interactive answers
pub trait Prompter {
    /// Ask for a line of free text
    fn input(&self, prompt: &str) -> Result<String>;

    /// Present a numbered menu and return the zero-based index chosen
    fn select(&self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Ask a yes/no question
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Recovery choices offered for an invalid region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionAction {
    AcceptSuggestion(String),
    KeepInput,
    KeepInputAndRemember,
    Cancel,
}

impl RegionAction {
    /// Menu entries, in display order, with or without a suggestion
    pub fn menu(suggestion: Option<&str>) -> Vec<RegionAction> {
        let mut actions = Vec::with_capacity(4);
        if let Some(s) = suggestion {
            actions.push(RegionAction::AcceptSuggestion(s.to_string()));
        }
        actions.push(RegionAction::KeepInput);
        actions.push(RegionAction::KeepInputAndRemember);
        actions.push(RegionAction::Cancel);
        actions
    }

    pub fn label(&self, region: &str) -> String {
        match self {
            RegionAction::AcceptSuggestion(s) => format!("Yes, use the suggestion: '{s}'"),
            RegionAction::KeepInput => format!("No, use what I input: '{region}'"),
            RegionAction::KeepInputAndRemember => {
                "No, use what I input and don't ask again".to_string()
            }
            RegionAction::Cancel => "Cancel".to_string(),
        }
    }
}

/// Recovery choices offered for an invalid bucket name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketNameAction {
    Reenter,
    Cancel,
}

impl BucketNameAction {
    pub const MENU: [BucketNameAction; 2] = [BucketNameAction::Reenter, BucketNameAction::Cancel];

    pub fn label(self) -> &'static str {
        match self {
            BucketNameAction::Reenter => "Re-enter bucket name",
            BucketNameAction::Cancel => "Cancel",
        }
    }
}

/// Show `actions` as a menu and return the chosen one
pub fn choose<T: Clone>(
    prompter: &dyn Prompter,
    prompt: &str,
    actions: &[T],
    label: impl Fn(&T) -> String,
) -> Result<T> {
    let items: Vec<String> = actions.iter().map(&label).collect();
    let index = prompter.select(prompt, &items)?;
    actions
        .get(index)
        .cloned()
        .ok_or_else(|| Error::Prompt(format!("menu choice {} out of range", index + 1)))
}
