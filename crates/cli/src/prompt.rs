//! Terminal prompter backed by dialoguer

use dialoguer::{Confirm, Input, Select};

use sd_core::{Error, Prompter, Result};

/// Prompts on the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(prompt_error)
    }
}
