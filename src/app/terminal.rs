//! Interactive terminal wizard built on dialoguer.

use crate::core::catalog::{DIET_GUIDELINES_URL, INTRO_TEXT, INTRO_TITLE};
use crate::core::Frontend;
use crate::domain::model::Theme;
use crate::domain::ports::{QuestionView, Reply};
use crate::utils::error::{AssessmentError, Result};
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme as PromptTheme};
use dialoguer::{Confirm, Input, Select};

const BACK_ITEM: &str = "← Back";

pub struct TerminalFrontend {
    theme: Box<dyn PromptTheme>,
}

impl TerminalFrontend {
    /// Dark gets the colourful prompts, light the plain ones.
    pub fn new(theme: Theme) -> Self {
        let theme: Box<dyn PromptTheme> = match theme {
            Theme::Dark => Box::new(ColorfulTheme::default()),
            Theme::Light => Box::new(SimpleTheme),
        };
        Self { theme }
    }

    fn ask_select(&self, view: &QuestionView<'_>, prompt: String, options: &[String]) -> Result<Reply> {
        let mut items: Vec<String> = options.to_vec();
        if view.can_retreat {
            items.push(BACK_ITEM.to_string());
        }

        let default = view
            .current
            .and_then(|value| value.as_text())
            .and_then(|current| options.iter().position(|option| option == current))
            .unwrap_or(0);

        let choice = Select::with_theme(&*self.theme)
            .with_prompt(prompt)
            .items(&items[..])
            .default(default)
            .interact_opt()?;

        Ok(match choice {
            None => Reply::Quit,
            Some(index) if index >= options.len() => Reply::Back,
            Some(index) => Reply::Answer(options[index].clone()),
        })
    }

    fn ask_number(&self, view: &QuestionView<'_>, prompt: String) -> Result<Reply> {
        let mut input = Input::<String>::with_theme(&*self.theme)
            .with_prompt(format!("{} [{}]", prompt, view.question.placeholder()))
            .allow_empty(true);
        if let Some(current) = view.current {
            input = input.with_initial_text(current.to_string());
        }

        let raw = input.interact_text()?;
        Ok(match raw.trim().to_ascii_lowercase().as_str() {
            "b" | "back" => Reply::Back,
            "q" | "quit" => Reply::Quit,
            _ => Reply::Answer(raw),
        })
    }
}

impl Frontend for TerminalFrontend {
    fn show_intro(&mut self) -> Result<bool> {
        println!();
        println!("{}", INTRO_TITLE);
        println!();
        println!("{}", INTRO_TEXT);
        println!("Type 'b' to go back or 'q' to quit at any numeric prompt, Esc to quit a choice.");
        println!();

        let start = Confirm::with_theme(&*self.theme)
            .with_prompt("Start assessment?")
            .default(true)
            .interact_opt()?;
        Ok(start.unwrap_or(false))
    }

    fn ask(&mut self, view: &QuestionView<'_>) -> Result<Reply> {
        let prompt = format!("Step {}/{} {}", view.step, view.total, view.question.label);
        match view.question.options() {
            Some(options) => self.ask_select(view, prompt, options),
            None => self.ask_number(view, prompt),
        }
    }

    fn report_invalid(&mut self, _view: &QuestionView<'_>, error: &AssessmentError) -> Result<()> {
        println!("  ⚠ {}", error.user_friendly_message());
        Ok(())
    }

    fn show_submitting(&mut self) -> Result<()> {
        println!("Loading...");
        Ok(())
    }

    fn show_result(&mut self, result: &str) -> Result<bool> {
        println!();
        println!("Assessment Complete!");
        println!("{}", result);
        println!();
        println!(
            "For detailed dietary guidelines on managing or preventing diabetes, visit {}",
            DIET_GUIDELINES_URL
        );
        println!();

        let restart = Confirm::with_theme(&*self.theme)
            .with_prompt("Restart?")
            .default(false)
            .interact_opt()?;
        Ok(restart.unwrap_or(false))
    }
}
