use colored::Colorize;
use rustyline::DefaultEditor;
use topicgraph_core::Prompter;

/// Asks the user on the terminal with a throwaway line editor per question.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ask(&self, question: &str) -> Option<String> {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot open line editor for prompt");
                return None;
            }
        };
        editor
            .readline(&format!("{} ", question.bright_yellow()))
            .ok()
            .map(|answer| answer.trim().to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn request_title(&self) -> Option<String> {
        self.ask("Enter topic name:")
    }

    fn confirm_branch(&self, suggested_title: &str) -> bool {
        let question = format!(
            "Would you like to create a new topic branch: \"{}\"? [y/N]",
            suggested_title
        );
        matches!(
            self.ask(&question).as_deref().map(str::to_lowercase).as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn request_session_name(&self, current_name: &str) -> Option<String> {
        self.ask(&format!("Enter a name for this session [{}]:", current_name))
            .filter(|name| !name.is_empty())
    }
}
