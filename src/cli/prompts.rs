//! Interactive prompts for the cases §4.9 calls out: editor choice at setup, protocol choice
//! when a merge needs one, context choice when a name is omitted.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use erasmus::Editor;

pub fn prompt_editor() -> std::io::Result<Editor> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which AI coding assistant is this project for?")
        .items(&Editor::ALL.iter().map(|e| e.short_name()).collect::<Vec<_>>())
        .default(0)
        .interact()
        .map_err(|dialoguer::Error::IO(e)| e)?;
    Ok(Editor::ALL[choice])
}

pub fn prompt_from_list(prompt: &str, items: &[String]) -> std::io::Result<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(|dialoguer::Error::IO(e)| e)?;
    Ok(Some(items[choice].clone()))
}
