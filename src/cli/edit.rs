//! `$EDITOR`/`$VISUAL` shell-out for the `edit` subcommands, via `dialoguer::Editor`'s
//! temp-file-round-trip helper.

use erasmus::{Error, Result};

/// Open `current` in the user's editor and return the edited text, or `current` unchanged if
/// the user aborted without saving.
pub fn edit_text(current: &str) -> Result<String> {
    let edited = dialoguer::Editor::new()
        .edit(current)
        .map_err(|e| {
            let dialoguer::Error::IO(io_err) = e;
            Error::io("edit", std::path::PathBuf::from("$EDITOR"), io_err)
        })?;
    Ok(edited.unwrap_or_else(|| current.to_string()))
}
