mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use erasmus::{App, Editor};

fn resolve_editor(root: &std::path::Path, interactive: bool) -> erasmus::Result<Editor> {
    if let Some(editor) = erasmus::editor::resolve_from_env(root) {
        return Ok(editor);
    }
    if !interactive {
        return Err(erasmus::Error::ConfigMissing { key: "IDE_ENV" });
    }
    let editor = cli::prompts::prompt_editor()
        .map_err(|e| erasmus::Error::io("prompt", root.to_path_buf(), e))?;
    erasmus::editor::persist_ide_env(root, editor)?;
    Ok(editor)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli::Cli::parse();
    let root = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: cannot determine current directory: {e}");
            std::process::exit(2);
        }
    };

    let interactive = matches!(args.command, cli::Command::Setup);
    let result = resolve_editor(&root, interactive).and_then(|editor| {
        let app = App::new(root.clone(), editor);
        cli::dispatch(args.command, &app)
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        if let Some(hint) = e.hint() {
            eprintln!("hint: {hint}");
        }
        std::process::exit(e.exit_code());
    }
}
