//! Runners available without any configuration.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::runner::RunnerDef;

/// Built-in runners keyed by canonical language identifier, lazily initialized.
pub static BUILTIN_RUNNERS: LazyLock<HashMap<&'static str, RunnerDef>> = LazyLock::new(|| {
    let defs = [
        // ==================== Shells ====================
        ("shellscript", "bash {file}", ".sh"),
        ("bash", "bash {file}", ".sh"),
        ("zsh", "zsh {file}", ".zsh"),
        ("fish", "fish {file}", ".fish"),
        ("powershell", "pwsh -NoProfile -File {file}", ".ps1"),
        // ==================== Scripting languages ====================
        ("python", "python3 -u {file}", ".py"),
        ("javascript", "node {file}", ".js"),
        ("typescript", "npx --yes tsx {file}", ".ts"),
        ("ruby", "ruby {file}", ".rb"),
        ("perl", "perl {file}", ".pl"),
        ("php", "php {file}", ".php"),
        ("lua", "lua {file}", ".lua"),
        ("r", "Rscript {file}", ".r"),
        ("elixir", "elixir {file}", ".exs"),
        ("julia", "julia {file}", ".jl"),
        // ==================== Compiled, run directly ====================
        ("go", "go run {file}", ".go"),
    ];

    defs.into_iter()
        .map(|(id, command, extension)| (id, RunnerDef::new(command, extension)))
        .collect()
});

/// Look up a built-in runner.
pub fn get_builtin_runner(language_id: &str) -> Option<&'static RunnerDef> {
    BUILTIN_RUNNERS.get(language_id)
}
