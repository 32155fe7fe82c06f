//! Language tag routing.

use serde::{Deserialize, Serialize};

/// Tags routed to the shell backend
pub const SHELL_TAGS: &[&str] = &["bash", "sh", "shell"];
/// Tags routed to the interpreter-script backend
pub const SCRIPT_TAGS: &[&str] = &["python", "py"];
/// Tags routed to the JSON reformat backend
pub const REFORMAT_TAGS: &[&str] = &["json"];
/// Tags routed to the external-command backend
pub const EXTERNAL_TAGS: &[&str] = &["sql"];

/// Execution strategy for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Inline command through a shell candidate
    Shell,
    /// Python interpreter over a temporary script file
    Script,
    /// Pretty-print JSON in-process
    Reformat,
    /// Configured command fed over stdin
    External,
}

impl Backend {
    /// Map a language tag to its backend, ignoring case. `None` means unsupported.
    pub fn resolve(tag: &str, table: &LanguageTable) -> Option<Self> {
        let tag = tag.to_lowercase();
        let matches = |tags: &[String]| tags.iter().any(|t| t.to_lowercase() == tag);

        if matches(&table.shell) {
            Some(Self::Shell)
        } else if matches(&table.script) {
            Some(Self::Script)
        } else if matches(&table.reformat) {
            Some(Self::Reformat)
        } else if matches(&table.external) {
            Some(Self::External)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Script => "script",
            Self::Reformat => "reformat",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Language tags recognised by each backend.
///
/// Checked in the order shell, script, reformat, external; a tag listed under two
/// backends goes to the first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct LanguageTable {
    #[serde(default = "default_shell_tags")]
    pub shell: Vec<String>,
    #[serde(default = "default_script_tags")]
    pub script: Vec<String>,
    #[serde(default = "default_reformat_tags")]
    pub reformat: Vec<String>,
    #[serde(default = "default_external_tags")]
    pub external: Vec<String>,
}

fn owned(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn default_shell_tags() -> Vec<String> {
    owned(SHELL_TAGS)
}

fn default_script_tags() -> Vec<String> {
    owned(SCRIPT_TAGS)
}

fn default_reformat_tags() -> Vec<String> {
    owned(REFORMAT_TAGS)
}

fn default_external_tags() -> Vec<String> {
    owned(EXTERNAL_TAGS)
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            shell: default_shell_tags(),
            script: default_script_tags(),
            reformat: default_reformat_tags(),
            external: default_external_tags(),
        }
    }
}
