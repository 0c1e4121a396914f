use unicode_script::{Script, UnicodeScript};

/// The script of `ch`, or `None` for characters that take the script of
/// their neighbours (Common, Inherited, Unknown).
pub fn resolve_script(ch: char) -> Option<Script> {
    match ch.script() {
        Script::Common | Script::Inherited | Script::Unknown => None,
        script => Some(script),
    }
}

/// Script state of a run being grown one character at a time.
///
/// A run adopts the first real script it meets; neutral characters never
/// split it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptRun {
    current: Option<Script>,
}

impl ScriptRun {
    /// Script to shape the run with.
    pub fn script(&self) -> Script {
        self.current.unwrap_or(Script::Common)
    }

    /// Whether `ch` has a real script that differs from the run's.
    pub fn breaks_before(&self, ch: char) -> bool {
        matches!((self.current, resolve_script(ch)), (Some(run), Some(next)) if run != next)
    }

    /// Add `ch` to the current run.
    pub fn extend(&mut self, ch: char) {
        if self.current.is_none() {
            self.current = resolve_script(ch);
        }
    }

    /// Start a new run at `ch`.
    pub fn restart(&mut self, ch: char) {
        self.current = resolve_script(ch);
    }
}
