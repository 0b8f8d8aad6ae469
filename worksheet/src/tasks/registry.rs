use super::Task;
use scraper::ElementRef;

/// Builds a task handler from its element in the parsed markup.
pub type TaskBuilder = fn(id: &str, element: ElementRef<'_>) -> Box<dyn Task>;

/// Lookup from task-id prefix to handler builder.
#[derive(Clone)]
pub struct TaskRegistry {
    entries: Vec<(String, TaskBuilder)>,
}

impl TaskRegistry {
    /// A registry with no kinds. Most callers want [`TaskRegistry::default`].
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `builder` for ids starting with `prefix`. A later registration
    /// for the same prefix replaces the earlier one.
    pub fn register(&mut self, prefix: impl Into<String>, builder: TaskBuilder) -> &mut Self {
        let prefix = prefix.into();
        self.entries.retain(|(p, _)| *p != prefix);
        self.entries.push((prefix, builder));
        self
    }

    /// Longest matching prefix wins.
    pub fn builder_for(&self, task_id: &str) -> Option<TaskBuilder> {
        self.entries
            .iter()
            .filter(|(prefix, _)| task_id.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, builder)| *builder)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("match-", super::match_pairs::MatchPairsTask::build)
            .register("blank-", super::fill_blank::FillBlankTask::build)
            .register("drop-", super::drag_drop::DragDropTask::build)
            .register("choice-", super::single_choice::SingleChoiceTask::build);
        registry
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.prefixes()).finish()
    }
}
