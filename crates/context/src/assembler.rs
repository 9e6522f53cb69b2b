use crate::error::{ContextError, Result};
use crate::render::{estimate_tokens, render_prompt};
use crate::templates::{AgentType, RenderFormat};
use metamark_extractor::DependencyClass;
use metamark_graph::{CompiledEntry, Database};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Defaults applied to every context request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub agent: AgentType,
    pub format: RenderFormat,
    pub token_budget: usize,
    pub max_entries: Option<usize>,
    pub include_dependencies: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            agent: AgentType::Generic,
            format: RenderFormat::Structured,
            token_budget: 4000,
            max_entries: None,
            include_dependencies: true,
        }
    }
}

/// What to put in the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRequest {
    pub agent: AgentType,
    /// Explicit ids; take precedence over every other selector
    pub ids: Vec<String>,
    /// Tag scope, used when no ids are given
    pub tags: Vec<String>,
    /// File-path substring, used when neither ids nor tags are given
    pub file_pattern: Option<String>,
    /// Follow runtime dependencies of the selection
    pub include_dependencies: bool,
    pub max_entries: Option<usize>,
    pub token_budget: usize,
    pub format: RenderFormat,
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

impl ContextRequest {
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            agent: config.agent,
            ids: Vec::new(),
            tags: Vec::new(),
            file_pattern: None,
            include_dependencies: config.include_dependencies,
            max_entries: config.max_entries,
            token_budget: config.token_budget,
            format: config.format,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_budget == 0 {
            return Err(ContextError::invalid_request("token_budget must be > 0"));
        }
        if self.max_entries == Some(0) {
            return Err(ContextError::invalid_request("max_entries must be > 0"));
        }
        Ok(())
    }
}

/// Selection bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStats {
    /// Entries chosen by the selectors
    pub selected: usize,
    /// Entries added by the dependency closure
    pub dependencies_added: usize,
    /// Entries dropped by the cap or the token budget
    pub dropped: usize,
    pub token_budget: usize,
}

/// Assembled prompt and the entries it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledContext {
    pub agent_type: AgentType,
    pub entries: Vec<CompiledEntry>,
    pub prompt: String,
    pub token_count: usize,
    pub was_trimmed: bool,
    pub stats: ContextStats,
}

/// Builds token-budgeted prompts from a compiled database
pub struct ContextAssembler<'a> {
    db: &'a Database,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Select, expand and render. Trimming is greedy: the last entry is
    /// dropped until the prompt fits or a single entry remains.
    pub fn assemble(&self, request: &ContextRequest) -> Result<AssembledContext> {
        request.validate()?;

        let initial = self.select(request);
        let selected = initial.len();
        let mut entries = if request.include_dependencies {
            self.expand_runtime(initial)
        } else {
            initial
        };
        let dependencies_added = entries.len() - selected;
        let before_cap = entries.len();
        if let Some(max) = request.max_entries {
            entries.truncate(max);
        }
        let mut was_trimmed = entries.len() < before_cap;

        let template = request.agent.template();
        let mut prompt = render_prompt(template, &entries, request.format)?;
        let mut token_count = estimate_tokens(&prompt);
        while token_count > request.token_budget && entries.len() > 1 {
            entries.pop();
            was_trimmed = true;
            prompt = render_prompt(template, &entries, request.format)?;
            token_count = estimate_tokens(&prompt);
        }

        log::debug!(
            "Assembled {} context: {} entries, ~{} tokens (budget {})",
            request.agent.as_str(),
            entries.len(),
            token_count,
            request.token_budget
        );

        Ok(AssembledContext {
            agent_type: request.agent,
            stats: ContextStats {
                selected,
                dependencies_added,
                dropped: selected + dependencies_added - entries.len(),
                token_budget: request.token_budget,
            },
            entries: entries.into_iter().cloned().collect(),
            prompt,
            token_count,
            was_trimmed,
        })
    }

    /// Ids, then tags, then file pattern, then everything
    fn select(&self, request: &ContextRequest) -> Vec<&'a CompiledEntry> {
        if !request.ids.is_empty() {
            let mut seen = HashSet::new();
            return request
                .ids
                .iter()
                .filter(|id| seen.insert(id.as_str()))
                .filter_map(|id| {
                    let entry = self.db.find_by_id(id);
                    if entry.is_none() {
                        log::warn!("Unknown id requested for context: {id}");
                    }
                    entry
                })
                .collect();
        }

        if !request.tags.is_empty() {
            return self
                .db
                .iter()
                .filter(|entry| request.tags.iter().any(|tag| entry.tags.contains(tag)))
                .collect();
        }

        if let Some(pattern) = &request.file_pattern {
            return self
                .db
                .iter()
                .filter(|entry| {
                    entry
                        .file_path
                        .as_deref()
                        .is_some_and(|path| path.contains(pattern.as_str()))
                })
                .collect();
        }

        self.db.iter().collect()
    }

    /// Append runtime dependencies breadth-first, skipping ids already present
    fn expand_runtime(&self, selection: Vec<&'a CompiledEntry>) -> Vec<&'a CompiledEntry> {
        let mut present: HashSet<&str> = selection.iter().map(|&entry| entry.id.as_str()).collect();
        let mut queue: VecDeque<&CompiledEntry> = selection.iter().copied().collect();
        let mut expanded = selection;

        while let Some(entry) = queue.pop_front() {
            for target in entry.deps_of(DependencyClass::Runtime) {
                let Some(dependency) = self.db.find_by_id(target) else {
                    continue;
                };
                if present.insert(dependency.id.as_str()) {
                    expanded.push(dependency);
                    queue.push_back(dependency);
                }
            }
        }

        expanded
    }
}
