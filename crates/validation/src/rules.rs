use crate::config::{Rule, ValidationConfig};
use crate::resolve::{is_path_shaped, TargetResolver};
use metamark_extractor::{AnnotationRecord, DependencyClass, Visibility};
use metamark_graph::{find_cycles, Issue};
use std::collections::{HashMap, HashSet};

/// Inputs shared by every rule
pub struct RuleContext<'a> {
    /// All records of the corpus in scan order
    pub records: Vec<&'a AnnotationRecord>,
    pub config: &'a ValidationConfig,
    pub(crate) resolver: TargetResolver<'a>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(records: Vec<&'a AnnotationRecord>, config: &'a ValidationConfig) -> Self {
        let resolver = TargetResolver::new(&records, config.target_matching);
        Self {
            records,
            config,
            resolver,
        }
    }

    /// Records that declare an id
    pub fn identified(&self) -> impl Iterator<Item = (&'a str, &'a AnnotationRecord)> + '_ {
        self.records
            .iter()
            .filter_map(|&record| record.id().map(|id| (id, record)))
    }

    /// Record a dependency target points at
    pub fn resolve(&self, target: &str) -> Option<&'a AnnotationRecord> {
        self.resolver.resolve(target)
    }
}

/// A semantic check over the extracted corpus
pub trait ValidationRule {
    fn rule(&self) -> Rule;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue>;
}

/// Rule implementation for a rule name
pub fn rule_for(rule: Rule) -> Box<dyn ValidationRule> {
    match rule {
        Rule::IdUniqueness => Box::new(IdUniqueness),
        Rule::DepsMustExist => Box::new(DepsMustExist),
        Rule::NoCircularRuntimeDeps => Box::new(NoCircularRuntimeDeps),
        Rule::RequiredFieldsPresent => Box::new(RequiredFieldsPresent),
        Rule::VisibilityConsistency => Box::new(VisibilityConsistency),
    }
}

fn location(record: &AnnotationRecord) -> String {
    format!("{}:{}", record.provenance.file_path, record.provenance.line)
}

fn issue_at(issue: Issue, record: &AnnotationRecord) -> Issue {
    let issue = issue.at(&record.provenance.file_path, Some(record.provenance.line));
    match record.id() {
        Some(id) => issue.with_annotation(id),
        None => issue,
    }
}

pub struct IdUniqueness;

impl ValidationRule for IdUniqueness {
    fn rule(&self) -> Rule {
        Rule::IdUniqueness
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut first: HashMap<&str, &AnnotationRecord> = HashMap::new();
        let mut issues = Vec::new();

        for (id, record) in ctx.identified() {
            match first.get(id) {
                Some(original) => issues.push(issue_at(
                    Issue::error(
                        self.rule().as_str(),
                        format!(
                            "Duplicate id '{id}' at {} (first declared at {})",
                            location(record),
                            location(original)
                        ),
                    ),
                    record,
                )),
                None => {
                    first.insert(id, record);
                }
            }
        }

        issues
    }
}

pub struct DepsMustExist;

impl ValidationRule for DepsMustExist {
    fn rule(&self) -> Rule {
        Rule::DepsMustExist
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();

        for record in &ctx.records {
            for (class, target) in record.annotation.dependency_buckets().iter() {
                if ctx.resolve(target).is_some() {
                    continue;
                }
                let message = format!(
                    "{} has {} dependency on '{target}' which is not declared",
                    record.label(),
                    class.as_str()
                );
                let issue = if is_path_shaped(target) {
                    Issue::warning(self.rule().as_str(), message)
                } else {
                    Issue::error(self.rule().as_str(), message)
                };
                issues.push(issue_at(issue, record));
            }
        }

        issues
    }
}

pub struct NoCircularRuntimeDeps;

impl ValidationRule for NoCircularRuntimeDeps {
    fn rule(&self) -> Rule {
        Rule::NoCircularRuntimeDeps
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut order: Vec<&str> = Vec::new();
        let mut runtime: HashMap<&str, Vec<String>> = HashMap::new();

        for (id, record) in ctx.identified() {
            let targets = runtime.entry(id).or_insert_with(|| {
                order.push(id);
                Vec::new()
            });
            targets.extend(
                record
                    .annotation
                    .dependency_buckets()
                    .get(DependencyClass::Runtime)
                    .iter()
                    .cloned(),
            );
        }

        let adjacency: Vec<(&str, Vec<&str>)> = order
            .iter()
            .map(|id| {
                let targets: Vec<&str> = runtime
                    .get(id)
                    .map(|targets| targets.iter().map(String::as_str).collect())
                    .unwrap_or_default();
                (*id, targets)
            })
            .collect();

        let first_record: HashMap<&str, &AnnotationRecord> = ctx
            .identified()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        find_cycles(&adjacency)
            .into_iter()
            .map(|cycle| {
                let issue = Issue::error(
                    self.rule().as_str(),
                    format!("Circular runtime dependency: {}", cycle.join(" -> ")),
                );
                match first_record.get(cycle[0].as_str()) {
                    Some(record) => issue_at(issue, record),
                    None => issue.with_annotation(&cycle[0]),
                }
            })
            .collect()
    }
}

pub struct RequiredFieldsPresent;

impl ValidationRule for RequiredFieldsPresent {
    fn rule(&self) -> Rule {
        Rule::RequiredFieldsPresent
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();

        for record in &ctx.records {
            for field in &ctx.config.required_fields {
                if record.annotation.has_field(*field) {
                    continue;
                }
                issues.push(issue_at(
                    Issue::error(
                        self.rule().as_str(),
                        format!(
                            "Annotation {} in {} is missing required field '{}'",
                            record.label(),
                            record.provenance.file_path,
                            field.as_str()
                        ),
                    ),
                    record,
                ));
            }
        }

        issues
    }
}

pub struct VisibilityConsistency;

impl ValidationRule for VisibilityConsistency {
    fn rule(&self) -> Rule {
        Rule::VisibilityConsistency
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut reported = HashSet::new();
        let mut issues = Vec::new();

        for (id, record) in ctx.identified() {
            if record.annotation.effective_visibility() != Visibility::Public {
                continue;
            }
            let buckets = record.annotation.dependency_buckets();
            let targets = buckets
                .get(DependencyClass::Runtime)
                .iter()
                .chain(buckets.get(DependencyClass::Build));

            for target in targets {
                let Some(dependency) = ctx.resolve(target) else {
                    continue;
                };
                if dependency.annotation.visibility != Some(Visibility::Internal) {
                    continue;
                }
                let dependency_id = dependency.id().unwrap_or(target.as_str());
                if !reported.insert((id, dependency_id.to_string())) {
                    continue;
                }
                issues.push(issue_at(
                    Issue::warning(
                        self.rule().as_str(),
                        format!("Public '{id}' depends on internal '{dependency_id}'"),
                    ),
                    record,
                ));
            }
        }

        issues
    }
}
