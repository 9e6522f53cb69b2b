use serde::{Deserialize, Serialize};

/// Which surface syntax an annotation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// `@mm:key=value` lines inside a comment block
    StructuredComment,
    /// `__mm = { ... }` object literal
    EmbeddedObject,
}

impl Origin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StructuredComment => "structured-comment",
            Self::EmbeddedObject => "embedded-object",
        }
    }
}

/// Who may depend on an annotated unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
}

impl Visibility {
    /// Parse a visibility value; anything outside the closed set is rejected
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
        }
    }
}

/// Lifecycle status of an annotated unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Experimental,
    Stable,
    Deprecated,
}

impl Status {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "experimental" => Some(Self::Experimental),
            "stable" => Some(Self::Stable),
            "deprecated" => Some(Self::Deprecated),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Experimental => "experimental",
            Self::Stable => "stable",
            Self::Deprecated => "deprecated",
        }
    }
}

/// Edge class of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyClass {
    /// Needed when the unit runs
    Runtime,
    /// Needed to build the unit
    Build,
    /// Used when present
    Optional,
}

impl DependencyClass {
    pub const ALL: [Self; 3] = [Self::Runtime, Self::Build, Self::Optional];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "runtime" => Some(Self::Runtime),
            "build" => Some(Self::Build),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Build => "build",
            Self::Optional => "optional",
        }
    }
}

/// Dependencies sorted into the three edge classes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyBuckets {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,
}

impl DependencyBuckets {
    #[must_use]
    pub fn get(&self, class: DependencyClass) -> &[String] {
        match class {
            DependencyClass::Runtime => &self.runtime,
            DependencyClass::Build => &self.build,
            DependencyClass::Optional => &self.optional,
        }
    }

    pub fn push(&mut self, class: DependencyClass, target: impl Into<String>) {
        let bucket = match class {
            DependencyClass::Runtime => &mut self.runtime,
            DependencyClass::Build => &mut self.build,
            DependencyClass::Optional => &mut self.optional,
        };
        bucket.push(target.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.build.is_empty() && self.optional.is_empty()
    }

    /// All targets with their class, runtime first
    pub fn iter(&self) -> impl Iterator<Item = (DependencyClass, &str)> + '_ {
        DependencyClass::ALL.into_iter().flat_map(move |class| {
            self.get(class)
                .iter()
                .map(move |target| (class, target.as_str()))
        })
    }

    /// Keep only the targets accepted by `keep`
    #[must_use]
    pub fn retain(mut self, mut keep: impl FnMut(&str) -> bool) -> Self {
        self.runtime.retain(|t| keep(t));
        self.build.retain(|t| keep(t));
        self.optional.retain(|t| keep(t));
        self
    }
}

/// Dependency declaration as written in source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    /// Plain list; every target is a runtime dependency
    Flat(Vec<String>),
    /// Targets already sorted by class
    Classified(DependencyBuckets),
}

impl Dependencies {
    /// Normalize into the three-bucket form
    #[must_use]
    pub fn to_buckets(&self) -> DependencyBuckets {
        match self {
            Self::Flat(targets) => DependencyBuckets {
                runtime: targets.clone(),
                ..Default::default()
            },
            Self::Classified(buckets) => buckets.clone(),
        }
    }

    /// Append another declaration, keeping the flat form while both are flat
    #[must_use]
    pub fn extend(self, other: Self) -> Self {
        match (self, other) {
            (Self::Flat(mut a), Self::Flat(b)) => {
                a.extend(b);
                Self::Flat(a)
            }
            (a, b) => {
                let mut buckets = a.to_buckets();
                for (class, target) in b.to_buckets().iter() {
                    buckets.push(class, target);
                }
                Self::Classified(buckets)
            }
        }
    }
}

/// Structured AI hints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// AI metadata: free text or structured hints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiMeta {
    Text(String),
    Structured(AiDetails),
}

impl AiMeta {
    /// Summary line, if one exists
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::Structured(details) => details.summary.as_deref(),
        }
    }
}

/// Named annotation fields, used for required-field checks and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationField {
    Id,
    Name,
    Desc,
    Tags,
    Deps,
    Ai,
    Visibility,
    Version,
    Phase,
    Status,
}

impl AnnotationField {
    pub const ALL: [Self; 10] = [
        Self::Id,
        Self::Name,
        Self::Desc,
        Self::Tags,
        Self::Deps,
        Self::Ai,
        Self::Visibility,
        Self::Version,
        Self::Phase,
        Self::Status,
    ];

    /// Parse a field key, accepting the long aliases
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "desc" | "description" => Some(Self::Desc),
            "tags" => Some(Self::Tags),
            "deps" | "dependencies" => Some(Self::Deps),
            "ai" => Some(Self::Ai),
            "visibility" => Some(Self::Visibility),
            "version" => Some(Self::Version),
            "phase" => Some(Self::Phase),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Desc => "desc",
            Self::Tags => "tags",
            Self::Deps => "deps",
            Self::Ai => "ai",
            Self::Visibility => "visibility",
            Self::Version => "version",
            Self::Phase => "phase",
            Self::Status => "status",
        }
    }
}

/// Annotation payload shared by both surface syntaxes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps: Option<Dependencies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Annotation {
    /// True when no field was recognized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        AnnotationField::ALL.iter().all(|field| !self.has_field(*field))
    }

    #[must_use]
    pub fn has_field(&self, field: AnnotationField) -> bool {
        match field {
            AnnotationField::Id => self.id.is_some(),
            AnnotationField::Name => self.name.is_some(),
            AnnotationField::Desc => self.desc.is_some(),
            AnnotationField::Tags => !self.tags.is_empty(),
            AnnotationField::Deps => self.deps.is_some(),
            AnnotationField::Ai => self.ai.is_some(),
            AnnotationField::Visibility => self.visibility.is_some(),
            AnnotationField::Version => self.version.is_some(),
            AnnotationField::Phase => self.phase.is_some(),
            AnnotationField::Status => self.status.is_some(),
        }
    }

    /// Visibility with the public default applied
    #[must_use]
    pub fn effective_visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    /// Dependencies in three-bucket form (empty when undeclared)
    #[must_use]
    pub fn dependency_buckets(&self) -> DependencyBuckets {
        self.deps
            .as_ref()
            .map(Dependencies::to_buckets)
            .unwrap_or_default()
    }

    /// Field-by-field overlay where every field set on `winner` takes precedence
    #[must_use]
    pub fn overlay(self, winner: Self) -> Self {
        Self {
            id: winner.id.or(self.id),
            name: winner.name.or(self.name),
            desc: winner.desc.or(self.desc),
            tags: if winner.tags.is_empty() {
                self.tags
            } else {
                winner.tags
            },
            deps: winner.deps.or(self.deps),
            ai: winner.ai.or(self.ai),
            visibility: winner.visibility.or(self.visibility),
            version: winner.version.or(self.version),
            phase: winner.phase.or(self.phase),
            status: winner.status.or(self.status),
        }
    }
}

/// Where an annotation was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub origin: Origin,

    /// Logical file path as handed to the extractor
    pub file_path: String,

    /// 1-indexed line of the annotation start
    pub line: usize,

    /// Annotation text as it appears in source
    pub raw: String,

    /// Declaration the annotation is attached to, when recoverable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

/// An annotation together with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(flatten)]
    pub annotation: Annotation,
    pub provenance: Provenance,
}

impl AnnotationRecord {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.annotation.id.as_deref()
    }

    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.provenance.entity.as_deref()
    }

    /// Human label: id, then entity name, then line
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(id) = self.id() {
            format!("'{id}'")
        } else if let Some(entity) = self.entity() {
            format!("entity '{entity}'")
        } else {
            format!("line {}", self.provenance.line)
        }
    }
}

/// Non-fatal problem found while extracting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractWarning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl ExtractWarning {
    pub fn new(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Extraction result for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExtraction {
    pub file_path: String,
    pub records: Vec<AnnotationRecord>,
    pub warnings: Vec<ExtractWarning>,
}

impl FileExtraction {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    /// True when the file yielded neither records nor warnings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.warnings.is_empty()
    }
}
