use metamark_extractor::AnnotationField;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of agent the context is prepared for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Codegen,
    Refactor,
    Docgen,
    Review,
    #[default]
    Generic,
}

/// Fixed prompt scaffolding for one agent type
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub preamble: &'static str,
    /// Fields rendered for every entry, in order
    pub fields: &'static [AnnotationField],
    pub instruction: &'static str,
}

const CODEGEN: Template = Template {
    preamble: "You are generating new code. The annotated units below describe the APIs you may call and what they depend on.",
    fields: &[
        AnnotationField::Id,
        AnnotationField::Desc,
        AnnotationField::Deps,
        AnnotationField::Ai,
        AnnotationField::Status,
    ],
    instruction: "Only call units listed here and respect their declared dependencies.",
};

const REFACTOR: Template = Template {
    preamble: "You are refactoring existing code. The units below and their dependency edges define what may be affected.",
    fields: &[
        AnnotationField::Id,
        AnnotationField::Desc,
        AnnotationField::Deps,
        AnnotationField::Visibility,
        AnnotationField::Status,
    ],
    instruction: "Keep public units stable and do not introduce new dependency cycles.",
};

const DOCGEN: Template = Template {
    preamble: "You are writing documentation for the annotated units below.",
    fields: &[
        AnnotationField::Id,
        AnnotationField::Name,
        AnnotationField::Desc,
        AnnotationField::Tags,
        AnnotationField::Ai,
        AnnotationField::Version,
    ],
    instruction: "Document each unit's purpose and usage in plain language.",
};

const REVIEW: Template = Template {
    preamble: "You are reviewing a change. The units below are in scope together with what they depend on.",
    fields: &[
        AnnotationField::Id,
        AnnotationField::Desc,
        AnnotationField::Deps,
        AnnotationField::Visibility,
        AnnotationField::Phase,
        AnnotationField::Status,
    ],
    instruction: "Flag dependency misuse, visibility leaks and deprecated units.",
};

const GENERIC: Template = Template {
    preamble: "Project metadata for the annotated units below.",
    fields: &[
        AnnotationField::Id,
        AnnotationField::Desc,
        AnnotationField::Tags,
        AnnotationField::Deps,
        AnnotationField::Status,
    ],
    instruction: "Use this metadata as context for the task.",
};

impl AgentType {
    pub const ALL: [Self; 5] = [
        Self::Codegen,
        Self::Refactor,
        Self::Docgen,
        Self::Review,
        Self::Generic,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Codegen => "codegen",
            Self::Refactor => "refactor",
            Self::Docgen => "docgen",
            Self::Review => "review",
            Self::Generic => "generic",
        }
    }

    #[must_use]
    pub const fn template(self) -> &'static Template {
        match self {
            Self::Codegen => &CODEGEN,
            Self::Refactor => &REFACTOR,
            Self::Docgen => &DOCGEN,
            Self::Review => &REVIEW,
            Self::Generic => &GENERIC,
        }
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|agent| agent.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown agent type '{s}'"))
    }
}

/// How entries are laid out in the prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// One block per entry
    #[default]
    Structured,
    /// A single embedded JSON data block
    Json,
    /// One line per entry
    Summary,
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "json" => Ok(Self::Json),
            "summary" => Ok(Self::Summary),
            other => Err(format!("unknown render format '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_starts_with_id() {
        for agent in AgentType::ALL {
            let template = agent.template();
            assert_eq!(template.fields.first(), Some(&AnnotationField::Id));
            assert!(template.preamble.len() + template.instruction.len() < 300);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Review".parse::<AgentType>().unwrap(), AgentType::Review);
        assert!("writer".parse::<AgentType>().is_err());
        assert_eq!("json".parse::<RenderFormat>().unwrap(), RenderFormat::Json);
    }
}
