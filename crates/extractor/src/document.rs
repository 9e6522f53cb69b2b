use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// File extensions the extractor understands
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "vue", "svelte", "astro", "html", "htm", "rs", "py",
];

static SCRIPT_REGION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("script pattern is valid")
});

/// How a file's text is laid out for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Plain source file; the whole text is scanned
    Script,
    /// Markup with embedded `<script>` regions
    Composite,
}

impl DocumentKind {
    /// Detect document kind from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "vue" | "svelte" | "astro" | "html" | "htm" => Self::Composite,
            _ => Self::Script,
        }
    }

    /// Detect document kind from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Script)
    }
}

/// True when the path has one of [`SOURCE_EXTENSIONS`]
pub fn is_source_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            SOURCE_EXTENSIONS.iter().any(|candidate| *candidate == ext)
        })
}

/// A slice of the document to extract from, with its 0-based line offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region<'a> {
    pub text: &'a str,
    pub line_offset: usize,
}

/// `<script>` bodies of a composite document; the whole text when none exist
pub(crate) fn regions(text: &str, kind: DocumentKind) -> Vec<Region<'_>> {
    if kind == DocumentKind::Script {
        return vec![Region {
            text,
            line_offset: 0,
        }];
    }

    let found: Vec<Region<'_>> = SCRIPT_REGION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|body| Region {
            text: body.as_str(),
            line_offset: text[..body.start()].matches('\n').count(),
        })
        .collect();

    if found.is_empty() {
        log::debug!("no <script> region found, scanning raw text");
        return vec![Region {
            text,
            line_offset: 0,
        }];
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(DocumentKind::from_path("App.vue"), DocumentKind::Composite);
        assert_eq!(DocumentKind::from_path("index.HTML"), DocumentKind::Composite);
        assert_eq!(DocumentKind::from_path("src/lib.rs"), DocumentKind::Script);
        assert_eq!(DocumentKind::from_path("Makefile"), DocumentKind::Script);
    }

    #[test]
    fn test_is_source_path() {
        assert!(is_source_path("src/app.tsx"));
        assert!(is_source_path("lib/Mod.RS"));
        assert!(!is_source_path("README.md"));
        assert!(!is_source_path("Makefile"));
    }

    #[test]
    fn test_regions_track_line_offsets() {
        let text = "<template>\n<div/>\n</template>\n<script setup>\nconst a = 1;\n</script>\n";
        let regions = regions(text, DocumentKind::Composite);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].line_offset, 3);
        assert!(regions[0].text.contains("const a = 1;"));
    }

    #[test]
    fn test_regions_fall_back_to_raw_text() {
        let text = "<div>no scripts</div>";
        let regions = regions(text, DocumentKind::Composite);
        assert_eq!(regions, vec![Region { text, line_offset: 0 }]);
    }
}
