//! Structured-comment pass: `@mm:key=value` lines inside comment blocks.

use crate::config::ExtractorConfig;
use crate::entity;
use crate::fields::apply_field;
use crate::types::{Annotation, AnnotationRecord, ExtractWarning, Origin, Provenance};
use once_cell::sync::Lazy;
use regex::Regex;

static ANNOTATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@mm:([A-Za-z_][\w-]*)\s*=\s*(.*?)\s*$").expect("annotation pattern is valid")
});

/// Comment block with 0-indexed line span and cleaned content lines
struct CommentBlock {
    start: usize,
    end: usize,
    lines: Vec<(usize, String)>,
    /// Code following `*/` on the closing line
    trailing: String,
}

pub(crate) fn extract(
    text: &str,
    file_path: &str,
    line_offset: usize,
    config: &ExtractorConfig,
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<AnnotationRecord> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();

    for block in comment_blocks(&lines) {
        let mut annotation = Annotation::default();
        let mut recognized = false;
        let mut unknown = Vec::new();

        for (idx, content) in &block.lines {
            let Some(caps) = ANNOTATION_LINE.captures(content) else {
                continue;
            };
            let key = &caps[1];
            if apply_field(&mut annotation, key, &caps[2]) {
                recognized = true;
            } else {
                unknown.push((*idx, key.to_string()));
            }
        }

        if !recognized {
            continue;
        }

        for (idx, key) in unknown {
            warnings.push(ExtractWarning::new(
                Some(idx + 1 + line_offset),
                format!("unknown annotation key '@mm:{key}'"),
            ));
        }

        let entity = entity::declared_name(&block.trailing)
            .or_else(|| entity::entity_after(&lines[block.end + 1..], config.entity_lookahead_lines))
            .map(str::to_string);

        records.push(AnnotationRecord {
            annotation,
            provenance: Provenance {
                origin: Origin::StructuredComment,
                file_path: file_path.to_string(),
                line: block.start + 1 + line_offset,
                raw: lines[block.start..=block.end].join("\n"),
                entity,
            },
        });
    }

    log::debug!(
        "{file_path}: {} structured-comment annotation(s)",
        records.len()
    );
    records
}

fn comment_blocks(lines: &[&str]) -> Vec<CommentBlock> {
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim_start();

        if let Some(rest) = trimmed.strip_prefix("/*") {
            let start = i;
            let mut body = Vec::new();
            let mut current = rest;
            let mut trailing = String::new();
            loop {
                if let Some(end) = current.find("*/") {
                    body.push((i, clean_block_line(&current[..end])));
                    trailing = current[end + 2..].to_string();
                    break;
                }
                body.push((i, clean_block_line(current)));
                if i + 1 >= lines.len() {
                    break;
                }
                i += 1;
                current = lines[i];
            }
            blocks.push(CommentBlock {
                start,
                end: i,
                lines: body,
                trailing,
            });
        } else if is_line_comment(trimmed) {
            let start = i;
            let mut body = Vec::new();
            while i < lines.len() && is_line_comment(lines[i].trim_start()) {
                body.push((i, clean_line_comment(lines[i].trim_start())));
                i += 1;
            }
            blocks.push(CommentBlock {
                start,
                end: i - 1,
                lines: body,
                trailing: String::new(),
            });
            continue;
        }

        i += 1;
    }

    blocks
}

fn is_line_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || (trimmed.starts_with('#') && !trimmed.starts_with("#[") && !trimmed.starts_with("#!"))
}

fn clean_block_line(line: &str) -> String {
    line.trim().trim_start_matches('*').trim().to_string()
}

fn clean_line_comment(trimmed: &str) -> String {
    let body = match trimmed.strip_prefix("//") {
        Some(rest) => rest.trim_start_matches(['/', '!']),
        None => trimmed.trim_start_matches('#'),
    };
    body.trim().to_string()
}
