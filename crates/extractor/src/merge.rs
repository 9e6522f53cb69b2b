use crate::types::{AnnotationRecord, Origin};

/// Combine two records describing the same unit.
///
/// When the origins differ the embedded-object record wins field-by-field and
/// its provenance is kept. Otherwise `later` replaces `earlier`.
pub fn merge_records(earlier: AnnotationRecord, later: AnnotationRecord) -> AnnotationRecord {
    let (comment, object) = match (earlier.provenance.origin, later.provenance.origin) {
        (Origin::StructuredComment, Origin::EmbeddedObject) => (earlier, later),
        (Origin::EmbeddedObject, Origin::StructuredComment) => (later, earlier),
        _ => return later,
    };

    let mut provenance = object.provenance;
    if provenance.entity.is_none() {
        provenance.entity = comment.provenance.entity;
    }

    AnnotationRecord {
        annotation: comment.annotation.overlay(object.annotation),
        provenance,
    }
}

/// Fold embedded-object records into the structured-comment records that name
/// the same owning entity. Output is in source-line order.
pub(crate) fn merge_origins(
    mut structured: Vec<AnnotationRecord>,
    embedded: Vec<AnnotationRecord>,
) -> Vec<AnnotationRecord> {
    let mut merged = vec![false; structured.len()];
    let mut unmatched = Vec::new();

    for record in embedded {
        let slot = record.entity().and_then(|entity| {
            (0..structured.len())
                .find(|&idx| !merged[idx] && structured[idx].entity() == Some(entity))
        });

        match slot {
            Some(idx) => {
                merged[idx] = true;
                log::debug!(
                    "merging annotations for entity {:?} in {}",
                    record.entity(),
                    record.provenance.file_path
                );
                structured[idx] = merge_records(structured[idx].clone(), record);
            }
            None => unmatched.push(record),
        }
    }

    structured.extend(unmatched);
    structured.sort_by_key(|record| record.provenance.line);
    structured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Annotation, Provenance};
    use pretty_assertions::assert_eq;

    fn record(origin: Origin, line: usize, entity: Option<&str>, annotation: Annotation) -> AnnotationRecord {
        AnnotationRecord {
            annotation,
            provenance: Provenance {
                origin,
                file_path: "w.js".into(),
                line,
                raw: String::new(),
                entity: entity.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_embedded_wins_regardless_of_order() {
        let comment = record(
            Origin::StructuredComment,
            1,
            Some("Widget"),
            Annotation {
                id: Some("widget".into()),
                desc: Some("JSDoc description".into()),
                ..Default::default()
            },
        );
        let object = record(
            Origin::EmbeddedObject,
            6,
            None,
            Annotation {
                desc: Some("Runtime description".into()),
                ..Default::default()
            },
        );

        for merged in [
            merge_records(comment.clone(), object.clone()),
            merge_records(object.clone(), comment.clone()),
        ] {
            assert_eq!(merged.id(), Some("widget"));
            assert_eq!(merged.annotation.desc.as_deref(), Some("Runtime description"));
            assert_eq!(merged.provenance.origin, Origin::EmbeddedObject);
            assert_eq!(merged.provenance.line, 6);
            assert_eq!(merged.entity(), Some("Widget"));
        }
    }

    #[test]
    fn test_same_origin_is_last_wins() {
        let a = record(Origin::StructuredComment, 1, None, Annotation { id: Some("x".into()), phase: Some(1), ..Default::default() });
        let b = record(Origin::StructuredComment, 9, None, Annotation { id: Some("x".into()), ..Default::default() });
        let merged = merge_records(a, b);
        assert_eq!(merged.provenance.line, 9);
        assert_eq!(merged.annotation.phase, None);
    }

    #[test]
    fn test_merge_origins_only_pairs_matching_entities() {
        let structured = vec![
            record(Origin::StructuredComment, 1, Some("A"), Annotation { id: Some("a".into()), ..Default::default() }),
            record(Origin::StructuredComment, 10, Some("B"), Annotation { id: Some("b".into()), ..Default::default() }),
        ];
        let embedded = vec![
            record(Origin::EmbeddedObject, 12, Some("B"), Annotation { phase: Some(3), ..Default::default() }),
            record(Origin::EmbeddedObject, 20, Some("C"), Annotation { id: Some("c".into()), ..Default::default() }),
        ];

        let merged = merge_origins(structured, embedded);
        let ids: Vec<_> = merged.iter().map(|r| r.id().unwrap_or("-")).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(merged[1].annotation.phase, Some(3));
        assert_eq!(merged[1].provenance.origin, Origin::EmbeddedObject);
        assert_eq!(merged[0].provenance.origin, Origin::StructuredComment);
    }
}
