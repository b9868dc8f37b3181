//! Text edits and fixes.
//!
//! A [`Fix`] is plain data: an ordered list of [`Edit`]s whose spans refer to
//! the document the fix was generated from. Applying it never depends on
//! the order the edits are visited in.

use serde::{Deserialize, Serialize};

use super::FixError;
use crate::syntax::Span;

/// Replace `span` of the original document with `replacement`.
///
/// An empty span is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::empty(at), text)
    }

    /// Length change caused by this edit.
    fn delta(&self) -> isize {
        self.replacement.len() as isize - self.span.len() as isize
    }
}

/// Pairwise non-overlapping edits, sorted by start offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub label: String,
    edits: Vec<Edit>,
}

impl Fix {
    /// Build a fix, sorting the edits and rejecting overlapping ones.
    pub fn new(label: impl Into<String>, mut edits: Vec<Edit>) -> Result<Self, FixError> {
        edits.sort_by_key(|e| (e.span.start, e.span.end));
        check_overlap(&edits)?;
        Ok(Self {
            label: label.into(),
            edits,
        })
    }

    pub fn single(label: impl Into<String>, edit: Edit) -> Self {
        Self {
            label: label.into(),
            edits: vec![edit],
        }
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Merge several fixes into one batch. Overlap across fixes is a conflict.
    pub fn merge<'a>(
        label: impl Into<String>,
        fixes: impl IntoIterator<Item = &'a Fix>,
    ) -> Result<Self, FixError> {
        let edits = fixes
            .into_iter()
            .flat_map(|f| f.edits.iter().cloned())
            .collect();
        Self::new(label, edits)
    }

    /// Offset of a fix made of exactly one pure insertion.
    pub fn insertion_offset(&self) -> Option<usize> {
        match self.edits.as_slice() {
            [edit] if edit.span.is_empty() => Some(edit.span.start),
            _ => None,
        }
    }

    /// Append the text of `other` to this fix when both are single
    /// insertions at the same offset. `other` is left without edits.
    ///
    /// A space ending this text absorbs a space starting the other one.
    pub fn absorb(&mut self, other: &mut Fix) -> bool {
        match (self.insertion_offset(), other.insertion_offset()) {
            (Some(a), Some(b)) if a == b => {}
            _ => return false,
        }
        let Some(taken) = other.edits.pop() else {
            return false;
        };
        let text = &mut self.edits[0].replacement;
        let extra = if text.ends_with(' ') {
            taken.replacement.strip_prefix(' ').unwrap_or(&taken.replacement)
        } else {
            &taken.replacement
        };
        text.push_str(extra);
        true
    }

    /// Apply the edits to `text`, last edit first so earlier offsets stay valid.
    pub fn apply_to(&self, text: &str) -> Result<String, FixError> {
        for edit in &self.edits {
            let Span { start, end } = edit.span;
            if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
                return Err(FixError::OutOfBounds {
                    span: edit.span,
                    len: text.len(),
                });
            }
        }

        let mut result = text.to_string();
        for edit in self.edits.iter().rev() {
            result.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        }
        Ok(result)
    }

    /// Where an offset of the original document ends up after this fix.
    ///
    /// Offsets inside a replaced span collapse onto the start of the edit.
    pub fn map_offset(&self, offset: usize) -> usize {
        let mut shift: isize = 0;
        for edit in &self.edits {
            if edit.span.end <= offset {
                shift += edit.delta();
            } else if edit.span.contains_offset(offset) {
                return (edit.span.start as isize + shift) as usize;
            }
        }
        (offset as isize + shift) as usize
    }
}

/// Reject overlapping edits. `edits` must be sorted by start offset.
fn check_overlap(edits: &[Edit]) -> Result<(), FixError> {
    for (i, a) in edits.iter().enumerate() {
        for b in &edits[i + 1..] {
            if b.span.start > a.span.end {
                break;
            }
            if a.span.overlaps(b.span) {
                return Err(FixError::Conflict {
                    first: a.span,
                    second: b.span,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_are_sorted() {
        let fix = Fix::new(
            "t",
            vec![Edit::replace(Span::new(6, 8), "X"), Edit::insert(0, "> ")],
        )
        .unwrap();
        assert_eq!(fix.edits()[0].span.start, 0);
        assert_eq!(fix.edits()[1].span.start, 6);
    }

    #[test]
    fn test_overlap_is_a_conflict() {
        let err = Fix::new(
            "t",
            vec![Edit::replace(Span::new(2, 6), "a"), Edit::replace(Span::new(4, 8), "b")],
        )
        .unwrap_err();
        assert!(matches!(err, FixError::Conflict { .. }));

        let err = Fix::new("t", vec![Edit::insert(3, "a"), Edit::insert(3, "b")]).unwrap_err();
        assert!(matches!(err, FixError::Conflict { .. }));
    }

    #[test]
    fn test_apply_uses_original_offsets() {
        let text = "new Pose(72.0, 36.0)";
        let fix = Fix::new(
            "convert",
            vec![
                Edit::replace(Span::new(4, 8), "Pose2d"),
                Edit::replace(Span::new(9, 13), "0.0000"),
                Edit::replace(Span::new(15, 19), "-36.0000"),
            ],
        )
        .unwrap();
        assert_eq!(fix.apply_to(text).unwrap(), "new Pose2d(0.0000, -36.0000)");
    }

    #[test]
    fn test_insert_next_to_replacement() {
        let fix = Fix::new(
            "t",
            vec![Edit::replace(Span::new(3, 5), "XY"), Edit::insert(3, "<")],
        )
        .unwrap();
        assert_eq!(fix.apply_to("abcdefg").unwrap(), "abc<XYfg");
    }

    #[test]
    fn test_absorb_same_offset_insertions() {
        let mut first = Fix::single("a", Edit::insert(1, " a(); "));
        let mut second = Fix::single("b", Edit::insert(1, " b(); "));
        assert!(first.absorb(&mut second));
        assert!(second.edits().is_empty());
        assert_eq!(first.apply_to("{}").unwrap(), "{ a(); b(); }");

        let mut elsewhere = Fix::single("c", Edit::insert(2, "c"));
        assert!(!first.absorb(&mut elsewhere));
        let mut replacement = Fix::single("d", Edit::replace(Span::new(1, 2), "d"));
        assert!(!first.absorb(&mut replacement));
        assert_eq!(replacement.edits().len(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let fix = Fix::single("t", Edit::replace(Span::new(2, 20), "x"));
        assert!(matches!(
            fix.apply_to("short"),
            Err(FixError::OutOfBounds { len: 5, .. })
        ));
    }

    #[test]
    fn test_map_offset() {
        let fix = Fix::new(
            "t",
            vec![Edit::insert(2, "1234"), Edit::replace(Span::new(10, 14), "z")],
        )
        .unwrap();
        assert_eq!(fix.map_offset(0), 0);
        assert_eq!(fix.map_offset(2), 6, "insertion at the offset pushes text after it");
        assert_eq!(fix.map_offset(5), 9);
        assert_eq!(fix.map_offset(12), 14, "inside a replacement maps to its start");
        assert_eq!(fix.map_offset(20), 21);
    }
}
