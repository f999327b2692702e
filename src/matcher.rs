//! # Matcher Module
//!
//! Structural pattern matching over [`Value`]s with named capture slots.
//!
//! Given a declarative [`Pattern`] and a subject [`Value`], [`matches`]
//! decides structural compatibility by recursive descent and records captured
//! sub-values into a caller-supplied [`CaptureSlots`] table. Matching is
//! stateless apart from the slots, never errors, and makes no ordering
//! decisions beyond the document order of the pattern elements it is given.
//!
//! ## Capture contract
//!
//! Slots are scoped to a single match attempt. On success, every slot
//! reachable from a [`Pattern::Capture`] node holds the matched sub-value.
//! On failure, slots touched during the failed descent are undefined; callers
//! must [`CaptureSlots::reset`] before the next attempt and must never read
//! slots after a failed one.
//!
//! ## Deliberate limits
//!
//! No guards, no alternation inside a single pattern, no backtracking once a
//! sub-pattern fails on a candidate element, no recursive patterns. The
//! existential search for `MappingShape`/`SetShape` is quadratic in the
//! subject size; this is intended for small response-shape structures, not as
//! a data-query engine.

use crate::value::{Tag, Value};

/// Index of a named capture slot.
pub type SlotId = usize;

/// Describes the set of acceptable [`Value`] shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Matches only a structurally equal value.
    Literal(Value),
    /// Matches any value carrying the tag, regardless of content.
    TypeTag(Tag),
    /// Matches a `Sequence` of identical length, element-wise.
    FixedSequence(Vec<Pattern>),
    /// Matches a `Mapping` where every `(key, value)` pattern pair finds at
    /// least one subject entry satisfying both. Unmatched subject entries are
    /// ignored; several pattern pairs may share one witness entry.
    MappingShape(Vec<(Pattern, Pattern)>),
    /// Matches a `Set` where every pattern element finds at least one
    /// matching subject element.
    SetShape(Vec<Pattern>),
    /// Matches iff the inner pattern matches; on success, records the matched
    /// sub-value into the slot.
    Capture(SlotId, Box<Pattern>),
}

impl Pattern {
    /// Shorthand for `Capture(slot, TypeTag(tag))`, the common capture form.
    #[must_use]
    pub fn capture_tag(slot: SlotId, tag: Tag) -> Pattern {
        Pattern::Capture(slot, Box::new(Pattern::TypeTag(tag)))
    }
}

/// Fixed-size table of named capture slots, allocated once per dispatch call
/// and reset between candidate attempts.
#[derive(Debug, Clone)]
pub struct CaptureSlots {
    slots: Vec<Option<Value>>,
}

impl CaptureSlots {
    /// Allocate `count` unbound slots.
    #[must_use]
    pub fn new(count: usize) -> Self {
        CaptureSlots {
            slots: vec![None; count],
        }
    }

    /// Unbind every slot. Call between independent match attempts.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Read a slot. Only meaningful after a successful match.
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&Value> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }

    fn bind(&mut self, id: SlotId, value: Value) {
        if let Some(slot) = self.slots.get_mut(id) {
            // Overwrite: failed existential probes may have left a stale
            // binding from an earlier element.
            *slot = Some(value);
        }
    }
}

/// Decide whether `subject` structurally matches `pattern`, binding captures
/// into `slots` on the way. Never errors; mismatched shapes yield `false`.
#[must_use]
pub fn matches(pattern: &Pattern, subject: &Value, slots: &mut CaptureSlots) -> bool {
    match pattern {
        Pattern::Literal(expected) => subject == expected,
        Pattern::TypeTag(tag) => subject.tag() == *tag,
        Pattern::FixedSequence(elems) => match subject {
            Value::Sequence(items) if items.len() == elems.len() => elems
                .iter()
                .zip(items)
                .all(|(p, item)| matches(p, item, slots)),
            _ => false,
        },
        Pattern::MappingShape(pairs) => match subject {
            // Note: quadratic time complexity
            Value::Mapping(entries) => pairs.iter().all(|(key_pat, val_pat)| {
                entries
                    .iter()
                    .any(|(k, v)| matches(key_pat, k, slots) && matches(val_pat, v, slots))
            }),
            _ => false,
        },
        Pattern::SetShape(elems) => match subject {
            // Note: quadratic time complexity
            Value::Set(items) => elems
                .iter()
                .all(|p| items.iter().any(|item| matches(p, item, slots))),
            _ => false,
        },
        Pattern::Capture(slot, inner) => {
            if matches(inner, subject, slots) {
                slots.bind(*slot, subject.clone());
                true
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOT_A: SlotId = 0;
    const SLOT_B: SlotId = 1;

    fn slots() -> CaptureSlots {
        CaptureSlots::new(2)
    }

    #[test]
    fn test_literal_requires_equal_value() {
        let mut s = slots();
        assert!(matches(
            &Pattern::Literal(Value::Integer(7)),
            &Value::Integer(7),
            &mut s
        ));
        assert!(!matches(
            &Pattern::Literal(Value::Integer(7)),
            &Value::Integer(8),
            &mut s
        ));
        assert!(!matches(
            &Pattern::Literal(Value::Integer(7)),
            &Value::Text("7".into()),
            &mut s
        ));
    }

    #[test]
    fn test_type_tag_ignores_content() {
        let mut s = slots();
        assert!(matches(
            &Pattern::TypeTag(Tag::Integer),
            &Value::Integer(-3),
            &mut s
        ));
        assert!(matches(
            &Pattern::TypeTag(Tag::Bytes),
            &Value::from(b"anything"),
            &mut s
        ));
        assert!(!matches(
            &Pattern::TypeTag(Tag::Integer),
            &Value::from("3"),
            &mut s
        ));
    }

    #[test]
    fn test_fixed_sequence_wrong_length_never_matches() {
        let mut s = slots();
        let pat = Pattern::FixedSequence(vec![
            Pattern::TypeTag(Tag::Integer),
            Pattern::TypeTag(Tag::Bytes),
        ]);
        let short = Value::Sequence(vec![Value::Integer(200)]);
        let long = Value::Sequence(vec![
            Value::Integer(200),
            Value::from(b"ok"),
            Value::from(b"extra"),
        ]);
        assert!(!matches(&pat, &short, &mut s));
        assert!(!matches(&pat, &long, &mut s));
        assert!(!matches(&pat, &Value::Integer(200), &mut s));

        let exact = Value::Sequence(vec![Value::Integer(200), Value::from(b"ok")]);
        assert!(matches(&pat, &exact, &mut s));
    }

    #[test]
    fn test_mapping_shape_is_existential() {
        let mut s = slots();
        // Both pattern pairs satisfied by the same single subject entry.
        let pat = Pattern::MappingShape(vec![
            (Pattern::TypeTag(Tag::Text), Pattern::TypeTag(Tag::Bytes)),
            (
                Pattern::Literal(Value::from("text/html")),
                Pattern::TypeTag(Tag::Bytes),
            ),
        ]);
        let subject = Value::Mapping(vec![(Value::from("text/html"), Value::from(b"<p>hi</p>"))]);
        assert!(matches(&pat, &subject, &mut s));
    }

    #[test]
    fn test_mapping_shape_ignores_unmatched_entries() {
        let mut s = slots();
        let pat = Pattern::MappingShape(vec![(
            Pattern::TypeTag(Tag::Text),
            Pattern::TypeTag(Tag::Bytes),
        )]);
        let subject = Value::Mapping(vec![
            (Value::Integer(1), Value::Integer(2)),
            (Value::from("ct"), Value::from(b"body")),
        ]);
        assert!(matches(&pat, &subject, &mut s));

        let no_witness = Value::Mapping(vec![(Value::Integer(1), Value::Integer(2))]);
        assert!(!matches(&pat, &no_witness, &mut s));
    }

    #[test]
    fn test_set_shape_requires_witness_per_element() {
        let mut s = slots();
        let pat = Pattern::SetShape(vec![
            Pattern::Literal(Value::Integer(1)),
            Pattern::TypeTag(Tag::Text),
        ]);
        let subject = Value::Set(vec![
            Value::from("extra"),
            Value::Integer(1),
            Value::Integer(9),
        ]);
        assert!(matches(&pat, &subject, &mut s));

        let missing = Value::Set(vec![Value::Integer(1), Value::Integer(9)]);
        assert!(!matches(&pat, &missing, &mut s));
        assert!(!matches(&pat, &Value::Sequence(vec![]), &mut s));
    }

    #[test]
    fn test_capture_binds_on_success_only() {
        let mut s = slots();
        let pat = Pattern::capture_tag(SLOT_A, Tag::Integer);
        assert!(!matches(&pat, &Value::from("nope"), &mut s));
        assert_eq!(s.get(SLOT_A), None);

        assert!(matches(&pat, &Value::Integer(42), &mut s));
        assert_eq!(s.get(SLOT_A), Some(&Value::Integer(42)));
    }

    #[test]
    fn test_nested_captures_in_sequence() {
        let mut s = slots();
        let pat = Pattern::FixedSequence(vec![
            Pattern::capture_tag(SLOT_A, Tag::Integer),
            Pattern::capture_tag(SLOT_B, Tag::Bytes),
        ]);
        let subject = Value::Sequence(vec![Value::Integer(201), Value::from(b"made")]);
        assert!(matches(&pat, &subject, &mut s));
        assert_eq!(s.get(SLOT_A), Some(&Value::Integer(201)));
        assert_eq!(s.get(SLOT_B), Some(&Value::Bytes(b"made".to_vec())));
    }

    #[test]
    fn test_existential_capture_takes_first_witness() {
        let mut s = slots();
        let pat = Pattern::MappingShape(vec![(
            Pattern::capture_tag(SLOT_A, Tag::Text),
            Pattern::TypeTag(Tag::Bytes),
        )]);
        let subject = Value::Mapping(vec![
            (Value::from("first"), Value::from(b"a")),
            (Value::from("second"), Value::from(b"b")),
        ]);
        assert!(matches(&pat, &subject, &mut s));
        assert_eq!(s.get(SLOT_A), Some(&Value::Text("first".into())));
    }

    #[test]
    fn test_reset_unbinds_slots() {
        let mut s = slots();
        assert!(matches(
            &Pattern::capture_tag(SLOT_A, Tag::Integer),
            &Value::Integer(1),
            &mut s
        ));
        s.reset();
        assert_eq!(s.get(SLOT_A), None);
    }
}
