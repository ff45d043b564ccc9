//! Declarative projection of loosely-typed LDBWS records.
//!
//! The remote service returns deeply nested records in which almost every
//! field is optional. A record shape is described once as a static list of
//! [`FieldSpec`]s and [`project`] walks a raw record against it, producing a
//! [`NormalizedRecord`] that contains exactly the fields the source carried.
//!
//! Presence rules:
//! - a field absent from the source, or present as `null`, is omitted;
//! - a primitive is copied verbatim (no coercion);
//! - a present array is projected element by element, and an empty array
//!   stays an empty array.
//!
//! Any value of the wrong shape aborts the whole projection.

use std::fmt;

use serde_json::{Map, Value};

/// A normalized output record: field name to projected value, in field-list order.
pub type NormalizedRecord = Map<String, Value>;

/// How one value is projected.
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    /// Copy a scalar (string, number, bool) verbatim.
    Primitive,
    /// Project an object through a nested list of field specs.
    Record(&'static [FieldSpec]),
    /// Project every element of an array, preserving order.
    Many(&'static Projection),
    /// Descend into a required wrapper field of an object, then project it.
    Within(&'static str, &'static Projection),
}

/// One named field of a record shape.
///
/// The name is the key in both the source record and the projected output.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub projection: Projection,
}

impl FieldSpec {
    /// A field copied verbatim.
    pub const fn primitive(name: &'static str) -> Self {
        Self {
            name,
            projection: Projection::Primitive,
        }
    }

    /// A field whose value is projected by a nested projection.
    pub const fn nested(name: &'static str, projection: Projection) -> Self {
        Self { name, projection }
    }
}

/// A value in the source record did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("expected {expected} at {path}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing required field at {path}")]
    MissingField { path: String },
}

/// Project `source` through `fields`.
///
/// Returns either the complete normalized record or the first shape error;
/// a partially built record is never returned.
pub fn project(source: &Value, fields: &[FieldSpec]) -> Result<NormalizedRecord, ProjectionError> {
    let mut path = FieldPath::default();
    project_record(source, fields, &mut path)
}

fn project_record(
    source: &Value,
    fields: &[FieldSpec],
    path: &mut FieldPath,
) -> Result<NormalizedRecord, ProjectionError> {
    let object = source
        .as_object()
        .ok_or_else(|| path.unexpected("object", source))?;

    let mut record = NormalizedRecord::new();
    for field in fields {
        let Some(value) = object.get(field.name).filter(|v| !v.is_null()) else {
            continue;
        };

        path.push(Segment::Field(field.name));
        let projected = project_value(value, &field.projection, path);
        path.pop();

        record.insert(field.name.to_string(), projected?);
    }

    Ok(record)
}

fn project_value(
    value: &Value,
    projection: &Projection,
    path: &mut FieldPath,
) -> Result<Value, ProjectionError> {
    match projection {
        Projection::Primitive => match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
            _ => Err(path.unexpected("scalar", value)),
        },
        Projection::Record(fields) => project_record(value, fields, path).map(Value::Object),
        Projection::Many(element) => {
            let items = value
                .as_array()
                .ok_or_else(|| path.unexpected("array", value))?;

            let mut projected = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(Segment::Index(index));
                let result = project_value(item, element, path);
                path.pop();
                projected.push(result?);
            }
            Ok(Value::Array(projected))
        }
        Projection::Within(wrapper, inner) => {
            let object = value
                .as_object()
                .ok_or_else(|| path.unexpected("object", value))?;

            path.push(Segment::Field(*wrapper));
            let result = match object.get(*wrapper).filter(|v| !v.is_null()) {
                Some(wrapped) => project_value(wrapped, inner, path),
                None => Err(ProjectionError::MissingField {
                    path: path.to_string(),
                }),
            };
            path.pop();
            result
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Field(&'static str),
    Index(usize),
}

/// Location of the value being projected, rendered only for errors.
#[derive(Debug, Default)]
struct FieldPath(Vec<Segment>);

impl FieldPath {
    fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    fn unexpected(&self, expected: &'static str, found: &Value) -> ProjectionError {
        ProjectionError::UnexpectedShape {
            path: self.to_string(),
            expected,
            found: kind_of(found),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LEAF: &[FieldSpec] = &[FieldSpec::primitive("name"), FieldSpec::primitive("code")];

    const PARENT: &[FieldSpec] = &[
        FieldSpec::primitive("title"),
        FieldSpec::nested("child", Projection::Record(LEAF)),
        FieldSpec::nested("children", Projection::Many(&Projection::Record(LEAF))),
        FieldSpec::nested("tags", Projection::Many(&Projection::Primitive)),
        FieldSpec::nested(
            "groups",
            Projection::Many(&Projection::Within(
                "item",
                &Projection::Many(&Projection::Record(LEAF)),
            )),
        ),
    ];

    #[test]
    fn copies_present_primitives_verbatim() {
        let source = json!({"title": "Board", "ignored": "x"});
        let record = project(&source, PARENT).unwrap();

        assert_eq!(record.len(), 1);
        assert_eq!(record["title"], json!("Board"));
    }

    #[test]
    fn does_not_coerce_types() {
        let source = json!({"title": true});
        let record = project(&source, PARENT).unwrap();
        assert_eq!(record["title"], json!(true));

        let source = json!({"title": 7});
        let record = project(&source, PARENT).unwrap();
        assert_eq!(record["title"], json!(7));
    }

    #[test]
    fn omits_absent_and_null_fields() {
        let source = json!({"title": null, "child": null, "children": null});
        let record = project(&source, PARENT).unwrap();
        assert!(record.is_empty());

        let serialized = serde_json::to_string(&record).unwrap();
        assert_eq!(serialized, "{}");
    }

    #[test]
    fn projects_nested_record() {
        let source = json!({"child": {"name": "Reading", "extra": 1}});
        let record = project(&source, PARENT).unwrap();
        assert_eq!(record["child"], json!({"name": "Reading"}));
    }

    #[test]
    fn preserves_empty_arrays() {
        let source = json!({"children": [], "tags": []});
        let record = project(&source, PARENT).unwrap();
        assert_eq!(record["children"], json!([]));
        assert_eq!(record["tags"], json!([]));
    }

    #[test]
    fn preserves_array_order() {
        let source = json!({"children": [{"name": "a"}, {"name": "b"}, {"name": "c"}]});
        let record = project(&source, PARENT).unwrap();
        assert_eq!(
            record["children"],
            json!([{"name": "a"}, {"name": "b"}, {"name": "c"}])
        );
    }

    #[test]
    fn two_level_nesting_keeps_list_sizes() {
        let source = json!({
            "groups": [
                {"item": [{"name": "a", "code": "A"}, {"name": "b"}]},
                {"item": []}
            ]
        });
        let record = project(&source, PARENT).unwrap();

        let groups = record["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].as_array().unwrap().len(), 2);
        assert_eq!(groups[1].as_array().unwrap().len(), 0);
        assert_eq!(groups[0][1], json!({"name": "b"}));
    }

    #[test]
    fn output_follows_spec_order() {
        let source = json!({"tags": ["x"], "title": "t"});
        let record = project(&source, PARENT).unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["title", "tags"]);
    }

    #[test]
    fn malformed_nested_value_fails_whole_projection() {
        let source = json!({"title": "ok", "children": [{"name": "a"}, "oops"]});
        let err = project(&source, PARENT).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::UnexpectedShape {
                path: "children[1]".to_string(),
                expected: "object",
                found: "string",
            }
        );
    }

    #[test]
    fn array_where_object_expected_fails() {
        let err = project(&json!({"child": []}), PARENT).unwrap_err();
        assert!(err.to_string().contains("expected object at child"));
    }

    #[test]
    fn object_where_scalar_expected_fails() {
        let err = project(&json!({"title": {"nested": 1}}), PARENT).unwrap_err();
        assert!(matches!(err, ProjectionError::UnexpectedShape { expected: "scalar", .. }));
    }

    #[test]
    fn missing_wrapper_field_fails() {
        let err = project(&json!({"groups": [{"other": []}]}), PARENT).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::MissingField {
                path: "groups[0].item".to_string()
            }
        );
    }

    #[test]
    fn non_object_root_fails() {
        let err = project(&json!("null"), PARENT).unwrap_err();
        assert!(err.to_string().contains("at $"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const FLAT: &[FieldSpec] = &[
        FieldSpec::primitive("a"),
        FieldSpec::primitive("b"),
        FieldSpec::primitive("c"),
        FieldSpec::primitive("d"),
        FieldSpec::primitive("e"),
    ];

    /// A source field is either absent, null, or carries a scalar.
    fn field_state() -> impl Strategy<Value = Option<Value>> {
        prop_oneof![
            Just(None),
            Just(Some(Value::Null)),
            "[a-zA-Z0-9 :]{0,12}".prop_map(|s| Some(Value::String(s))),
            any::<bool>().prop_map(|b| Some(Value::Bool(b))),
            any::<i64>().prop_map(|n| Some(Value::from(n))),
        ]
    }

    fn source_record() -> impl Strategy<Value = (Vec<Option<Value>>, Value)> {
        proptest::collection::vec(field_state(), FLAT.len()).prop_map(|states| {
            let mut object = Map::new();
            for (field, state) in FLAT.iter().zip(&states) {
                if let Some(value) = state {
                    object.insert(field.name.to_string(), value.clone());
                }
            }
            (states, Value::Object(object))
        })
    }

    proptest! {
        /// Present-and-non-null fields survive with equal values; others vanish
        #[test]
        fn presence_is_preserved((states, source) in source_record()) {
            let record = project(&source, FLAT).unwrap();

            for (field, state) in FLAT.iter().zip(&states) {
                match state {
                    Some(value) if !value.is_null() => {
                        prop_assert_eq!(record.get(field.name), Some(value));
                    }
                    _ => prop_assert!(!record.contains_key(field.name)),
                }
            }
            prop_assert!(record.values().all(|v| !v.is_null()));
        }

        /// Projecting twice gives identical output
        #[test]
        fn projection_is_idempotent((_, source) in source_record()) {
            let first = project(&source, FLAT).unwrap();
            let second = project(&source, FLAT).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Every element of a present array is projected, including none
        #[test]
        fn arrays_keep_their_length(len in 0usize..8) {
            const LIST: &[FieldSpec] = &[FieldSpec::nested(
                "items",
                Projection::Many(&Projection::Record(FLAT)),
            )];
            let items: Vec<Value> = (0..len).map(|i| serde_json::json!({"a": i})).collect();
            let source = serde_json::json!({ "items": items });

            let record = project(&source, LIST).unwrap();
            prop_assert_eq!(record["items"].as_array().map(Vec::len), Some(len));
        }
    }
}
