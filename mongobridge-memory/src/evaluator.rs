//! Query and update evaluation for in-memory documents.
//!
//! Covers the subset of MongoDB syntax scripts commonly send: field equality,
//! comparison and membership operators, logical combinators, the `$set`, `$unset`
//! and `$inc` update operators, pipeline-style updates and a handful of
//! aggregation stages.

use std::cmp::Ordering;

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use mongobridge_core::{
    backend::UpdateSpec,
    error::{BridgeError, BridgeResult},
};

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64. Values of different types order by
/// MongoDB's BSON comparison order, see [`Comparable::total_cmp`].
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    MinKey,
    Null,
    Number(f64),
    String(&'a str),
    Map(Vec<(&'a str, Comparable<'a>)>),
    Array(Vec<Comparable<'a>>),
    ObjectId(ObjectId),
    Bool(bool),
    DateTime(DateTime),
    MaxKey,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::MinKey => Comparable::MinKey,
            Bson::MaxKey => Comparable::MaxKey,
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<Vec<_>>()
            ),
            _ => Comparable::Null,
        }
    }
}

impl<'a> Comparable<'a> {
    fn rank(&self) -> u8 {
        match self {
            Comparable::MinKey => 0,
            Comparable::Null => 1,
            Comparable::Number(_) => 2,
            Comparable::String(_) => 3,
            Comparable::Map(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::ObjectId(_) => 7,
            Comparable::Bool(_) => 8,
            Comparable::DateTime(_) => 9,
            Comparable::MaxKey => 127,
        }
    }

    /// Orders by BSON type first, then by value within a type.
    ///
    /// MinKey < null < numbers < strings < documents < arrays < ObjectIds
    /// < booleans < dates < MaxKey. NaN sorts below every other number.
    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => {
                match (a.is_nan(), b.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    // -0.0 == 0.0, unlike f64::total_cmp
                    (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                }
            }
            (Comparable::String(a), Comparable::String(b)) => a.cmp(b),
            (Comparable::Map(a), Comparable::Map(b)) => a
                .iter()
                .zip(b.iter())
                .map(|((ka, va), (kb, vb))| {
                    va.rank()
                        .cmp(&vb.rank())
                        .then_with(|| ka.cmp(kb))
                        .then_with(|| va.total_cmp(vb))
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Comparable::Array(a), Comparable::Array(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.total_cmp(y))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.cmp(b),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::MinKey, Comparable::MinKey) => true,
            (Comparable::MaxKey, Comparable::MaxKey) => true,
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Query comparison operators only match values of the same BSON type.
impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::Map(_), Comparable::Map(_))
            | (Comparable::Array(_), Comparable::Array(_)) => None,
            _ if self.rank() == other.rank() => Some(self.total_cmp(other)),
            _ => None,
        }
    }
}

fn unsupported(what: &str) -> BridgeError {
    BridgeError::Driver(format!("unsupported {what}"))
}

/// Resolves a dotted path (`"job.grade"`, `"items.0"`) inside a document.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(doc) => doc.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

pub(crate) fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(*n as i64),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) if n.fract() == 0.0 => Some(*n as i64),
        _ => None,
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_f64(other).is_none_or(|n| n != 0.0),
    }
}

fn is_operator_document(value: &Bson) -> Option<&Document> {
    match value {
        Bson::Document(doc) if !doc.is_empty() && doc.keys().all(|k| k.starts_with('$')) => {
            Some(doc)
        }
        _ => None,
    }
}

/// Evaluates filter documents against stored documents.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn matches(&self, filter: &Document) -> BridgeResult<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => self
                    .clauses(condition)?
                    .into_iter()
                    .map(|clause| self.matches(clause))
                    .collect::<BridgeResult<Vec<_>>>()?
                    .into_iter()
                    .all(|m| m),
                "$or" => self
                    .clauses(condition)?
                    .into_iter()
                    .map(|clause| self.matches(clause))
                    .collect::<BridgeResult<Vec<_>>>()?
                    .into_iter()
                    .any(|m| m),
                "$nor" => !self
                    .clauses(condition)?
                    .into_iter()
                    .map(|clause| self.matches(clause))
                    .collect::<BridgeResult<Vec<_>>>()?
                    .into_iter()
                    .any(|m| m),
                op if op.starts_with('$') => {
                    return Err(unsupported(&format!("query operator {op}")));
                }
                field => Self::field_matches(lookup(self.document, field), condition)?,
            };

            if !matched {
                return Ok(false);
            }
        }

        Ok(true)
    }

    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        filter: &Document,
    ) -> BridgeResult<Vec<Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).matches(filter)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }

    fn clauses<'b>(&self, condition: &'b Bson) -> BridgeResult<Vec<&'b Document>> {
        match condition {
            Bson::Array(items) => items
                .iter()
                .map(|item| item.as_document().ok_or_else(|| unsupported("logical clause")))
                .collect(),
            _ => Err(unsupported("logical clause")),
        }
    }

    fn field_matches(value: Option<&Bson>, condition: &Bson) -> BridgeResult<bool> {
        let Some(operators) = is_operator_document(condition) else {
            return Ok(Self::equals(value, condition));
        };

        for (op, operand) in operators {
            let matched = match op.as_str() {
                "$eq" => Self::equals(value, operand),
                "$ne" => !Self::equals(value, operand),
                "$gt" => Self::compare(value, operand, |o| o == Ordering::Greater),
                "$gte" => Self::compare(value, operand, |o| o != Ordering::Less),
                "$lt" => Self::compare(value, operand, |o| o == Ordering::Less),
                "$lte" => Self::compare(value, operand, |o| o != Ordering::Greater),
                "$in" => Self::any_of(value, operand)?,
                "$nin" => !Self::any_of(value, operand)?,
                "$exists" => value.is_some() == truthy(operand),
                other => return Err(unsupported(&format!("query operator {other}"))),
            };

            if !matched {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Equality with array semantics: an array field matches when it equals the
    /// operand or one of its elements does. A missing field equals `null`.
    fn equals(value: Option<&Bson>, operand: &Bson) -> bool {
        let expected = Comparable::from(operand);

        match value {
            None => expected == Comparable::Null,
            Some(array @ Bson::Array(items)) => {
                Comparable::from(array) == expected
                    || items.iter().any(|item| Comparable::from(item) == expected)
            }
            Some(actual) => Comparable::from(actual) == expected,
        }
    }

    fn compare(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
        let expected = Comparable::from(operand);
        let check = |item: &Bson| {
            Comparable::from(item)
                .partial_cmp(&expected)
                .is_some_and(&accept)
        };

        match value {
            Some(Bson::Array(items)) => items.iter().any(check),
            Some(actual) => check(actual),
            None => false,
        }
    }

    fn any_of(value: Option<&Bson>, operand: &Bson) -> BridgeResult<bool> {
        match operand {
            Bson::Array(candidates) => Ok(candidates
                .iter()
                .any(|candidate| Self::equals(value, candidate))),
            _ => Err(unsupported("$in/$nin operand, expected an array")),
        }
    }
}

/// Applies an update to `document`, returning whether it changed.
pub(crate) fn apply_update(document: &mut Document, update: &UpdateSpec) -> BridgeResult<bool> {
    let before = document.clone();

    match update {
        UpdateSpec::Document(operators) => apply_operators(document, operators)?,
        UpdateSpec::Pipeline(stages) => {
            for stage in stages {
                apply_stage(document, stage)?;
            }
        }
    }

    Ok(before != *document)
}

/// Rejects replacement-style documents, as the server does for update calls.
pub(crate) fn check_update(update: &UpdateSpec) -> BridgeResult<()> {
    match update {
        UpdateSpec::Document(operators)
            if operators.is_empty() || !operators.keys().all(|k| k.starts_with('$')) =>
        {
            Err(BridgeError::Driver(
                "Update document requires atomic operators".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

fn apply_operators(document: &mut Document, operators: &Document) -> BridgeResult<()> {
    check_update(&UpdateSpec::Document(operators.clone()))?;

    for (op, fields) in operators {
        let fields = fields
            .as_document()
            .ok_or_else(|| unsupported(&format!("{op} argument, expected an object")))?;

        for (path, value) in fields {
            match op.as_str() {
                "$set" => set_path(document, path, value.clone()),
                "$unset" => unset_path(document, path),
                "$inc" => {
                    let next = increment(lookup(document, path), value)?;
                    set_path(document, path, next);
                }
                other => return Err(unsupported(&format!("update operator {other}"))),
            }
        }
    }

    Ok(())
}

/// Integer addition stays integral; anything involving a double yields a double.
fn increment(current: Option<&Bson>, delta: &Bson) -> BridgeResult<Bson> {
    if as_f64(delta).is_none() {
        return Err(unsupported("$inc operand"));
    }

    Ok(match (current, delta) {
        (None, _) => delta.clone(),
        (Some(Bson::Int32(a)), Bson::Int32(b)) => a
            .checked_add(*b)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(*a as i64 + *b as i64)),
        (Some(a @ (Bson::Int32(_) | Bson::Int64(_))), Bson::Int32(_) | Bson::Int64(_)) => {
            Bson::Int64(as_i64(a).unwrap_or_default() + as_i64(delta).unwrap_or_default())
        }
        (Some(current), _) => match (as_f64(current), as_f64(delta)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => return Err(unsupported("$inc on a non-numeric field")),
        },
    })
}

fn apply_stage(document: &mut Document, stage: &Document) -> BridgeResult<()> {
    for (name, body) in stage {
        match (name.as_str(), body) {
            ("$set" | "$addFields", Bson::Document(fields)) => {
                for (path, value) in fields {
                    let resolved = match value {
                        Bson::String(reference) if reference.starts_with('$') => {
                            lookup(document, &reference[1..])
                                .cloned()
                                .unwrap_or(Bson::Null)
                        }
                        literal => literal.clone(),
                    };
                    set_path(document, path, resolved);
                }
            }
            ("$unset", Bson::String(path)) => unset_path(document, path),
            ("$unset", Bson::Array(paths)) => {
                for path in paths.iter().filter_map(Bson::as_str) {
                    unset_path(document, path);
                }
            }
            (other, _) => return Err(unsupported(&format!("update pipeline stage {other}"))),
        }
    }

    Ok(())
}

fn set_path(document: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(document.get(head), Some(Bson::Document(_))) {
                document.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = document.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

fn unset_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(child)) = document.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

/// Builds the base of an upserted document from the equality clauses of a filter.
pub(crate) fn seed_from_filter(filter: &Document) -> Document {
    let mut seed = Document::new();

    for (key, condition) in filter {
        if key.starts_with('$') {
            continue;
        }
        match is_operator_document(condition) {
            Some(operators) => {
                if let Some(value) = operators.get("$eq") {
                    set_path(&mut seed, key, value.clone());
                }
            }
            None => set_path(&mut seed, key, condition.clone()),
        }
    }

    seed
}

/// Sorts by a `{ field: 1 | -1, ... }` specification.
pub(crate) fn sort_documents(documents: &mut [Document], spec: &Document) {
    documents.sort_by(|a, b| {
        for (field, direction) in spec {
            // missing fields sort as null
            let left = lookup(a, field).map_or(Comparable::Null, Comparable::from);
            let right = lookup(b, field).map_or(Comparable::Null, Comparable::from);
            let ordering = left.total_cmp(&right);
            let ordering = if as_f64(direction).is_some_and(|d| d < 0.0) {
                ordering.reverse()
            } else {
                ordering
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Applies an inclusion or exclusion projection to top-level fields.
pub(crate) fn project(document: Document, projection: &Document) -> Document {
    if projection.is_empty() {
        return document;
    }

    let include_id = projection.get("_id").is_none_or(truthy);
    let inclusive = projection
        .iter()
        .any(|(field, flag)| field != "_id" && truthy(flag));

    document
        .into_iter()
        .filter(|(field, _)| {
            if field == "_id" {
                include_id
            } else if inclusive {
                projection.get(field).is_some_and(truthy)
            } else {
                projection.get(field).is_none_or(truthy)
            }
        })
        .collect()
}

/// Runs aggregation stages over `documents`.
pub(crate) fn run_pipeline(
    mut documents: Vec<Document>,
    pipeline: &[Document],
) -> BridgeResult<Vec<Document>> {
    for stage in pipeline {
        let Some((name, body)) = stage.iter().next() else {
            return Err(unsupported("empty pipeline stage"));
        };

        documents = match (name.as_str(), body) {
            ("$match", Bson::Document(filter)) => {
                DocumentEvaluator::filter_documents(documents.iter(), filter)?
            }
            ("$sort", Bson::Document(spec)) => {
                sort_documents(&mut documents, spec);
                documents
            }
            ("$skip", n) => {
                let n = as_i64(n).ok_or_else(|| unsupported("$skip operand"))?;
                documents.into_iter().skip(n.max(0) as usize).collect()
            }
            ("$limit", n) => {
                let n = as_i64(n).ok_or_else(|| unsupported("$limit operand"))?;
                documents.into_iter().take(n.max(0) as usize).collect()
            }
            ("$project", Bson::Document(spec)) => documents
                .into_iter()
                .map(|doc| project(doc, spec))
                .collect(),
            ("$count", Bson::String(field)) => {
                let mut result = Document::new();
                result.insert(field.as_str(), documents.len() as i32);
                vec![result]
            }
            (other, _) => return Err(unsupported(&format!("aggregation stage {other}"))),
        };
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    fn matches(document: &Document, filter: Document) -> bool {
        DocumentEvaluator::new(document).matches(&filter).unwrap()
    }

    #[test]
    fn test_equality_and_operators() {
        let player = doc! {
            "name": "Bob",
            "cash": 500,
            "job": { "name": "police", "grade": 2 },
            "licenses": ["drive", "weapon"],
        };

        assert!(matches(&player, doc! { "name": "Bob" }));
        assert!(matches(&player, doc! { "job.grade": 2 }));
        assert!(matches(&player, doc! { "licenses": "weapon" }));
        assert!(matches(&player, doc! { "cash": { "$gte": 500, "$lt": 1000 } }));
        assert!(matches(&player, doc! { "name": { "$in": ["Alice", "Bob"] } }));
        assert!(matches(&player, doc! { "phone": { "$exists": false } }));
        assert!(matches(&player, doc! { "phone": null }));
        assert!(!matches(&player, doc! { "cash": { "$gt": 500 } }));
        assert!(!matches(&player, doc! { "name": { "$nin": ["Bob"] } }));
    }

    #[test]
    fn test_logical_operators() {
        let player = doc! { "name": "Bob", "cash": 500 };

        assert!(matches(&player, doc! { "$or": [{ "name": "Alice" }, { "cash": 500 }] }));
        assert!(!matches(&player, doc! { "$and": [{ "name": "Bob" }, { "cash": 1 }] }));
        assert!(matches(&player, doc! { "$nor": [{ "name": "Alice" }] }));
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        let player = doc! { "name": "Bob" };
        assert!(DocumentEvaluator::new(&player).matches(&doc! { "name": { "$regex": "B" } }).is_err());
    }

    #[test]
    fn test_update_operators() {
        let mut player = doc! { "cash": 10, "bank": 1.5, "job": { "grade": 1 } };
        let changed = apply_update(
            &mut player,
            &UpdateSpec::Document(doc! {
                "$inc": { "cash": 5, "bank": 1 },
                "$set": { "job.grade": 2, "name": "Bob" },
            }),
        )
        .unwrap();

        assert!(changed);
        assert_eq!(player, doc! { "cash": 15, "bank": 2.5, "job": { "grade": 2 }, "name": "Bob" });

        let unchanged = apply_update(&mut player, &UpdateSpec::Document(doc! { "$set": { "name": "Bob" } })).unwrap();
        assert!(!unchanged);
    }

    #[test]
    fn test_replacement_rejected_as_update() {
        assert!(check_update(&UpdateSpec::Document(doc! { "name": "Bob" })).is_err());
        assert!(check_update(&UpdateSpec::Document(Document::new())).is_err());
        assert!(check_update(&UpdateSpec::Pipeline(vec![])).is_ok());
    }

    #[test]
    fn test_pipeline_update() {
        let mut player = doc! { "cash": 10, "temp": true };
        apply_update(
            &mut player,
            &UpdateSpec::Pipeline(vec![
                doc! { "$set": { "previous": "$cash", "cash": 0 } },
                doc! { "$unset": "temp" },
            ]),
        )
        .unwrap();

        assert_eq!(player, doc! { "cash": 0, "previous": 10 });
    }

    #[test]
    fn test_pipeline_stages() {
        let documents = vec![
            doc! { "name": "a", "cash": 3 },
            doc! { "name": "b", "cash": 1 },
            doc! { "name": "c", "cash": 2 },
        ];

        let result = run_pipeline(
            documents.clone(),
            &[
                doc! { "$match": { "cash": { "$gte": 2 } } },
                doc! { "$sort": { "cash": 1 } },
                doc! { "$project": { "name": 1, "_id": 0 } },
            ],
        )
        .unwrap();
        assert_eq!(result, vec![doc! { "name": "c" }, doc! { "name": "a" }]);

        let counted = run_pipeline(documents, &[doc! { "$count": "total" }]).unwrap();
        assert_eq!(counted, vec![doc! { "total": 3 }]);
    }

    #[test]
    fn test_sort_orders_mixed_types_by_bson_type() {
        let oid = ObjectId::new();
        let mut documents = vec![
            doc! { "n": 1, "v": true },
            doc! { "n": 2, "v": "b" },
            doc! { "n": 3 },
            doc! { "n": 4, "v": 2.5 },
            doc! { "n": 5, "v": oid },
            doc! { "n": 6, "v": [1, 2] },
            doc! { "n": 7, "v": { "a": 1 } },
            doc! { "n": 8, "v": null },
            doc! { "n": 9, "v": f64::NAN },
            doc! { "n": 10, "v": "a" },
            doc! { "n": 11, "v": DateTime::from_millis(0) },
            doc! { "n": 12, "v": -1 },
        ];

        sort_documents(&mut documents, &doc! { "v": 1 });
        let order = documents
            .iter()
            .map(|d| d.get_i32("n").unwrap())
            .collect::<Vec<_>>();

        // missing and null tie, so the stable sort keeps their insertion order
        assert_eq!(order, vec![3, 8, 9, 12, 4, 10, 2, 7, 6, 5, 1, 11]);

        sort_documents(&mut documents, &doc! { "v": -1 });
        assert_eq!(documents[0].get_i32("n").unwrap(), 11);
        assert_eq!(documents[11].get_i32("n").unwrap(), 8);
    }

    #[test]
    fn test_sort_applies_keys_in_order() {
        let mut documents = vec![
            doc! { "job": "police", "cash": 1 },
            doc! { "job": "ems", "cash": 1 },
            doc! { "job": "police", "cash": 3 },
            doc! { "job": "ems", "cash": 2 },
        ];

        sort_documents(&mut documents, &doc! { "job": 1, "cash": -1 });
        assert_eq!(
            documents,
            vec![
                doc! { "job": "ems", "cash": 2 },
                doc! { "job": "ems", "cash": 1 },
                doc! { "job": "police", "cash": 3 },
                doc! { "job": "police", "cash": 1 },
            ]
        );
    }

    #[test]
    fn test_comparison_operators_stay_within_type() {
        let player = doc! { "cash": "lots" };
        assert!(!matches(&player, doc! { "cash": { "$gt": 5 } }));
        assert!(!matches(&player, doc! { "cash": { "$lt": 5 } }));
        assert!(matches(&player, doc! { "cash": { "$gt": "a" } }));
    }

    #[test]
    fn test_seed_from_filter() {
        let seed = seed_from_filter(&doc! {
            "identifier": "steam:1",
            "cash": { "$gt": 5 },
            "job": { "$eq": "police" },
            "$or": [{ "a": 1 }],
        });
        assert_eq!(seed, doc! { "identifier": "steam:1", "job": "police" });
    }
}
