use serde_json::Value;

/// Boolean predicate over a raw event payload.
///
/// Implementations must treat the payload as read-only. Plain closures
/// implement the trait, so an external path-query engine can be wired in
/// with a one-line adapter.
pub trait EventMatcher: Send + Sync {
    fn matches(&self, payload: &Value) -> bool;
}

impl<F> EventMatcher for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, payload: &Value) -> bool {
        self(payload)
    }
}

/// Built-in matcher: accepts a payload when any element of its `data`
/// array carries `field == value`.
///
/// This is the equality-filter shape the declarative predicate language is
/// required to support, expressed directly over the payload tree.
#[derive(Debug, Clone)]
pub struct DataFieldEquals {
    field: String,
    value: Value,
}

impl DataFieldEquals {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl EventMatcher for DataFieldEquals {
    fn matches(&self, payload: &Value) -> bool {
        payload
            .get("data")
            .and_then(Value::as_array)
            .is_some_and(|rows| {
                rows.iter()
                    .any(|row| row.get(&self.field) == Some(&self.value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_row_with_equal_field() {
        let matcher = DataFieldEquals::new("destinationTable", "Files");
        let payload = json!({"data": [
            {"destinationTable": "Transactions._id", "value": 1},
            {"destinationTable": "Files", "name": "a.txt"},
        ]});
        assert!(matcher.matches(&payload));
    }

    #[test]
    fn rejects_payload_without_matching_row() {
        let matcher = DataFieldEquals::new("destinationTable", "Files");
        assert!(!matcher.matches(&json!({"data": [{"destinationTable": "Other"}]})));
        assert!(!matcher.matches(&json!({"data": []})));
        assert!(!matcher.matches(&json!({})));
        assert!(!matcher.matches(&json!({"data": "not an array"})));
    }

    #[test]
    fn closures_are_matchers() {
        let matcher = |payload: &Value| payload.get("data").is_some();
        assert!(matcher.matches(&json!({"data": []})));
        assert!(!matcher.matches(&json!({})));
    }
}
