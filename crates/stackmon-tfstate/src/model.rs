//! Terraform state document model.
//!
//! Only the attributes the parser reads are modelled. Every attribute is
//! deserialized leniently: a field holding an unexpected JSON shape becomes
//! its default instead of failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, deserialize_with = "lenient")]
    pub terraform_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resource {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Instance {
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attributes {
    /// DNS record type on DNS resources (`CNAME`, `A`, ...).
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default, deserialize_with = "lenient")]
    pub vars: Option<Vars>,
    #[serde(default, deserialize_with = "lenient")]
    pub answers: Vec<Answer>,
    #[serde(default, deserialize_with = "lenient")]
    pub cidr_blocks: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vars {
    #[serde(default, deserialize_with = "lenient")]
    pub domain_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "lenient")]
    pub answer: Option<String>,
}

impl Attributes {
    pub fn is_cname(&self) -> bool {
        self.record_type.as_deref() == Some("CNAME")
    }

    /// Non-empty `vars.domain_name`.
    pub fn base_domain(&self) -> Option<&str> {
        self.vars
            .as_ref()
            .and_then(|v| v.domain_name.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Non-empty CNAME answers in document order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.answers
            .iter()
            .filter_map(|a| a.answer.as_deref())
            .filter(|a| !a.is_empty())
    }
}

/// The `tags` attribute, which providers emit as an object, an array, or
/// not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TagSet {
    #[default]
    Absent,
    Object(TagFields),
    /// Array-shaped tags carry nothing stackmon reads.
    Array(Vec<Value>),
    /// Any other JSON value, kept for diagnostics.
    Unexpected(Value),
}

/// The tag keys stackmon cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub role: Option<String>,
    pub search_head: Option<String>,
    pub stack: Option<String>,
}

impl TagSet {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => TagSet::Absent,
            Value::Object(map) => TagSet::Object(TagFields::from_map(&map)),
            Value::Array(items) => TagSet::Array(items),
            other => TagSet::Unexpected(other),
        }
    }

    /// Structured fields, if the tags were an object.
    pub fn fields(&self) -> Option<&TagFields> {
        match self {
            TagSet::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

impl TagFields {
    fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            role: text("Role"),
            search_head: text("SearchHead"),
            stack: text("Stack"),
        }
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TagSet::from_value)
    }
}

/// Deserialize `T`, falling back to `T::default()` on a shape mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(value: Value) -> Attributes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn tags_as_object() {
        let attrs = attributes(json!({
            "tags": { "Role": "search-head", "SearchHead": "sh1", "Stack": "mystack", "Owner": "x" }
        }));
        let fields = attrs.tags.fields().unwrap();
        assert_eq!(fields.role.as_deref(), Some("search-head"));
        assert_eq!(fields.search_head.as_deref(), Some("sh1"));
        assert_eq!(fields.stack.as_deref(), Some("mystack"));
    }

    #[test]
    fn tags_as_array_are_kept_but_unstructured() {
        let attrs = attributes(json!({ "tags": [{ "key": "Role", "value": "search-head" }] }));
        assert!(matches!(attrs.tags, TagSet::Array(ref items) if items.len() == 1));
        assert!(attrs.tags.fields().is_none());
    }

    #[test]
    fn tags_absent_or_null() {
        assert_eq!(attributes(json!({})).tags, TagSet::Absent);
        assert_eq!(attributes(json!({ "tags": null })).tags, TagSet::Absent);
    }

    #[test]
    fn tags_unexpected_shape() {
        let attrs = attributes(json!({ "tags": "Role=search-head" }));
        assert_eq!(attrs.tags, TagSet::Unexpected(json!("Role=search-head")));
        assert!(attrs.tags.fields().is_none());
    }

    #[test]
    fn non_string_tag_values_ignored() {
        let attrs = attributes(json!({ "tags": { "Role": 7, "Stack": "s" } }));
        let fields = attrs.tags.fields().unwrap();
        assert_eq!(fields.role, None);
        assert_eq!(fields.stack.as_deref(), Some("s"));
    }

    #[test]
    fn mistyped_fields_become_defaults() {
        let attrs = attributes(json!({
            "type": 12,
            "domain": ["x"],
            "answers": null,
            "cidr_blocks": "0.0.0.0/0",
            "vars": "nope"
        }));
        assert_eq!(attrs.record_type, None);
        assert_eq!(attrs.domain, None);
        assert!(attrs.answers.is_empty());
        assert!(attrs.cidr_blocks.is_empty());
        assert_eq!(attrs.base_domain(), None);
    }

    #[test]
    fn cname_aliases_in_order() {
        let attrs = attributes(json!({
            "type": "CNAME",
            "domain": "foo-mystack.companycloud.com",
            "answers": [{ "answer": "sh1.internal" }, { "answer": "" }, { "answer": "sh2.internal" }]
        }));
        assert!(attrs.is_cname());
        assert_eq!(attrs.aliases().collect::<Vec<_>>(), vec!["sh1.internal", "sh2.internal"]);
    }

    #[test]
    fn document_without_resources_key() {
        let doc: StateDocument = serde_json::from_str(r#"{"version": 4}"#).unwrap();
        assert!(doc.resources.is_empty());
    }
}
