//! Variable resolution
//!
//! Turns a source record into a flat map of display strings and checkbox
//! flags, substitutes `{{key}}` placeholders, and decides whether a
//! conditionally bound element should be drawn.

use crate::template::{Element, VariableDef};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern"));

/// Id prefix of the legacy checkbox convention: `checkbox-<key>-<value>`
const CHECKBOX_ID_PREFIX: &str = "checkbox-";

/// A resolved variable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Flag(bool),
    Text(String),
}

impl VariableValue {
    pub fn text(value: impl Into<String>) -> Self {
        VariableValue::Text(value.into())
    }

    pub fn is_true(&self) -> bool {
        matches!(self, VariableValue::Flag(true))
    }

    pub fn as_display(&self) -> String {
        match self {
            VariableValue::Flag(b) => b.to_string(),
            VariableValue::Text(s) => s.clone(),
        }
    }
}

/// Flat key → value map consumed by the renderer
pub type VariableMap = BTreeMap<String, VariableValue>;

/// Raw source data, e.g. one customer/class row
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Keys of every `{{key}}` placeholder in `content`, in order of appearance
pub fn placeholder_keys(content: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace every known `{{key}}` token. Unknown tokens are left in place
/// so the editor can show them unresolved.
pub fn substitute(content: &str, vars: &VariableMap) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.as_display(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Composite flag key for one checkbox option: `courseTime` + `4 hr` →
/// `courseTime4hr`
pub fn option_key(group_key: &str, option: &str) -> String {
    let mut key = group_key.to_string();
    key.extend(option.chars().filter(|c| !c.is_whitespace()));
    key
}

/// Flags for a one-of-N checkbox group. The option equal to `source` is
/// true, every other option false; an unset source leaves all false.
pub fn derive_checkbox_flags(
    group_key: &str,
    options: &[String],
    source: Option<&str>,
) -> Vec<(String, bool)> {
    options
        .iter()
        .map(|option| {
            let checked = source.is_some_and(|s| s == option);
            (option_key(group_key, option), checked)
        })
        .collect()
}

/// `firstName` → `first_name`
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// ISO dates (`2024-03-02`, optionally with a time suffix) print as
/// `03/02/2024`; everything else passes through.
fn format_display(value: &str) -> String {
    value
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .filter(|_| value.len() == 10 || value[10..].starts_with('T') || value[10..].starts_with(' '))
        .map(|date| date.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

fn value_as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(format_display(s)),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolves records against a template's variable catalog
#[derive(Debug, Clone)]
pub struct VariableResolver {
    catalog: Vec<VariableDef>,
}

impl VariableResolver {
    pub fn new(catalog: &[VariableDef]) -> Self {
        Self {
            catalog: catalog.to_vec(),
        }
    }

    /// Every composite flag key the catalog can produce
    pub fn flag_keys(&self) -> BTreeSet<String> {
        self.catalog
            .iter()
            .filter_map(|def| def.options.as_ref().map(|opts| (def, opts)))
            .flat_map(|(def, opts)| opts.iter().map(|o| option_key(&def.key, o)))
            .collect()
    }

    fn lookup<'r>(&self, record: &'r Record, key: &str) -> Option<&'r serde_json::Value> {
        record
            .get(key)
            .or_else(|| record.get(&snake_case(key)))
            .filter(|v| !v.is_null())
    }

    /// Build the variable map for one record.
    ///
    /// Fields are looked up by key, then by the snake_case form of the key.
    /// Option groups additionally produce one flag per option.
    pub fn resolve(&self, record: &Record) -> VariableMap {
        let mut vars = VariableMap::new();
        for def in &self.catalog {
            let raw = self.lookup(record, &def.key);
            match raw {
                Some(serde_json::Value::Bool(b)) if def.options.is_none() => {
                    vars.insert(def.key.clone(), VariableValue::Flag(*b));
                }
                Some(value) => {
                    if let Some(text) = value_as_text(value) {
                        vars.insert(def.key.clone(), VariableValue::Text(text));
                    }
                }
                None => log::debug!("Record has no value for '{}'", def.key),
            }

            if let Some(options) = &def.options {
                let source = match vars.get(&def.key) {
                    Some(VariableValue::Text(s)) => Some(s.as_str()),
                    _ => None,
                };
                for (key, checked) in derive_checkbox_flags(&def.key, options, source) {
                    vars.insert(key, VariableValue::Flag(checked));
                }
            }
        }
        vars
    }

    /// Example values from the catalog, for editor previews. Option groups
    /// check the option matching the example, or the first option.
    pub fn sample(&self) -> VariableMap {
        let mut vars = VariableMap::new();
        for def in &self.catalog {
            vars.insert(def.key.clone(), VariableValue::text(def.example.clone()));
            if let Some(options) = &def.options {
                let chosen = options
                    .iter()
                    .find(|o| **o == def.example)
                    .or_else(|| options.first())
                    .map(String::as_str);
                for (key, checked) in derive_checkbox_flags(&def.key, options, chosen) {
                    vars.insert(key, VariableValue::Flag(checked));
                }
            }
        }
        vars
    }
}

/// Decides visibility of conditionally bound elements
#[derive(Debug, Clone)]
pub struct VisibilityRules<'a> {
    vars: &'a VariableMap,
    known_flags: BTreeSet<String>,
}

impl<'a> VisibilityRules<'a> {
    pub fn new(resolver: &VariableResolver, vars: &'a VariableMap) -> Self {
        let mut known_flags = resolver.flag_keys();
        known_flags.extend(
            vars.iter()
                .filter(|(_, v)| matches!(v, VariableValue::Flag(_)))
                .map(|(k, _)| k.clone()),
        );
        Self { vars, known_flags }
    }

    /// The flag key an element is bound to, if any.
    ///
    /// An explicit `binding` wins. Otherwise an id of the form
    /// `checkbox-<key>-...` binds to `<key>` when `<key>` is a known flag.
    /// Otherwise the longest known
    /// flag key contained in the id is used, so `courseTime4hrExtended`
    /// never matches `courseTime4hr`.
    pub fn binding_for(&self, element: &Element<'_>) -> Option<String> {
        if let Some(explicit) = element.binding() {
            return Some(explicit.to_string());
        }
        let id = element.id();
        if let Some(rest) = id.strip_prefix(CHECKBOX_ID_PREFIX) {
            let key = rest.split('-').next().unwrap_or(rest);
            if self.known_flags.contains(key) {
                return Some(key.to_string());
            }
        }
        self.known_flags
            .iter()
            .filter(|key| id.contains(key.as_str()))
            .max_by_key(|key| key.len())
            .cloned()
    }

    /// Unbound elements are always drawn; bound ones only when their flag
    /// is true.
    pub fn is_visible(&self, element: &Element<'_>) -> bool {
        match self.binding_for(element) {
            Some(key) => self.vars.get(&key).is_some_and(VariableValue::is_true),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ShapeElement;

    fn course_time() -> VariableDef {
        VariableDef::new("courseTime", "Course Time", "4 hr").with_options(&["4 hr", "6 hr", "8 hr"])
    }

    #[test]
    fn test_substitute_known_and_unknown() {
        let mut vars = VariableMap::new();
        vars.insert("studentName".into(), VariableValue::text("JOHN DOE"));
        assert_eq!(substitute("{{studentName}}", &vars), "JOHN DOE");
        assert_eq!(
            substitute("Hello {{firstName}}", &vars),
            "Hello {{firstName}}"
        );
        assert_eq!(substitute("{{studentName}}", &VariableMap::new()), "{{studentName}}");
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let mut vars = VariableMap::new();
        vars.insert("a".into(), VariableValue::text("x"));
        assert_eq!(substitute("{{a}}-{{a}}-{{b}}", &vars), "x-x-{{b}}");
    }

    #[test]
    fn test_substitute_is_deterministic() {
        let mut vars = VariableMap::new();
        vars.insert("name".into(), VariableValue::text("Ann"));
        let content = "Dear {{name}}, {{missing}}";
        assert_eq!(substitute(content, &vars), substitute(content, &vars));
    }

    #[test]
    fn test_checkbox_group_exclusive() {
        let def = course_time();
        let options = def.options.clone().unwrap();
        let flags = derive_checkbox_flags("courseTime", &options, Some("6 hr"));
        assert_eq!(flags.iter().filter(|(_, v)| *v).count(), 1);
        assert!(flags.contains(&("courseTime6hr".to_string(), true)));

        let none = derive_checkbox_flags("courseTime", &options, None);
        assert!(none.iter().all(|(_, v)| !v));

        let unknown = derive_checkbox_flags("courseTime", &options, Some("5 hr"));
        assert!(unknown.iter().all(|(_, v)| !v));
    }

    #[test]
    fn test_resolve_snake_case_fields_and_dates() {
        let resolver = VariableResolver::new(&[
            VariableDef::new("firstName", "First", ""),
            VariableDef::new("courseDate", "Date", ""),
            course_time(),
        ]);
        let record: Record = serde_json::from_str(
            r#"{"first_name": "Maria", "course_date": "2024-03-02", "courseTime": "8 hr"}"#,
        )
        .unwrap();
        let vars = resolver.resolve(&record);
        assert_eq!(vars["firstName"], VariableValue::text("Maria"));
        assert_eq!(vars["courseDate"], VariableValue::text("03/02/2024"));
        assert_eq!(vars["courseTime8hr"], VariableValue::Flag(true));
        assert_eq!(vars["courseTime4hr"], VariableValue::Flag(false));
    }

    #[test]
    fn test_format_display_leaves_non_dates() {
        assert_eq!(format_display("2024-13-40"), "2024-13-40");
        assert_eq!(format_display("2024-03-02T10:00:00Z"), "03/02/2024");
        assert_eq!(format_display("2024-03-02abc"), "2024-03-02abc");
        assert_eq!(format_display("D1234"), "D1234");
    }

    #[test]
    fn test_checkbox_visibility() {
        let resolver = VariableResolver::new(&[course_time()]);
        let shape = ShapeElement::line("checkbox-courseTime4hr-true", 0.0, 0.0, 1.0, 1.0);

        let mut vars = VariableMap::new();
        vars.insert("courseTime4hr".into(), VariableValue::Flag(true));
        assert!(VisibilityRules::new(&resolver, &vars).is_visible(&Element::Shape(&shape)));

        vars.insert("courseTime4hr".into(), VariableValue::Flag(false));
        assert!(!VisibilityRules::new(&resolver, &vars).is_visible(&Element::Shape(&shape)));

        let empty = VariableMap::new();
        assert!(!VisibilityRules::new(&resolver, &empty).is_visible(&Element::Shape(&shape)));
    }

    #[test]
    fn test_checkbox_prefix_needs_known_flag() {
        let resolver = VariableResolver::new(&[course_time()]);
        let outline = ShapeElement::rectangle("checkbox-outline", 0.0, 0.0, 12.0, 12.0);
        let mut vars = VariableMap::new();
        vars.insert("courseTime4hr".into(), VariableValue::Flag(true));
        let rules = VisibilityRules::new(&resolver, &vars);
        assert_eq!(rules.binding_for(&Element::Shape(&outline)), None);
        assert!(rules.is_visible(&Element::Shape(&outline)));
    }

    #[test]
    fn test_longest_flag_key_wins() {
        let resolver = VariableResolver::new(&[VariableDef::new("courseTime", "", "")
            .with_options(&["4hr", "4hrExtended"])]);
        let shape = ShapeElement::rectangle("mark_courseTime4hrExtended", 0.0, 0.0, 1.0, 1.0);
        let mut vars = VariableMap::new();
        vars.insert("courseTime4hr".into(), VariableValue::Flag(true));
        vars.insert("courseTime4hrExtended".into(), VariableValue::Flag(false));
        let rules = VisibilityRules::new(&resolver, &vars);
        assert_eq!(
            rules.binding_for(&Element::Shape(&shape)).as_deref(),
            Some("courseTime4hrExtended")
        );
        assert!(!rules.is_visible(&Element::Shape(&shape)));
    }

    #[test]
    fn test_explicit_binding_and_unbound() {
        let resolver = VariableResolver::new(&[]);
        let mut bound = ShapeElement::circle("dot", 0.0, 0.0, 2.0);
        bound.binding = Some("isHonors".to_string());
        let plain = ShapeElement::circle("border", 0.0, 0.0, 2.0);

        let mut vars = VariableMap::new();
        vars.insert("isHonors".into(), VariableValue::Flag(true));
        let rules = VisibilityRules::new(&resolver, &vars);
        assert!(rules.is_visible(&Element::Shape(&bound)));
        assert!(rules.is_visible(&Element::Shape(&plain)));
    }
}
