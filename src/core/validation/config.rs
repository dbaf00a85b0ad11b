//! Declarative per-form validation configuration
//!
//! A `FormSchema` lists the fields a form accepts, in order, each with its
//! filters and validators. Fields not declared in the schema are ignored, so
//! client-supplied `id` or `date` values never reach a validated record.

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type FilterFn = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;
type ValidatorFn = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Field name -> ordered list of error messages
pub type FieldErrors = IndexMap<String, Vec<String>>;

#[derive(Default, Clone)]
struct FieldRules {
    filters: Vec<FilterFn>,
    validators: Vec<ValidatorFn>,
}

/// Validation configuration for one form
#[derive(Default, Clone)]
pub struct FormSchema {
    fields: IndexMap<&'static str, FieldRules>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with no rules yet
    pub fn field(mut self, name: &'static str) -> Self {
        self.fields.entry(name).or_default();
        self
    }

    /// Add a filter to a field (declaring it if needed)
    pub fn add_filter<F>(&mut self, field: &'static str, filter: F)
    where
        F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.fields
            .entry(field)
            .or_default()
            .filters
            .push(Arc::new(filter));
    }

    /// Add a validator to a field (declaring it if needed)
    pub fn add_validator<V>(&mut self, field: &'static str, validator: V)
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.fields
            .entry(field)
            .or_default()
            .validators
            .push(Arc::new(validator));
    }

    /// Declared field names, in order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Run filters then validators over a raw form submission
    ///
    /// Every field is checked, so the caller gets the complete error set in
    /// one pass. On success the filtered values are returned keyed by field.
    pub fn validate_and_filter(
        &self,
        form: &HashMap<String, String>,
    ) -> Result<IndexMap<&'static str, Value>, FieldErrors> {
        let mut values = IndexMap::with_capacity(self.fields.len());
        let mut errors = FieldErrors::new();

        for (&name, rules) in &self.fields {
            let mut value = form
                .get(name)
                .map(|raw| Value::String(raw.clone()))
                .unwrap_or(Value::Null);

            let mut messages = Vec::new();
            for filter in &rules.filters {
                match filter(name, value) {
                    Ok(filtered) => value = filtered,
                    Err(e) => {
                        messages.push(e.to_string());
                        value = Value::Null;
                        break;
                    }
                }
            }

            if messages.is_empty() {
                for validator in &rules.validators {
                    if let Err(message) = validator(name, &value) {
                        messages.push(message);
                    }
                }
            }

            if messages.is_empty() {
                values.insert(name, value);
            } else {
                errors.insert(name.to_string(), messages);
            }
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        }
    }
}
