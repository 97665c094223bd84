use crate::{
    error::{Error, RequiredError},
    field::{Record, value_at},
    walk::walk,
};

/// Checks a populated record against a set of rules
pub trait Validator {
    fn validate(&self, record: &dyn Record) -> Result<(), Error>;
}

/// Fails when a field carrying the marker tag still holds its zero value.
///
/// The marker defaults to `required = "true"`; another pair selects an
/// independent required-ness scheme on the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredValidator {
    pub tag_name: String,
    pub tag_value: String,
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new("required", "true")
    }
}

impl RequiredValidator {
    pub fn new(tag_name: impl Into<String>, tag_value: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            tag_value: tag_value.into(),
        }
    }

    /// Dotted paths of every marked field that is still zero, in walk order
    pub fn missing(&self, record: &dyn Record) -> Vec<String> {
        walk(record.schema())
            .filter(|leaf| leaf.def.tag(&self.tag_name) == Some(self.tag_value.as_str()))
            .filter(|leaf| value_at(record, &leaf.indices).is_some_and(|value| value.is_zero()))
            .map(|leaf| leaf.path())
            .collect()
    }

    pub fn check(&self, record: &dyn Record) -> Result<(), RequiredError> {
        let missing = self.missing(record);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RequiredError::new(missing))
        }
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, record: &dyn Record) -> Result<(), Error> {
        Ok(self.check(record)?)
    }
}

/// Runs every validator; required violations from all of them are merged
#[derive(Default)]
pub struct MultiValidator {
    validators: Vec<Box<dyn Validator>>,
}

impl MultiValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Validator for MultiValidator {
    fn validate(&self, record: &dyn Record) -> Result<(), Error> {
        let mut missing: Vec<String> = Vec::new();
        for validator in &self.validators {
            match validator.validate(record) {
                Ok(()) => {}
                Err(Error::Required(err)) => {
                    for path in err.fields {
                        if !missing.contains(&path) {
                            missing.push(path);
                        }
                    }
                }
                Err(other) => return Err(other),
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RequiredError::new(missing).into())
        }
    }
}
