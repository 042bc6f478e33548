use crate::guest::{ElementType, ElementTypeConstraint};

/// Everything a runtime needs to know about a proc-block before using it.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub homepage: Option<String>,
    pub tags: Vec<String>,
    pub arguments: Vec<ArgumentMetadata>,
    pub inputs: Vec<TensorMetadata>,
    pub outputs: Vec<TensorMetadata>,
}

impl Metadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Metadata {
            name: name.into(),
            version: version.into(),
            description: None,
            repository: None,
            homepage: None,
            tags: Vec::new(),
            arguments: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description);
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = non_empty(repository);
        self
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = non_empty(homepage);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_argument(mut self, arg: ArgumentMetadata) -> Self {
        self.arguments.push(arg);
        self
    }

    pub fn with_input(mut self, input: TensorMetadata) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: TensorMetadata) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentMetadata> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// A named string value used to configure a proc-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub value: String,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Argument {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentMetadata {
    pub name: String,
    pub description: Option<String>,
    pub default_value: Option<String>,
    pub hints: Vec<ArgumentHint>,
}

impl ArgumentMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        ArgumentMetadata {
            name: name.into(),
            description: None,
            default_value: None,
            hints: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description);
        self
    }

    pub fn with_default_value(mut self, default_value: impl ToString) -> Self {
        self.default_value = non_empty(default_value.to_string());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<ArgumentHint>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentHint {
    NonNegativeNumber,
    OneOf(Vec<String>),
    ArgumentType(ArgumentType),
}

impl ArgumentHint {
    pub fn one_of(items: impl IntoIterator<Item = impl ToString>) -> Self {
        ArgumentHint::OneOf(items.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<ArgumentType> for ArgumentHint {
    fn from(a: ArgumentType) -> Self { ArgumentHint::ArgumentType(a) }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArgumentType {
    Boolean,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TensorMetadata {
    pub name: String,
    pub description: Option<String>,
    pub hints: Vec<TensorHint>,
}

impl TensorMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        TensorMetadata {
            name: name.into(),
            description: None,
            hints: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description);
        self
    }

    pub fn with_hint(mut self, hint: TensorHint) -> Self {
        self.hints.push(hint);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TensorHint {
    SupportedShape {
        accepted_element_types: Vec<ElementType>,
        dimensions: Dimensions,
    },
}

impl TensorHint {
    pub fn supported_shape(
        accepted_element_types: &[ElementType],
        dimensions: impl Into<Dimensions>,
    ) -> Self {
        TensorHint::SupportedShape {
            accepted_element_types: accepted_element_types.to_vec(),
            dimensions: dimensions.into(),
        }
    }
}

/// The shape of a tensor.
///
/// A `0` in a fixed shape means that dimension may have any length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions(pub Vec<u32>);

impl Dimensions {
    /// Does a concrete shape satisfy these dimensions?
    pub fn accepts(&self, shape: &[u32]) -> bool {
        let Dimensions(expected) = self;

        expected.len() == shape.len()
            && expected
                .iter()
                .zip(shape)
                .all(|(&e, &actual)| e == 0 || e == actual)
    }
}

impl From<Vec<u32>> for Dimensions {
    fn from(fixed: Vec<u32>) -> Self { Dimensions(fixed) }
}

impl<const N: usize> From<[u32; N]> for Dimensions {
    fn from(fixed: [u32; N]) -> Self { Dimensions(fixed.to_vec()) }
}

/// The tensors a proc-block node will accept and produce.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorConstraints {
    pub inputs: Vec<TensorConstraint>,
    pub outputs: Vec<TensorConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TensorConstraint {
    pub name: String,
    pub element_type: ElementTypeConstraint,
    pub dimensions: Dimensions,
}

impl TensorConstraint {
    pub fn new(
        name: impl Into<String>,
        element_type: impl Into<ElementTypeConstraint>,
        dimensions: impl Into<Dimensions>,
    ) -> Self {
        TensorConstraint {
            name: name.into(),
            element_type: element_type.into(),
            dimensions: dimensions.into(),
        }
    }
}

fn non_empty(s: impl Into<String>) -> Option<String> {
    let s = s.into();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_ignored() {
        let meta = Metadata::new("Thing", "1.0.0")
            .with_description("")
            .with_homepage("https://example.com");

        assert_eq!(meta.description, None);
        assert_eq!(meta.homepage.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn zero_means_any_length() {
        let dims = Dimensions::from([0, 7]);

        assert!(dims.accepts(&[3, 7]));
        assert!(dims.accepts(&[1, 7]));
        assert!(!dims.accepts(&[3, 8]));
        assert!(!dims.accepts(&[7]));
    }
}
