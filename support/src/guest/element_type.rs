use bytemuck::{AnyBitPattern, NoUninit};

/// The type of each element stored in a [`crate::guest::Tensor`].
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::EnumVariantNames,
    strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
    Complex64,
    Complex128,
    Utf8,
}

/// A primitive value that can be stored directly in a [`crate::guest::Tensor`].
pub trait PrimitiveTensorElement: AnyBitPattern + NoUninit {
    const ELEMENT_TYPE: ElementType;
}

macro_rules! primitive_elements {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PrimitiveTensorElement for $ty {
                const ELEMENT_TYPE: ElementType = ElementType::$variant;
            }
        )*
    };
}

primitive_elements! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    u64 => U64,
    i64 => I64,
    f64 => F64,
}

bitflags::bitflags! {
    /// The set of element types a proc-block will accept for a tensor.
    pub struct ElementTypeConstraint: u32 {
        const U8 = 1 << 0;
        const I8 = 1 << 1;
        const U16 = 1 << 2;
        const I16 = 1 << 3;
        const U32 = 1 << 4;
        const I32 = 1 << 5;
        const F32 = 1 << 6;
        const U64 = 1 << 7;
        const I64 = 1 << 8;
        const F64 = 1 << 9;
        const COMPLEX64 = 1 << 10;
        const COMPLEX128 = 1 << 11;
        const UTF8 = 1 << 12;
    }
}

impl ElementTypeConstraint {
    pub fn accepts(self, element_type: ElementType) -> bool {
        self.contains(ElementTypeConstraint::from(element_type))
    }
}

impl From<ElementType> for ElementTypeConstraint {
    fn from(e: ElementType) -> Self {
        match e {
            ElementType::U8 => ElementTypeConstraint::U8,
            ElementType::I8 => ElementTypeConstraint::I8,
            ElementType::U16 => ElementTypeConstraint::U16,
            ElementType::I16 => ElementTypeConstraint::I16,
            ElementType::U32 => ElementTypeConstraint::U32,
            ElementType::I32 => ElementTypeConstraint::I32,
            ElementType::F32 => ElementTypeConstraint::F32,
            ElementType::U64 => ElementTypeConstraint::U64,
            ElementType::I64 => ElementTypeConstraint::I64,
            ElementType::F64 => ElementTypeConstraint::F64,
            ElementType::Complex64 => ElementTypeConstraint::COMPLEX64,
            ElementType::Complex128 => ElementTypeConstraint::COMPLEX128,
            ElementType::Utf8 => ElementTypeConstraint::UTF8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_element_types() {
        assert_eq!("u8".parse::<ElementType>().unwrap(), ElementType::U8);
        assert_eq!("I32".parse::<ElementType>().unwrap(), ElementType::I32);
        assert_eq!("utf8".parse::<ElementType>().unwrap(), ElementType::Utf8);
        assert!("string".parse::<ElementType>().is_err());
        assert_eq!(ElementType::Complex64.to_string(), "complex64");
    }

    #[test]
    fn numeric_constraint_excludes_strings() {
        let numeric = !ElementTypeConstraint::UTF8;

        assert!(numeric.accepts(ElementType::I32));
        assert!(!numeric.accepts(ElementType::Utf8));
    }
}
