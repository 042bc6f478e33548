use ndarray::{
    ArrayBase, ArrayD, ArrayView, Data, Dim, Dimension,
    IntoDimension,
};

use crate::{
    guest::{
        ElementType, InvalidInput, PrimitiveTensorElement, RunError,
        TensorConstraint,
    },
    StringBuilder,
};

/// A named, row-major tensor.
///
/// Numeric elements are stored as their native-endian bytes, while
/// [`ElementType::Utf8`] tensors use the [`StringBuilder`] encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub name: String,
    pub element_type: ElementType,
    pub dimensions: Vec<u32>,
    pub buffer: Vec<u8>,
}

impl Tensor {
    /// Copy an array into a new tensor.
    ///
    /// # Panics
    ///
    /// Every dimension must fit in a `u32`.
    pub fn new<T, S, D>(name: impl Into<String>, array: &ArrayBase<S, D>) -> Self
    where
        T: PrimitiveTensorElement,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let buffer: Vec<u8> = match array.as_slice() {
            Some(contiguous) => bytemuck::cast_slice::<T, u8>(contiguous).to_vec(),
            None => array
                .iter()
                .flat_map(|element| bytemuck::bytes_of(element).iter().copied())
                .collect(),
        };

        Tensor {
            name: name.into(),
            element_type: T::ELEMENT_TYPE,
            dimensions: shape_of(array),
            buffer,
        }
    }

    pub fn new_1d<T>(name: impl Into<String>, elements: &[T]) -> Self
    where
        T: PrimitiveTensorElement,
    {
        Tensor::new(name, &ndarray::aview1(elements))
    }

    /// Serialize a string tensor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hotg_rune_proc_blocks::guest::Tensor;
    /// let strings = ndarray::arr2(&[
    ///     ["this", "is", "a", "sentence"],
    ///     ["and", "this", "is", "another"],
    /// ]);
    ///
    /// let tensor = Tensor::from_strings("tensor", &strings);
    ///
    /// let deserialized = tensor.string_view()?;
    /// assert_eq!(deserialized, strings.into_dyn());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_strings<S, A, D>(
        name: impl Into<String>,
        array: &ArrayBase<A, D>,
    ) -> Self
    where
        D: Dimension,
        A: Data<Elem = S>,
        S: AsRef<str>,
    {
        let mut builder = StringBuilder::new();
        builder.extend(array.iter().map(|s| s.as_ref()));

        Tensor {
            name: name.into(),
            element_type: ElementType::Utf8,
            dimensions: shape_of(array),
            buffer: builder.finish(),
        }
    }

    pub fn from_strings_1d<S: AsRef<str>>(
        name: impl Into<String>,
        strings: &[S],
    ) -> Self {
        Tensor::from_strings(name, &ndarray::aview1(strings))
    }

    pub fn get_named<'t>(
        tensors: &'t [Tensor],
        name: &str,
    ) -> Result<&'t Self, RunError> {
        tensors
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| RunError::missing_input(name))
    }

    /// Check this tensor against the constraint a proc-block declared for it.
    pub fn check(&self, constraint: &TensorConstraint) -> Result<(), InvalidInput> {
        if !constraint.element_type.accepts(self.element_type) {
            return Err(InvalidInput::incompatible_element_type(&self.name));
        }
        if !constraint.dimensions.accepts(&self.dimensions) {
            return Err(InvalidInput::incompatible_dimensions(&self.name));
        }

        Ok(())
    }

    /// View the tensor with a fixed number of dimensions, adding or removing
    /// leading `1`s as necessary.
    pub fn view_with_dimensions<T, const N: usize>(
        &self,
    ) -> Result<ArrayView<'_, T, Dim<[usize; N]>>, InvalidInput>
    where
        T: PrimitiveTensorElement,
        [usize; N]: IntoDimension<Dim = Dim<[usize; N]>>,
        Dim<[usize; N]>: Dimension,
    {
        let shape: [usize; N] = self.as_nd_shape()?;
        let elements = self.elements()?;

        ArrayView::from_shape(shape, elements)
            .map_err(|e| InvalidInput::other(&self.name, e))
    }

    pub fn view_1d<T>(&self) -> Result<ndarray::ArrayView1<'_, T>, InvalidInput>
    where
        T: PrimitiveTensorElement,
    {
        self.view_with_dimensions()
    }

    pub fn view_2d<T>(&self) -> Result<ndarray::ArrayView2<'_, T>, InvalidInput>
    where
        T: PrimitiveTensorElement,
    {
        self.view_with_dimensions()
    }

    pub fn string_view(&self) -> Result<ArrayD<&str>, InvalidInput> {
        if self.element_type != ElementType::Utf8 {
            return Err(InvalidInput::incompatible_element_type(&self.name));
        }

        let strings = crate::decode_strings(&self.buffer)
            .map_err(|e| InvalidInput::invalid_value(&self.name, e))?;

        ArrayD::from_shape_vec(self.shape(), strings)
            .map_err(|e| InvalidInput::other(&self.name, e))
    }

    /// Read a string tensor as a flat list, ignoring leading `1`s in its
    /// shape.
    pub fn string_view_1d(&self) -> Result<Vec<&str>, InvalidInput> {
        let [_] = self.as_nd_shape::<1>()?;
        let strings = self.string_view()?;

        Ok(strings.iter().copied().collect())
    }

    fn elements<T>(&self) -> Result<&[T], InvalidInput>
    where
        T: PrimitiveTensorElement,
    {
        if self.element_type != T::ELEMENT_TYPE {
            return Err(InvalidInput::incompatible_element_type(&self.name));
        }

        // An empty Vec's pointer is only aligned for u8, so casting it to a
        // more strictly aligned T would fail.
        if self.buffer.is_empty() {
            return Ok(&[]);
        }

        bytemuck::try_cast_slice(&self.buffer)
            .map_err(|e| InvalidInput::other(&self.name, e))
    }

    fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|&d| d as usize).collect()
    }

    fn as_nd_shape<const N: usize>(&self) -> Result<[usize; N], InvalidInput> {
        let mut shape = [1; N];
        let mut remaining = N;

        for &dim in self.dimensions.iter().rev() {
            if dim == 1 {
                continue;
            }

            remaining = remaining.checked_sub(1).ok_or_else(|| {
                InvalidInput::incompatible_dimensions(&self.name)
            })?;
            shape[remaining] = dim as usize;
        }

        Ok(shape)
    }
}

fn shape_of<S, D>(array: &ArrayBase<S, D>) -> Vec<u32>
where
    S: Data,
    D: Dimension,
{
    array
        .shape()
        .iter()
        .map(|&d| {
            u32::try_from(d).expect("Tensor dimensions must fit in a u32")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::{ElementTypeConstraint, InvalidInputReason};

    #[test]
    fn viewing_with_dimensionality_can_strip_or_add_leading_1s() {
        let elements = ndarray::arr2(&[[0_i32, 5, 10, 3, -200]]);
        let tensor = Tensor::new("x", &elements);

        assert_eq!(tensor.view_1d::<i32>().unwrap().dim(), 5);
        assert_eq!(tensor.view_2d::<i32>().unwrap().dim(), (1, 5));
    }

    #[test]
    fn cant_view_2d_as_1d() {
        let elements = ndarray::arr2(&[[0_i32, 5], [10, -200]]);
        let tensor = Tensor::new("x", &elements);

        let err = tensor.view_1d::<i32>().unwrap_err();

        assert_eq!(err.reason, InvalidInputReason::IncompatibleDimensions);
    }

    #[test]
    fn non_contiguous_arrays_are_copied_in_logical_order() {
        let elements = ndarray::arr2(&[[1_i32, 2], [3, 4]]);
        let transposed = elements.t();

        let tensor = Tensor::new("x", &transposed);

        let view = tensor.view_2d::<i32>().unwrap();
        assert_eq!(view, ndarray::arr2(&[[1, 3], [2, 4]]));
    }

    #[test]
    fn wrong_element_type() {
        let tensor = Tensor::new_1d("x", &[1_u32, 2, 3]);

        let err = tensor.view_1d::<i32>().unwrap_err();

        assert_eq!(err.reason, InvalidInputReason::IncompatibleElementType);
    }

    #[test]
    fn empty_tensors_have_empty_views() {
        let empty: &[i32] = &[];
        let tensor = Tensor::new_1d("x", empty);

        assert_eq!(tensor.view_1d::<i32>().unwrap().len(), 0);
    }

    #[test]
    fn read_a_list_of_strings() {
        let tensor = Tensor::from_strings_1d("text", &["Hello", "World"]);

        let strings = tensor.string_view_1d().unwrap();

        assert_eq!(strings, vec!["Hello", "World"]);
        assert_eq!(tensor.dimensions, vec![2]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "Tensor dimensions must fit in a u32")]
    fn dimensions_larger_than_u32_are_rejected() {
        let too_wide = u32::MAX as usize + 1;
        let empty = ndarray::Array2::<i32>::zeros((0, too_wide));

        let _ = Tensor::new("x", &empty);
    }

    #[test]
    fn check_against_a_constraint() {
        let tensor = Tensor::from_strings_1d("text", &["a", "b"]);
        let strings = TensorConstraint::new(
            "text",
            ElementTypeConstraint::UTF8,
            vec![0],
        );
        let numbers = TensorConstraint::new(
            "text",
            !ElementTypeConstraint::UTF8,
            vec![0],
        );

        assert!(tensor.check(&strings).is_ok());
        assert_eq!(
            tensor.check(&numbers).unwrap_err().reason,
            InvalidInputReason::IncompatibleElementType
        );
    }
}
