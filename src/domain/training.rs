// ============================================================
// Layer 3 — Training Data Types
// ============================================================
// What a padded instance exports for the training loop:
//
//   TrainingExample
//     ├── inputs: Vec<IntArray>   one dense array per input "slot"
//     │                           (sentence → 1 slot,
//     │                            logical form → words + transitions,
//     │                            background → words + background)
//     └── label:  Vec<f32>        one-hot
//
// IntArray is a row-major array with an explicit shape. Question
// instances stack the arrays of their options along a new leading
// axis, so a question of 4 sentence options padded to length 10
// exports a single [4, 10] array.

use serde::{Deserialize, Serialize};

use crate::domain::error::{DataError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntArray {
    pub shape: Vec<usize>,
    pub data:  Vec<u32>,
}

impl IntArray {
    /// A rank-1 array holding `values`.
    pub fn from_vec(values: Vec<u32>) -> Self {
        Self { shape: vec![values.len()], data: values }
    }

    /// A rank-2 array from rows that must all have `width` entries.
    pub fn from_rows(rows: &[Vec<u32>], width: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(DataError::shape(format!(
                    "row {i} has {} entries, expected {width}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { shape: vec![rows.len(), width], data })
    }

    /// Stack equally shaped arrays along a new leading axis.
    pub fn stack(arrays: &[IntArray]) -> Result<Self> {
        let Some(first) = arrays.first() else {
            return Ok(Self { shape: vec![0], data: Vec::new() });
        };
        let mut data = Vec::with_capacity(first.data.len() * arrays.len());
        for (i, array) in arrays.iter().enumerate() {
            if array.shape != first.shape {
                return Err(DataError::shape(format!(
                    "array {i} has shape {:?}, expected {:?}",
                    array.shape, first.shape
                )));
            }
            data.extend_from_slice(&array.data);
        }
        let mut shape = Vec::with_capacity(first.shape.len() + 1);
        shape.push(arrays.len());
        shape.extend_from_slice(&first.shape);
        Ok(Self { shape, data })
    }
}

/// One exported instance: input arrays plus a one-hot label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub inputs: Vec<IntArray>,
    pub label:  Vec<f32>,
}

/// A one-hot vector of `size` entries with a 1 at `hot`.
pub fn one_hot(size: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; size];
    if let Some(slot) = v.get_mut(hot) {
        *slot = 1.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec![1, 2], vec![3]];
        assert!(IntArray::from_rows(&rows, 2).is_err());
    }

    #[test]
    fn test_from_rows_with_no_rows_keeps_width() {
        let array = IntArray::from_rows(&[], 5).unwrap();
        assert_eq!(array.shape, vec![0, 5]);
        assert!(array.data.is_empty());
    }

    #[test]
    fn test_stack_adds_leading_axis() {
        let a = IntArray::from_vec(vec![1, 2, 3]);
        let b = IntArray::from_vec(vec![4, 5, 6]);
        let stacked = IntArray::stack(&[a, b]).unwrap();
        assert_eq!(stacked.shape, vec![2, 3]);
        assert_eq!(stacked.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_stack_rejects_mismatched_shapes() {
        let a = IntArray::from_vec(vec![1, 2, 3]);
        let b = IntArray::from_vec(vec![4, 5]);
        assert!(matches!(IntArray::stack(&[a, b]), Err(DataError::ShapeMismatch(_))));
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(2, 1), vec![0.0, 1.0]);
        assert_eq!(one_hot(4, 0), vec![1.0, 0.0, 0.0, 0.0]);
    }
}
