use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("weight buffer holds {actual} values but {rows}x{cols} needs {expected}")]
    WeightLength {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },
    #[error("bias length {actual} does not match {expected} output rows")]
    BiasLength { expected: usize, actual: usize },
    #[error("input length {actual} does not match layer input width {expected}")]
    InputLength { expected: usize, actual: usize },
    #[error("layer must have at least one row and one column")]
    Empty,
}

/// Affine layer `y = W·x + b` with `W` stored row-major as `out × in`.
///
/// Each row holds the weights for one output unit, matching the layout of a
/// PyTorch `nn.Linear` weight tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl DenseLayer {
    pub fn new(
        input_size: usize,
        output_size: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self, DimensionError> {
        if input_size == 0 || output_size == 0 {
            return Err(DimensionError::Empty);
        }
        let expected = input_size * output_size;
        if weights.len() != expected {
            return Err(DimensionError::WeightLength {
                rows: output_size,
                cols: input_size,
                expected,
                actual: weights.len(),
            });
        }
        if biases.len() != output_size {
            return Err(DimensionError::BiasLength {
                expected: output_size,
                actual: biases.len(),
            });
        }
        Ok(Self {
            input_size,
            output_size,
            weights,
            biases,
        })
    }

    /// All-zero layer; the output equals `biases`.
    pub fn zeros(input_size: usize, output_size: usize) -> Result<Self, DimensionError> {
        Self::new(
            input_size,
            output_size,
            vec![0.0; input_size * output_size],
            vec![0.0; output_size],
        )
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Computes `output[j] = sum_i(input[i] * W[j][i]) + b[j]`.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, DimensionError> {
        if input.len() != self.input_size {
            return Err(DimensionError::InputLength {
                expected: self.input_size,
                actual: input.len(),
            });
        }

        let output = self
            .weights
            .chunks_exact(self.input_size)
            .zip(&self.biases)
            .map(|(row, bias)| {
                row.iter()
                    .zip(input)
                    .fold(*bias, |sum, (weight, value)| sum + weight * value)
            })
            .collect();
        Ok(output)
    }
}

/// ReLU activation: f(x) = max(0, x)
pub fn relu_in_place(values: &mut [f32]) {
    for val in values.iter_mut() {
        if *val < 0.0 {
            *val = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_activation_works() {
        let mut x = [-1.0, 0.0, 1.0, -5.0, 10.0];
        relu_in_place(&mut x);
        assert_eq!(x, [0.0, 0.0, 1.0, 0.0, 10.0]);
    }

    #[test]
    fn forward_computes_affine_map() {
        let layer = DenseLayer::new(
            2,
            3,
            vec![
                1.0, 0.0, // row 0
                0.0, 1.0, // row 1
                2.0, -1.0, // row 2
            ],
            vec![0.5, 0.5, 0.0],
        )
        .unwrap();

        let output = layer.forward(&[1.0, 2.0]).unwrap();
        assert_eq!(output, vec![1.5, 2.5, 0.0]);
    }

    #[test]
    fn mismatched_input_is_rejected() {
        let layer = DenseLayer::zeros(4, 2).unwrap();
        assert_eq!(
            layer.forward(&[1.0, 2.0, 3.0]),
            Err(DimensionError::InputLength {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn construction_validates_shapes() {
        assert!(matches!(
            DenseLayer::new(3, 2, vec![0.0; 5], vec![0.0; 2]),
            Err(DimensionError::WeightLength { expected: 6, .. })
        ));
        assert!(matches!(
            DenseLayer::new(3, 2, vec![0.0; 6], vec![0.0; 3]),
            Err(DimensionError::BiasLength { expected: 2, .. })
        ));
        assert_eq!(
            DenseLayer::new(0, 2, vec![], vec![0.0; 2]),
            Err(DimensionError::Empty)
        );
    }

    #[test]
    fn zero_layer_returns_biases() {
        let mut layer = DenseLayer::zeros(3, 2).unwrap();
        layer.biases_mut().copy_from_slice(&[0.25, -0.75]);
        assert_eq!(layer.forward(&[9.0, 9.0, 9.0]).unwrap(), vec![0.25, -0.75]);
    }
}
