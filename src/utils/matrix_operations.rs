use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// Row-major matrix helpers over `[Vec<f32>]`, one inner `Vec` per row.
///
/// Every row is computed sequentially so results do not depend on how rayon
/// splits the work, only rows are spread across threads.
pub trait MatrixOperations {
    /// Matrix product `self . against`, `(m x k) . (k x n) -> (m x n)`.
    fn dot(&self, against: &[Vec<f32>]) -> Vec<Vec<f32>>;

    /// Adds `row` to every row of the matrix.
    fn add_row(&self, row: &[f32]) -> Vec<Vec<f32>>;

    fn subtract(&self, against: &[Vec<f32>]) -> Vec<Vec<f32>>;

    /// Element-wise (Hadamard) product.
    fn multiply_by_other(&self, against: &[Vec<f32>]) -> Vec<Vec<f32>>;

    fn multiply(&self, by: f32) -> Vec<Vec<f32>>;

    fn divide(&self, by: f32) -> Vec<Vec<f32>>;

    fn map_values<F>(&self, function: F) -> Vec<Vec<f32>>
    where
        F: Fn(f32) -> f32 + Sync + Send;

    /// Sums every column, giving a row of `get_width()` values.
    fn column_sums(&self) -> Vec<f32>;

    fn transpose(&self) -> Vec<Vec<f32>>;

    fn get_width(&self) -> usize;

    fn get_height(&self) -> usize;

    /// Whether every value in the matrix is finite.
    fn is_finite(&self) -> bool;
}

impl MatrixOperations for [Vec<f32>] {
    fn dot(&self, against: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let width = against.get_width();
        assert_eq!(self.get_width(), against.get_height());

        self.par_iter()
            .map(|row| {
                let mut result = vec![0.0_f32; width];
                for (value, against_row) in row.iter().zip(against) {
                    for (col, against_value) in against_row.iter().enumerate() {
                        result[col] += value * against_value;
                    }
                }
                result
            })
            .collect()
    }

    fn add_row(&self, row: &[f32]) -> Vec<Vec<f32>> {
        self.par_iter()
            .map(|values| values.iter().zip(row).map(|(x, y)| x + y).collect())
            .collect()
    }

    fn subtract(&self, against: &[Vec<f32>]) -> Vec<Vec<f32>> {
        self.par_iter()
            .zip(against)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x - y).collect())
            .collect()
    }

    fn multiply_by_other(&self, against: &[Vec<f32>]) -> Vec<Vec<f32>> {
        self.par_iter()
            .zip(against)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x * y).collect())
            .collect()
    }

    fn multiply(&self, by: f32) -> Vec<Vec<f32>> {
        self.map_values(|x| x * by)
    }

    fn divide(&self, by: f32) -> Vec<Vec<f32>> {
        self.map_values(|x| x / by)
    }

    fn map_values<F>(&self, function: F) -> Vec<Vec<f32>>
    where
        F: Fn(f32) -> f32 + Sync + Send,
    {
        self.par_iter()
            .map(|row| row.iter().map(|x| function(*x)).collect::<Vec<f32>>())
            .collect::<Vec<Vec<f32>>>()
    }

    fn column_sums(&self) -> Vec<f32> {
        let mut sums = vec![0.0_f32; self.get_width()];
        for row in self {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        sums
    }

    fn transpose(&self) -> Vec<Vec<f32>> {
        let width = self.get_width();
        let height = self.get_height();
        let mut transposed: Vec<Vec<f32>> = vec![vec![0.0_f32; height]; width];

        for (i, row) in self.iter().enumerate() {
            assert_eq!(width, row.len());
            for (j, col) in row.iter().enumerate() {
                transposed[j][i] = *col;
            }
        }

        transposed
    }

    fn get_width(&self) -> usize {
        self.first().map_or(0, |row| row.len())
    }

    fn get_height(&self) -> usize {
        self.len()
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|row| row.iter().all(|x| x.is_finite()))
    }
}

#[test]
fn should_correctly_multiply_two_matrices() {
    let a: Vec<Vec<f32>> = Vec::from([Vec::from([1.0, 2.0]), Vec::from([3.0, 4.0])]);
    let b: Vec<Vec<f32>> = Vec::from([
        Vec::from([5.0, 6.0, 7.0]),
        Vec::from([8.0, 9.0, 10.0]),
    ]);

    let expected_result: Vec<Vec<f32>> = Vec::from([
        Vec::from([21.0, 24.0, 27.0]),
        Vec::from([47.0, 54.0, 61.0]),
    ]);

    assert_eq!(a.dot(&b), expected_result);
}

#[test]
fn should_transpose_matrix_correctly() {
    let matrix: Vec<Vec<f32>> = Vec::from([
        Vec::from([0.2, 0.4]),
        Vec::from([3.1, 9.2]),
        Vec::from([0.9, 4.4]),
    ]);
    let correctly_transposed_matrix: Vec<Vec<f32>> =
        Vec::from([Vec::from([0.2, 3.1, 0.9]), Vec::from([0.4, 9.2, 4.4])]);

    assert_eq!(matrix.transpose(), correctly_transposed_matrix);
}

#[test]
fn should_sum_columns_and_broadcast_rows() {
    let matrix: Vec<Vec<f32>> = Vec::from([Vec::from([1.0, -2.0]), Vec::from([3.0, 4.5])]);

    assert_eq!(matrix.column_sums(), vec![4.0, 2.5]);
    assert_eq!(
        matrix.add_row(&[0.5, 1.0]),
        vec![vec![1.5, -1.0], vec![3.5, 5.5]]
    );
}

#[test]
fn should_detect_non_finite_values() {
    let finite: Vec<Vec<f32>> = vec![vec![1.0, 2.0], vec![0.0, -3.0]];
    let with_nan: Vec<Vec<f32>> = vec![vec![1.0, f32::NAN]];
    let with_inf: Vec<Vec<f32>> = vec![vec![f32::NEG_INFINITY]];

    assert!(finite.is_finite());
    assert!(!with_nan.is_finite());
    assert!(!with_inf.is_finite());
}
