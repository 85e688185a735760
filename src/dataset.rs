use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Supervised training examples built by sliding a window over a series.
///
/// `x` is stored row-major: example i occupies `x[i * window .. (i + 1) * window]`.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub window: usize,
}

impl TrainingData {
    pub fn n_examples(&self) -> usize {
        self.y.len()
    }

    pub fn example(&self, i: usize) -> &[f64] {
        &self.x[i * self.window..(i + 1) * self.window]
    }
}

/// Shuffled train/test partition of a training dataset.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub train_x: Vec<f64>,
    pub train_y: Vec<f64>,
    pub test_x: Vec<f64>,
    pub test_y: Vec<f64>,
    pub window: usize,
}

impl SplitData {
    pub fn n_train(&self) -> usize {
        self.train_y.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_y.len()
    }

    pub fn train_example(&self, i: usize) -> &[f64] {
        &self.train_x[i * self.window..(i + 1) * self.window]
    }
}

/// Build every (window, next value) pair from the series, sliding one row at
/// a time. A series of length N yields exactly N - window examples, in input
/// order; shuffling happens only in the split.
pub fn build_windows(series: &[f64], window: usize) -> TrainingData {
    let n_examples = series.len().saturating_sub(window);

    let mut x = Vec::with_capacity(n_examples * window);
    let mut y = Vec::with_capacity(n_examples);

    for i in 0..n_examples {
        x.extend_from_slice(&series[i..i + window]);
        y.push(series[i + window]);
    }

    TrainingData { x, y, window }
}

/// Split examples into training and held-out partitions with a seeded shuffle.
/// The same seed on the same dataset gives identical partitions across runs.
pub fn split_train_test(data: &TrainingData, test_fraction: f64, seed: u64) -> SplitData {
    let n = data.n_examples();
    let n_test = ((n as f64) * test_fraction).round() as usize;
    let n_train = n - n_test;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut split = SplitData {
        train_x: Vec::with_capacity(n_train * data.window),
        train_y: Vec::with_capacity(n_train),
        test_x: Vec::with_capacity(n_test * data.window),
        test_y: Vec::with_capacity(n_test),
        window: data.window,
    };

    for (pos, &idx) in indices.iter().enumerate() {
        if pos < n_train {
            split.train_x.extend_from_slice(data.example(idx));
            split.train_y.push(data.y[idx]);
        } else {
            split.test_x.extend_from_slice(data.example(idx));
            split.test_y.push(data.y[idx]);
        }
    }

    split
}
