//! Fixed-depth circular CPU stack.

/// Values a stack holds before the oldest is overwritten.
pub const STACK_SIZE: usize = 10;

/// A circular stack of `STACK_SIZE` integers. Pushing onto a full stack
/// silently drops the oldest value; popping an empty one yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuStack {
    values: [i32; STACK_SIZE],
    top: usize,
    depth: usize,
}

impl CpuStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: i32) {
        self.top = (self.top + STACK_SIZE - 1) % STACK_SIZE;
        self.values[self.top] = value;
        self.depth = (self.depth + 1).min(STACK_SIZE);
    }

    pub fn pop(&mut self) -> Option<i32> {
        if self.depth == 0 {
            return None;
        }
        let value = self.values[self.top];
        self.values[self.top] = 0;
        self.top = (self.top + 1) % STACK_SIZE;
        self.depth -= 1;
        Some(value)
    }

    /// Value `depth` entries below the top, zero past the live entries.
    #[must_use]
    pub fn get(&self, depth: usize) -> i32 {
        if depth >= self.depth {
            return 0;
        }
        self.values[(self.top + depth) % STACK_SIZE]
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Reverses the live entries.
    pub fn flip(&mut self) {
        let live: Vec<i32> = (0..self.depth).map(|d| self.get(d)).collect();
        self.clear();
        for value in live {
            self.push(value);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Live entries, top first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<i32> {
        (0..self.depth).map(|d| self.get(d)).collect()
    }
}
