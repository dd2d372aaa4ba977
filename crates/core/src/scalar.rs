use std::collections::BTreeMap;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul};

/// Arithmetic shared by plain scores and gradient-tracking scores.
pub trait Scalar:
    Clone + Debug + Add<Output = Self> + AddAssign + Mul<f64, Output = Self>
{
    fn zero() -> Self;
    fn constant(value: f64) -> Self;
    fn value(&self) -> f64;
}

impl Scalar for f64 {
    fn zero() -> Self {
        0.0
    }

    fn constant(value: f64) -> Self {
        value
    }

    fn value(&self) -> f64 {
        *self
    }
}

/// Forward-mode dual number with a sparse gradient keyed by parameter slot.
///
/// Scores are linear in the influence modifiers, so a forward pass carries the
/// exact partial derivative of the score with respect to every slot it touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dual {
    value: f64,
    grad: BTreeMap<usize, f64>,
}

impl Dual {
    pub fn variable(value: f64, slot: usize) -> Self {
        let mut grad = BTreeMap::new();
        grad.insert(slot, 1.0);
        Self { value, grad }
    }

    pub fn grad(&self) -> &BTreeMap<usize, f64> {
        &self.grad
    }

    pub fn partial(&self, slot: usize) -> f64 {
        self.grad.get(&slot).copied().unwrap_or(0.0)
    }

    /// Adds `scale * d(self)/d(slot)` into `out` for every tracked slot.
    pub fn accumulate_grad(&self, scale: f64, out: &mut [f64]) {
        for (slot, partial) in &self.grad {
            if let Some(cell) = out.get_mut(*slot) {
                *cell += scale * partial;
            }
        }
    }
}

impl Add for Dual {
    type Output = Dual;

    fn add(mut self, rhs: Dual) -> Dual {
        self += rhs;
        self
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, rhs: Dual) {
        self.value += rhs.value;
        for (slot, partial) in rhs.grad {
            *self.grad.entry(slot).or_insert(0.0) += partial;
        }
    }
}

impl Mul<f64> for Dual {
    type Output = Dual;

    fn mul(mut self, rhs: f64) -> Dual {
        self.value *= rhs;
        for partial in self.grad.values_mut() {
            *partial *= rhs;
        }
        self
    }
}

impl Scalar for Dual {
    fn zero() -> Self {
        Self::default()
    }

    fn constant(value: f64) -> Self {
        Self {
            value,
            grad: BTreeMap::new(),
        }
    }

    fn value(&self) -> f64 {
        self.value
    }
}
