use crate::Scalar;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes<S = f64> {
    #[serde(default)]
    pub attack: S,
    #[serde(default)]
    pub defense: S,
    #[serde(default)]
    pub support: S,
}

impl<S> Attributes<S> {
    pub fn new(attack: S, defense: S, support: S) -> Self {
        Self {
            attack,
            defense,
            support,
        }
    }
}

impl Attributes<f64> {
    pub fn attack(value: f64) -> Self {
        Self::new(value, 0.0, 0.0)
    }

    pub fn defense(value: f64) -> Self {
        Self::new(0.0, value, 0.0)
    }

    pub fn support(value: f64) -> Self {
        Self::new(0.0, 0.0, value)
    }

    pub fn is_finite(&self) -> bool {
        self.attack.is_finite() && self.defense.is_finite() && self.support.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.attack, self.defense, self.support]
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl<S: Scalar> Attributes<S> {
    pub fn zero() -> Self {
        Self::new(S::zero(), S::zero(), S::zero())
    }

    /// Lifts plain values into any scalar type without gradient.
    pub fn constant(values: Attributes<f64>) -> Self {
        Self::new(
            S::constant(values.attack),
            S::constant(values.defense),
            S::constant(values.support),
        )
    }

    pub fn weighted(&self, attack_w: f64, defense_w: f64, support_w: f64) -> S {
        self.attack.clone() * attack_w
            + self.defense.clone() * defense_w
            + self.support.clone() * support_w
    }

    pub fn values(&self) -> Attributes<f64> {
        Attributes::new(
            self.attack.value(),
            self.defense.value(),
            self.support.value(),
        )
    }
}

impl<S: Scalar> Add for Attributes<S> {
    type Output = Attributes<S>;

    fn add(mut self, rhs: Attributes<S>) -> Attributes<S> {
        self += rhs;
        self
    }
}

impl<S: Scalar> AddAssign for Attributes<S> {
    fn add_assign(&mut self, rhs: Attributes<S>) {
        self.attack += rhs.attack;
        self.defense += rhs.defense;
        self.support += rhs.support;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dual;
    use proptest::prelude::*;

    fn finite() -> impl Strategy<Value = f64> {
        -1.0e6..1.0e6f64
    }

    fn attrs() -> impl Strategy<Value = Attributes> {
        (finite(), finite(), finite()).prop_map(|(a, d, s)| Attributes::new(a, d, s))
    }

    fn close(a: Attributes, b: Attributes) -> bool {
        let tol = 1e-6;
        (a.attack - b.attack).abs() <= tol
            && (a.defense - b.defense).abs() <= tol
            && (a.support - b.support).abs() <= tol
    }

    proptest! {
        #[test]
        fn addition_is_associative(a in attrs(), b in attrs(), c in attrs()) {
            prop_assert!(close((a + b) + c, a + (b + c)));
        }

        #[test]
        fn zero_is_identity(a in attrs()) {
            prop_assert_eq!(a + Attributes::zero(), a);
            prop_assert_eq!(Attributes::zero() + a, a);
        }

        #[test]
        fn sums_stay_finite(a in attrs(), b in attrs()) {
            prop_assert!((a + b).is_finite());
        }
    }

    #[test]
    fn weighted_dot_product() {
        let value = Attributes::new(1.0, 2.0, 3.0);
        assert_eq!(value.weighted(2.0, 1.5, 1.0), 2.0 + 3.0 + 3.0);
    }

    #[test]
    fn tracked_and_plain_agree_on_values() {
        let plain = Attributes::new(0.5, -1.0, 2.0);
        let tracked = Attributes::<Dual>::constant(plain)
            + Attributes::new(
                Dual::variable(1.0, 0),
                Dual::variable(0.0, 1),
                Dual::variable(-0.5, 2),
            );
        assert_eq!(tracked.values(), plain + Attributes::new(1.0, 0.0, -0.5));
        assert_eq!(tracked.weighted(2.0, 1.0, 1.0).partial(0), 2.0);
    }
}
