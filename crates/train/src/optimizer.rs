use crate::AdamConfig;

/// Adam over a flat parameter vector.
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f64,
    config: AdamConfig,
    step: i32,
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Adam {
    pub fn new(slots: usize, lr: f64, config: AdamConfig) -> Self {
        Self {
            lr,
            config,
            step: 0,
            m: vec![0.0; slots],
            v: vec![0.0; slots],
        }
    }

    pub fn steps_taken(&self) -> i32 {
        self.step
    }

    /// Returns the deltas to add to the parameters for gradient `grad`.
    pub fn step(&mut self, grad: &[f64]) -> Vec<f64> {
        self.step = self.step.saturating_add(1);
        let AdamConfig {
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let bias1 = 1.0 - beta1.powi(self.step);
        let bias2 = 1.0 - beta2.powi(self.step);
        let mut deltas = vec![0.0; self.m.len()];
        for (i, delta) in deltas.iter_mut().enumerate() {
            let g = grad.get(i).copied().unwrap_or(0.0);
            self.m[i] = beta1 * self.m[i] + (1.0 - beta1) * g;
            self.v[i] = beta2 * self.v[i] + (1.0 - beta2) * g * g;
            let m_hat = self.m[i] / bias1;
            let v_hat = self.v[i] / bias2;
            *delta = -self.lr * m_hat / (v_hat.sqrt() + epsilon);
        }
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate_against_gradient() {
        let mut adam = Adam::new(3, 0.1, AdamConfig::default());
        let deltas = adam.step(&[2.0, -0.5, 0.0]);
        assert!((deltas[0] + 0.1).abs() < 1e-6);
        assert!((deltas[1] - 0.1).abs() < 1e-6);
        assert_eq!(deltas[2], 0.0);
        assert_eq!(adam.steps_taken(), 1);
    }

    #[test]
    fn momentum_keeps_moving_after_gradient_vanishes() {
        let mut adam = Adam::new(1, 0.01, AdamConfig::default());
        adam.step(&[-1.0]);
        let deltas = adam.step(&[0.0]);
        assert!(deltas[0] > 0.0);
    }

    #[test]
    fn descends_a_quadratic() {
        let mut adam = Adam::new(1, 0.05, AdamConfig::default());
        let mut x = 3.0_f64;
        for _ in 0..20 {
            let deltas = adam.step(&[2.0 * (x - 1.0)]);
            x += deltas[0];
        }
        assert!(x < 2.9);
        assert!(x > 1.0);
    }
}
