use crate::calibration::Prob3;
use crate::model_config::GoalModelConfig;

/// Joint scoreline distribution, `cells[h][a]` = P(home scores h, away scores a),
/// truncated at `max_goals` per side and normalised to sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorelineMatrix {
    cells: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalMarkets {
    pub outcome: Prob3,
    pub btts: f64,
    pub over_2_5: f64,
}

impl ScorelineMatrix {
    pub fn build(lambda_home: f64, lambda_away: f64, cfg: &GoalModelConfig) -> Self {
        let n = cfg.max_goals as usize + 1;
        let pmf_h = poisson_pmf(lambda_home, cfg.max_goals);
        let pmf_a = poisson_pmf(lambda_away, cfg.max_goals);

        let mut cells = vec![vec![0.0_f64; n]; n];
        for (h, p_h) in pmf_h.iter().enumerate() {
            for (a, p_a) in pmf_a.iter().enumerate() {
                let tau = dc_tau(h, a, lambda_home, lambda_away, cfg.rho)
                    .clamp(cfg.tau_min, cfg.tau_max);
                cells[h][a] = (p_h * p_a * tau).max(0.0);
            }
        }

        let total: f64 = cells.iter().flatten().sum();
        if total > 0.0 {
            for cell in cells.iter_mut().flatten() {
                *cell /= total;
            }
        }
        Self { cells }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, home_goals: usize, away_goals: usize) -> f64 {
        self.cells
            .get(home_goals)
            .and_then(|row| row.get(away_goals))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    /// Home wins below the diagonal, draws on it, away wins above it.
    pub fn outcome_probs(&self) -> Prob3 {
        let mut out = Prob3::zero();
        for (h, row) in self.cells.iter().enumerate() {
            for (a, p) in row.iter().enumerate() {
                if h > a {
                    out.home += p;
                } else if h < a {
                    out.away += p;
                } else {
                    out.draw += p;
                }
            }
        }
        out
    }

    pub fn btts(&self) -> f64 {
        let home_blank = self
            .cells
            .first()
            .map(|row| row.iter().sum::<f64>())
            .unwrap_or(0.0);
        let away_blank: f64 = self.cells.iter().filter_map(|row| row.first()).sum();
        (1.0 - home_blank - away_blank + self.get(0, 0)).clamp(0.0, 1.0)
    }

    pub fn over(&self, line: f64) -> f64 {
        let mut p = 0.0_f64;
        for (h, row) in self.cells.iter().enumerate() {
            for (a, cell) in row.iter().enumerate() {
                if (h + a) as f64 > line {
                    p += *cell;
                }
            }
        }
        p.clamp(0.0, 1.0)
    }

    pub fn markets(&self) -> GoalMarkets {
        GoalMarkets {
            outcome: self.outcome_probs(),
            btts: self.btts(),
            over_2_5: self.over(2.5),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(h, row)| row.iter().enumerate().map(move |(a, p)| (h, a, *p)))
    }
}

fn dc_tau(
    home_goals: usize,
    away_goals: usize,
    lambda_home: f64,
    lambda_away: f64,
    rho: f64,
) -> f64 {
    match (home_goals, away_goals) {
        (0, 0) => 1.0 - lambda_home * lambda_away * rho,
        (0, 1) => 1.0 + lambda_home * rho,
        (1, 0) => 1.0 + lambda_away * rho,
        (1, 1) => 1.0 - rho,
        _ => 1.0,
    }
}

// Truncated pmf; mass beyond `max_k` is dropped and restored by matrix normalisation.
fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let lambda = lambda.max(0.0);
    let mut out = vec![0.0; max_k + 1];
    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }
    out
}
