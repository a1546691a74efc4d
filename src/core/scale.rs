//! Weight → tile side mapping.
//!
//! Tile *area* grows as `(weight / unit_weight)^gamma` with `gamma < 1`, so a
//! single huge transaction cannot swallow the grid while the smallest ones
//! still get a full cell.

/// Knobs for [`side_cells`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    /// Weight that maps to exactly one cell of area.
    pub unit_weight: f64,
    /// Area exponent, `(0, 1]`.
    pub gamma: f64,
    /// Smallest side in cells (forced `>= 1`).
    pub min_side: u32,
    /// Largest side in cells before the grid clamp.
    pub max_side: u32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            unit_weight: 250.0,
            gamma: 0.75,
            min_side: 1,
            max_side: 16,
        }
    }
}

/// Replace NaN, infinite and negative weights with `0`.
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Side length in cells for an item of `weight`.
///
/// Pure and monotonic in `weight`; invalid weights get `min_side`.
pub fn side_cells(weight: f64, cfg: &ScaleConfig) -> u32 {
    let min_side = cfg.min_side.max(1);
    let max_side = cfg.max_side.max(min_side);

    let unit = if cfg.unit_weight.is_finite() && cfg.unit_weight > 0.0 {
        cfg.unit_weight
    } else {
        1.0
    };
    let gamma = if cfg.gamma.is_finite() {
        cfg.gamma.clamp(0.1, 1.0)
    } else {
        1.0
    };

    let area = (sanitize_weight(weight) / unit).powf(gamma);
    let side = area.sqrt().ceil();
    if !side.is_finite() {
        return max_side;
    }
    (side.min(f64::from(max_side)) as u32).clamp(min_side, max_side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_weights_get_minimum_side() {
        let cfg = ScaleConfig::default();
        for w in [0.0, -3.0, f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
            assert_eq!(side_cells(w, &cfg), 1, "weight {w}");
        }
    }

    #[test]
    fn unit_weight_is_one_cell() {
        let cfg = ScaleConfig::default();
        assert_eq!(side_cells(250.0, &cfg), 1);
        assert_eq!(side_cells(1.0, &cfg), 1);
    }

    #[test]
    fn sub_linear_growth_and_max_clamp() {
        let cfg = ScaleConfig::default();
        // (100_000 / 250)^0.75 ≈ 89.4 cells of area → side 10.
        assert_eq!(side_cells(100_000.0, &cfg), 10);
        assert_eq!(side_cells(1.0e12, &cfg), cfg.max_side);
    }

    #[test]
    fn monotonic_over_a_sweep() {
        let cfg = ScaleConfig::default();
        let mut prev = 0;
        let mut w = 1.0;
        while w < 1.0e9 {
            let s = side_cells(w, &cfg);
            assert!(s >= prev, "side dropped at weight {w}");
            prev = s;
            w *= 1.37;
        }
    }

    #[test]
    fn zero_min_side_is_raised_to_one() {
        let cfg = ScaleConfig {
            min_side: 0,
            max_side: 0,
            ..ScaleConfig::default()
        };
        assert_eq!(side_cells(0.0, &cfg), 1);
        assert_eq!(side_cells(1.0e6, &cfg), 1);
    }
}
