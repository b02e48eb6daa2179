//! Geometry engine: seed orbit + pattern -> every satellite's elements

use crate::pattern::{ConstellationPattern, PatternRule, ValidationPolicy};
use crate::{Constellation, Orbit, Result, SeedConstellation};
use tracing::debug;

/// Generate with the default (strict) policy.
pub fn generate(
    reference: &Orbit,
    pattern: ConstellationPattern,
    plane_count: u32,
    sats_per_plane: u32,
) -> Result<Vec<Orbit>> {
    GeometryEngine::default().generate(reference, pattern, plane_count, sats_per_plane)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryEngine {
    policy: ValidationPolicy,
}

impl GeometryEngine {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(ValidationPolicy::Strict)
    }

    pub fn permissive() -> Self {
        Self::new(ValidationPolicy::Permissive)
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Phase `plane_count * sats_per_plane` satellites off `reference`.
    ///
    /// Output is plane-major, satellite-minor. Downstream node IDs are
    /// assigned by position, so this ordering must not change. All checks run
    /// before the first orbit is built.
    pub fn generate(
        &self,
        reference: &Orbit,
        pattern: ConstellationPattern,
        plane_count: u32,
        sats_per_plane: u32,
    ) -> Result<Vec<Orbit>> {
        reference.validate()?;
        let rule =
            PatternRule::resolve(pattern, reference, plane_count, sats_per_plane, self.policy)?;

        let mut orbits = Vec::with_capacity(plane_count as usize * sats_per_plane as usize);
        for plane_idx in 0..plane_count {
            for sat_idx in 0..sats_per_plane {
                orbits.push(rule.phase(plane_idx, sat_idx));
            }
        }

        debug!(
            "Generated {} orbits ({} x {} {})",
            orbits.len(),
            plane_count,
            sats_per_plane,
            pattern
        );

        Ok(orbits)
    }

    /// Consume a seed and produce the phased constellation.
    pub fn generate_constellation(&self, seed: SeedConstellation) -> Result<Constellation> {
        let orbits = self.generate(
            &seed.reference,
            seed.pattern,
            seed.plane_count,
            seed.sats_per_plane,
        )?;

        Ok(Constellation {
            name: seed.name,
            central_body: seed.central_body,
            rules: seed.rules,
            orbits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{normalize_degrees, GeometryError};
    use proptest::prelude::*;

    fn congruent(a: f64, b: f64) -> bool {
        let d = normalize_degrees(a - b);
        d < 1e-9 || (360.0 - d) < 1e-9
    }

    #[test]
    fn test_walker_delta_two_by_two() {
        let reference = Orbit::new(500.0, 0.0, 45.0, 0.0, 0.0, 0.0);
        let orbits = generate(&reference, ConstellationPattern::WalkerDelta, 2, 2).unwrap();

        let pairs: Vec<(f64, f64)> = orbits.iter().map(|o| (o.raan, o.mean_anomaly)).collect();
        assert_eq!(
            pairs,
            vec![(0.0, 0.0), (0.0, 180.0), (180.0, 0.0), (180.0, 180.0)]
        );
        for o in &orbits {
            assert_eq!(o.semi_major_axis, 500.0);
            assert_eq!(o.inclination, 45.0);
        }
    }

    #[test]
    fn test_equatorial_two_planes_fails() {
        let reference = Orbit::new(500.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let result = generate(&reference, ConstellationPattern::Equatorial, 2, 4);
        assert!(matches!(result, Err(GeometryError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_equatorial_keeps_reference_raan() {
        let reference = Orbit::new(42164.0, 0.0, 0.0, 75.0, 0.0, 10.0);
        let orbits = generate(&reference, ConstellationPattern::Equatorial, 1, 3).unwrap();
        assert_eq!(orbits.len(), 3);
        assert!(orbits.iter().all(|o| o.raan == 75.0));
        assert_eq!(orbits[1].mean_anomaly, 130.0);
        assert_eq!(orbits[2].mean_anomaly, 250.0);
    }

    #[test]
    fn test_star_requires_polar_when_strict() {
        let reference = Orbit::new(550.0, 0.0, 87.0, 0.0, 0.0, 0.0);
        assert!(GeometryEngine::strict()
            .generate(&reference, ConstellationPattern::WalkerStar, 4, 4)
            .is_err());
        assert_eq!(
            GeometryEngine::permissive()
                .generate(&reference, ConstellationPattern::WalkerStar, 4, 4)
                .unwrap()
                .len(),
            16
        );
    }

    #[test]
    fn test_zero_counts_rejected() {
        let reference = Orbit::new(500.0, 0.0, 45.0, 0.0, 0.0, 0.0);
        assert!(generate(&reference, ConstellationPattern::WalkerDelta, 0, 4).is_err());
        assert!(generate(&reference, ConstellationPattern::WalkerDelta, 4, 0).is_err());
    }

    #[test]
    fn test_invalid_reference_rejected() {
        let reference = Orbit::new(-1.0, 0.0, 45.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            generate(&reference, ConstellationPattern::WalkerDelta, 2, 2),
            Err(GeometryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_generate_constellation_passes_metadata_through() {
        let seed = SeedConstellation {
            name: "relay".to_string(),
            central_body: "Mars".to_string(),
            pattern: ConstellationPattern::WalkerStar,
            plane_count: 3,
            sats_per_plane: 5,
            rules: vec!["isl".to_string(), "no_gs".to_string()],
            reference: Orbit::new(3800.0, 0.0, 90.0, 0.0, 0.0, 0.0),
        };
        let constellation = GeometryEngine::strict().generate_constellation(seed).unwrap();
        assert_eq!(constellation.name, "relay");
        assert_eq!(constellation.central_body, "Mars");
        assert_eq!(constellation.rules, vec!["isl", "no_gs"]);
        assert_eq!(constellation.len(), 15);
    }

    proptest! {
        #[test]
        fn prop_count_and_ordering(
            planes in 1u32..12,
            sats in 1u32..40,
            raan in -360.0f64..720.0,
            ma in -360.0f64..720.0,
        ) {
            let reference = Orbit::new(7000.0, 0.01, 45.0, raan, 30.0, ma);
            let orbits = GeometryEngine::permissive()
                .generate(&reference, ConstellationPattern::WalkerDelta, planes, sats)
                .unwrap();
            prop_assert_eq!(orbits.len(), (planes * sats) as usize);

            let raan_step = 360.0 / planes as f64;
            let ma_step = 360.0 / sats as f64;
            for (idx, orbit) in orbits.iter().enumerate() {
                let plane = (idx as u32) / sats;
                let sat = (idx as u32) % sats;
                prop_assert!((0.0..360.0).contains(&orbit.raan));
                prop_assert!((0.0..360.0).contains(&orbit.mean_anomaly));
                prop_assert!(congruent(orbit.raan, plane as f64 * raan_step + raan));
                prop_assert!(congruent(orbit.mean_anomaly, sat as f64 * ma_step + ma));
            }
        }

        #[test]
        fn prop_star_planes_share_raan(planes in 1u32..10, sats in 1u32..20) {
            let reference = Orbit::new(7000.0, 0.0, 90.0, 15.0, 0.0, 0.0);
            let orbits =
                generate(&reference, ConstellationPattern::WalkerStar, planes, sats).unwrap();
            for (plane, chunk) in orbits.chunks(sats as usize).enumerate() {
                let expected = plane as f64 * (180.0 / planes as f64) + 15.0;
                for orbit in chunk {
                    prop_assert!(congruent(orbit.raan, expected));
                    prop_assert_eq!(orbit.raan, chunk[0].raan);
                }
            }
        }

        #[test]
        fn prop_equatorial_never_moves_raan(sats in 1u32..64, raan in 0.0f64..360.0) {
            let reference = Orbit::new(7000.0, 0.0, 0.0, raan, 0.0, 0.0);
            let orbits = generate(&reference, ConstellationPattern::Equatorial, 1, sats).unwrap();
            prop_assert!(orbits.iter().all(|o| o.raan == normalize_degrees(raan)));
        }
    }
}
