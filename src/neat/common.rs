use super::compatibility::Compatibility;
use super::error::SettingsError;

/// Everything a run is configured with. Fixed for the lifetime of a population.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub population_size: usize,
    pub n_sensor_nodes: usize,
    pub n_output_nodes: usize,

    /// Chance that a single connection weight is mutated.
    pub mutate_weight_rate: f64,
    /// Chance that a mutated weight is replaced rather than perturbed.
    pub mutate_weight_replace_rate: f64,
    /// Perturbations are drawn from `[-scale, scale]`.
    pub mutate_weight_scale: f64,
    pub mutate_add_connection_rate: f64,
    pub mutate_add_node_rate: f64,

    pub excess_coefficient: f64,
    pub disjoint_coefficient: f64,
    pub weight_coefficient: f64,
    pub compatibility_threshold: f64,

    pub max_stagnation_generations: usize,
    pub n_species_min: usize,
    /// Number of top members copied unchanged into each species' offspring.
    pub elitism: usize,
    /// Share of a species, in percent, that is allowed to breed.
    pub survival_threshold_percent: usize,
    /// Chance that a gene disabled in either parent comes back enabled.
    pub reenable_rate: f64,
    pub tournament_size: usize,
}

impl Settings {
    pub fn standard(n_sensor_nodes: usize, n_output_nodes: usize) -> Settings {
        let mutation_rate = 0.8;
        Settings {
            population_size: 100,
            n_sensor_nodes,
            n_output_nodes,
            mutate_weight_rate: mutation_rate,
            mutate_weight_replace_rate: 0.1,
            mutate_weight_scale: 0.5,
            mutate_add_connection_rate: mutation_rate * 0.5,
            mutate_add_node_rate: mutation_rate * 0.3,
            excess_coefficient: 1.0,
            disjoint_coefficient: 1.0,
            weight_coefficient: 0.6,
            compatibility_threshold: 3.5,
            max_stagnation_generations: 25,
            n_species_min: 2,
            elitism: 1,
            survival_threshold_percent: 20,
            reenable_rate: 0.75,
            tournament_size: 3,
        }
    }

    pub fn compatibility(&self) -> Compatibility {
        Compatibility {
            excess_coefficient: self.excess_coefficient,
            disjoint_coefficient: self.disjoint_coefficient,
            weight_coefficient: self.weight_coefficient,
            threshold: self.compatibility_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.population_size == 0 {
            return Err(SettingsError::EmptyPopulation);
        }
        if self.n_sensor_nodes == 0 || self.n_output_nodes == 0 {
            return Err(SettingsError::MissingNodes {
                n_sensor_nodes: self.n_sensor_nodes,
                n_output_nodes: self.n_output_nodes,
            });
        }

        let probabilities = [
            ("mutate_weight_rate", self.mutate_weight_rate),
            ("mutate_weight_replace_rate", self.mutate_weight_replace_rate),
            ("mutate_add_connection_rate", self.mutate_add_connection_rate),
            ("mutate_add_node_rate", self.mutate_add_node_rate),
            ("reenable_rate", self.reenable_rate),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::InvalidProbability { name, value });
            }
        }

        let magnitudes = [
            ("mutate_weight_scale", self.mutate_weight_scale),
            ("excess_coefficient", self.excess_coefficient),
            ("disjoint_coefficient", self.disjoint_coefficient),
            ("weight_coefficient", self.weight_coefficient),
            ("compatibility_threshold", self.compatibility_threshold),
        ];
        for (name, value) in magnitudes {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidMagnitude { name, value });
            }
        }

        if self.tournament_size == 0 {
            return Err(SettingsError::EmptyTournament);
        }
        if self.survival_threshold_percent > 100 {
            return Err(SettingsError::InvalidSurvivalThreshold(self.survival_threshold_percent));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_valid() {
        let settings = Settings::standard(5, 2);
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.population_size, 100);
        assert!((settings.mutate_add_connection_rate - 0.4).abs() < 1e-12);
        assert!((settings.mutate_add_node_rate - 0.24).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut settings = Settings::standard(2, 1);
        settings.reenable_rate = 1.5;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidProbability { name: "reenable_rate", value: 1.5 })
        );
    }

    #[test]
    fn test_rejects_missing_nodes() {
        let settings = Settings::standard(0, 1);
        assert!(matches!(settings.validate(), Err(SettingsError::MissingNodes { .. })));
    }

    #[test]
    fn test_rejects_nan_scale() {
        let mut settings = Settings::standard(2, 1);
        settings.mutate_weight_scale = f64::NAN;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidMagnitude { name: "mutate_weight_scale", .. })
        ));
    }

    #[test]
    fn test_compatibility_coefficients() {
        let compatibility = Settings::standard(2, 1).compatibility();
        assert_eq!(compatibility.excess_coefficient, 1.0);
        assert_eq!(compatibility.disjoint_coefficient, 1.0);
        assert_eq!(compatibility.weight_coefficient, 0.6);
        assert_eq!(compatibility.threshold, 3.5);
    }
}
