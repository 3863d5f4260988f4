//! Synthetic customer populations.
//!
//! Each install sub-cohort is discretized into customers whose enrollment
//! levels are linearly spaced over `[0, U)`. Every customer is assigned the
//! incentive the fitted curve requires to reach its level.

use crate::domain::{
    BuildConfig, CurveParameters, CustomerType, InstallKind, PopulationPolicy, Rate,
    ScenarioInputs, SyntheticCustomer,
};
use crate::math::{incentive_for, linear_levels};

/// The two install sub-cohorts of one scenario and customer type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    pub new_install: Vec<SyntheticCustomer>,
    pub no_install: Vec<SyntheticCustomer>,
}

impl Population {
    pub fn cohort(&self, install: InstallKind) -> &[SyntheticCustomer] {
        match install {
            InstallKind::NewInstall => &self.new_install,
            InstallKind::NoInstall => &self.no_install,
        }
    }

    pub fn len(&self) -> usize {
        self.new_install.len() + self.no_install.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// New-install customers first, then no-install customers.
    pub fn iter(&self) -> impl Iterator<Item = &SyntheticCustomer> {
        self.new_install.iter().chain(self.no_install.iter())
    }
}

/// Number of synthetic customers for a cohort holding `fraction` of the population.
pub fn cohort_size(fraction: f64, customer_resolution: usize, policy: PopulationPolicy) -> usize {
    match policy {
        // Truncates toward zero; negative or NaN fractions give an empty cohort.
        PopulationPolicy::Scaled => (customer_resolution as f64 * fraction) as usize,
        PopulationPolicy::Fixed if fraction > 0.0 => customer_resolution,
        PopulationPolicy::Fixed => 0,
    }
}

/// Synthesize both sub-cohorts for one scenario row and customer type.
pub fn synthesize_population(
    inputs: &ScenarioInputs,
    params: &CurveParameters,
    customer_type: CustomerType,
    config: &BuildConfig,
) -> Population {
    Population {
        new_install: synthesize_cohort(inputs, params, InstallKind::NewInstall, customer_type, config),
        no_install: synthesize_cohort(inputs, params, InstallKind::NoInstall, customer_type, config),
    }
}

/// Synthesize one install sub-cohort.
pub fn synthesize_cohort(
    inputs: &ScenarioInputs,
    params: &CurveParameters,
    install: InstallKind,
    customer_type: CustomerType,
    config: &BuildConfig,
) -> Vec<SyntheticCustomer> {
    let n = cohort_size(
        inputs.cohort_fraction(install, customer_type),
        config.customer_resolution,
        config.population_policy,
    );
    let op_and_admin = inputs.op_and_admin(customer_type);
    let rate = params.rate(install);

    linear_levels(params.upper_limit, n)
        .into_iter()
        .map(|enrollment| SyntheticCustomer {
            enrollment,
            incentive: match rate {
                Rate::Defined(beta) => {
                    incentive_for(enrollment, beta, params.lower_limit, params.upper_limit)
                }
                Rate::Undefined => 0.0,
            },
            op_and_admin,
            marketing: inputs.marketing,
            install,
            customer_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvType, Program, Scenario};
    use crate::fit::beta::fit_curve_parameters;
    use crate::math::enrollment_at;

    fn inputs() -> ScenarioInputs {
        ScenarioInputs {
            ev_type: EvType::Mhdv,
            program: Program::Dlc,
            scenario: Scenario::Low,
            year: 2035,
            new_install: 0.2,
            upper_limit: 0.4,
            incentive_annual: 120.0,
            enrollment_anch: 0.1,
            incentive_new_install: 900.0,
            program_op: 30.0,
            init_admin: 15.0,
            marketing: 5.0,
        }
    }

    #[test]
    fn scaled_policy_splits_population_by_cohort_fraction() {
        let s = inputs();
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        let pop = synthesize_population(&s, &params, CustomerType::New, &BuildConfig::default());
        assert_eq!(pop.new_install.len(), 200);
        assert_eq!(pop.no_install.len(), 800);
        assert!(pop.new_install.iter().all(|c| c.install == InstallKind::NewInstall));
        assert!(pop.iter().all(|c| c.op_and_admin == 45.0 && c.marketing == 5.0));
    }

    #[test]
    fn fixed_policy_gives_every_nonempty_cohort_the_full_resolution() {
        assert_eq!(cohort_size(0.2, 1000, PopulationPolicy::Fixed), 1000);
        assert_eq!(cohort_size(0.0, 1000, PopulationPolicy::Fixed), 0);
        assert_eq!(cohort_size(0.2, 1000, PopulationPolicy::Scaled), 200);
        assert_eq!(cohort_size(0.0015, 1000, PopulationPolicy::Scaled), 1);
    }

    #[test]
    fn recurring_customers_have_no_install_cohort() {
        let s = inputs();
        let params = fit_curve_parameters(&s, CustomerType::Recurring).unwrap();
        let pop =
            synthesize_population(&s, &params, CustomerType::Recurring, &BuildConfig::default());
        assert!(pop.new_install.is_empty());
        assert_eq!(pop.no_install.len(), 800);
        assert!(pop.iter().all(|c| c.op_and_admin == 30.0));
    }

    #[test]
    fn enrollment_levels_span_zero_to_upper_limit() {
        let s = inputs();
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        let cohort = synthesize_cohort(
            &s,
            &params,
            InstallKind::NoInstall,
            CustomerType::New,
            &BuildConfig::default(),
        );
        assert_eq!(cohort[0].enrollment, 0.0);
        assert_eq!(cohort[0].incentive, 0.0);
        let last = cohort[cohort.len() - 1].enrollment;
        assert!((last - 0.4 * 799.0 / 800.0).abs() < 1e-12);
    }

    #[test]
    fn incentives_invert_the_response_curve() {
        let s = inputs();
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        let pop = synthesize_population(&s, &params, CustomerType::New, &BuildConfig::default());
        for install in InstallKind::ALL {
            let beta = params.rate(install).value().unwrap();
            for c in pop.cohort(install) {
                let e = enrollment_at(c.incentive, beta, 0.0, s.upper_limit);
                assert!((e - c.enrollment).abs() < 1e-9, "{c:?}");
            }
        }
    }

    #[test]
    fn undefined_rate_gives_zero_incentives() {
        let mut s = inputs();
        s.incentive_annual = 0.0;
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        let pop = synthesize_population(&s, &params, CustomerType::New, &BuildConfig::default());
        assert!(pop.no_install.iter().all(|c| c.incentive == 0.0));
        assert!(pop.new_install.iter().skip(1).all(|c| c.incentive > 0.0));
    }
}
