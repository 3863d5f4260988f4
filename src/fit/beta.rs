//! Response-curve calibration.
//!
//! Each channel's decay rate is chosen so that the curve passes through the
//! scenario's anchor point `(driver, enrollment_anch)`:
//!
//! ```text
//! β = -ln((anchor - U) / (L - U)) / driver
//! ```
//!
//! The driver is the annual incentive (no-install channel) or the new-install
//! incentive (install channel). LDV customers on TOU rates respond to marketing
//! spend instead and never need an install.

use crate::domain::{CurveParameters, CustomerType, InstallKind, LOWER_LIMIT, Rate, ScenarioInputs};
use crate::error::{Result, SupplyCurveError};
use crate::math::{anchor_log_argument, enrollment_at};

/// Fit both channel rates for one scenario row and customer type.
///
/// A channel whose driver is not strictly positive has an undefined rate.
/// An anchor outside `(L, U)` is a configuration error whenever a rate
/// depends on it.
pub fn fit_curve_parameters(
    inputs: &ScenarioInputs,
    customer_type: CustomerType,
) -> Result<CurveParameters> {
    let (install, no_install) = if inputs.is_marketing_driven() {
        (Rate::Undefined, channel_rate(inputs, inputs.marketing)?)
    } else {
        let install = match customer_type {
            CustomerType::New => channel_rate(inputs, inputs.incentive_new_install)?,
            CustomerType::Recurring => Rate::Undefined,
        };
        (install, channel_rate(inputs, inputs.incentive_annual)?)
    };

    Ok(CurveParameters {
        install,
        no_install,
        upper_limit: inputs.upper_limit,
        lower_limit: LOWER_LIMIT,
    })
}

fn channel_rate(inputs: &ScenarioInputs, driver: f64) -> Result<Rate> {
    if !(driver > 0.0) {
        return Ok(Rate::Undefined);
    }

    let log_arg = anchor_log_argument(inputs.enrollment_anch, LOWER_LIMIT, inputs.upper_limit);
    if !(log_arg > 0.0 && log_arg < 1.0) {
        return Err(SupplyCurveError::InvalidAnchor {
            key: inputs.key().to_string(),
            anchor: inputs.enrollment_anch,
            upper: inputs.upper_limit,
            log_arg,
        });
    }

    Ok(Rate::Defined(-log_arg.ln() / driver))
}

/// Enrollment reached by each incentive on one channel's curve.
///
/// An undefined rate never moves enrollment off the lower limit.
pub fn enrollments_for(params: &CurveParameters, install: InstallKind, incentives: &[f64]) -> Vec<f64> {
    match params.rate(install) {
        Rate::Defined(rate) => incentives
            .iter()
            .map(|&x| enrollment_at(x, rate, params.lower_limit, params.upper_limit))
            .collect(),
        Rate::Undefined => vec![params.lower_limit; incentives.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvType, Program, Scenario};

    fn inputs(ev_type: EvType, program: Program) -> ScenarioInputs {
        ScenarioInputs {
            ev_type,
            program,
            scenario: Scenario::High,
            year: 2025,
            new_install: 0.2,
            upper_limit: 0.30,
            incentive_annual: 50.0,
            enrollment_anch: 0.05,
            incentive_new_install: 300.0,
            program_op: 12.0,
            init_admin: 8.0,
            marketing: 25.0,
        }
    }

    #[test]
    fn fitted_rates_reproduce_the_anchor() {
        let s = inputs(EvType::Mhdv, Program::Dlc);
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();

        let e = enrollments_for(&params, InstallKind::NoInstall, &[s.incentive_annual]);
        assert!((e[0] - s.enrollment_anch).abs() < 1e-12);

        let e = enrollments_for(&params, InstallKind::NewInstall, &[s.incentive_new_install]);
        assert!((e[0] - s.enrollment_anch).abs() < 1e-12);
    }

    #[test]
    fn recurring_customers_have_no_install_rate() {
        let s = inputs(EvType::Ldv, Program::Rtp);
        let params = fit_curve_parameters(&s, CustomerType::Recurring).unwrap();
        assert_eq!(params.install, Rate::Undefined);
        assert!(params.no_install.is_defined());
    }

    #[test]
    fn ldv_tou_responds_to_marketing() {
        let s = inputs(EvType::Ldv, Program::Tou);
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        assert_eq!(params.install, Rate::Undefined);

        let e = enrollments_for(&params, InstallKind::NoInstall, &[s.marketing]);
        assert!((e[0] - s.enrollment_anch).abs() < 1e-12);
    }

    #[test]
    fn ldv_tou_without_marketing_has_no_response() {
        let mut s = inputs(EvType::Ldv, Program::Tou);
        s.marketing = 0.0;
        // Even a degenerate anchor is not consulted when no rate depends on it.
        s.enrollment_anch = 0.0;
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        assert_eq!(params.install, Rate::Undefined);
        assert_eq!(params.no_install, Rate::Undefined);
    }

    #[test]
    fn zero_incentive_leaves_channel_undefined() {
        let mut s = inputs(EvType::Mhdv, Program::Rtp);
        s.incentive_new_install = 0.0;
        let params = fit_curve_parameters(&s, CustomerType::New).unwrap();
        assert_eq!(params.install, Rate::Undefined);
        assert!(params.no_install.is_defined());
    }

    #[test]
    fn anchor_at_or_above_upper_limit_is_a_configuration_error() {
        let mut s = inputs(EvType::Mhdv, Program::Dlc);
        s.enrollment_anch = 0.30;
        let err = fit_curve_parameters(&s, CustomerType::New).unwrap_err();
        assert!(matches!(err, SupplyCurveError::InvalidAnchor { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);

        s.enrollment_anch = 0.45;
        assert!(fit_curve_parameters(&s, CustomerType::Recurring).is_err());
    }

    #[test]
    fn zero_anchor_is_a_configuration_error() {
        let mut s = inputs(EvType::Mhdv, Program::Dlc);
        s.enrollment_anch = 0.0;
        assert!(fit_curve_parameters(&s, CustomerType::New).is_err());
    }
}
