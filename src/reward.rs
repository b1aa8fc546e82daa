//! Reward shaping for the building energy simulation.
//!
//! The default simulation reward only looks at net electricity consumption.
//! [`SocCostReward`] additionally couples the penalty to each building's
//! battery state of charge, so that importing grid power while the battery
//! sits full (or exporting while it sits empty) is punished harder than the
//! same flow with a well-positioned battery.

/// Per-building snapshot consumed by the reward function.
///
/// `net_electricity_consumption` is positive when the building draws from
/// the grid and negative when it exports. `electrical_storage_soc` is the
/// battery state of charge in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingObservation {
    pub net_electricity_consumption: f64,
    pub electrical_storage_soc: f64,
}

impl BuildingObservation {
    #[must_use]
    pub fn new(net_electricity_consumption: f64, electrical_storage_soc: f64) -> Self {
        Self {
            net_electricity_consumption,
            electrical_storage_soc,
        }
    }
}

/// State-of-charge weighted electricity cost reward.
///
/// For each building the penalty factor is `-(1 + sign(net) * soc)`:
/// consuming with a full battery doubles the penalty, consuming with an
/// empty battery leaves it unchanged, and the signs flip for export. The
/// per-building reward is that factor times `|net|`, and the district
/// reward is the sum over buildings.
///
/// Rewards are negative costs, so a study over them maximizes.
///
/// # Examples
///
/// ```
/// use gridtune::reward::{BuildingObservation, SocCostReward};
///
/// let reward = SocCostReward;
/// // Drawing 2 kWh with a full battery costs twice the base penalty.
/// let obs = BuildingObservation::new(2.0, 1.0);
/// assert!((reward.building_reward(&obs) - (-4.0)).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SocCostReward;

impl SocCostReward {
    /// Reward contribution of a single building.
    #[must_use]
    pub fn building_reward(&self, obs: &BuildingObservation) -> f64 {
        let net = obs.net_electricity_consumption;
        let soc = obs.electrical_storage_soc;
        let penalty = -(1.0 + net.signum() * soc);
        penalty * net.abs()
    }

    /// District reward: sum of the per-building rewards.
    #[must_use]
    pub fn district_reward(&self, observations: &[BuildingObservation]) -> f64 {
        observations.iter().map(|o| self.building_reward(o)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn consuming_with_full_battery_doubles_penalty() {
        // penalty = -(1 + 1*1) = -2, reward = -2 * 3 = -6
        let obs = BuildingObservation::new(3.0, 1.0);
        assert_close(SocCostReward.building_reward(&obs), -6.0);
    }

    #[test]
    fn consuming_with_empty_battery_keeps_base_penalty() {
        // penalty = -(1 + 1*0) = -1, reward = -1 * 3 = -3
        let obs = BuildingObservation::new(3.0, 0.0);
        assert_close(SocCostReward.building_reward(&obs), -3.0);
    }

    #[test]
    fn exporting_with_full_battery_is_free() {
        // penalty = -(1 + (-1)*1) = 0
        let obs = BuildingObservation::new(-3.0, 1.0);
        assert_close(SocCostReward.building_reward(&obs), 0.0);
    }

    #[test]
    fn exporting_with_empty_battery_still_costs() {
        // penalty = -(1 + (-1)*0) = -1, reward = -1 * 3 = -3
        let obs = BuildingObservation::new(-3.0, 0.0);
        assert_close(SocCostReward.building_reward(&obs), -3.0);
    }

    #[test]
    fn zero_net_flow_is_free() {
        let obs = BuildingObservation::new(0.0, 0.5);
        assert_close(SocCostReward.building_reward(&obs), 0.0);
    }

    #[test]
    fn district_reward_sums_buildings() {
        let obs = [
            BuildingObservation::new(3.0, 1.0),  // -6
            BuildingObservation::new(3.0, 0.0),  // -3
            BuildingObservation::new(-3.0, 1.0), // 0
        ];
        assert_close(SocCostReward.district_reward(&obs), -9.0);
    }

    #[test]
    fn empty_district_scores_zero() {
        assert_close(SocCostReward.district_reward(&[]), 0.0);
    }
}
