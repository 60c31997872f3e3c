//! ErlangEngine: achievable service from offered traffic and net agents.
//!
//! Queue model: M/M/N/∞ (Erlang C). Offered traffic A is in Erlangs,
//! the agent count N is real-valued (net agents after shrinkage).
//!
//! RULES:
//!   - Never materialise Aᴺ or N!. Erlang B is built by the recursion
//!     B(0) = 1, B(n) = A·B(n−1) / (n + A·B(n−1)), then converted to
//!     Erlang C with C = B / (1 − ρ(1 − B)), ρ = A/N.
//!   - N ≤ A is an unstable queue. It surfaces as `Understaffed`,
//!     never as a numeric probability, ASA or gap.
//!   - Zero traffic means nobody waits, whatever N is.
//!   - Every function here is pure. Same inputs, bit-identical outputs.

use crate::{
    config::ServiceTarget,
    demand::IntervalDemand,
    error::{StaffingError, StaffingResult},
    shrinkage::StaffingInput,
    types::{Agents, Erlangs, Seconds},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest agent count the recursion will walk.
pub const MAX_AGENTS: Agents = 100_000.0;

/// Required-agents search bound: SEARCH_BOUND_FACTOR·ceil(A) + SEARCH_BOUND_OFFSET.
pub const SEARCH_BOUND_FACTOR: u32 = 10;
pub const SEARCH_BOUND_OFFSET: u32 = 50;

/// Erlang B blocking probability for `agents` servers.
///
/// Integer counts use the recursion directly. A fractional count is
/// interpolated linearly between the two neighbouring integer counts,
/// which keeps B monotone in N.
pub fn erlang_b(traffic: Erlangs, agents: Agents) -> StaffingResult<f64> {
    check_traffic(traffic)?;
    check_agents(agents)?;

    let whole = agents.floor();
    let frac = agents - whole;

    let mut b = 1.0;
    for n in 1..=(whole as u64) {
        b = erlang_b_step(traffic, n as f64, b);
    }
    if frac == 0.0 {
        return Ok(b);
    }

    let next = erlang_b_step(traffic, whole + 1.0, b);
    Ok(b + frac * (next - b))
}

fn erlang_b_step(traffic: Erlangs, n: f64, prev: f64) -> f64 {
    let ab = traffic * prev;
    ab / (n + ab)
}

/// Erlang C: probability that an arriving call waits, P(W > 0).
pub fn erlang_c(traffic: Erlangs, agents: Agents) -> StaffingResult<f64> {
    check_traffic(traffic)?;
    check_agents(agents)?;
    if traffic == 0.0 {
        return Ok(0.0);
    }
    if agents <= traffic {
        return Err(StaffingError::Understaffed { traffic, agents });
    }

    let b = erlang_b(traffic, agents)?;
    let rho = traffic / agents;
    Ok(b / (1.0 - rho * (1.0 - b)))
}

/// Fraction of calls answered within `answer_seconds`:
/// SL = 1 − P(W>0)·exp(−(N−A)·T/AHT).
pub fn service_level(
    traffic: Erlangs,
    agents: Agents,
    aht_seconds: Seconds,
    answer_seconds: Seconds,
) -> StaffingResult<f64> {
    check_aht(aht_seconds)?;
    let wait = erlang_c(traffic, agents)?;
    if traffic == 0.0 {
        return Ok(1.0);
    }
    Ok(1.0 - wait * (-(agents - traffic) * answer_seconds / aht_seconds).exp())
}

/// Average speed of answer: P(W>0)·AHT / (N − A).
pub fn average_speed_of_answer(
    traffic: Erlangs,
    agents: Agents,
    aht_seconds: Seconds,
) -> StaffingResult<Seconds> {
    check_aht(aht_seconds)?;
    let wait = erlang_c(traffic, agents)?;
    if traffic == 0.0 {
        return Ok(0.0);
    }
    Ok(wait * aht_seconds / (agents - traffic))
}

/// Occupancy A / N. Zero traffic is 0 whatever N is; traffic with
/// no agents is `Understaffed`.
pub fn occupancy(traffic: Erlangs, agents: Agents) -> StaffingResult<f64> {
    check_traffic(traffic)?;
    check_agents(agents)?;
    if traffic == 0.0 {
        return Ok(0.0);
    }
    if agents == 0.0 {
        return Err(StaffingError::Understaffed { traffic, agents });
    }
    Ok(traffic / agents)
}

/// Square-root staffing estimate: ceil(A + K·√A).
pub fn square_root_staffing(traffic: Erlangs, k_factor: f64) -> StaffingResult<u32> {
    check_traffic(traffic)?;
    if !k_factor.is_finite() || k_factor < 0.0 {
        return Err(StaffingError::InvalidInput {
            field: "k factor",
            value: k_factor,
        });
    }
    Ok((traffic + k_factor * traffic.sqrt()).ceil() as u32)
}

fn check_traffic(traffic: Erlangs) -> StaffingResult<()> {
    if !traffic.is_finite() || traffic < 0.0 {
        return Err(StaffingError::InvalidInput {
            field: "traffic intensity",
            value: traffic,
        });
    }
    Ok(())
}

fn check_agents(agents: Agents) -> StaffingResult<()> {
    if !agents.is_finite() || !(0.0..=MAX_AGENTS).contains(&agents) {
        return Err(StaffingError::InvalidInput {
            field: "agent count",
            value: agents,
        });
    }
    Ok(())
}

fn check_aht(aht_seconds: Seconds) -> StaffingResult<()> {
    if !aht_seconds.is_finite() || aht_seconds <= 0.0 {
        return Err(StaffingError::InvalidInput {
            field: "average handle time",
            value: aht_seconds,
        });
    }
    Ok(())
}

/// Achievable service for one adequately staffed interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ServiceMetrics {
    pub traffic: Erlangs,
    pub net_agents: Agents,
    pub wait_probability: f64,
    pub service_level: f64,
    pub asa_seconds: Seconds,
    pub occupancy: f64,
    pub required_agents: u32,
    /// net − required. Positive = overstaffed.
    pub staffing_gap: f64,
}

/// Result of evaluating one interval. `Understaffed` is a legitimate
/// scheduling state ("need more agents"), not a failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntervalOutcome {
    Staffed(ServiceMetrics),
    Understaffed {
        traffic: Erlangs,
        net_agents: Agents,
        /// `None` when no count up to the search bound meets the target.
        required_agents: Option<u32>,
    },
}

impl IntervalOutcome {
    pub fn metrics(&self) -> Option<&ServiceMetrics> {
        match self {
            Self::Staffed(m) => Some(m),
            Self::Understaffed { .. } => None,
        }
    }

    pub fn is_understaffed(&self) -> bool {
        matches!(self, Self::Understaffed { .. })
    }

    pub fn traffic(&self) -> Erlangs {
        match self {
            Self::Staffed(m) => m.traffic,
            Self::Understaffed { traffic, .. } => *traffic,
        }
    }

    pub fn net_agents(&self) -> Agents {
        match self {
            Self::Staffed(m) => m.net_agents,
            Self::Understaffed { net_agents, .. } => *net_agents,
        }
    }

    pub fn required_agents(&self) -> Option<u32> {
        match self {
            Self::Staffed(m) => Some(m.required_agents),
            Self::Understaffed {
                required_agents, ..
            } => *required_agents,
        }
    }
}

/// Erlang C calculator bound to one caller-supplied service target.
/// Holds no state between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErlangEngine {
    target: ServiceTarget,
}

impl ErlangEngine {
    pub fn new(target: ServiceTarget) -> StaffingResult<Self> {
        target.validate()?;
        Ok(Self { target })
    }

    pub fn target(&self) -> ServiceTarget {
        self.target
    }

    pub fn wait_probability(&self, traffic: Erlangs, agents: Agents) -> StaffingResult<f64> {
        erlang_c(traffic, agents)
    }

    pub fn service_level(
        &self,
        traffic: Erlangs,
        agents: Agents,
        aht_seconds: Seconds,
    ) -> StaffingResult<f64> {
        service_level(traffic, agents, aht_seconds, self.target.answer_seconds)
    }

    pub fn asa(&self, traffic: Erlangs, agents: Agents, aht_seconds: Seconds) -> StaffingResult<Seconds> {
        average_speed_of_answer(traffic, agents, aht_seconds)
    }

    pub fn occupancy(&self, traffic: Erlangs, agents: Agents) -> StaffingResult<f64> {
        occupancy(traffic, agents)
    }

    /// Smallest integer agent count whose service level meets the target.
    ///
    /// Service level is non-decreasing in N, so this binary-searches
    /// from the first stable count (the smallest integer above A) up to
    /// 10·ceil(A) + 50, capped at `MAX_AGENTS`, failing with
    /// `NoSolutionFound` when the bound itself misses the target.
    pub fn required_agents(&self, traffic: Erlangs, aht_seconds: Seconds) -> StaffingResult<u32> {
        check_traffic(traffic)?;
        check_aht(aht_seconds)?;
        if traffic == 0.0 {
            return Ok(0);
        }

        let bound = (traffic.ceil() as u32)
            .saturating_mul(SEARCH_BOUND_FACTOR)
            .saturating_add(SEARCH_BOUND_OFFSET)
            .min(MAX_AGENTS as u32);
        let target = self.target.level;
        let no_solution = StaffingError::NoSolutionFound {
            traffic,
            target,
            bound,
        };

        let first_stable = (traffic.floor() as u32).saturating_add(1);
        if first_stable > bound {
            return Err(no_solution);
        }
        let at_bound = self.service_level(traffic, f64::from(bound), aht_seconds)?;
        if at_bound.is_nan() || at_bound < target {
            return Err(no_solution);
        }

        let mut lo = first_stable;
        let mut hi = bound;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.service_level(traffic, f64::from(mid), aht_seconds)? >= target {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        log::debug!(
            "required agents: traffic={traffic:.2} target={} -> {lo}",
            self.target
        );
        Ok(lo)
    }

    /// Net − required agents. Unstable intervals report `Understaffed`.
    pub fn staffing_gap(
        &self,
        traffic: Erlangs,
        net_agents: Agents,
        aht_seconds: Seconds,
    ) -> StaffingResult<f64> {
        if traffic > 0.0 && net_agents <= traffic {
            return Err(StaffingError::Understaffed {
                traffic,
                agents: net_agents,
            });
        }
        let required = self.required_agents(traffic, aht_seconds)?;
        Ok(net_agents - f64::from(required))
    }

    /// Evaluate one interval against its schedule.
    pub fn evaluate(
        &self,
        demand: &IntervalDemand,
        staffing: &StaffingInput,
    ) -> StaffingResult<IntervalOutcome> {
        let traffic = demand.traffic();
        let aht = demand.aht_seconds();
        let net = staffing.net_agents()?;

        if traffic > 0.0 && net <= traffic {
            let required = match self.required_agents(traffic, aht) {
                Ok(n) => Some(n),
                Err(StaffingError::NoSolutionFound { .. }) => None,
                Err(e) => return Err(e),
            };
            log::warn!(
                "understaffed interval: {net:.1} net agents for {traffic:.2} Erlangs, {} required",
                required.map_or_else(|| "no count".to_string(), |n| n.to_string())
            );
            return Ok(IntervalOutcome::Understaffed {
                traffic,
                net_agents: net,
                required_agents: required,
            });
        }

        let required = self.required_agents(traffic, aht)?;

        let metrics = ServiceMetrics {
            traffic,
            net_agents: net,
            wait_probability: self.wait_probability(traffic, net)?,
            service_level: self.service_level(traffic, net, aht)?,
            asa_seconds: self.asa(traffic, net, aht)?,
            occupancy: self.occupancy(traffic, net)?,
            required_agents: required,
            staffing_gap: net - f64::from(required),
        };

        log::debug!(
            "interval: A={:.2} N={:.1} P(W>0)={:.4} SL={:.4} ASA={:.1}s occ={:.3} gap={:+.1}",
            metrics.traffic,
            metrics.net_agents,
            metrics.wait_probability,
            metrics.service_level,
            metrics.asa_seconds,
            metrics.occupancy,
            metrics.staffing_gap
        );
        Ok(IntervalOutcome::Staffed(metrics))
    }

    /// Evaluate a sequence of intervals in order.
    pub fn evaluate_all(
        &self,
        intervals: &[(IntervalDemand, StaffingInput)],
    ) -> StaffingResult<Vec<IntervalOutcome>> {
        intervals
            .iter()
            .map(|(demand, staffing)| self.evaluate(demand, staffing))
            .collect()
    }

    /// Same as `evaluate_all`, spread across the rayon pool.
    /// Intervals are independent, so the output order and values match.
    pub fn evaluate_all_parallel(
        &self,
        intervals: &[(IntervalDemand, StaffingInput)],
    ) -> StaffingResult<Vec<IntervalOutcome>> {
        intervals
            .par_iter()
            .map(|(demand, staffing)| self.evaluate(demand, staffing))
            .collect()
    }
}
