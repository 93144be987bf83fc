//! Simulation configuration.

use std::str::FromStr;

use hexroll_protocol::ProtocolConfig;
use hexroll_topology::Layout;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a simulated mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random source in the run
    pub seed: u64,

    /// Probability that one byte on one link is dropped for one tick
    pub loss_rate: f64,

    /// A face reads as fresh while its last delivery is at most this many
    /// ticks old
    pub stale_after: u64,

    /// Protocol tunables shared by every tile
    pub protocol: ProtocolConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            loss_rate: 0.0,
            stale_after: 2,
            protocol: ProtocolConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Defaults overridden by `HEXROLL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let protocol = defaults
            .protocol
            .with_send_repeats(env_or("HEXROLL_SEND_REPEATS", defaults.protocol.send_repeats)?)
            .with_min_confirm(env_or("HEXROLL_MIN_CONFIRM", defaults.protocol.min_confirm)?)
            .with_answer_window(env_or(
                "HEXROLL_ANSWER_WINDOW",
                defaults.protocol.answer_window,
            )?);

        let config = Self {
            seed: env_or("HEXROLL_SEED", defaults.seed)?,
            loss_rate: env_or("HEXROLL_LOSS_RATE", defaults.loss_rate)?,
            stale_after: env_or("HEXROLL_STALE_AFTER", defaults.stale_after)?,
            protocol,
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_loss_rate(mut self, rate: f64) -> Self {
        self.loss_rate = rate;
        self
    }

    #[must_use]
    pub fn with_stale_after(mut self, ticks: u64) -> Self {
        self.stale_after = ticks;
        self
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }

    /// Check the medium settings and the protocol config.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.loss_rate) {
            return Err(Error::LossRate(self.loss_rate));
        }
        self.protocol.validate()?;
        Ok(())
    }

    /// Check that a query can reach the far side of `layout` and a dissent
    /// can make it back before the answer window closes.
    pub fn check_layout(&self, layout: &Layout) -> Result<()> {
        let diameter = layout.diameter();
        let needed = u32::try_from(diameter)
            .unwrap_or(u32::MAX)
            .saturating_mul(2)
            .saturating_add(self.protocol.send_repeats);
        if self.protocol.answer_window < needed {
            return Err(Error::AnswerWindow {
                window: self.protocol.answer_window,
                diameter,
                needed,
            });
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| Error::Env { var, value }),
        Err(_) => Ok(default),
    }
}
