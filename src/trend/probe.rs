//! Where CPU samples come from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::metrics::SystemDiagnostics;

/// Source of the CPU utilisation fed to the spike detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuSource {
    /// Load average per core of the remote engine, from system diagnostics.
    #[default]
    Diagnostics,
    /// Global CPU usage of the host running this process.
    Host,
    /// No CPU estimator.
    Disabled,
}

impl fmt::Display for CpuSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuSource::Diagnostics => write!(f, "diagnostics"),
            CpuSource::Host => write!(f, "host"),
            CpuSource::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for CpuSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diagnostics" => Ok(CpuSource::Diagnostics),
            "host" => Ok(CpuSource::Host),
            "disabled" | "off" | "none" => Ok(CpuSource::Disabled),
            other => Err(format!("unknown CPU source '{}'", other)),
        }
    }
}

/// Samples host CPU usage through `sysinfo`.
///
/// Usage is computed between consecutive refreshes, so the first sample
/// after construction reads 0 on most platforms.
pub struct HostCpuProbe {
    system: System,
}

impl HostCpuProbe {
    pub fn new() -> Self {
        let refresh = RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_cpu_usage());
        let mut system = System::new_with_specifics(refresh);
        system.refresh_cpu_usage();
        Self { system }
    }

    /// Global CPU usage in percent since the previous call.
    pub fn sample(&mut self) -> Option<f64> {
        self.system.refresh_cpu_usage();
        Some(f64::from(self.system.global_cpu_usage())).filter(|pct| pct.is_finite())
    }
}

impl Default for HostCpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostCpuProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCpuProbe")
            .field("cpus", &self.system.cpus().len())
            .finish()
    }
}

/// A configured CPU source with whatever state it needs.
#[derive(Debug)]
pub enum CpuSampler {
    Diagnostics,
    Host(HostCpuProbe),
    Disabled,
}

impl CpuSampler {
    pub fn new(source: CpuSource) -> Self {
        match source {
            CpuSource::Diagnostics => CpuSampler::Diagnostics,
            CpuSource::Host => CpuSampler::Host(HostCpuProbe::new()),
            CpuSource::Disabled => CpuSampler::Disabled,
        }
    }

    /// Take one CPU sample, or `None` when disabled or unavailable.
    pub fn sample(&mut self, diagnostics: Option<&SystemDiagnostics>) -> Option<f64> {
        match self {
            CpuSampler::Diagnostics => diagnostics.and_then(SystemDiagnostics::load_cpu_pct),
            CpuSampler::Host(probe) => probe.sample(),
            CpuSampler::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_source_parse() {
        assert_eq!("Host".parse::<CpuSource>().unwrap(), CpuSource::Host);
        assert_eq!("off".parse::<CpuSource>().unwrap(), CpuSource::Disabled);
        assert!("gpu".parse::<CpuSource>().is_err());
        assert_eq!(CpuSource::default().to_string(), "diagnostics");
    }

    #[test]
    fn test_diagnostics_sampler() {
        let diagnostics = SystemDiagnostics {
            processor_load_average: Some(1.0),
            available_processors: Some(4),
            ..Default::default()
        };
        let mut sampler = CpuSampler::new(CpuSource::Diagnostics);
        assert_eq!(sampler.sample(Some(&diagnostics)), Some(25.0));
        assert_eq!(sampler.sample(None), None);

        let mut disabled = CpuSampler::new(CpuSource::Disabled);
        assert_eq!(disabled.sample(Some(&diagnostics)), None);
    }

    #[test]
    fn test_host_sampler_is_a_percentage() {
        let mut sampler = CpuSampler::new(CpuSource::Host);
        if let Some(pct) = sampler.sample(None) {
            assert!(pct >= 0.0);
        }
    }
}
