//! Scenario planning
//!
//! A scenario turns a random number generator into one concrete request.
//! Planning is pure so a seeded RNG always yields the same request sequence.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::types::GeneratorError;

/// Seconds the server is asked to hold an allocation
pub const ALLOCATION_KEEP_SECS: u64 = 5 * 60;

/// One kind of randomized request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Ask the server to allocate memory
    Memory,
    /// Ask the server to burn CPU (square roots or Fibonacci)
    Cpu,
    /// Ask the server to answer with an arbitrary status code
    Status,
    /// Ask the server to sleep before answering
    Wait,
    /// Upload a payload for the server to receive
    Receive,
    /// Download a payload the server generates
    Generate,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Memory,
        Scenario::Cpu,
        Scenario::Status,
        Scenario::Wait,
        Scenario::Receive,
        Scenario::Generate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Memory => "memory",
            Scenario::Cpu => "cpu",
            Scenario::Status => "status",
            Scenario::Wait => "wait",
            Scenario::Receive => "receive",
            Scenario::Generate => "generate",
        }
    }

    /// Draw the parameters for this scenario
    pub fn plan<R: Rng + ?Sized>(self, rng: &mut R) -> PlannedRequest {
        match self {
            Scenario::Memory => {
                let mb = rng.random_range(0..128u64);
                PlannedRequest {
                    scenario: self,
                    route: "/allocate",
                    query: vec![("mb", mb), ("keep", ALLOCATION_KEEP_SECS)],
                    payload: Payload::None,
                    description: format!("allocating {}MB of memory", mb),
                }
            }
            Scenario::Cpu => {
                if rng.random_bool(0.5) {
                    let n = rng.random_range(0..100u64) * 1000 * 1000;
                    PlannedRequest {
                        scenario: self,
                        route: "/sqrt2",
                        query: vec![("n", n)],
                        payload: Payload::None,
                        description: format!("generating {} square roots of 2", n),
                    }
                } else {
                    let n = 30 + rng.random_range(0..15u64);
                    PlannedRequest {
                        scenario: self,
                        route: "/fibo",
                        query: vec![("n", n)],
                        payload: Payload::None,
                        description: format!("computing fibo({})", n),
                    }
                }
            }
            Scenario::Status => {
                let class = 2 + rng.random_range(0..4u64);
                let status = class * 100 + rng.random_range(0..20u64);
                PlannedRequest {
                    scenario: self,
                    route: "/status",
                    query: vec![("status", status)],
                    payload: Payload::None,
                    description: format!("make query with status code {}", status),
                }
            }
            Scenario::Wait => {
                let time = rng.random_range(0..2000u64);
                PlannedRequest {
                    scenario: self,
                    route: "/wait",
                    query: vec![("time", time)],
                    payload: Payload::None,
                    description: format!("making query taking {}ms", time),
                }
            }
            Scenario::Receive => {
                let mb = rng.random_range(0..64u64);
                PlannedRequest {
                    scenario: self,
                    route: "/send",
                    query: Vec::new(),
                    payload: Payload::Upload { mb },
                    description: format!("uploading {}MB of data", mb),
                }
            }
            Scenario::Generate => {
                let mb = rng.random_range(0..64u64);
                PlannedRequest {
                    scenario: self,
                    route: "/generate",
                    query: vec![("mb", mb)],
                    payload: Payload::Download,
                    description: format!("downloading {}MB of data", mb),
                }
            }
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GeneratorError::UnknownScenario(wanted.to_string()))
    }
}

/// Body handling for a planned request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Plain GET, the response body is read and discarded
    None,
    /// POST a multipart `file` field of `mb` MiB
    Upload { mb: u64 },
    /// GET a binary body and count its bytes
    Download,
}

/// A fully parameterized request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRequest {
    pub scenario: Scenario,
    /// Route appended to the base URL
    pub route: &'static str,
    /// Numeric query parameters, in order
    pub query: Vec<(&'static str, u64)>,
    pub payload: Payload,
    /// Human readable line logged when the request is fired
    pub description: String,
}

/// Parse `name=weight` pairs separated by commas, e.g. `memory=2,cpu=1`.
///
/// A bare name counts as weight 1. Scenarios not listed are never picked.
pub fn parse_weights(raw: &str) -> Result<Vec<(Scenario, u32)>, GeneratorError> {
    let mut weights: Vec<(Scenario, u32)> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, weight) = match entry.split_once('=') {
            Some((name, weight)) => {
                let weight = weight.trim().parse::<u32>().map_err(|_| {
                    GeneratorError::InvalidWeights(format!("bad weight in '{}'", entry))
                })?;
                (name, weight)
            }
            None => (entry, 1),
        };

        let scenario: Scenario = name.parse()?;
        if weights.iter().any(|(s, _)| *s == scenario) {
            return Err(GeneratorError::InvalidWeights(format!(
                "scenario '{}' listed twice",
                scenario
            )));
        }
        weights.push((scenario, weight));
    }

    if weights.is_empty() {
        return Err(GeneratorError::InvalidWeights(
            "no scenarios listed".to_string(),
        ));
    }

    Ok(weights)
}

/// Picks the next scenario, uniformly or by weight
#[derive(Debug, Clone)]
pub struct ScenarioPicker {
    scenarios: Vec<Scenario>,
    /// `None` means every listed scenario is equally likely
    index: Option<WeightedIndex<u32>>,
}

impl ScenarioPicker {
    /// Every scenario with the same probability
    pub fn uniform() -> Self {
        Self {
            scenarios: Scenario::ALL.to_vec(),
            index: None,
        }
    }

    /// Scenarios picked proportionally to their weight
    pub fn weighted(weights: &[(Scenario, u32)]) -> Result<Self, GeneratorError> {
        let index = WeightedIndex::new(weights.iter().map(|(_, w)| *w))?;
        Ok(Self {
            scenarios: weights.iter().map(|(s, _)| *s).collect(),
            index: Some(index),
        })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Scenario {
        let slot = match &self.index {
            Some(index) => index.sample(rng),
            None => rng.random_range(0..self.scenarios.len()),
        };
        self.scenarios[slot]
    }
}

impl Default for ScenarioPicker {
    fn default() -> Self {
        Self::uniform()
    }
}
