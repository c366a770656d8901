// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, Result, Scenario, TagReader, Transport};
use core::fmt;
use s7tag_core::{plan::ReadPlanner, DecodedValue, TagDescriptor};
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};

/// how a read cycle fetches its tags
#[derive(Debug, Clone, Copy)]
pub enum ReadMode {
    /// one round trip per tag
    Single,
    /// multi-item requests packed by the planner
    Planned(ReadPlanner),
}

impl Default for ReadMode {
    fn default() -> Self {
        ReadMode::Single
    }
}

/// timings of a benchmark run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchResults {
    /// time to connect
    pub connection_time: Duration,
    /// time to disconnect
    pub disconnection_time: Duration,
    /// number of read cycles
    pub num_read_cycles: usize,
    /// time of each read cycle
    pub read_times: Vec<Duration>,
}

impl BenchResults {
    /// average read cycle time; zero without cycles
    pub fn average_read_time(&self) -> Duration {
        if self.read_times.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.read_times.iter().sum();
        total / self.read_times.len() as u32
    }
}

impl fmt::Display for BenchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ms connect, {} ms disconnect, {} ms avg read time",
            self.connection_time.as_millis(),
            self.disconnection_time.as_millis(),
            self.average_read_time().as_millis()
        )
    }
}

/// timer driven read-decode-compare benchmark
///
/// # Examples
/// ```rust
/// use s7tag_async::{Benchmark, MemoryTransport, Scenario};
/// use std::time::Duration;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let transport = MemoryTransport::new();
///     transport.write_block(4, 6, &[0x00, 0x2A]);
///     let scenario = Scenario::new(3, Duration::from_millis(1))
///         .tag("%DB4:6:INT", "int;42")
///         .unwrap();
///
///     let results = Benchmark::new("memory", transport, scenario)
///         .run()
///         .await
///         .unwrap();
///     assert_eq!(results.num_read_cycles, 3);
///     assert_eq!(results.read_times.len(), 3);
/// });
/// ```
#[derive(Debug)]
pub struct Benchmark<T> {
    name: String,
    reader: TagReader<T>,
    scenario: Scenario,
    mode: ReadMode,
}

impl<T: Transport> Benchmark<T> {
    /// create benchmark reading tags one by one
    pub fn new(name: impl Into<String>, transport: T, scenario: Scenario) -> Self {
        Self {
            name: name.into(),
            reader: TagReader::new(transport),
            scenario,
            mode: ReadMode::Single,
        }
    }

    /// select read mode
    #[inline]
    pub fn mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    /// benchmark name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// underlying transport
    #[inline]
    pub fn transport(&self) -> &T {
        self.reader.transport()
    }

    /// connect, run all read cycles, then disconnect.
    /// disconnect is attempted even if connecting or a cycle failed;
    /// the first failure is returned.
    pub async fn run(&self) -> Result<BenchResults> {
        info!(
            "running '{}': {} tags, {} cycles, {}ms intervals",
            self.name,
            self.scenario.tags().len(),
            self.scenario.num_cycles(),
            self.scenario.cycle_time().as_millis()
        );
        let mut results = BenchResults {
            num_read_cycles: self.scenario.num_cycles(),
            ..Default::default()
        };

        let start = Instant::now();
        let mut outcome = self.reader.connect().await;
        results.connection_time = start.elapsed();

        if outcome.is_ok() {
            outcome = self.cycles(&mut results.read_times).await;
        }

        let start = Instant::now();
        let disconnected = self.reader.disconnect().await;
        results.disconnection_time = start.elapsed();
        if let Err(ref e) = disconnected {
            warn!("'{}': disconnect failed: {}", self.name, e);
        }

        outcome.and(disconnected)?;
        info!("'{}' --> {}", self.name, results);
        Ok(results)
    }

    async fn cycles(&self, read_times: &mut Vec<Duration>) -> Result<()> {
        let num_cycles = self.scenario.num_cycles();
        if num_cycles == 0 {
            return Ok(());
        }
        let tags: Vec<(usize, TagDescriptor)> = self
            .scenario
            .tags()
            .iter()
            .enumerate()
            .map(|(i, spec)| (i, spec.tag))
            .collect();
        let cycle_time = self.scenario.cycle_time();
        // interval panics on a zero period
        let mut interval = if cycle_time.is_zero() {
            None
        } else {
            let mut interval = time::interval(cycle_time);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(interval)
        };

        for cycle in 0..num_cycles {
            if let Some(ref mut interval) = interval {
                interval.tick().await;
            }
            let start = Instant::now();
            let values = match self.mode {
                ReadMode::Single => self.reader.read_tags(&tags).await,
                ReadMode::Planned(ref planner) => {
                    self.reader.read_tags_planned(planner, &tags).await
                }
            };
            let elapsed = start.elapsed();
            self.check(values)?;
            trace!("'{}' cycle {}: {:?}", self.name, cycle, elapsed);
            read_times.push(elapsed);
        }
        Ok(())
    }

    fn check(&self, values: Vec<(usize, Result<DecodedValue>)>) -> Result<()> {
        let specs = self.scenario.tags();
        for (i, value) in values {
            let spec = &specs[i];
            match value {
                Err(e) => {
                    return Err(Error::Tag {
                        name: spec.name.clone(),
                        address: spec.address.clone(),
                        source: Box::new(e),
                    })
                }
                Ok(v) if !spec.expected.matches(&v) => {
                    return Err(Error::Mismatch {
                        name: spec.name.clone(),
                        address: spec.address.clone(),
                        expected: spec.expected.to_string(),
                        actual: v.to_string(),
                    })
                }
                Ok(_) => {}
            }
        }
        Ok(())
    }
}

impl From<ReadPlanner> for ReadMode {
    #[inline]
    fn from(planner: ReadPlanner) -> Self {
        ReadMode::Planned(planner)
    }
}
