use crate::dht22::{celsius_to_fahrenheit, round_to, Measurement};
use log::{info, warn};

/// A source of complete sensor measurements.
///
/// Implemented by the hardware transport in the binary crate and by scripted
/// mocks in tests. One call performs one complete sensor transaction.
pub trait Sample {
    /// Fault raised by a failed measurement attempt.
    type Fault: core::fmt::Display;

    /// Perform one measurement transaction.
    ///
    /// # Returns
    /// * `Result<Measurement, Self::Fault>` - The decoded measurement or the fault.
    fn sample(&mut self) -> Result<Measurement, Self::Fault>;
}

/// A blocking delay source.
pub trait Delay {
    /// Block for the given number of milliseconds.
    ///
    /// # Arguments
    /// * `ms` - The number of milliseconds to block.
    fn delay_ms(&mut self, ms: u32);
}

/// Retry policy for one acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of measurement attempts per cycle.
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds.
    pub retry_delay_ms: u32,
}

/// Implementation of the `Default` trait for `RetryPolicy`.
impl Default for RetryPolicy {
    /// Ten attempts, 250 ms apart.
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay_ms: 250,
        }
    }
}

/// A display-ready temperature produced by one acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Fahrenheit, rounded for rendering.
    pub temperature_f: f32,
}

/// Outcome of one bounded-retry acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acquired {
    /// A measurement was obtained on the given 1-based attempt.
    Reading { reading: Reading, attempts: u32 },

    /// Every attempt failed. The caller must treat this as its own outcome,
    /// never substitute a stale or zero value.
    NoReading { attempts: u32 },
}

/// Run one acquisition cycle against the given sampler.
///
/// Each transient fault is logged with its attempt number and retried after
/// the policy delay. On success the Celsius value is converted to Fahrenheit
/// and rounded to `decimals` fractional digits.
///
/// # Arguments
/// * `sampler` - The measurement source.
/// * `delay` - The blocking delay source used between attempts.
/// * `policy` - The retry policy for this cycle.
/// * `decimals` - The number of fractional digits kept in the reading.
///
/// # Returns
/// * `Acquired` - The converted reading, or `NoReading` on exhaustion.
pub fn acquire<S, D>(sampler: &mut S, delay: &mut D, policy: RetryPolicy, decimals: u32) -> Acquired
where
    S: Sample,
    D: Delay,
{
    for attempt in 1..=policy.max_attempts {
        match sampler.sample() {
            Ok(measurement) => {
                info!(
                    "Measured {:.1} %RH, {:.1} degrees C on attempt {attempt}",
                    measurement.humidity_percent, measurement.temperature_c
                );

                let temperature_f =
                    round_to(celsius_to_fahrenheit(measurement.temperature_c), decimals);

                return Acquired::Reading {
                    reading: Reading { temperature_f },
                    attempts: attempt,
                };
            }
            Err(fault) => {
                warn!(
                    "Measurement attempt {attempt}/{} failed: {fault}",
                    policy.max_attempts
                );
            }
        }

        delay.delay_ms(policy.retry_delay_ms);
    }

    Acquired::NoReading {
        attempts: policy.max_attempts,
    }
}

/// Tests.
#[cfg(test)]
mod tests {
    use super::*;

    /// Sampler that replays a fixed script of results.
    struct ScriptedSampler {
        script: Vec<Result<Measurement, &'static str>>,
        calls: usize,
    }

    impl ScriptedSampler {
        fn new(script: Vec<Result<Measurement, &'static str>>) -> Self {
            Self { script, calls: 0 }
        }
    }

    impl Sample for ScriptedSampler {
        type Fault = &'static str;

        fn sample(&mut self) -> Result<Measurement, &'static str> {
            let result = self.script[self.calls];
            self.calls += 1;
            result
        }
    }

    /// Delay that records every requested pause instead of blocking.
    #[derive(Default)]
    struct CountingDelay {
        pauses_ms: Vec<u32>,
    }

    impl Delay for CountingDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.pauses_ms.push(ms);
        }
    }

    fn measurement(temperature_c: f32) -> Measurement {
        Measurement {
            humidity_percent: 50.0,
            temperature_c,
        }
    }

    #[test]
    fn succeeds_on_first_attempt() {
        let mut sampler = ScriptedSampler::new(vec![Ok(measurement(22.5))]);
        let mut delay = CountingDelay::default();

        let outcome = acquire(&mut sampler, &mut delay, RetryPolicy::default(), 0);

        assert_eq!(
            outcome,
            Acquired::Reading {
                reading: Reading { temperature_f: 73.0 },
                attempts: 1
            }
        );
        assert_eq!(sampler.calls, 1);
        assert!(delay.pauses_ms.is_empty());
    }

    #[test]
    fn retries_transient_faults_then_succeeds() {
        let mut sampler = ScriptedSampler::new(vec![
            Err("checksum mismatch"),
            Err("bit pulse timeout"),
            Ok(measurement(21.25)),
        ]);
        let mut delay = CountingDelay::default();

        let outcome = acquire(&mut sampler, &mut delay, RetryPolicy::default(), 1);

        match outcome {
            Acquired::Reading { reading, attempts } => {
                assert_eq!(attempts, 3);
                assert!((reading.temperature_f - 70.3).abs() < 1e-4);
            }
            Acquired::NoReading { .. } => panic!("expected a reading"),
        }

        // One pause per failed attempt, each the policy delay.
        assert_eq!(sampler.calls, 3);
        assert_eq!(delay.pauses_ms, vec![250, 250]);
    }

    #[test]
    fn exhaustion_reports_no_reading() {
        let mut sampler = ScriptedSampler::new(vec![Err("bus release timeout"); 10]);
        let mut delay = CountingDelay::default();

        let outcome = acquire(&mut sampler, &mut delay, RetryPolicy::default(), 1);

        assert_eq!(outcome, Acquired::NoReading { attempts: 10 });
        assert_eq!(sampler.calls, 10);
        assert_eq!(delay.pauses_ms.len(), 10);
    }

    #[test]
    fn custom_policy_bounds_attempts() {
        let mut sampler = ScriptedSampler::new(vec![Err("fault"); 3]);
        let mut delay = CountingDelay::default();

        let policy = RetryPolicy {
            max_attempts: 3,
            retry_delay_ms: 50,
        };

        let outcome = acquire(&mut sampler, &mut delay, policy, 1);

        assert_eq!(outcome, Acquired::NoReading { attempts: 3 });
        assert_eq!(delay.pauses_ms, vec![50, 50, 50]);
    }

    #[test]
    fn zero_attempts_never_samples() {
        let mut sampler = ScriptedSampler::new(vec![]);
        let mut delay = CountingDelay::default();

        let policy = RetryPolicy {
            max_attempts: 0,
            retry_delay_ms: 250,
        };

        let outcome = acquire(&mut sampler, &mut delay, policy, 1);

        assert_eq!(outcome, Acquired::NoReading { attempts: 0 });
        assert_eq!(sampler.calls, 0);
    }
}
