//! Hardware-independent DHT-22 logic: frame decoding, unit conversion and
//! the bounded-retry acquisition engine.
//!
//! The crate knows nothing about GPIO or timing. The binary crate owns the
//! one-wire transport and hands complete 5-byte frames to [`dht22`], and
//! implements the [`acquire`] traits so the retry loop can be unit tested
//! against scripted samplers on a host machine.

pub mod acquire;
pub mod dht22;
