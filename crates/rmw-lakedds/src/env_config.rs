// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Environment variable configuration for rmw_lakedds.
//!
//! Reads runtime configuration from environment variables:
//!
//! - `LAKEDDS_WAITSET_CAPACITY`: initial capacity of the wait-set scratch
//!   condition sequences (default: 256)
//! - `RMW_WAITSET_CAPACITY`: fallback for `LAKEDDS_WAITSET_CAPACITY`
//!
//! Invalid values fall back to the default with a warning; they never abort.

use std::env;

/// Environment variable for the wait-set scratch capacity.
pub const ENV_WAITSET_CAPACITY: &str = "LAKEDDS_WAITSET_CAPACITY";
/// RMW-generic fallback for [`ENV_WAITSET_CAPACITY`].
pub const ENV_RMW_WAITSET_CAPACITY: &str = "RMW_WAITSET_CAPACITY";

/// Default scratch capacity per wait-set.
/// 256 covers large ROS 2 nodes (ros2_control ~150 subs, nav2 ~100).
pub const DEFAULT_WAITSET_CAPACITY: usize = 256;

/// Wait-set scratch capacity, from the environment or the default.
#[must_use]
pub fn waitset_capacity() -> usize {
    for name in [ENV_WAITSET_CAPACITY, ENV_RMW_WAITSET_CAPACITY] {
        let Ok(raw) = env::var(name) else { continue };
        match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => return value,
            _ => {
                log::warn!(
                    "[env-config] ignoring invalid {}={:?}, using default {}",
                    name,
                    raw,
                    DEFAULT_WAITSET_CAPACITY
                );
                return DEFAULT_WAITSET_CAPACITY;
            }
        }
    }
    DEFAULT_WAITSET_CAPACITY
}
