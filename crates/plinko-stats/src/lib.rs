//! Statistical helpers for the Plinko workspace.
//!
//! Only descriptive statistics live here for now:
//!
//! - [`descriptive`]: min, max, mean, median, variance and standard deviation
//!
//! # Example
//!
//! ```
//! use plinko_stats::descriptive::DescriptiveStats;
//!
//! let accuracies = [0.25, 0.5, 0.75];
//! let stats = DescriptiveStats::new(accuracies).unwrap();
//! assert_eq!(stats.mean, 0.5);
//! ```

pub mod descriptive;
