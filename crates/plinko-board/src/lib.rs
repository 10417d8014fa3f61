//! Stand-in for the Plinko board simulation.
//!
//! The real board is a rigid-body simulation; this crate only needs to emit
//! the same kind of data it does: one observation per ball that settles in a
//! bucket. Balls take a random walk through the peg rows instead of being
//! simulated physically.
//!
//! - [`BoardGeometry`] - canvas, peg grid and bucket layout
//! - [`BallSpec`] - ranges balls draw their bounciness and size from
//! - [`Board`] - in-flight balls, dropping and settling
//! - [`DropPlan`] - scan across the board or drop on a single spot
//!
//! # Example
//!
//! ```
//! use plinko_board::{BallSpec, Board, DropPlan};
//! use plinko_knn::ObservationStore;
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(7);
//! let mut board = Board::new();
//! let mut store = ObservationStore::new();
//!
//! let plan = DropPlan::Spot { position: 300.0, quantity: 20 };
//! let dropped = board.drop_plan(&plan, &BallSpec::default(), &mut rng);
//! let settled = board.settle(&mut store, &mut rng);
//! assert_eq!(dropped, 20);
//! assert_eq!(settled, 20);
//! assert_eq!(store.len(), 20);
//! ```

pub use self::{ball::*, board::*, geometry::*};

mod ball;
mod board;
mod geometry;
