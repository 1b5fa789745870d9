//! NEAT neuroevolution: innovation-tracked genomes, compatibility speciation with
//! fitness sharing, and decoding of genomes into feed-forward networks.
//!
//! ```no_run
//! use neat_pilot::neat::{common::Settings, population::Population, seeded_rng};
//!
//! let mut rng = seeded_rng(7);
//! let mut population = Population::init(&mut rng, &Settings::standard(5, 2))?;
//! for _ in 0..10 {
//!     let fitness: Vec<f64> = population
//!         .decode_networks()
//!         .iter_mut()
//!         .map(|network| network.predict(&[0.2; 5]).map(|out| out[0]).unwrap_or(0.))
//!         .collect();
//!     population.assign_fitness(&fitness);
//!     population.next_generation(&mut rng);
//! }
//! # Ok::<(), neat_pilot::neat::error::SettingsError>(())
//! ```

pub mod neat;

pub use neat::common::Settings;
pub use neat::error::{NetworkError, SettingsError};
pub use neat::genome::Genome;
pub use neat::network::Network;
pub use neat::population::{Evaluator, GenerationSummary, Population};
