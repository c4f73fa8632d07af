//! IVF vector index
//!
//! ## Components
//!
//! - `distance`: metric definitions (score = -distance)
//! - `kmeans`: seeded k-means++ / Lloyd clustering
//! - `ivf`: the inverted-file index with lazy build and linear fallback
//! - `error`: index error type

pub mod distance;
pub mod error;
pub mod ivf;
pub mod kmeans;

pub use distance::DistanceMetric;
pub use error::{IndexError, IndexResult};
pub use ivf::{Cluster, Clustering, IndexStats, IvfIndex, IvfParams};
pub use kmeans::KMeansParams;
