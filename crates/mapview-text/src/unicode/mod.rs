pub mod clusters;

pub use clusters::{cluster_end, is_cluster_extender};
