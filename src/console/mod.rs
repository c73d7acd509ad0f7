//! Server console handling: following the log and classifying its lines.

pub mod classifier;
pub mod follower;
pub mod keywords;
pub mod prefix;

pub use classifier::Classifier;
pub use follower::LogFollower;
pub use keywords::KeywordSet;
