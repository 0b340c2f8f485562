mod csv;

pub use csv::TrajectoryFile;
