pub mod farmer;

pub use farmer::PostgresFarmerRepository;
