pub mod thingspeak;

pub use thingspeak::ThingSpeakClient;
