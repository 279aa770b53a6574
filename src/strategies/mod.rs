pub mod adaptive;
pub mod traits;
pub mod trend;
