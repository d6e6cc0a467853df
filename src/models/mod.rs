pub mod banner;
pub mod common;
pub mod member;
pub mod payment;
pub mod portfolio;
pub mod reservation;
pub mod review;
pub mod settings;
pub mod stats;
pub mod upload;

pub use banner::*;
pub use common::*;
pub use member::*;
pub use payment::*;
pub use portfolio::*;
pub use reservation::*;
pub use review::*;
pub use settings::*;
pub use stats::*;
pub use upload::*;
