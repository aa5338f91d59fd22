mod client;
mod money;
mod order;
mod payment;
mod project;
mod revenue;

pub use client::*;
pub use money::*;
pub use order::*;
pub use payment::*;
pub use project::*;
pub use revenue::*;
