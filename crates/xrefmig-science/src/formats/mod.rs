pub mod deposit;

pub use deposit::{DepositHead, render_batch};
