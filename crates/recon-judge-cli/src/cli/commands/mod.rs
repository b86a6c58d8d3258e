pub mod aggregate;
mod dispatch;
pub mod judge;

pub use dispatch::dispatch;
