pub mod channel;

pub use crate::queue::channel::RecordQueue;

#[cfg(test)]
mod tests;
