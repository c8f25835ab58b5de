#[macro_use]
extern crate log;

#[macro_use]
extern crate anyhow;

pub mod math;
pub mod rooms;
pub mod scene;

#[cfg(test)]
pub mod test_common;
