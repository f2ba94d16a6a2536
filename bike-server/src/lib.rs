//! Bike-share journey helper.
//!
//! Answers: "If I take a bike from my home station to this one, how far is
//! it, how long will it take and when will I get there?" Also fetches the
//! live station list, the weather and the predicted availability that go
//! with the answer.

pub mod backend;
pub mod cache;
pub mod config;
pub mod domain;
pub mod estimate;
pub mod session;
pub mod stations;
