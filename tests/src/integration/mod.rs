//! Integration flows between the request pipeline and the dispatcher.

pub mod fixtures;

mod flows;
mod http;
